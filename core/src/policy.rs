//! Field classification and enforcement.
//!
//! Every configuration field belongs to a [`Scope`]. A fixed table decides
//! whether the field may hold behaviour freely, may only hold raw markup or
//! code when the host opts in, or is a map whose entries are always compiled.

use crate::api::{Engine, Error};
use crate::descriptor::{Callable, ConfigValue, FunctionDescriptor, expression_callable, resolve};
use crate::sanitizer::Diagnostic;
use std::collections::BTreeMap;

/// Markup substituted for blocked template fields.
pub const EMPTY_TEMPLATE: &str = "<div></div>";

/// Where in the configuration tree a field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Grid,
    Column,
    HeaderParams,
    DetailParams,
}

/// Safe replacement for a blocked field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neutral {
    /// A callable returning `""`.
    EmptyFunction,
    /// The literal [`EMPTY_TEMPLATE`].
    EmptyTemplate,
}

impl Neutral {
    pub fn value(self) -> ConfigValue {
        match self {
            Neutral::EmptyFunction => ConfigValue::Callable(Callable::empty()),
            Neutral::EmptyTemplate => ConfigValue::string(EMPTY_TEMPLATE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityClassification {
    Unrestricted,
    RestrictedUnlessOptIn { neutral: Neutral },
    AlwaysRewritten,
}

struct FieldTable {
    unrestricted: &'static [&'static str],
    empty_function: &'static [&'static str],
    empty_template: &'static [&'static str],
    always_rewritten: &'static [&'static str],
}

const COLUMN_FIELDS: FieldTable = FieldTable {
    unrestricted: &[
        "valueGetter",
        "valueFormatter",
        "valueParser",
        "valueSetter",
        "filterValueGetter",
        "headerValueGetter",
        "tooltipValueGetter",
        "keyCreator",
        "equals",
        "comparator",
        "pivotComparator",
        "colSpan",
        "rowSpan",
        "editable",
        "checkboxSelection",
        "showDisabledCheckboxes",
        "suppressKeyboardEvent",
        "rowDrag",
        "getQuickFilterText",
        "cellClass",
        "headerClass",
        "cellStyle",
    ],
    empty_function: &[
        "cellRenderer",
        "cellRendererSelector",
        "cellEditor",
        "cellEditorSelector",
        "headerComponent",
        "tooltipComponent",
        "floatingFilterComponent",
    ],
    empty_template: &[],
    always_rewritten: &["cellClassRules"],
};

const GRID_FIELDS: FieldTable = FieldTable {
    unrestricted: &[
        "getRowId",
        "getRowClass",
        "getRowHeight",
        "isRowSelectable",
        "isExternalFilterPresent",
        "doesExternalFilterPass",
        "postSortRows",
        "getDataPath",
        "isRowMaster",
        "getContextMenuItems",
        "processCellForClipboard",
        "navigateToNextCell",
        "tabToNextCell",
    ],
    empty_function: &[
        "loadingOverlayComponent",
        "noRowsOverlayComponent",
        "fullWidthCellRenderer",
        "groupRowRenderer",
    ],
    empty_template: &["overlayLoadingTemplate", "overlayNoRowsTemplate"],
    always_rewritten: &["rowClassRules"],
};

const TEMPLATE_ONLY: FieldTable = FieldTable {
    unrestricted: &[],
    empty_function: &[],
    empty_template: &["template"],
    always_rewritten: &[],
};

fn table(scope: Scope) -> &'static FieldTable {
    match scope {
        Scope::Grid => &GRID_FIELDS,
        Scope::Column => &COLUMN_FIELDS,
        Scope::HeaderParams | Scope::DetailParams => &TEMPLATE_ONLY,
    }
}

fn listed(scope: Scope, field: &str) -> Option<SecurityClassification> {
    let table = table(scope);
    if table.unrestricted.contains(&field) {
        Some(SecurityClassification::Unrestricted)
    } else if table.empty_function.contains(&field) {
        Some(SecurityClassification::RestrictedUnlessOptIn {
            neutral: Neutral::EmptyFunction,
        })
    } else if table.empty_template.contains(&field) {
        Some(SecurityClassification::RestrictedUnlessOptIn {
            neutral: Neutral::EmptyTemplate,
        })
    } else if table.always_rewritten.contains(&field) {
        Some(SecurityClassification::AlwaysRewritten)
    } else {
        None
    }
}

/// Classification of `field` in `scope`. Unlisted fields are unrestricted.
pub fn classify(scope: Scope, field: &str) -> SecurityClassification {
    listed(scope, field).unwrap_or(SecurityClassification::Unrestricted)
}

/// Whether `field` is one of the behaviour fields of `scope`. Unlisted fields
/// are plain data and never compiled.
pub fn is_listed(scope: Scope, field: &str) -> bool {
    listed(scope, field).is_some()
}

/// Result of enforcing a classification on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Enforced {
    pub value: ConfigValue,
    pub diagnostics: Vec<Diagnostic>,
}

impl Enforced {
    fn clean(value: ConfigValue) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    fn invalid(field: &str, err: &Error) -> Self {
        tracing::warn!(field, error = %err, "Invalid expression replaced by an empty function");
        Self {
            value: ConfigValue::Callable(Callable::empty()),
            diagnostics: vec![Diagnostic::invalid_expression(field, err.to_string())],
        }
    }
}

/// Applies `classification` to the raw value of `field`.
///
/// `field` is only used to label diagnostics.
pub fn enforce(
    field: &str,
    raw: &ConfigValue,
    classification: SecurityClassification,
    allow_raw_code: bool,
    engine: &Engine,
) -> Enforced {
    match classification {
        SecurityClassification::Unrestricted => materialize(field, raw, engine),
        SecurityClassification::RestrictedUnlessOptIn { .. } if allow_raw_code => {
            materialize(field, raw, engine)
        }
        SecurityClassification::RestrictedUnlessOptIn { neutral } => match raw {
            ConfigValue::String(_) => {
                tracing::error!(field, "Blocked raw content in a restricted field");
                Enforced {
                    value: neutral.value(),
                    diagnostics: vec![Diagnostic::blocked(field)],
                }
            }
            _ => materialize(field, raw, engine),
        },
        SecurityClassification::AlwaysRewritten => rewrite_entries(field, raw, engine),
    }
}

fn materialize(field: &str, raw: &ConfigValue, engine: &Engine) -> Enforced {
    match resolve(raw).to_callable(engine) {
        Ok(value) => Enforced::clean(value),
        Err(err) => Enforced::invalid(field, &err),
    }
}

/// Every entry of a rule map becomes a callable; plain text is source.
fn rewrite_entries(field: &str, raw: &ConfigValue, engine: &Engine) -> Enforced {
    let ConfigValue::Object(entries) = raw else {
        return Enforced::clean(raw.clone());
    };

    let mut rewritten = BTreeMap::new();
    let mut diagnostics = Vec::new();
    for (key, entry) in entries {
        let compiled = match resolve(entry) {
            FunctionDescriptor::Literal(ConfigValue::String(source)) => {
                expression_callable(engine, &source).map(ConfigValue::Callable)
            }
            descriptor => descriptor.to_callable(engine),
        };
        let value = match compiled {
            Ok(value) => value,
            Err(err) => {
                let invalid = Enforced::invalid(&format!("{field}.{key}"), &err);
                diagnostics.extend(invalid.diagnostics);
                invalid.value
            }
        };
        rewritten.insert(key.clone(), value);
    }

    Enforced {
        value: ConfigValue::Object(rewritten),
        diagnostics,
    }
}

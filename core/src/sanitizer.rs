//! Sanitization of grid configuration trees.
//!
//! One pass walks the grid option set, compiles expression descriptors into
//! callables, replaces raw markup in restricted fields with neutral values
//! and collects diagnostics. The input is never modified; the pass returns a
//! new tree.
//!
//! Traversal order, parents before children:
//!
//! 1. behaviour fields of the grid, in key order
//! 2. `dashGridOptions`, as a nested grid option set
//! 3. `getRowStyle` and `cellStyle` rule sets
//! 4. `defaultColDef`, then every entry of `columnDefs` (own fields,
//!    `headerComponentParams`, then `children`)
//! 5. `detailCellRendererParams`, then its `detailGridOptions`

use crate::api::{Engine, SanitizeOptions};
use crate::descriptor::{Callable, ConfigValue, expression_callable};
use crate::policy::{Scope, classify, enforce, is_listed};
use crate::style::{StyleRuleSet, is_rule_set};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const DASH_GRID_OPTIONS: &str = "dashGridOptions";
const GET_ROW_STYLE: &str = "getRowStyle";
const GET_ROW_ID: &str = "getRowId";
const CELL_STYLE: &str = "cellStyle";
const DEFAULT_COL_DEF: &str = "defaultColDef";
const COLUMN_DEFS: &str = "columnDefs";
const CHILDREN: &str = "children";
const HEADER_COMPONENT_PARAMS: &str = "headerComponentParams";
const DETAIL_CELL_RENDERER_PARAMS: &str = "detailCellRendererParams";
const DETAIL_GRID_OPTIONS: &str = "detailGridOptions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticReason {
    /// Raw content in a restricted field without the opt-in.
    BlockedUnsafeField,
    /// Expression text that does not parse.
    InvalidExpression { message: String },
}

/// A finding of one sanitization pass. Not an error: the pass still
/// produces a usable tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Path of the field, e.g. `columnDefs[2].cellRenderer`.
    pub field: String,
    pub reason: DiagnosticReason,
}

impl Diagnostic {
    pub fn blocked(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: DiagnosticReason::BlockedUnsafeField,
        }
    }

    pub fn invalid_expression(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: DiagnosticReason::InvalidExpression {
                message: message.into(),
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DiagnosticReason::BlockedUnsafeField => write!(
                f,
                "{}: raw content blocked, it could lead to script injection (set allowRawCode to keep it)",
                self.field
            ),
            DiagnosticReason::InvalidExpression { message } => {
                write!(f, "{}: invalid expression: {message}", self.field)
            }
        }
    }
}

/// Output of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    pub tree: ConfigValue,
    pub diagnostics: Vec<Diagnostic>,
}

/// Rewrites configuration trees against one engine.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'e> {
    engine: &'e Engine,
}

impl<'e> Sanitizer<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self { engine }
    }

    /// Sanitizes a grid option set.
    pub fn sanitize(&self, config: &ConfigValue, allow_raw_code: bool) -> Sanitized {
        let mut pass = Pass {
            engine: self.engine,
            allow_raw_code,
            diagnostics: Vec::new(),
        };
        let tree = pass.grid(config, "");
        tracing::debug!(diagnostics = pass.diagnostics.len(), "Sanitization pass complete");
        Sanitized {
            tree,
            diagnostics: pass.diagnostics,
        }
    }

    pub fn sanitize_with(&self, config: &ConfigValue, options: SanitizeOptions) -> Sanitized {
        self.sanitize(config, options.allow_raw_code)
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// State of one traversal. Diagnostics belong to this pass only.
struct Pass<'e> {
    engine: &'e Engine,
    allow_raw_code: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Pass<'_> {
    fn field(&mut self, scope: Scope, path: &str, key: &str, value: &ConfigValue) -> ConfigValue {
        let enforced = enforce(
            &join(path, key),
            value,
            classify(scope, key),
            self.allow_raw_code,
            self.engine,
        );
        self.diagnostics.extend(enforced.diagnostics);
        enforced.value
    }

    /// A plain-text row id is the expression computing it.
    fn row_id(&mut self, path: &str, value: &ConfigValue) -> ConfigValue {
        let ConfigValue::String(source) = value else {
            return self.field(Scope::Grid, path, GET_ROW_ID, value);
        };
        match expression_callable(self.engine, source) {
            Ok(callable) => ConfigValue::Callable(callable),
            Err(err) => {
                let field = join(path, GET_ROW_ID);
                tracing::warn!(field, error = %err, "Invalid row id expression");
                self.diagnostics
                    .push(Diagnostic::invalid_expression(field, err.to_string()));
                ConfigValue::Callable(Callable::empty())
            }
        }
    }

    fn style_rules(&mut self, path: &str, value: &ConfigValue) -> Option<Callable> {
        match StyleRuleSet::from_config(value) {
            Ok(rules) => {
                let compiled = rules.compile(self.engine);
                for (index, err) in compiled.failures() {
                    self.diagnostics.push(Diagnostic::invalid_expression(
                        format!("{path}.styleConditions[{index}].condition"),
                        err.to_string(),
                    ));
                }
                Some(compiled.into_callable())
            }
            Err(err) => {
                self.diagnostics.push(Diagnostic::invalid_expression(
                    path,
                    format!("invalid style rule set: {err}"),
                ));
                None
            }
        }
    }

    fn grid(&mut self, node: &ConfigValue, path: &str) -> ConfigValue {
        let ConfigValue::Object(fields) = node else {
            return node.clone();
        };
        let mut out = fields.clone();

        for (key, value) in fields {
            if key == GET_ROW_ID {
                out.insert(key.clone(), self.row_id(path, value));
            } else if is_listed(Scope::Grid, key) {
                out.insert(key.clone(), self.field(Scope::Grid, path, key, value));
            }
        }

        if let Some(nested @ ConfigValue::Object(_)) = fields.get(DASH_GRID_OPTIONS) {
            let nested = self.grid(nested, &join(path, DASH_GRID_OPTIONS));
            out.insert(DASH_GRID_OPTIONS.to_string(), nested);
        }

        if let Some(row_style) = fields.get(GET_ROW_STYLE) {
            if is_rule_set(row_style) {
                let callable = self.style_rules(&join(path, GET_ROW_STYLE), row_style);
                out.insert(
                    GET_ROW_STYLE.to_string(),
                    callable.map_or(ConfigValue::Null, ConfigValue::Callable),
                );
            } else {
                let value = self.field(Scope::Grid, path, GET_ROW_STYLE, row_style);
                out.insert(GET_ROW_STYLE.to_string(), value);
            }
        }
        let default_cell_style = match fields.get(CELL_STYLE) {
            Some(cell_style) if is_rule_set(cell_style) => {
                self.style_rules(&join(path, CELL_STYLE), cell_style)
            }
            _ => None,
        };

        if let Some(default_col_def) = fields.get(DEFAULT_COL_DEF) {
            let column = self.column(
                default_col_def,
                &join(path, DEFAULT_COL_DEF),
                default_cell_style.as_ref(),
            );
            out.insert(DEFAULT_COL_DEF.to_string(), column);
        }
        if let Some(ConfigValue::Array(columns)) = fields.get(COLUMN_DEFS) {
            let base = join(path, COLUMN_DEFS);
            let columns = columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    self.column(column, &format!("{base}[{i}]"), default_cell_style.as_ref())
                })
                .collect();
            out.insert(COLUMN_DEFS.to_string(), ConfigValue::Array(columns));
        }

        if let Some(detail) = fields.get(DETAIL_CELL_RENDERER_PARAMS) {
            let detail = self.params(
                Scope::DetailParams,
                detail,
                &join(path, DETAIL_CELL_RENDERER_PARAMS),
            );
            out.insert(DETAIL_CELL_RENDERER_PARAMS.to_string(), detail);
        }

        ConfigValue::Object(out)
    }

    fn column(
        &mut self,
        node: &ConfigValue,
        path: &str,
        default_cell_style: Option<&Callable>,
    ) -> ConfigValue {
        let ConfigValue::Object(fields) = node else {
            return node.clone();
        };
        let mut out: BTreeMap<String, ConfigValue> = fields.clone();

        for (key, value) in fields {
            if key == CELL_STYLE && is_rule_set(value) {
                let callable = self.style_rules(&join(path, key), value);
                out.insert(
                    key.clone(),
                    callable.map_or(ConfigValue::Null, ConfigValue::Callable),
                );
            } else if is_listed(Scope::Column, key) {
                out.insert(key.clone(), self.field(Scope::Column, path, key, value));
            }
        }

        if let Some(header_params) = fields.get(HEADER_COMPONENT_PARAMS) {
            let header_params = self.params(
                Scope::HeaderParams,
                header_params,
                &join(path, HEADER_COMPONENT_PARAMS),
            );
            out.insert(HEADER_COMPONENT_PARAMS.to_string(), header_params);
        }

        if let Some(ConfigValue::Array(children)) = fields.get(CHILDREN) {
            let base = join(path, CHILDREN);
            let children = children
                .iter()
                .enumerate()
                .map(|(i, child)| self.column(child, &format!("{base}[{i}]"), default_cell_style))
                .collect();
            out.insert(CHILDREN.to_string(), ConfigValue::Array(children));
        }

        if let Some(default_cell_style) = default_cell_style {
            out.entry(CELL_STYLE.to_string())
                .or_insert_with(|| ConfigValue::Callable(default_cell_style.clone()));
        }

        ConfigValue::Object(out)
    }

    /// `headerComponentParams` and `detailCellRendererParams`.
    fn params(&mut self, scope: Scope, node: &ConfigValue, path: &str) -> ConfigValue {
        let ConfigValue::Object(fields) = node else {
            return node.clone();
        };
        let mut out = fields.clone();

        for (key, value) in fields {
            if is_listed(scope, key) {
                out.insert(key.clone(), self.field(scope, path, key, value));
            }
        }

        if scope == Scope::DetailParams {
            if let Some(nested) = fields.get(DETAIL_GRID_OPTIONS) {
                let nested = self.grid(nested, &join(path, DETAIL_GRID_OPTIONS));
                out.insert(DETAIL_GRID_OPTIONS.to_string(), nested);
            }
        }

        ConfigValue::Object(out)
    }
}

#[cfg(test)]
#[path = "sanitizer_test.rs"]
mod sanitizer_test;

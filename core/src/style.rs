//! Conditional row and cell styles.
//!
//! A rule set arrives in the wire shape
//!
//! ```json
//! {
//!   "styleConditions": [{ "condition": "params.value > 10", "style": { "color": "red" } }],
//!   "defaultStyle": { "color": "black" }
//! }
//! ```
//!
//! and resolves to the style of the first rule whose condition is truthy,
//! falling back to the default.

use crate::api::{CompiledExpression, Engine, Error};
use crate::descriptor::{Callable, ConfigValue};
use crate::values::Value;
use serde::{Deserialize, Serialize};

/// Any JSON value, normally a map of CSS properties.
pub type StyleValue = serde_json::Value;

const CONDITIONS_KEY: &str = "styleConditions";
const DEFAULT_KEY: &str = "defaultStyle";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    pub condition: String,
    pub style: StyleValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleRuleSet {
    #[serde(rename = "styleConditions", default)]
    pub rules: Vec<StyleRule>,
    #[serde(rename = "defaultStyle", default, skip_serializing_if = "Option::is_none")]
    pub default: Option<StyleValue>,
}

/// Whether `value` is written as a style rule set rather than a plain style.
pub fn is_rule_set(value: &ConfigValue) -> bool {
    value
        .as_object()
        .is_some_and(|fields| {
            fields.contains_key(CONDITIONS_KEY) || fields.contains_key(DEFAULT_KEY)
        })
}

impl StyleRuleSet {
    pub fn from_config(value: &ConfigValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.to_json())
    }

    /// Evaluates the conditions in order and returns the first matching style.
    ///
    /// A condition that fails to compile or evaluate does not match.
    pub fn resolve(&self, engine: &Engine, params: &Value) -> Option<StyleValue> {
        for rule in &self.rules {
            let matched = engine
                .compile(&rule.condition)
                .and_then(|expr| expr.run(Default::default(), params));
            match matched {
                Ok(value) if value.is_truthy() => return Some(rule.style.clone()),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        condition = %rule.condition,
                        error = %err,
                        "Style condition failed"
                    );
                }
            }
        }
        self.default.clone()
    }

    /// Compiles every condition once for repeated resolution.
    ///
    /// A condition that does not compile never matches; its error is kept
    /// in [`CompiledStyleRules::failures`] under the rule's index.
    pub fn compile(&self, engine: &Engine) -> CompiledStyleRules {
        let mut failures = Vec::new();
        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let condition = match engine.compile(&rule.condition) {
                    Ok(condition) => Some(condition),
                    Err(err) => {
                        tracing::warn!(
                            condition = %rule.condition,
                            error = %err,
                            "Style condition does not compile and will never match"
                        );
                        failures.push((index, err));
                        None
                    }
                };
                (condition, rule.style.clone())
            })
            .collect();
        CompiledStyleRules {
            rules,
            default: self.default.clone(),
            failures,
        }
    }
}

/// A [`StyleRuleSet`] with its conditions compiled.
#[derive(Debug, Clone)]
pub struct CompiledStyleRules {
    rules: Vec<(Option<CompiledExpression>, StyleValue)>,
    default: Option<StyleValue>,
    failures: Vec<(usize, Error)>,
}

impl CompiledStyleRules {
    /// Conditions that failed to compile, by rule index.
    pub fn failures(&self) -> &[(usize, Error)] {
        &self.failures
    }

    pub fn resolve(&self, params: &Value) -> Option<StyleValue> {
        for (condition, style) in &self.rules {
            let Some(condition) = condition else {
                continue;
            };
            match condition.run(Default::default(), params) {
                Ok(value) if value.is_truthy() => return Some(style.clone()),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        condition = condition.source(),
                        error = %err,
                        "Style condition failed"
                    );
                }
            }
        }
        self.default.clone()
    }

    /// Wraps the rules in a callable returning the style, or `null`.
    pub fn into_callable(self) -> Callable {
        Callable::new("<style rules>", move |params| {
            self.resolve(params)
                .map_or(Value::Null, |style| Value::from(&style))
        })
    }
}

//! Integration tests for the `style` command.

mod common;

use common::{gridexpr, temp_json};
use predicates::prelude::*;

const RULES: &str = r#"{
    "styleConditions": [
        { "condition": "params.value > 10", "style": { "color": "red" } },
        { "condition": "params.value > 5", "style": { "color": "orange" } }
    ],
    "defaultStyle": { "color": "black" }
}"#;

fn resolve(rules: &str, params: &str) -> assert_cmd::assert::Assert {
    let file = temp_json(rules);
    gridexpr()
        .args(["style", file.path().to_str().unwrap(), "--params", params])
        .assert()
}

#[test]
fn style_first_matching_rule() {
    resolve(RULES, r#"{"value": 15}"#)
        .success()
        .stdout("{\"color\":\"red\"}\n");
    resolve(RULES, r#"{"value": 7}"#)
        .success()
        .stdout("{\"color\":\"orange\"}\n");
}

#[test]
fn style_default_when_nothing_matches() {
    resolve(RULES, r#"{"value": 1}"#)
        .success()
        .stdout("{\"color\":\"black\"}\n");
}

#[test]
fn style_null_without_default() {
    resolve(
        r#"{ "styleConditions": [{ "condition": "params.value > 10", "style": "big" }] }"#,
        r#"{"value": 1}"#,
    )
    .success()
    .stdout("null\n");
}

#[test]
fn style_failing_condition_is_skipped() {
    resolve(
        r#"{ "styleConditions": [{ "condition": "missing.value", "style": "never" }], "defaultStyle": "fallback" }"#,
        r#"{"value": 1}"#,
    )
    .success()
    .stdout("\"fallback\"\n");
}

#[test]
fn style_requires_params() {
    let file = temp_json(RULES);
    gridexpr()
        .args(["style", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--params"));
}

use super::dynamic::Value;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_truthiness() {
    let falsy = [
        Value::Null,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::Float(-0.0),
        Value::Float(f64::NAN),
        Value::str(""),
        Value::array([]),
        Value::record::<String>([]),
    ];
    for value in &falsy {
        assert!(!value.is_truthy(), "{value:?} should be falsy");
    }

    let truthy = [
        Value::Bool(true),
        Value::Int(-1),
        Value::Float(0.5),
        Value::str("0"),
        Value::array([Value::Null]),
        Value::record([("a", Value::Null)]),
        Value::native("f", |_| Ok(Value::Null)),
    ];
    for value in &truthy {
        assert!(value.is_truthy(), "{value:?} should be truthy");
    }
}

#[test]
fn test_from_json() {
    let value = Value::from(json!({
        "name": "Widget",
        "price": 9.5,
        "qty": 3,
        "tags": ["a", "b"],
        "missing": null,
    }));

    assert_eq!(value.get("name"), Some(&Value::str("Widget")));
    assert_eq!(value.get("price"), Some(&Value::Float(9.5)));
    assert_eq!(value.get("qty"), Some(&Value::Int(3)));
    assert_eq!(
        value.get("tags"),
        Some(&Value::array([Value::str("a"), Value::str("b")]))
    );
    assert_eq!(value.get("missing"), Some(&Value::Null));
    assert_eq!(value.get("nope"), None);
}

#[test]
fn test_strict_and_loose_equality() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
    assert!(
        Value::array([Value::Int(1), Value::str("x")])
            .loose_eq(&Value::array([Value::Float(1.0), Value::str("x")]))
    );
    assert!(!Value::Float(f64::NAN).loose_eq(&Value::Float(f64::NAN)));
    assert!(!Value::str("1").loose_eq(&Value::Int(1)));
    assert!(Value::record([("a", Value::Int(2))]).loose_eq(&Value::record([("a", Value::Float(2.0))])));
}

#[test]
fn test_display() {
    assert_eq!(Value::Float(3.0).to_string(), "3");
    assert_eq!(Value::Float(2.5).to_string(), "2.5");
    assert_eq!(Value::Float(f64::INFINITY).to_string(), "Infinity");
    assert_eq!(Value::str("plain").to_string(), "plain");
    assert_eq!(
        Value::array([Value::Int(1), Value::str("a")]).to_string(),
        "[1, \"a\"]"
    );
    assert_eq!(
        Value::record([("k", Value::Bool(true))]).to_string(),
        "{k: true}"
    );
    assert_eq!(
        Value::native("fmt", |_| Ok(Value::Null)).to_string(),
        "<function fmt>"
    );
}

#[test]
fn test_serialize_to_json() {
    let value = Value::record([
        ("n", Value::Int(1)),
        ("x", Value::Float(f64::NAN)),
        ("s", Value::str("hi")),
        ("f", Value::native("fmt", |_| Ok(Value::Null))),
    ]);
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({ "n": 1, "x": null, "s": "hi", "f": "<function fmt>" })
    );
}

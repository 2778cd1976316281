//! Tests for d3-style number formatting

use super::*;
use crate::api::{Engine, EngineOptions};
use serde_json::json;

fn fmt(specifier: &str, value: f64) -> String {
    specifier
        .parse::<FormatSpecifier>()
        .unwrap_or_else(|e| panic!("{specifier:?} should parse: {e}"))
        .format(value)
}

// ============================================================================
// Specifier parsing
// ============================================================================

#[test]
fn test_parse_full_specifier() {
    let spec: FormatSpecifier = "*^+$012,.3~f".parse().unwrap();
    assert_eq!(
        spec,
        FormatSpecifier {
            fill: '*',
            align: Align::Center,
            sign: Sign::Plus,
            symbol: Some(Symbol::Currency),
            zero: true,
            width: Some(12),
            comma: true,
            precision: Some(3),
            trim: true,
            kind: Some('f'),
        }
    );
}

#[test]
fn test_parse_invalid_specifier() {
    assert!("..2f".parse::<FormatSpecifier>().is_err());
    assert!(".f".parse::<FormatSpecifier>().is_err());
    assert!("f2".parse::<FormatSpecifier>().is_err());
    assert_eq!(
        "%%".parse::<FormatSpecifier>(),
        Err(InvalidSpecifier("%%".to_string()))
    );
}

#[test]
fn test_width_is_capped() {
    let widest = format!("{MAX_WIDTH}d");
    assert_eq!(fmt(&widest, 42.0).chars().count(), MAX_WIDTH);

    let too_wide = format!("{}d", MAX_WIDTH + 1);
    assert_eq!(
        too_wide.parse::<FormatSpecifier>(),
        Err(InvalidSpecifier(too_wide.clone()))
    );
    assert!("999999999999999".parse::<FormatSpecifier>().is_err());
    assert!("99999999999999999999999".parse::<FormatSpecifier>().is_err());
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_fixed() {
    assert_eq!(fmt(".1f", 3.14159), "3.1");
    assert_eq!(fmt(".2f", 2.0), "2.00");
    assert_eq!(fmt("f", 1.5), "1.500000");
}

#[test]
fn test_grouping() {
    assert_eq!(fmt(",.0f", 1234567.8), "1,234,568");
    assert_eq!(fmt(",", 1234.5), "1,234.5");
    assert_eq!(fmt(",d", 999.0), "999");
}

#[test]
fn test_currency() {
    assert_eq!(fmt("$,.1f", 1234.56), "$1,234.6");
    assert_eq!(fmt("$,.2f", -5.0), "\u{2212}$5.00");
}

#[test]
fn test_percent() {
    assert_eq!(fmt(".0%", 0.123), "12%");
    assert_eq!(fmt(".1%", 0.5), "50.0%");
    assert_eq!(fmt(".2p", 0.1234), "12%");
}

#[test]
fn test_integer() {
    assert_eq!(fmt("d", 42.4), "42");
    assert_eq!(fmt("d", 42.5), "43");
    assert_eq!(fmt("+d", 5.0), "+5");
    assert_eq!(fmt("+d", -5.0), "\u{2212}5");
}

#[test]
fn test_exponent() {
    assert_eq!(fmt(".2e", 12345.0), "1.23e+4");
    assert_eq!(fmt(".1e", 0.00012), "1.2e-4");
    assert_eq!(fmt("~e", 1500.0), "1.5e+3");
}

#[test]
fn test_significant_digits() {
    assert_eq!(fmt(".3g", 1234.0), "1.23e+3");
    assert_eq!(fmt(".3g", 12.345), "12.3");
    assert_eq!(fmt(".3g", 0.0012345), "0.00123");
    assert_eq!(fmt(".2r", 4223.0), "4200");
    assert_eq!(fmt(",.2r", 4223.0), "4,200");
    assert_eq!(fmt(".3r", 0.0456789), "0.0457");
}

#[test]
fn test_si_prefix() {
    assert_eq!(fmt(".3s", 1500.0), "1.50k");
    assert_eq!(fmt("~s", 1500.0), "1.5k");
    assert_eq!(fmt(".2s", 42e6), "42M");
    assert_eq!(fmt(".1s", 0.002), "2m");
}

#[test]
fn test_radix() {
    assert_eq!(fmt("x", 255.0), "ff");
    assert_eq!(fmt("#x", 255.0), "0xff");
    assert_eq!(fmt("X", 255.0), "FF");
    assert_eq!(fmt("b", 5.0), "101");
    assert_eq!(fmt("#o", 8.0), "0o10");
}

#[test]
fn test_default_type_trims() {
    assert_eq!(fmt("", 0.1), "0.1");
    assert_eq!(fmt("", 1234.0), "1234");
    assert_eq!(fmt("", 1.0 / 3.0), "0.333333333333");
}

#[test]
fn test_trim() {
    assert_eq!(fmt(".3~f", 1.5), "1.5");
    assert_eq!(fmt(".2~f", 1.0), "1");
    assert_eq!(fmt(".2~f", 10.0), "10");
}

// ============================================================================
// Sign, width and alignment
// ============================================================================

#[test]
fn test_sign_variants() {
    assert_eq!(fmt("(.2f", -3.5), "(3.50)");
    assert_eq!(fmt("(.2f", 3.5), "3.50");
    assert_eq!(fmt(" .1f", 3.0), " 3.0");
    assert_eq!(fmt("-.1f", -3.0), "\u{2212}3.0");
}

#[test]
fn test_negative_zero_after_rounding() {
    assert_eq!(fmt(".1f", -0.04), "0.0");
    assert_eq!(fmt("+.1f", -0.04), "\u{2212}0.0");
}

#[test]
fn test_padding_and_alignment() {
    assert_eq!(fmt(">8.2f", 3.14159), "    3.14");
    assert_eq!(fmt("<8.2f", 3.14159), "3.14    ");
    assert_eq!(fmt("^8.2f", 3.14159), "  3.14  ");
    assert_eq!(fmt("*^7d", 42.0), "**42***");
    assert_eq!(fmt("08.2f", -3.14159), "\u{2212}0003.14");
    assert_eq!(fmt("=+8d", 42.0), "+     42");
}

#[test]
fn test_zero_padding_with_grouping() {
    assert_eq!(fmt("09,d", 1234.0), "0,001,234");
}

#[test]
fn test_special_values() {
    assert_eq!(fmt(".2f", f64::NAN), "NaN");
    assert_eq!(fmt(".2f", f64::INFINITY), "Infinity");
    assert_eq!(fmt(".2f", f64::NEG_INFINITY), "\u{2212}Infinity");
}

// ============================================================================
// Library function
// ============================================================================

#[test]
fn test_coerce_number() {
    assert_eq!(coerce_number(&Value::Null), 0.0);
    assert_eq!(coerce_number(&Value::Bool(true)), 1.0);
    assert_eq!(coerce_number(&Value::str(" 2.5 ")), 2.5);
    assert!(coerce_number(&Value::str("abc")).is_nan());
    assert!(coerce_number(&Value::array([])).is_nan());
}

#[test]
fn test_format_from_expression() {
    let engine = Engine::new(EngineOptions::default());
    let params = Value::from(json!({ "value": 1234567.891, "pop": 31889923 }));

    assert_eq!(
        engine
            .evaluate("d3.format('.1f')(params.value)", &params)
            .unwrap(),
        Value::str("1234567.9")
    );
    assert_eq!(
        engine
            .evaluate("d3.format(',.0f')(params.pop)", &params)
            .unwrap(),
        Value::str("31,889,923")
    );
    assert_eq!(
        engine
            .evaluate("d3.format('$,.1f')(params.value)", &params)
            .unwrap(),
        Value::str("$1,234,567.9")
    );
}

#[test]
fn test_format_errors() {
    let engine = Engine::new(EngineOptions::default());
    assert!(engine.evaluate("d3.format('..')(1)", &Value::Null).is_err());
    assert!(engine.evaluate("d3.format(2)", &Value::Null).is_err());
    assert!(engine.evaluate("d3.format('.1f')()", &Value::Null).is_err());

    let err = engine
        .evaluate("d3.format('999999999999999')(1)", &Value::Null)
        .unwrap_err();
    assert!(err.to_string().contains("invalid format: 999999999999999"), "{err}");
}

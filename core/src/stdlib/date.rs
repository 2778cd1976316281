//! Date formatting and parsing with d3-time-format specifiers.
//!
//! Dates travel as milliseconds since the Unix epoch, the shape grid rows
//! usually carry. ISO 8601 strings (`2020-01-02T03:04:05Z`, `2020-01-02`) are
//! accepted wherever a date is expected. A value that is not a date formats to
//! `null`, and text that does not match a parse specifier parses to `null`.

use crate::evaluator::RuntimeError;
use crate::values::{Binder, Value, expect_arity};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt::{Display, Write};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%LZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Local,
    Utc,
}

/// Rewrites a d3 specifier into a chrono one.
///
/// `special` renders the directives chrono has no counterpart for (`%Q`,
/// `%q`); returning `None` rejects them. Unknown directives print their
/// character, like d3 does.
fn translate(specifier: &str, special: &dyn Fn(char) -> Option<String>) -> Result<String, String> {
    let mut out = String::with_capacity(specifier.len() + 8);
    let mut chars = specifier.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let pad = match chars.peek() {
            Some(&p @ ('-' | '_' | '0')) => {
                chars.next();
                Some(p)
            }
            _ => None,
        };
        let Some(directive) = chars.next() else {
            out.push_str("%%");
            break;
        };
        match directive {
            'd' | 'e' | 'H' | 'I' | 'j' | 'm' | 'M' | 'S' | 'u' | 'U' | 'V' | 'w' | 'W' | 'y'
            | 'Y' | 'G' | 'g' | 's' => {
                out.push('%');
                if let Some(pad) = pad {
                    out.push(pad);
                }
                out.push(directive);
            }
            'a' | 'A' | 'b' | 'B' | 'p' => {
                out.push('%');
                out.push(directive);
            }
            'f' => out.push_str("%6f"),
            'L' => out.push_str("%3f"),
            'Z' => out.push_str("%z"),
            'x' => out.push_str("%-m/%-d/%Y"),
            'X' => out.push_str("%-I:%M:%S %p"),
            'c' => out.push_str("%-m/%-d/%Y, %-I:%M:%S %p"),
            '%' => out.push_str("%%"),
            'Q' | 'q' => match special(directive) {
                Some(text) => out.push_str(&text),
                None => return Err(format!("%{directive} is not supported for parsing")),
            },
            other => out.push(other),
        }
    }
    Ok(out)
}

fn check_items(chrono_spec: &str) -> Result<Vec<Item<'_>>, String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(chrono_spec).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(format!("unsupported directive in {chrono_spec:?}"));
    }
    Ok(items)
}

fn format_date<Tz>(date: &DateTime<Tz>, specifier: &str) -> Result<String, String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let chrono_spec = translate(specifier, &|directive| match directive {
        'Q' => Some(date.timestamp_millis().to_string()),
        _ => Some((date.month0() / 3 + 1).to_string()),
    })?;
    let items = check_items(&chrono_spec)?;

    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.iter()))
        .map_err(|_| format!("cannot format date with {specifier:?}"))?;
    Ok(out)
}

fn parse_date(zone: Zone, chrono_spec: &str, text: &str) -> Option<i64> {
    if let Ok(date) = DateTime::parse_from_str(text, chrono_spec) {
        return Some(date.timestamp_millis());
    }
    let naive = NaiveDateTime::parse_from_str(text, chrono_spec)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, chrono_spec)
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
        })?;
    match zone {
        Zone::Utc => Some(Utc.from_utc_datetime(&naive).timestamp_millis()),
        Zone::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|date| date.timestamp_millis()),
    }
}

fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Int(ms) => DateTime::from_timestamp_millis(*ms),
        Value::Float(ms) if ms.is_finite() => DateTime::from_timestamp_millis(ms.round() as i64),
        Value::Str(text) => parse_iso(text),
        _ => None,
    }
}

fn specifier_arg(function: &str, value: &Value) -> Result<String, RuntimeError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        RuntimeError::invalid_argument(
            function,
            format!("expected a specifier string, got {}", value.type_name()),
        )
    })
}

/// `d3.timeFormat(specifier)` / `d3.utcFormat(specifier)`
fn formatter(
    function: &'static str,
    zone: Zone,
) -> impl Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static {
    move |args: &[Value]| {
        expect_arity(function, args, 1)?;
        let specifier = specifier_arg(function, &args[0])?;
        let skeleton = translate(&specifier, &|_| Some(String::new()))
            .map_err(|message| RuntimeError::invalid_argument(function, message))?;
        check_items(&skeleton)
            .map_err(|message| RuntimeError::invalid_argument(function, message))?;

        let name = format!("{function}({specifier:?})");
        Ok(Value::native(name.clone(), move |args| {
            expect_arity(&name, args, 1)?;
            let Some(date) = to_datetime(&args[0]) else {
                return Ok(Value::Null);
            };
            let text = match zone {
                Zone::Utc => format_date(&date, &specifier),
                Zone::Local => format_date(&date.with_timezone(&Local), &specifier),
            }
            .map_err(|message| RuntimeError::invalid_argument(name.as_str(), message))?;
            Ok(Value::str(text))
        }))
    }
}

/// `d3.timeParse(specifier)` / `d3.utcParse(specifier)`
fn parser(
    function: &'static str,
    zone: Zone,
) -> impl Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static {
    move |args: &[Value]| {
        expect_arity(function, args, 1)?;
        let specifier = specifier_arg(function, &args[0])?;
        let chrono_spec = translate(&specifier, &|_| None)
            .map_err(|message| RuntimeError::invalid_argument(function, message))?;
        check_items(&chrono_spec)
            .map_err(|message| RuntimeError::invalid_argument(function, message))?;

        let name = format!("{function}({specifier:?})");
        Ok(Value::native(name.clone(), move |args| {
            expect_arity(&name, args, 1)?;
            let parsed = args[0]
                .as_str()
                .and_then(|text| parse_date(zone, &chrono_spec, text));
            Ok(parsed.map_or(Value::Null, Value::Int))
        }))
    }
}

/// `d3.isoFormat(date)`
fn iso_format(args: &[Value]) -> Result<Value, RuntimeError> {
    expect_arity("isoFormat", args, 1)?;
    let Some(date) = to_datetime(&args[0]) else {
        return Ok(Value::Null);
    };
    format_date(&date, ISO_FORMAT)
        .map(Value::str)
        .map_err(|message| RuntimeError::invalid_argument("isoFormat", message))
}

/// `d3.isoParse(text)`
fn iso_parse(args: &[Value]) -> Result<Value, RuntimeError> {
    expect_arity("isoParse", args, 1)?;
    let parsed = args[0].as_str().and_then(parse_iso);
    Ok(parsed.map_or(Value::Null, |date| Value::Int(date.timestamp_millis())))
}

/// Registers the date functions of the `d3` namespace.
pub fn register_date_functions<B: Binder>(builder: B) -> B {
    builder
        .bind(
            "timeFormat",
            Value::native("timeFormat", formatter("timeFormat", Zone::Local)),
        )
        .bind(
            "utcFormat",
            Value::native("utcFormat", formatter("utcFormat", Zone::Utc)),
        )
        .bind(
            "timeParse",
            Value::native("timeParse", parser("timeParse", Zone::Local)),
        )
        .bind(
            "utcParse",
            Value::native("utcParse", parser("utcParse", Zone::Utc)),
        )
        .bind("isoFormat", Value::native("isoFormat", iso_format))
        .bind("isoParse", Value::native("isoParse", iso_parse))
}

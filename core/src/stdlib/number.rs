//! Number formatting with d3-format specifiers.
//!
//! `d3.format(specifier)` returns a function formatting one number, so
//! configuration can write `d3.format(',.0f')(params.value)`.
//!
//! Specifier grammar: `[[fill]align][sign][symbol][0][width][,][.precision][~][type]`
//!
//! Supported types: `e f g r s % p d b o x X n`; an empty or unknown type
//! behaves like `.12~g`. Only the default (en-US) locale is available.

use crate::evaluator::RuntimeError;
use crate::values::{Binder, Value, expect_arity};
use std::str::FromStr;
use thiserror::Error;

/// d3 renders negative numbers with a true minus sign, not a hyphen.
const MINUS: &str = "\u{2212}";

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "\u{b5}", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Widest padding a specifier may ask for.
pub const MAX_WIDTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid format: {0}")]
pub struct InvalidSpecifier(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign and the digits.
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Minus for negative values, nothing for positive ones.
    Minus,
    Plus,
    Parentheses,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Currency,
    RadixPrefix,
}

/// A parsed d3-format specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpecifier {
    pub fill: char,
    pub align: Align,
    pub sign: Sign,
    pub symbol: Option<Symbol>,
    pub zero: bool,
    pub width: Option<usize>,
    pub comma: bool,
    pub precision: Option<usize>,
    pub trim: bool,
    pub kind: Option<char>,
}

impl FromStr for FormatSpecifier {
    type Err = InvalidSpecifier;

    fn from_str(specifier: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSpecifier(specifier.to_string());
        let chars: Vec<char> = specifier.chars().collect();
        let mut i = 0;

        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        };

        let mut fill = ' ';
        let mut align = Align::Right;
        if let Some(a) = chars.get(1).copied().and_then(align_of) {
            fill = chars[0];
            align = a;
            i = 2;
        } else if let Some(a) = chars.first().copied().and_then(align_of) {
            align = a;
            i = 1;
        }

        let sign = match chars.get(i) {
            Some('-') => Some(Sign::Minus),
            Some('+') => Some(Sign::Plus),
            Some('(') => Some(Sign::Parentheses),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if sign.is_some() {
            i += 1;
        }

        let symbol = match chars.get(i) {
            Some('$') => Some(Symbol::Currency),
            Some('#') => Some(Symbol::RadixPrefix),
            _ => None,
        };
        if symbol.is_some() {
            i += 1;
        }

        let zero = chars.get(i) == Some(&'0');
        if zero {
            i += 1;
        }

        let digits = |from: usize| {
            chars[from..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .count()
        };

        let width_len = digits(i);
        let width = if width_len > 0 {
            let text: String = chars[i..i + width_len].iter().collect();
            i += width_len;
            let width = text.parse::<usize>().map_err(|_| invalid())?;
            if width > MAX_WIDTH {
                return Err(invalid());
            }
            Some(width)
        } else {
            None
        };

        let comma = chars.get(i) == Some(&',');
        if comma {
            i += 1;
        }

        let precision = if chars.get(i) == Some(&'.') {
            let len = digits(i + 1);
            if len == 0 {
                return Err(invalid());
            }
            let text: String = chars[i + 1..i + 1 + len].iter().collect();
            i += 1 + len;
            Some(text.parse::<usize>().map_err(|_| invalid())?)
        } else {
            None
        };

        let trim = chars.get(i) == Some(&'~');
        if trim {
            i += 1;
        }

        let kind = match chars.get(i) {
            Some(&c) if c.is_ascii_alphabetic() || c == '%' => {
                i += 1;
                Some(c)
            }
            _ => None,
        };

        if i != chars.len() {
            return Err(invalid());
        }

        Ok(FormatSpecifier {
            fill,
            align,
            sign: sign.unwrap_or(Sign::Minus),
            symbol,
            zero,
            width,
            comma,
            precision,
            trim,
            kind,
        })
    }
}

fn is_known_type(kind: char) -> bool {
    matches!(
        kind,
        'e' | 'f' | 'g' | 'r' | 's' | '%' | 'p' | 'd' | 'b' | 'o' | 'x' | 'X'
    )
}

impl FormatSpecifier {
    /// Formats `value` according to this specifier.
    pub fn format(&self, value: f64) -> String {
        let mut fill = self.fill;
        let mut align = self.align;
        let mut zero = self.zero;
        let mut comma = self.comma;
        let mut trim = self.trim;
        let mut precision = self.precision;

        let kind = match self.kind {
            Some('n') => {
                comma = true;
                'g'
            }
            Some(k) if is_known_type(k) => k,
            _ => {
                precision = precision.or(Some(12));
                trim = true;
                'g'
            }
        };

        if zero || (fill == '0' && align == Align::AfterSign) {
            zero = true;
            fill = '0';
            align = Align::AfterSign;
        }

        let precision = match precision {
            None => 6,
            Some(p) if matches!(kind, 'g' | 'p' | 'r' | 's') => p.clamp(1, 21),
            Some(p) => p.min(20),
        };

        let mut negative = value < 0.0 || (value == 0.0 && value.is_sign_negative());
        let (mut digits, si_exponent) = if value.is_nan() {
            ("NaN".to_string(), 0)
        } else {
            format_type(kind, value.abs(), precision)
        };
        if trim {
            digits = trim_insignificant(&digits);
        }
        // A value that rounds to zero loses its sign, unless `+` asks for one.
        if negative && digits.parse::<f64>().is_ok_and(|v| v == 0.0) && self.sign != Sign::Plus {
            negative = false;
        }

        let symbol_prefix = match (self.symbol, kind) {
            (Some(Symbol::Currency), _) => "$".to_string(),
            (Some(Symbol::RadixPrefix), 'b' | 'o' | 'x' | 'X') => {
                format!("0{}", kind.to_ascii_lowercase())
            }
            _ => String::new(),
        };
        let sign_prefix = match (negative, self.sign) {
            (true, Sign::Parentheses) => "(",
            (true, _) => MINUS,
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, _) => "",
        };
        let prefix = format!("{sign_prefix}{symbol_prefix}");

        let mut suffix = String::new();
        if kind == 's' {
            suffix.push_str(SI_PREFIXES[(8 + si_exponent) as usize]);
        }
        if matches!(kind, '%' | 'p') && self.symbol != Some(Symbol::Currency) {
            suffix.push('%');
        }
        if negative && self.sign == Sign::Parentheses {
            suffix.push(')');
        }

        // Split off the fractional or exponential part; only the integer
        // digits are grouped and padded.
        let mut value = digits;
        if matches!(kind, 'd' | 'e' | 'f' | 'g' | 'p' | 'r' | 's' | '%') {
            if let Some(pos) = value.find(|c: char| !c.is_ascii_digit()) {
                suffix.insert_str(0, &value[pos..]);
                value.truncate(pos);
            }
        }

        if comma && !zero {
            value = group(&value, usize::MAX);
        }

        let width = self.width.unwrap_or(0);
        let length = prefix.chars().count() + value.chars().count() + suffix.chars().count();
        let mut padding: String = if length < width {
            std::iter::repeat_n(fill, width - length).collect()
        } else {
            String::new()
        };

        if comma && zero {
            let limit = if padding.is_empty() {
                usize::MAX
            } else {
                width.saturating_sub(suffix.chars().count())
            };
            value = group(&format!("{padding}{value}"), limit);
            padding.clear();
        }

        match align {
            Align::Left => format!("{prefix}{value}{suffix}{padding}"),
            Align::AfterSign => format!("{prefix}{padding}{value}{suffix}"),
            Align::Center => {
                let half = padding.chars().count() / 2;
                let left: String = padding.chars().take(half).collect();
                let right: String = padding.chars().skip(half).collect();
                format!("{left}{prefix}{value}{suffix}{right}")
            }
            Align::Right => format!("{padding}{prefix}{value}{suffix}"),
        }
    }
}

/// Formats a non-negative, non-NaN number. Returns the digits and, for `s`,
/// the SI prefix exponent (as a multiple of three).
fn format_type(kind: char, x: f64, p: usize) -> (String, i32) {
    if x.is_infinite() {
        return ("Infinity".to_string(), 0);
    }
    match kind {
        'e' => (to_exponential(x, p), 0),
        'f' => (format!("{x:.p$}"), 0),
        'g' => (to_precision(x, p), 0),
        'r' => (rounded(x, p), 0),
        's' => si(x, p),
        '%' => (format!("{:.p$}", x * 100.0), 0),
        'p' => (rounded(x * 100.0, p), 0),
        'b' => (format!("{:b}", x.round() as i64), 0),
        'o' => (format!("{:o}", x.round() as i64), 0),
        'x' => (format!("{:x}", x.round() as i64), 0),
        'X' => (format!("{:X}", x.round() as i64), 0),
        // 'd'
        _ => (format!("{:.0}", x.round()), 0),
    }
}

/// Significant digits of `x` rounded to `p` digits, and the decimal exponent.
fn decimal_parts(x: f64, p: usize) -> (String, i32) {
    let text = if p == 0 {
        format!("{x:e}")
    } else {
        format!("{:.*e}", p - 1, x)
    };
    match text.split_once('e') {
        Some((mantissa, exponent)) => (
            mantissa.replace('.', ""),
            exponent.parse::<i32>().unwrap_or(0),
        ),
        None => (text, 0),
    }
}

fn exponent_suffix(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("e{sign}{}", exponent.unsigned_abs())
}

fn to_exponential(x: f64, p: usize) -> String {
    let text = format!("{x:.p$e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            format!("{mantissa}{}", exponent_suffix(exponent.parse().unwrap_or(0)))
        }
        None => text,
    }
}

fn to_precision(x: f64, p: usize) -> String {
    if x == 0.0 {
        return format!("{:.*}", p - 1, 0.0);
    }
    let (coefficient, exponent) = decimal_parts(x, p);
    if exponent < -6 || exponent >= p as i32 {
        let (head, tail) = coefficient.split_at(1);
        let mantissa = if tail.is_empty() {
            head.to_string()
        } else {
            format!("{head}.{tail}")
        };
        format!("{mantissa}{}", exponent_suffix(exponent))
    } else {
        place_decimal_point(&coefficient, exponent)
    }
}

/// Renders significant digits with the decimal point after `exponent + 1` digits.
fn place_decimal_point(coefficient: &str, exponent: i32) -> String {
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{zeros}{coefficient}");
    }
    let point = exponent as usize + 1;
    if coefficient.len() > point {
        format!("{}.{}", &coefficient[..point], &coefficient[point..])
    } else {
        format!("{coefficient}{}", "0".repeat(point - coefficient.len()))
    }
}

fn rounded(x: f64, p: usize) -> String {
    let (coefficient, exponent) = decimal_parts(x, p);
    place_decimal_point(&coefficient, exponent)
}

fn si(x: f64, p: usize) -> (String, i32) {
    let (coefficient, exponent) = decimal_parts(x, p);
    let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8);
    let i = exponent - prefix_exponent * 3 + 1;
    let n = coefficient.len() as i32;
    let digits = if i == n {
        coefficient
    } else if i > n {
        format!("{coefficient}{}", "0".repeat((i - n) as usize))
    } else if i > 0 {
        let (head, tail) = coefficient.split_at(i as usize);
        format!("{head}.{tail}")
    } else {
        let (more, _) = decimal_parts(x, (p as i32 + i - 1).max(0) as usize);
        format!("0.{}{more}", "0".repeat((-i) as usize))
    };
    (digits, prefix_exponent)
}

/// Removes insignificant trailing zeros after the decimal point:
/// `1.500` becomes `1.5`, `1.000` becomes `1`, `1.50e+3` becomes `1.5e+3`.
fn trim_insignificant(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut start: isize = -1;
    let mut end = 0;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match b {
            b'.' => {
                start = i as isize;
                end = i;
            }
            b'0' => {
                if start == 0 {
                    start = i as isize;
                }
                end = i;
            }
            b'1'..=b'9' => {
                if start > 0 {
                    start = 0;
                }
            }
            _ => break,
        }
    }
    if start > 0 {
        format!("{}{}", &s[..start as usize], &s[end + 1..])
    } else {
        s.to_string()
    }
}

/// Inserts thousands separators, keeping the result within `width` characters
/// when zero padding is being grouped.
fn group(value: &str, width: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut i = chars.len();
    let mut parts = Vec::new();
    let mut length = 0usize;
    let mut size = 3;
    while i > 0 && size > 0 {
        if length + size + 1 > width {
            size = width.saturating_sub(length).max(1);
        }
        let start = i.saturating_sub(size);
        parts.push(chars[start..i].iter().collect::<String>());
        i = start;
        length += size + 1;
        if length > width {
            break;
        }
        size = 3;
    }
    parts.reverse();
    parts.join(",")
}

/// Numeric coercion applied to format arguments: `null` is 0, booleans are
/// 0/1, numeric strings are parsed and anything else is NaN.
pub(crate) fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Int(n) => *n as f64,
        Value::Float(x) => *x,
        Value::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    }
}

/// `d3.format(specifier)`
fn d3_format(args: &[Value]) -> Result<Value, RuntimeError> {
    expect_arity("format", args, 1)?;
    let Some(text) = args[0].as_str() else {
        return Err(RuntimeError::invalid_argument(
            "format",
            format!("expected a specifier string, got {}", args[0].type_name()),
        ));
    };
    let specifier: FormatSpecifier = text
        .parse()
        .map_err(|e: InvalidSpecifier| RuntimeError::invalid_argument("format", e.to_string()))?;

    let name = format!("format({text:?})");
    Ok(Value::native(name.clone(), move |args| {
        expect_arity(&name, args, 1)?;
        Ok(Value::str(specifier.format(coerce_number(&args[0]))))
    }))
}

/// Registers the number formatting functions of the `d3` namespace.
pub fn register_number_functions<B: Binder>(builder: B) -> B {
    builder.bind("format", Value::native("format", d3_format))
}

#[cfg(test)]
#[path = "number_test.rs"]
mod number_test;

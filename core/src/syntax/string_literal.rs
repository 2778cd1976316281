//! Unescaping for quoted string literals.

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    /// A backslash at the very end of the literal.
    TrailingBackslash,
    /// `\u` not followed by exactly four hex digits.
    InvalidUnicodeEscape(String),
    /// The code point is not a valid `char` (e.g. a lone surrogate).
    InvalidCodePoint(u32),
    /// Escape character that has no meaning.
    UnknownEscape(char),
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnescapeError::TrailingBackslash => write!(f, "trailing backslash"),
            UnescapeError::InvalidUnicodeEscape(s) => write!(f, "invalid unicode escape `\\u{s}`"),
            UnescapeError::InvalidCodePoint(cp) => write!(f, "invalid code point U+{cp:04X}"),
            UnescapeError::UnknownEscape(c) => write!(f, "unknown escape `\\{c}`"),
        }
    }
}

/// Resolve backslash escapes in the body of a string literal (quotes removed).
///
/// Supported: `\n \t \r \0 \\ \' \" \/ \uXXXX`.
pub fn unescape_string(raw: &str) -> Result<String, UnescapeError> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next().ok_or(UnescapeError::TrailingBackslash)?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            '/' => out.push('/'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    return Err(UnescapeError::InvalidUnicodeEscape(hex));
                }
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| UnescapeError::InvalidUnicodeEscape(hex.clone()))?;
                let ch = char::from_u32(code).ok_or(UnescapeError::InvalidCodePoint(code))?;
                out.push(ch);
            }
            other => return Err(UnescapeError::UnknownEscape(other)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(unescape_string("hello world").unwrap(), "hello world");
    }

    #[test]
    fn test_common_escapes() {
        assert_eq!(unescape_string(r"a\nb\tc").unwrap(), "a\nb\tc");
        assert_eq!(unescape_string(r#"say \"hi\""#).unwrap(), "say \"hi\"");
        assert_eq!(unescape_string(r"it\'s").unwrap(), "it's");
        assert_eq!(unescape_string(r"back\\slash").unwrap(), "back\\slash");
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(unescape_string(r"\u0048ello").unwrap(), "Hello");
        assert_eq!(
            unescape_string(r"\u00e9t\u00e9").unwrap(),
            "\u{e9}t\u{e9}"
        );
    }

    #[test]
    fn test_invalid_escapes() {
        assert_eq!(
            unescape_string(r"\q"),
            Err(UnescapeError::UnknownEscape('q'))
        );
        assert_eq!(
            unescape_string(r"\u12"),
            Err(UnescapeError::InvalidUnicodeEscape("12".to_string()))
        );
        assert_eq!(
            unescape_string(r"\ud800"),
            Err(UnescapeError::InvalidCodePoint(0xD800))
        );
        assert_eq!(unescape_string("\\"), Err(UnescapeError::TrailingBackslash));
    }
}

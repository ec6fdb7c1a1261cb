//! Placeholder scanning and literal interpolation.
//!
//! A `?` counts as a placeholder only outside string literals and quoted
//! identifiers. Inside `'...'` and `"..."` a backslash escapes the next
//! character; inside `` `...` `` it does not.

use crate::error::{DbrError, DbrResult};
use crate::value::Value;

enum Piece<'a> {
    Text(&'a str),
    Placeholder,
}

/// Walk `sql`, reporting literal runs and every `?` outside quotes.
fn scan<'a>(sql: &'a str, mut visit: impl FnMut(Piece<'a>)) {
    let bytes = sql.as_bytes();
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' && q != b'`' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'?' => {
                    visit(Piece::Text(&sql[start..i]));
                    visit(Piece::Placeholder);
                    start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }
    if start < sql.len() {
        visit(Piece::Text(&sql[start..]));
    }
}

/// Number of `?` placeholders in `sql`, ignoring quoted text.
pub fn count_placeholders(sql: &str) -> usize {
    let mut n = 0;
    scan(sql, |piece| {
        if matches!(piece, Piece::Placeholder) {
            n += 1;
        }
    });
    n
}

/// Replace every placeholder in `sql` with the literal form of the matching
/// argument.
///
/// Fails with [`DbrError::ArgumentCountMismatch`] when the counts differ and
/// with [`DbrError::Interpolation`] when a value has no literal form.
pub fn interpolate(sql: &str, args: &[Value]) -> DbrResult<String> {
    let placeholders = count_placeholders(sql);
    if placeholders != args.len() {
        return Err(DbrError::ArgumentCountMismatch {
            placeholders,
            args: args.len(),
        });
    }

    let mut out = String::with_capacity(sql.len() + args.len() * 8);
    let mut values = args.iter();
    let mut result = Ok(());
    scan(sql, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Placeholder => {
            if result.is_ok() {
                if let Some(value) = values.next() {
                    result = value.write_literal(&mut out);
                }
            }
        }
    });
    result.map(|()| out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_outside_quotes_only() {
        assert_eq!(count_placeholders("a = ? AND b = ?"), 2);
        assert_eq!(count_placeholders("a = '?' AND b = ?"), 1);
        assert_eq!(count_placeholders(r#"a = "it\"s?" AND `we?ird` = ?"#), 1);
        assert_eq!(count_placeholders(r"a = 'it\'s ?'"), 0);
        assert_eq!(count_placeholders("a = 'x''?' OR ?"), 1);
    }

    #[test]
    fn interpolates_in_order() {
        let sql = interpolate(
            "SELECT a FROM t WHERE (a = ?) AND (b IN (?,?)) AND (c = '?')",
            &[Value::Int(1), Value::from("x"), Value::Null],
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT a FROM t WHERE (a = 1) AND (b IN ('x',NULL)) AND (c = '?')"
        );
    }

    #[test]
    fn escaped_values_do_not_create_placeholders() {
        let sql = interpolate("a = ? AND b = ?", &[Value::from("what?"), Value::Int(2)]).unwrap();
        assert_eq!(sql, "a = 'what?' AND b = 2");
    }

    #[test]
    fn mismatch_is_an_error() {
        let err = interpolate("a = ? AND b = ?", &[Value::Int(1)]).unwrap_err();
        assert!(err.is_argument_count_mismatch());
    }

    #[test]
    fn unrenderable_value_is_an_error() {
        let err = interpolate("a = ?", &[Value::Float(f64::NAN)]).unwrap_err();
        assert!(err.is_interpolation());
    }
}

//! Bound argument values and their MySQL literal rendering.
//!
//! [`Value`] is what ends up in the argument list returned by `to_sql()`.
//! When a statement is interpolated, every value is rendered as a literal with
//! [`Value::write_literal`] instead.

use crate::error::{DbrError, DbrResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use std::fmt::Write as _;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single bound argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Signed integer (covers int and int64)
    Int(i64),
    /// Unsigned integer
    Uint(u64),
    /// Floating point number
    Float(f64),
    /// Boolean, rendered as `0`/`1`
    Bool(bool),
    /// Text
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Date and time without time zone; literals keep microsecond precision
    Time(NaiveDateTime),
    /// JSON document, bound as text
    Json(serde_json::Value),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render this value as a MySQL literal.
    pub fn to_literal(&self) -> DbrResult<String> {
        let mut out = String::new();
        self.write_literal(&mut out)?;
        Ok(out)
    }

    /// Append the MySQL literal form of this value to `out`.
    pub fn write_literal(&self, out: &mut String) -> DbrResult<()> {
        match self {
            Value::Null => out.push_str("NULL"),
            Value::Int(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Uint(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Float(v) => {
                if !v.is_finite() {
                    return Err(DbrError::interpolation(format!(
                        "float {v} has no SQL literal form"
                    )));
                }
                // `{}` prints the shortest representation that parses back to `v`.
                let _ = write!(out, "{v}");
            }
            Value::Bool(v) => out.push(if *v { '1' } else { '0' }),
            Value::Text(s) => write_quoted(out, s),
            Value::Bytes(b) => {
                out.push_str("X'");
                for byte in b {
                    let _ = write!(out, "{byte:02X}");
                }
                out.push('\'');
            }
            Value::Time(t) => {
                out.push('\'');
                let _ = write!(out, "{}", t.format(TIME_FORMAT));
                // MySQL keeps microseconds; a leap second stays within :59.
                let micros = (t.nanosecond() / 1_000).min(999_999);
                if micros != 0 {
                    let _ = write!(out, ".{micros:06}");
                }
                out.push('\'');
            }
            Value::Json(v) => write_quoted(out, &v.to_string()),
        }
        Ok(())
    }
}

/// Append `s` as a single-quoted MySQL string literal.
///
/// Escapes the characters `mysql_real_escape_string` escapes: NUL, `\n`, `\r`,
/// backslash, both quote characters and Ctrl-Z.
pub fn write_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64);
impl_from_int!(Uint, u64, u8, u16, u32, u64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Time(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v.naive_utc())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Reverse of `write_quoted`, enough to check what MySQL would read back.
    fn unquote(lit: &str) -> String {
        let inner = &lit[1..lit.len() - 1];
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('0') => out.push('\0'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('Z') => out.push('\x1a'),
                Some(other) => out.push(other),
                None => panic!("dangling escape in {lit}"),
            }
        }
        out
    }

    #[test]
    fn int_and_bool_literals() {
        assert_eq!(Value::Int(-42).to_literal().unwrap(), "-42");
        assert_eq!(Value::Uint(u64::MAX).to_literal().unwrap(), "18446744073709551615");
        assert_eq!(Value::Bool(true).to_literal().unwrap(), "1");
        assert_eq!(Value::Bool(false).to_literal().unwrap(), "0");
        assert_eq!(Value::Null.to_literal().unwrap(), "NULL");
    }

    #[test]
    fn string_escaping_round_trips() {
        let raw = "it's a \"test\"\\ with\nnewline\r\0nul and \x1a";
        let lit = Value::from(raw).to_literal().unwrap();
        assert_eq!(
            lit,
            r#"'it\'s a \"test\"\\ with\nnewline\r\0nul and \Z'"#
        );
        assert_eq!(unquote(&lit), raw);
    }

    #[test]
    fn float_round_trips() {
        for v in [2.5f64, 2.7, 0.1, -1e-7, 123456789.125] {
            let lit = Value::Float(v).to_literal().unwrap();
            assert_eq!(lit.parse::<f64>().unwrap(), v);
        }
    }

    #[test]
    fn non_finite_float_is_interpolation_error() {
        assert!(Value::Float(f64::NAN).to_literal().unwrap_err().is_interpolation());
        assert!(Value::Float(f64::INFINITY).to_literal().unwrap_err().is_interpolation());
    }

    #[test]
    fn time_literal_is_zero_padded() {
        let t = NaiveDate::from_ymd_opt(2006, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let lit = Value::Time(t).to_literal().unwrap();
        assert_eq!(lit, "'2006-01-02 03:04:05'");
        let back = NaiveDateTime::parse_from_str(&lit[1..lit.len() - 1], TIME_FORMAT).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn time_literal_keeps_microseconds() {
        let t = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_micro_opt(23, 59, 58, 1_500)
            .unwrap();
        let lit = Value::Time(t).to_literal().unwrap();
        assert_eq!(lit, "'2024-12-31 23:59:58.001500'");
        let back =
            NaiveDateTime::parse_from_str(&lit[1..lit.len() - 1], "%Y-%m-%d %H:%M:%S%.f").unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn time_literal_truncates_below_microseconds() {
        let day = NaiveDate::from_ymd_opt(2016, 12, 31).unwrap();
        let sub_micro = day.and_hms_nano_opt(10, 0, 0, 500).unwrap();
        assert_eq!(
            Value::Time(sub_micro).to_literal().unwrap(),
            "'2016-12-31 10:00:00'"
        );
        let leap = day.and_hms_nano_opt(23, 59, 59, 1_500_000_000).unwrap();
        assert_eq!(
            Value::Time(leap).to_literal().unwrap(),
            "'2016-12-31 23:59:59.999999'"
        );
    }

    #[test]
    fn bytes_render_as_hex() {
        assert_eq!(Value::Bytes(vec![0x0a, 0xff]).to_literal().unwrap(), "X'0AFF'");
    }

    #[test]
    fn json_is_quoted_text() {
        let v = Value::from(serde_json::json!({"name": "o'neil"}));
        assert_eq!(v.to_literal().unwrap(), r#"'{\"name\":\"o\'neil\"}'"#);
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i32)), Value::Int(7));
    }
}

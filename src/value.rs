//! The preference value grammar.
//!
//! A [`Value`] mirrors what a property list can hold: booleans, numbers,
//! dates, strings, and raw bytes as leaves, with arrays and string-keyed
//! dictionaries as containers. There is no null. Anything decoded from a
//! config file or from the OS store goes through the conversions in
//! [`validate`](crate::validate) before it becomes a `Value`, so holding a
//! `Value` means holding valid data.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

/// Ordered string-keyed mapping. Equality ignores order.
pub type Dictionary = IndexMap<String, Value>;

#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Date(DateTime<Utc>),
    String(String),
    Data(Vec<u8>),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

/// The concrete kind of a [`Value`], used to annotate type changes in diffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Integer,
    Real,
    Date,
    String,
    Data,
    Array,
    Dictionary,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Date => "date",
            ValueKind::String => "string",
            ValueKind::Data => "data",
            ValueKind::Array => "array",
            ValueKind::Dictionary => "dictionary",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Real(_) => ValueKind::Real,
            Value::Date(_) => ValueKind::Date,
            Value::String(_) => ValueKind::String,
            Value::Data(_) => ValueKind::Data,
            Value::Array(_) => ValueKind::Array,
            Value::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

/// Structural equality, except that any two NaN reals compare equal so a
/// value always equals itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Dictionary(a), Value::Dictionary(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Data(bytes) => {
                f.write_str("<")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str(">")
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Dictionary(dict) => {
                f.write_str("{")?;
                for (i, (key, value)) in dict.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dict(pairs: &[(&str, Value)]) -> Value {
        Value::Dictionary(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn scalars_display() {
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(2i64).to_string(), "2");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(2.0).to_string(), "2.0");
        assert_eq!(Value::from("en_US").to_string(), "\"en_US\"");
        assert_eq!(Value::Data(vec![0x0a, 0xff]).to_string(), "<0aff>");
    }

    #[test]
    fn date_displays_rfc3339() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-03-01T12:30:00Z");
    }

    #[test]
    fn containers_display() {
        let value = dict(&[
            ("langs", Value::from(vec!["en", "fr"])),
            ("size", Value::from(3i64)),
        ]);
        assert_eq!(value.to_string(), "{langs: [\"en\", \"fr\"], size: 3}");
    }

    #[test]
    fn dictionary_equality_ignores_order() {
        let a = dict(&[("x", Value::from(1i64)), ("y", Value::from(2i64))]);
        let b = dict(&[("y", Value::from(2i64)), ("x", Value::from(1i64))]);
        assert_eq!(a, b);
    }

    #[test]
    fn integer_and_real_are_distinct_kinds() {
        assert_eq!(Value::from(1i64).kind(), ValueKind::Integer);
        assert_eq!(Value::from(1.0).kind(), ValueKind::Real);
        assert_ne!(Value::from(1i64), Value::from(1.0));
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_eq!(Value::from(0.0), Value::from(-0.0));
        assert_ne!(Value::from(f64::NAN), Value::from(1.0));
    }
}

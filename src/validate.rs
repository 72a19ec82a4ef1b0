//! Validation of decoded data against the preference value grammar.
//!
//! Data arrives from three decoders: JSON5 config files (`serde_json::Value`),
//! TOML config files (`toml::Value`), and the OS store (`plist::Value`). Each
//! conversion walks the whole tree and fails on the first value the grammar
//! does not allow, reporting its dotted location (e.g.
//! `user.com.apple.finder.ShowPreviewPane`). Nothing is built partially.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::error::DotmacosError;
use crate::value::{Dictionary, Value};

/// True if `raw` is built only from booleans, numbers, strings, arrays of
/// valid values, and string-keyed mappings of valid values.
pub fn is_valid(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) | serde_json::Value::String(_) => {
            true
        }
        serde_json::Value::Array(items) => items.iter().all(is_valid),
        serde_json::Value::Object(map) => map.values().all(is_valid),
    }
}

/// Reject empty preference keys and domain names.
pub fn check_key(key: &str, context: &str) -> Result<(), DotmacosError> {
    if key.is_empty() {
        return Err(DotmacosError::InvalidKey {
            context: context.into(),
        });
    }
    Ok(())
}

/// Convert decoded JSON5 data into a [`Value`].
pub fn from_json(raw: serde_json::Value, at: &str) -> Result<Value, DotmacosError> {
    match raw {
        serde_json::Value::Null => Err(invalid(at, "null is not a valid preference value")),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Value::Integer(i)),
            (None, Some(r)) => Ok(Value::Real(r)),
            (None, None) => Err(invalid(at, &format!("unrepresentable number {n}"))),
        },
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| from_json(item, &index(at, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, item)| {
                let value = from_json(item, &child(at, &key))?;
                Ok((key, value))
            })
            .collect::<Result<Dictionary, _>>()
            .map(Value::Dictionary),
    }
}

/// Convert decoded TOML data into a [`Value`].
///
/// TOML dates are accepted only with a UTC offset; local dates and times
/// have no plist counterpart.
pub fn from_toml(raw: toml::Value, at: &str) -> Result<Value, DotmacosError> {
    match raw {
        toml::Value::Boolean(b) => Ok(Value::Boolean(b)),
        toml::Value::Integer(i) => Ok(Value::Integer(i)),
        toml::Value::Float(r) => Ok(Value::Real(r)),
        toml::Value::String(s) => Ok(Value::String(s)),
        toml::Value::Datetime(dt) => {
            let text = dt.to_string();
            DateTime::parse_from_rfc3339(&text)
                .map(|d| Value::Date(d.with_timezone(&Utc)))
                .map_err(|_| invalid(at, &format!("date {text} has no UTC offset")))
        }
        toml::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| from_toml(item, &index(at, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        toml::Value::Table(table) => table
            .into_iter()
            .map(|(key, item)| {
                let value = from_toml(item, &child(at, &key))?;
                Ok((key, value))
            })
            .collect::<Result<Dictionary, _>>()
            .map(Value::Dictionary),
    }
}

/// Convert a value read from the OS store into a [`Value`].
pub fn from_plist(raw: plist::Value, at: &str) -> Result<Value, DotmacosError> {
    match raw {
        plist::Value::Boolean(b) => Ok(Value::Boolean(b)),
        plist::Value::Integer(i) => match i.as_signed() {
            Some(i) => Ok(Value::Integer(i)),
            None => Err(invalid(at, &format!("integer {i:?} is out of range"))),
        },
        plist::Value::Real(r) => Ok(Value::Real(r)),
        plist::Value::Date(d) => Ok(Value::Date(DateTime::<Utc>::from(SystemTime::from(d)))),
        plist::Value::String(s) => Ok(Value::String(s)),
        plist::Value::Data(bytes) => Ok(Value::Data(bytes)),
        plist::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| from_plist(item, &index(at, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        plist::Value::Dictionary(dict) => dict
            .into_iter()
            .map(|(key, item)| {
                let value = from_plist(item, &child(at, &key))?;
                Ok((key, value))
            })
            .collect::<Result<Dictionary, _>>()
            .map(Value::Dictionary),
        plist::Value::Uid(_) => Err(invalid(at, "UID values are not supported")),
        _ => Err(invalid(at, "unsupported plist value")),
    }
}

fn invalid(at: &str, reason: &str) -> DotmacosError {
    DotmacosError::InvalidValue {
        key: at.into(),
        reason: reason.into(),
    }
}

pub(crate) fn child(at: &str, key: &str) -> String {
    if at.is_empty() {
        key.to_string()
    } else {
        format!("{at}.{key}")
    }
}

fn index(at: &str, i: usize) -> String {
    format!("{at}[{i}]")
}

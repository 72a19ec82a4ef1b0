//! Validated key/value preferences for one (section, domain).

use std::collections::BTreeSet;

use crate::error::DotmacosError;
use crate::validate;
use crate::value::{Dictionary, Value};

/// Preferences of a single domain: non-empty string keys mapped to [`Value`]s.
///
/// Only built through [`PreferenceMap::new`] (or the conversions that call it),
/// so every instance has been validated. There is no mutable access; merging
/// produces a new map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferenceMap {
    entries: Dictionary,
}

impl PreferenceMap {
    /// Validate `entries` and wrap them. `context` names the domain in errors.
    pub fn new(entries: Dictionary, context: &str) -> Result<Self, DotmacosError> {
        for key in entries.keys() {
            validate::check_key(key, context)?;
        }
        Ok(Self { entries })
    }

    /// Validate a decoded value that must be a dictionary of preferences.
    pub fn from_value(value: Value, context: &str) -> Result<Self, DotmacosError> {
        match value {
            Value::Dictionary(entries) => Self::new(entries, context),
            _ => Err(DotmacosError::NotAMapping {
                context: format!("prefs for {context}"),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn key_set(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the entries whose key is in `keys`.
    pub fn restricted_to(self, keys: &BTreeSet<String>) -> Self {
        let entries = self
            .entries
            .into_iter()
            .filter(|(key, _)| keys.contains(key))
            .collect();
        Self { entries }
    }

    pub fn as_dictionary(&self) -> &Dictionary {
        &self.entries
    }

    pub fn into_dictionary(self) -> Dictionary {
        self.entries
    }

    /// Assemble a map from entries that already passed validation.
    pub(crate) fn from_validated(entries: Dictionary) -> Self {
        Self { entries }
    }
}

impl IntoIterator for PreferenceMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

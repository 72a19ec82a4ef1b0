//! One-directional structural diff between preference maps.
//!
//! [`diff`] compares two maps of a single domain and yields [`DiffLine`]s.
//! [`DiffReport`] collects those lines per section and domain and renders the
//! nested text shown by dry runs:
//!
//! ```text
//! user:
//!   com.apple.finder:
//!     <absent> -> ShowPathbar: true
//!     ShowPreviewPane: false -> true
//! ```
//!
//! Keys present only on the `old` side are never reported: reconciliation
//! never deletes keys, so they would not change.

use std::fmt;

use crate::prefs::PreferenceMap;
use crate::types::Section;
use crate::value::Value;

/// A single reported change for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffLine {
    /// Key present in `new` only.
    Added { key: String, value: Value },
    /// Key present in both with unequal values.
    Changed { key: String, old: Value, new: Value },
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::Added { key, value } => write!(f, "<absent> -> {key}: {value}"),
            DiffLine::Changed { key, old, new } if old.kind() == new.kind() => {
                write!(f, "{key}: {old} -> {new}")
            }
            DiffLine::Changed { key, old, new } => write!(
                f,
                "{key}: ({}) {old} -> ({}) {new}",
                old.kind(),
                new.kind()
            ),
        }
    }
}

/// Compare `old` against `new`, oriented by `new`'s keys.
///
/// Additions come first, then modifications; each group follows the
/// iteration order of `new`.
pub fn diff(old: &PreferenceMap, new: &PreferenceMap) -> Vec<DiffLine> {
    let added = new
        .iter()
        .filter(|(key, _)| !old.contains_key(key))
        .map(|(key, value)| DiffLine::Added {
            key: key.clone(),
            value: value.clone(),
        });
    let changed = new.iter().filter_map(|(key, value)| {
        let old_value = old.get(key)?;
        (old_value != value).then(|| DiffLine::Changed {
            key: key.clone(),
            old: old_value.clone(),
            new: value.clone(),
        })
    });
    added.chain(changed).collect()
}

/// Diff lines of one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainDiff {
    pub domain: String,
    pub lines: Vec<DiffLine>,
}

/// Domain diffs of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDiff {
    pub section: Section,
    pub domains: Vec<DomainDiff>,
}

/// Nested diff over a whole document. Empty domains and sections are never
/// stored, so an empty report renders as the empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffReport {
    sections: Vec<SectionDiff>,
}

impl DiffReport {
    /// Record the lines of one domain. Empty line lists are dropped.
    pub fn push(&mut self, section: Section, domain: &str, lines: Vec<DiffLine>) {
        if lines.is_empty() {
            return;
        }
        let entry = DomainDiff {
            domain: domain.to_string(),
            lines,
        };
        match self.sections.iter_mut().find(|s| s.section == section) {
            Some(existing) => existing.domains.push(entry),
            None => self.sections.push(SectionDiff {
                section,
                domains: vec![entry],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[SectionDiff] {
        &self.sections
    }
}

const INDENT: &str = "  ";

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out: Vec<String> = Vec::new();
        for section in &self.sections {
            out.push(format!("{}:", section.section));
            for domain in &section.domains {
                out.push(format!("{INDENT}{}:", domain.domain));
                for line in &domain.lines {
                    out.push(format!("{INDENT}{INDENT}{line}"));
                }
            }
        }
        f.write_str(&out.join("\n"))
    }
}

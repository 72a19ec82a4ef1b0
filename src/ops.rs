//! Reconciliation between a config document and the OS store.
//!
//! Provides the logic behind `set`, `get` and `dump`, and the `SyncResult`
//! enum that callers use to display results. Every function takes the
//! access scope explicitly; sections outside it never reach the store.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::access::AccessScope;
use crate::diff::{self, DiffReport};
use crate::document::{Domains, SectionsDocument};
use crate::error::DotmacosError;
use crate::merge;
use crate::store::PrefStore;
use crate::types::Section;

/// Result of a reconciliation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncResult {
    /// Declared preferences of one config file were written to the OS.
    Applied {
        path: PathBuf,
        domains: Vec<(Section, String)>,
    },
    /// A config file was rewritten from OS preferences.
    Pulled { path: PathBuf },
    /// What a run against one config file would change.
    Preview { path: PathBuf, report: DiffReport },
    /// Encoded snapshot document.
    Snapshot(String),
    /// Confirmation that a snapshot was written to a file.
    SnapshotWritten { path: PathBuf },
    /// Commented settings template.
    Template(String),
}

impl SyncResult {
    /// True if displaying this result would print nothing.
    pub fn is_silent(&self) -> bool {
        matches!(self, SyncResult::Preview { report, .. } if report.is_empty())
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncResult::Applied { path, domains } => write!(
                f,
                "Applied {} domain(s) from {}",
                domains.len(),
                path.display()
            ),
            SyncResult::Pulled { path } => write!(f, "Updated {}", path.display()),
            SyncResult::Preview { report, .. } if report.is_empty() => Ok(()),
            SyncResult::Preview { path, report } => {
                write!(f, "\n{}:", path.display())?;
                for line in report.to_string().lines() {
                    write!(f, "\n  {line}")?;
                }
                Ok(())
            }
            SyncResult::Snapshot(text) | SyncResult::Template(text) => write!(f, "{text}"),
            SyncResult::SnapshotWritten { path } => {
                write!(f, "Snapshot written to {}", path.display())
            }
        }
    }
}

/// Sections of `doc` inside `scope`, in document order. Logs the rest.
fn accessible<'a>(
    doc: &'a SectionsDocument,
    scope: AccessScope,
) -> impl Iterator<Item = (Section, &'a Domains)> {
    doc.iter().filter(move |(section, _)| {
        let allowed = scope.allows(*section);
        if !allowed {
            warn!(%section, "Skipping section outside the current access scope");
        }
        allowed
    })
}

/// Write every accessible domain of `doc` into the store, merged on top of
/// what the store already holds. Returns the domains written.
pub fn merge_to_os<S: PrefStore + ?Sized>(
    doc: &SectionsDocument,
    scope: AccessScope,
    store: &mut S,
) -> Result<Vec<(Section, String)>, DotmacosError> {
    let mut written = Vec::new();
    for (section, domains) in accessible(doc, scope) {
        for (domain, declared) in domains {
            debug!(%section, %domain, "Merging declared preferences into the OS");
            let current = store.read(section, domain, None)?;
            let merged = merge::merge_optional(current, declared.clone());
            store.write(section, domain, &merged)?;
            written.push((section, domain.clone()));
        }
    }
    Ok(written)
}

/// Build a new document whose accessible domains are the declared maps
/// overlaid with current OS values. Unless `all_keys`, only keys already
/// declared are pulled. Sections outside `scope` pass through unchanged.
pub fn merge_from_os<S: PrefStore + ?Sized>(
    doc: &SectionsDocument,
    scope: AccessScope,
    store: &S,
    all_keys: bool,
) -> Result<SectionsDocument, DotmacosError> {
    let mut sections = Vec::new();
    for (section, domains) in doc.iter() {
        if !scope.allows(section) {
            sections.push((section, domains.clone()));
            continue;
        }
        let mut pulled = Domains::new();
        for (domain, declared) in domains {
            debug!(%section, %domain, "Merging OS preferences into the document");
            let keys = declared.key_set();
            let os = store.read(section, domain, (!all_keys).then_some(&keys))?;
            let merged = match os {
                Some(os) => merge::merge(declared.clone(), os),
                None => declared.clone(),
            };
            pulled.insert(domain.clone(), merged);
        }
        sections.push((section, pulled));
    }
    SectionsDocument::from_sections(sections)
}

/// Report what a reconciliation would change, without changing anything.
///
/// With `os_is_base`, the diff runs from the full OS state to the declared
/// values (what `set` would write). Otherwise it runs from the declared
/// values to the OS state (what `get` would pull), restricted to declared
/// keys unless `all_keys`.
pub fn diff_with_os<S: PrefStore + ?Sized>(
    doc: &SectionsDocument,
    scope: AccessScope,
    store: &S,
    os_is_base: bool,
    all_keys: bool,
) -> Result<DiffReport, DotmacosError> {
    let mut report = DiffReport::default();
    for (section, domains) in accessible(doc, scope) {
        for (domain, declared) in domains {
            let lines = if os_is_base {
                let os = store.read(section, domain, None)?.unwrap_or_default();
                diff::diff(&os, declared)
            } else {
                let keys = declared.key_set();
                let os = store
                    .read(section, domain, (!all_keys).then_some(&keys))?
                    .unwrap_or_default();
                diff::diff(declared, &os)
            };
            report.push(section, domain, lines);
        }
    }
    Ok(report)
}

/// Capture every stored domain of the requested sections into a new
/// document. An empty `sections` means every accessible section. Absent
/// and empty domains are left out.
pub fn snapshot_from_os<S: PrefStore + ?Sized>(
    scope: AccessScope,
    store: &S,
    sections: &[Section],
) -> Result<SectionsDocument, DotmacosError> {
    let requested: Vec<Section> = if sections.is_empty() {
        scope.sections().to_vec()
    } else {
        Section::ALL
            .into_iter()
            .filter(|section| sections.contains(section))
            .collect()
    };

    let mut snapshot = Vec::new();
    for section in requested {
        if !scope.allows(section) {
            warn!(%section, "Skipping section outside the current access scope");
            continue;
        }
        let mut domains = Domains::new();
        for domain in store.domains(section)? {
            match store.read(section, &domain, None)? {
                Some(prefs) if !prefs.is_empty() => {
                    domains.insert(domain, prefs);
                }
                _ => debug!(%section, %domain, "Skipping empty domain"),
            }
        }
        snapshot.push((section, domains));
    }
    SectionsDocument::from_sections(snapshot)
}

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::access::AccessScope;
use crate::error::DotmacosError;
use crate::file;
use crate::ops::{self, SyncResult};
use crate::settings::{self, Settings};
use crate::store::{DefaultsStore, PrefStore};
use crate::types::{Action, FileFormat};

/// Entry point for building a dotmacos session.
pub struct Dotmacos;

impl Dotmacos {
    pub fn builder() -> DotmacosBuilder {
        DotmacosBuilder::new()
    }
}

/// Builder for a [`Session`].
///
/// Every knob is optional: the format falls back to the settings, the
/// settings to the platform settings file, and the access scope to the
/// privilege of the running process.
#[derive(Debug, Default)]
pub struct DotmacosBuilder {
    format: Option<FileFormat>,
    scope: Option<AccessScope>,
    settings: Option<Settings>,
    settings_path: Option<PathBuf>,
}

impl DotmacosBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Override the config file format. `None` values are ignored (useful
    /// for optional clap args).
    pub fn format(mut self, format: Option<FileFormat>) -> Self {
        if format.is_some() {
            self.format = format;
        }
        self
    }

    /// Use an explicit access scope instead of the process privilege.
    pub fn scope(mut self, scope: AccessScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Use already loaded settings instead of loading them.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Load settings from this file instead of the platform default.
    pub fn settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    fn effective_settings(&mut self) -> Result<Settings, DotmacosError> {
        match self.settings.take() {
            Some(settings) => Ok(settings),
            None => Settings::load(self.settings_path.as_deref()),
        }
    }

    /// Build a session backed by the `defaults` tool.
    pub fn build(mut self) -> Result<Session<DefaultsStore>, DotmacosError> {
        let settings = self.effective_settings()?;
        let scope = self.scope.unwrap_or_else(AccessScope::current);
        let store = DefaultsStore::new(scope)
            .program(&settings.defaults.program)
            .timeout(settings.timeout());
        Ok(self.finish(settings, scope, store))
    }

    /// Build a session backed by a caller-provided store.
    pub fn build_with<S: PrefStore>(mut self, store: S) -> Result<Session<S>, DotmacosError> {
        let settings = self.effective_settings()?;
        let scope = self.scope.unwrap_or_else(AccessScope::current);
        Ok(self.finish(settings, scope, store))
    }

    fn finish<S: PrefStore>(self, settings: Settings, scope: AccessScope, store: S) -> Session<S> {
        let format = self.format.unwrap_or(settings.format);
        debug!(%format, privilege = ?scope.privilege(), "Session ready");
        Session {
            format,
            scope,
            store,
        }
    }
}

/// A configured session: one format, one access scope, one store.
#[derive(Debug)]
pub struct Session<S: PrefStore> {
    format: FileFormat,
    scope: AccessScope,
    store: S,
}

impl<S: PrefStore> Session<S> {
    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn scope(&self) -> AccessScope {
        self.scope
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle an [`Action`] and print every non-empty result to stdout.
    pub fn handle_and_print(&mut self, action: &Action) -> Result<(), DotmacosError> {
        for result in self.handle(action)? {
            if result.is_silent() {
                continue;
            }
            let text = result.to_string();
            if text.ends_with('\n') {
                print!("{text}");
            } else {
                println!("{text}");
            }
        }
        Ok(())
    }

    /// Handle an [`Action`] (set / get / dump / settings).
    ///
    /// Config files are processed in order; the first error aborts the run.
    pub fn handle(&mut self, action: &Action) -> Result<Vec<SyncResult>, DotmacosError> {
        match action {
            Action::Set { paths, dry_run } => paths
                .iter()
                .map(|path| self.set(path, *dry_run))
                .collect(),
            Action::Get {
                paths,
                all_keys,
                dry_run,
            } => paths
                .iter()
                .map(|path| self.get(path, *all_keys, *dry_run))
                .collect(),
            Action::Dump { sections, output } => {
                let snapshot = ops::snapshot_from_os(self.scope, &self.store, sections)?;
                match output {
                    Some(path) => {
                        file::write_new_document(&snapshot, path, self.format)?;
                        Ok(vec![SyncResult::SnapshotWritten { path: path.clone() }])
                    }
                    None => {
                        let text = file::encode(&snapshot, Path::new("<stdout>"), self.format, None)?;
                        Ok(vec![SyncResult::Snapshot(text)])
                    }
                }
            }
            Action::Settings => Ok(vec![SyncResult::Template(settings::template())]),
        }
    }

    fn set(&mut self, path: &Path, dry_run: bool) -> Result<SyncResult, DotmacosError> {
        let doc = file::read_document(path, self.format)?;
        if dry_run {
            let report = ops::diff_with_os(&doc, self.scope, &self.store, true, false)?;
            return Ok(SyncResult::Preview {
                path: path.to_path_buf(),
                report,
            });
        }
        let domains = ops::merge_to_os(&doc, self.scope, &mut self.store)?;
        Ok(SyncResult::Applied {
            path: path.to_path_buf(),
            domains,
        })
    }

    fn get(&mut self, path: &Path, all_keys: bool, dry_run: bool) -> Result<SyncResult, DotmacosError> {
        let doc = file::read_document(path, self.format)?;
        if dry_run {
            let report = ops::diff_with_os(&doc, self.scope, &self.store, false, all_keys)?;
            return Ok(SyncResult::Preview {
                path: path.to_path_buf(),
                report,
            });
        }
        let pulled = ops::merge_from_os(&doc, self.scope, &self.store, all_keys)?;
        file::write_document(&pulled, path, self.format)?;
        Ok(SyncResult::Pulled {
            path: path.to_path_buf(),
        })
    }
}

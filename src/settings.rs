//! Tool settings.
//!
//! Loaded with confique from, highest priority first: `DOTMACOS_*`
//! environment variables, the settings file, compiled defaults. The settings
//! file is `dotmacos/dotmacos.toml` in the platform config directory unless
//! a path is given explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use confique::Config;

use crate::error::DotmacosError;
use crate::types::FileFormat;

pub const APP_NAME: &str = "dotmacos";
pub const FILE_NAME: &str = "dotmacos.toml";

#[derive(Config, Debug)]
pub struct Settings {
    /// Format of config documents when `--format` is not given.
    /// One of "json5" or "toml".
    #[config(env = "DOTMACOS_FORMAT", default = "json5")]
    pub format: FileFormat,

    /// How OS preferences are read and written.
    #[config(nested)]
    pub defaults: DefaultsSettings,
}

#[derive(Config, Debug)]
pub struct DefaultsSettings {
    /// Executable used to export and import preference domains.
    #[config(env = "DOTMACOS_DEFAULTS_PROGRAM", default = "defaults")]
    pub program: String,

    /// Seconds to wait for a single preference command before killing it.
    #[config(env = "DOTMACOS_DEFAULTS_TIMEOUT_SECS", default = 30)]
    pub timeout_secs: u64,
}

impl Settings {
    /// Load settings, reading `explicit` or else the platform settings file.
    ///
    /// A missing platform file is fine; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, DotmacosError> {
        let path = match explicit {
            Some(path) => {
                std::fs::metadata(path).map_err(|e| DotmacosError::IoError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                Some(path.to_path_buf())
            }
            None => default_path(),
        };

        let mut builder = Settings::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs)
    }
}

/// The settings file in the platform config directory
/// (e.g. `~/Library/Application Support/dotmacos/dotmacos.toml` on macOS).
pub fn default_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Some(dirs.config_dir().join(FILE_NAME))
}

/// Commented TOML template generated from the settings' doc comments.
pub fn template() -> String {
    confique::toml::template::<Settings>(confique::toml::FormatOptions::default())
}

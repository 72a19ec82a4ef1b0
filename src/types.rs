use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// An access-scoped partition of preference storage.
///
/// The set is closed: `user` is per-user storage, `local` is per-user and
/// per-machine (`defaults -currentHost`), `system` is machine-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Section {
    User,
    Local,
    System,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::User, Section::Local, Section::System];

    pub fn name(self) -> &'static str {
        match self {
            Section::User => "user",
            Section::Local => "local",
            Section::System => "system",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Section::User),
            "local" => Ok(Section::Local),
            "system" => Ok(Section::System),
            other => Err(other.to_string()),
        }
    }
}

/// On-disk format of a config document.
///
/// `Json` and `Yaml` are accepted on the command line but have no codec;
/// every read or write in those formats fails with
/// [`UnsupportedFormat`](crate::DotmacosError::UnsupportedFormat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json5,
    Json,
    Yaml,
    Toml,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Json5 => "json5",
            FileFormat::Json => "json",
            FileFormat::Yaml => "yaml",
            FileFormat::Toml => "toml",
        };
        f.write_str(name)
    }
}

/// A reconciliation request, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write declared preferences into the OS, or show what would change.
    Set { paths: Vec<PathBuf>, dry_run: bool },
    /// Pull OS preferences back into config files, or show what would change.
    Get {
        paths: Vec<PathBuf>,
        all_keys: bool,
        dry_run: bool,
    },
    /// Snapshot every domain of the given sections (all accessible ones if empty).
    Dump {
        sections: Vec<Section>,
        output: Option<PathBuf>,
    },
    /// Print the commented settings template.
    Settings,
}

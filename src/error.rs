use std::path::PathBuf;
use thiserror::Error;

use crate::types::{FileFormat, Section};

#[derive(Debug, Error)]
pub enum DotmacosError {
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid key in {context}: keys must be non-empty strings")]
    InvalidKey { context: String },

    #[error("Invalid section names: {}", .0.join(", "))]
    InvalidSections(Vec<String>),

    #[error("Invalid {context}: not a mapping")]
    NotAMapping { context: String },

    #[error("Cannot access {section} settings as user {uid}")]
    AccessDenied { section: Section, uid: u32 },

    #[error("Failed to access {section} settings for {domain}: {reason}")]
    StoreError {
        section: Section,
        domain: String,
        reason: String,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid data in config file {path}: top level is not a mapping")]
    StructureError { path: PathBuf },

    #[error("Failed to write {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("The {0} config format is not supported")]
    UnsupportedFormat(FileFormat),

    #[error("Settings error: {0}")]
    SettingsError(#[from] confique::Error),
}

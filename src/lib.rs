//! Manage macOS and app preferences with config files.
//!
//! A config document declares preferences by section, domain and key:
//!
//! ```json5
//! {
//!   user: {
//!     "com.apple.finder": { ShowPreviewPane: true },
//!   },
//!   local: {
//!     "com.apple.screensaver": { idleTime: 0 },
//!   },
//! }
//! ```
//!
//! dotmacos reconciles such a document with the live preference store in
//! either direction:
//!
//! - **set** merges the declared values into the OS ([`merge_to_os`]).
//! - **get** merges current OS values back into the document and rewrites
//!   the file ([`merge_from_os`]).
//! - **dry run** of either shows the difference without touching anything
//!   ([`diff_with_os`]).
//! - **dump** snapshots every stored domain into a new document
//!   ([`snapshot_from_os`]).
//!
//! ```ignore
//! let mut session = Dotmacos::builder().build()?;
//! session.handle_and_print(&Action::Set {
//!     paths: vec!["finder.json5".into()],
//!     dry_run: true,
//! })?;
//! ```
//!
//! # Sections and access
//!
//! `user` holds per-user preferences, `local` per-user preferences bound to
//! this machine (`defaults -currentHost`), and `system` machine-wide ones.
//! Root can only reach `system`; everyone else only `user` and `local`. The
//! privilege is read once when a session is built and passed to every
//! operation as an [`AccessScope`]; sections outside it are skipped and never
//! reach the store.
//!
//! # Merging
//!
//! Values in the incoming map win. Arrays are replaced, never unioned.
//! Dictionaries present on both sides are combined one level deep. Keys are
//! never deleted. See [`merge`](crate::merge()) for the full table.
//!
//! # Diffs
//!
//! A diff reports additions (`<absent> -> key: value`) and modifications
//! (`key: old -> new`), annotating both kinds when a value changes type
//! (`key: (boolean) true -> (string) "true"`). Keys only on the base side
//! are not reported.
//!
//! # Formats
//!
//! Config documents are JSON5 (the default) or TOML. TOML write-back keeps
//! the file's comments and layout. JSON and YAML are recognised names with
//! no codec; using them fails with [`DotmacosError::UnsupportedFormat`].
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides the
//! [`Cli`] parser used by the `dotmacos` binary. It only converts arguments
//! into an [`Action`]; everything else runs through [`Session::handle`].

pub mod error;
pub mod file;
pub mod logging;
pub mod settings;
pub mod types;
pub mod validate;

mod access;
mod builder;
#[cfg(feature = "clap")]
mod cli;
mod diff;
mod document;
mod merge;
mod ops;
mod persist;
mod prefs;
mod store;
mod value;

#[cfg(test)]
mod fixtures;

pub use access::{AccessScope, Privilege};
pub use builder::{Dotmacos, DotmacosBuilder, Session};
#[cfg(feature = "clap")]
pub use cli::{Cli, Command};
pub use diff::{DiffLine, DiffReport, DomainDiff, SectionDiff, diff};
pub use document::{Domains, SectionsDocument};
pub use error::DotmacosError;
pub use merge::{merge, merge_optional};
pub use ops::{SyncResult, diff_with_os, merge_from_os, merge_to_os, snapshot_from_os};
pub use prefs::PreferenceMap;
pub use settings::Settings;
pub use store::{DefaultsStore, PrefStore};
pub use types::{Action, FileFormat, Section};
pub use value::{Dictionary, Value, ValueKind};

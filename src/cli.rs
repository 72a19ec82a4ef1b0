//! Clap adapter for dotmacos.
//!
//! Compiled only with the `clap` Cargo feature (on by default). The parsed
//! [`Cli`] carries the global flags the binary needs to build a session;
//! [`Command::into_action()`] converts the subcommand into a
//! framework-agnostic [`Action`](crate::Action). From there, all logic flows
//! through [`Session::handle()`](crate::Session::handle).

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::types::{Action, FileFormat, Section};

/// Manage macOS and app preferences using config files.
#[derive(Debug, Parser)]
#[command(name = "dotmacos", version)]
pub struct Cli {
    /// Log more detail to stderr (-v for info, -vv for debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read tool settings from this file instead of the platform default.
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    /// Format of config files [default: from settings, else json5].
    #[arg(long, value_enum, global = true)]
    pub format: Option<FileFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set OS and app preferences from config files, merged with the
    /// current ones.
    Set {
        /// Show what settings would be added or changed.
        #[arg(long)]
        dry_run: bool,

        /// Config files to apply, in order.
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Read OS and app preferences back into existing config files.
    Get {
        /// Include keys not already in the config files.
        #[arg(long)]
        all_keys: bool,

        /// Show what settings would be added or changed.
        #[arg(long)]
        dry_run: bool,

        /// Config files to update, in order.
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Snapshot every stored domain into a new config document.
    Dump {
        /// Only dump this section (repeatable) [default: every accessible one].
        #[arg(short, long = "section", value_enum)]
        sections: Vec<Section>,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a commented settings file template.
    Settings,
}

impl Command {
    /// Convert the parsed subcommand into a framework-agnostic `Action`.
    pub fn into_action(self) -> Action {
        match self {
            Command::Set { dry_run, paths } => Action::Set { paths, dry_run },
            Command::Get {
                all_keys,
                dry_run,
                paths,
            } => Action::Get {
                paths,
                all_keys,
                dry_run,
            },
            Command::Dump { sections, output } => Action::Dump { sections, output },
            Command::Settings => Action::Settings,
        }
    }
}

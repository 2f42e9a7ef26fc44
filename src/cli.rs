//! Command-line interface definitions and parsing
//!
//! This module defines the complete CLI structure for canopy using the `clap` crate.
//!
//! # Commands
//!
//! - **tree**: Show a collection as an indented tree
//! - **add** / **rename**: Create items or change their title
//! - **context**: Print where an item sits in its collection
//! - **plan**: Show what a cascading operation on a selection would affect
//! - **delete** / **move**: Bulk operations on a selection
//! - **import** / **export**: JSON snapshots of a collection
//! - **collections**: List or create collections
//! - **db** / **config**: Manage databases and settings
//!
//! # Examples
//!
//! ```
//! use canopy::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["canopy", "delete", "c1", "season1", "ep3", "--yes"]);
//! assert!(matches!(cli.command, Commands::Delete { .. }));
//! ```

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::bulk::Destination;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(about = "Select and bulk-edit hierarchical content collections", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Shared arguments for commands that work with a database
#[derive(Parser, Debug, Clone, Default)]
pub struct DbArgs {
    /// Database name to use (overrides default)
    #[arg(long = "db", value_name = "NAME")]
    pub db: Option<String>,
}

/// Which items of a collection an operation starts from
#[derive(Parser, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Ids of the selected items
    #[arg(value_name = "ID", required_unless_present = "all")]
    pub ids: Vec<String>,

    /// Select every item of the collection
    #[arg(short = 'a', long = "all", conflicts_with = "ids")]
    pub all: bool,
}

/// Flags shared by destructive bulk commands
#[derive(Parser, Debug, Clone, Default)]
pub struct BulkArgs {
    /// Preview the affected items without changing anything
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Store calls in flight at once (overrides config)
    #[arg(short = 'j', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show a collection as a tree
    #[command(visible_alias = "t")]
    Tree {
        /// Collection id
        collection: String,

        /// Print item ids next to titles
        #[arg(short = 'i', long = "ids")]
        show_ids: bool,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Add an item to a collection
    Add {
        /// Collection id
        collection: String,

        /// Title of the new item
        title: String,

        /// Parent item (omit for a root item)
        #[arg(short = 'p', long = "parent", value_name = "ID")]
        parent: Option<String>,

        /// Item kind, e.g. series, season, episode
        #[arg(short = 'k', long = "kind", default_value = "item")]
        kind: String,

        /// Item id (generated when omitted)
        #[arg(long = "id")]
        id: Option<String>,

        /// Optional description
        #[arg(short = 'd', long = "description")]
        description: Option<String>,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Change the title of an item
    Rename {
        /// Item id
        id: String,

        /// New title
        title: String,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Print where an item sits, e.g. "Series in Season 1 in Whoniverse"
    Context {
        /// Collection id
        collection: String,

        /// Item id
        id: String,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Show what a cascading operation on the selection would affect
    Plan {
        /// Collection id
        collection: String,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Delete the selected items together with everything below them
    #[command(visible_alias = "rm")]
    Delete {
        /// Collection id
        collection: String,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        bulk: BulkArgs,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Move the selected items under another item, or to the root
    #[command(visible_alias = "mv")]
    Move {
        /// Collection id
        collection: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Destination item id, or "root"
        #[arg(long = "to", value_name = "DEST", value_parser = parse_destination)]
        to: Destination,

        #[command(flatten)]
        bulk: BulkArgs,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Import a collection from a JSON file
    Import {
        /// JSON file written by `canopy export`
        file: PathBuf,

        /// Replace items that already exist instead of failing
        #[arg(long = "replace")]
        replace: bool,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Export a collection as JSON
    Export {
        /// Collection id
        collection: String,

        /// Output file (stdout when omitted)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Manage collections
    Collections {
        #[command(subcommand)]
        command: CollectionCommands,

        #[command(flatten)]
        db_args: DbArgs,
    },

    /// Manage databases
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Collection subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CollectionCommands {
    /// List all collections
    #[command(visible_alias = "ls")]
    List,

    /// Create a collection, or rename an existing one
    Add {
        /// Collection id
        id: String,

        /// Display name
        name: String,
    },
}

/// Database management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DbCommands {
    /// Add a new database
    Add {
        /// Name of the database
        name: String,

        /// Path to the database directory
        path: PathBuf,
    },

    /// List all databases
    List,

    /// Remove a database from configuration
    #[command(visible_alias = "rm")]
    Remove {
        /// Name of the database to remove
        name: String,

        /// Also delete database files from disk
        #[arg(short = 'd', long = "delete-files")]
        delete_files: bool,
    },

    /// Set the default database
    #[command(name = "set-default")]
    SetDefault {
        /// Name of the database to set as default
        name: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., max_concurrency=8)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., quiet)
        #[arg(value_name = "KEY")]
        key: String,
    },
}

#[allow(clippy::unnecessary_wraps)]
fn parse_destination(value: &str) -> Result<Destination, String> {
    Ok(Destination::parse(value))
}

impl Commands {
    /// Database name given with `--db`, if the command uses a database
    #[must_use]
    pub fn get_db(&self) -> Option<String> {
        match self {
            Self::Tree { db_args, .. }
            | Self::Add { db_args, .. }
            | Self::Rename { db_args, .. }
            | Self::Context { db_args, .. }
            | Self::Plan { db_args, .. }
            | Self::Delete { db_args, .. }
            | Self::Move { db_args, .. }
            | Self::Import { db_args, .. }
            | Self::Export { db_args, .. }
            | Self::Collections { db_args, .. } => db_args.db.clone(),
            Self::Db { .. } | Self::Config { .. } => None,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter directive for the requested verbosity
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delete_with_ids() {
        let cli = Cli::parse_from(["canopy", "delete", "c1", "season1", "ep3", "-y"]);
        match cli.command {
            Commands::Delete { collection, selection, bulk, .. } => {
                assert_eq!(collection, "c1");
                assert_eq!(selection.ids, vec!["season1".to_string(), "ep3".to_string()]);
                assert!(!selection.all);
                assert!(bulk.yes);
                assert!(!bulk.dry_run);
            }
            other => panic!("Expected Delete command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_all() {
        let cli = Cli::parse_from(["canopy", "rm", "c1", "--all", "--dry-run"]);
        match cli.command {
            Commands::Delete { selection, bulk, .. } => {
                assert!(selection.all);
                assert!(selection.ids.is_empty());
                assert!(bulk.dry_run);
            }
            other => panic!("Expected Delete command, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_requires_selection() {
        assert!(Cli::try_parse_from(["canopy", "delete", "c1"]).is_err());
        assert!(Cli::try_parse_from(["canopy", "delete", "c1", "a", "--all"]).is_err());
    }

    #[test]
    fn test_parse_move_to_root() {
        let cli = Cli::parse_from(["canopy", "mv", "c1", "ep1", "--to", "root", "-j", "2"]);
        match cli.command {
            Commands::Move { to, bulk, .. } => {
                assert_eq!(to, Destination::Root);
                assert_eq!(bulk.concurrency, Some(2));
            }
            other => panic!("Expected Move command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_move_to_item() {
        let cli = Cli::parse_from(["canopy", "move", "c1", "ep1", "--to", "season2"]);
        match cli.command {
            Commands::Move { to, .. } => assert_eq!(to, Destination::Item("season2".into())),
            other => panic!("Expected Move command, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["canopy", "tree", "c1", "-vv", "-q", "--db", "work"]);
        assert!(cli.quiet);
        assert_eq!(cli.log_level(), "debug");
        assert_eq!(cli.command.get_db(), Some("work".to_string()));
    }

    #[test]
    fn test_db_commands_have_no_database() {
        let cli = Cli::parse_from(["canopy", "db", "list"]);
        assert!(cli.command.get_db().is_none());
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::parse_from([
            "canopy", "add", "c1", "Episode 4", "-p", "season2", "-k", "episode",
        ]);
        match cli.command {
            Commands::Add { title, parent, kind, id, .. } => {
                assert_eq!(title, "Episode 4");
                assert_eq!(parent.as_deref(), Some("season2"));
                assert_eq!(kind, "episode");
                assert!(id.is_none());
            }
            other => panic!("Expected Add command, got {other:?}"),
        }
    }
}

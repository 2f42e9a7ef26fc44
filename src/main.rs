//! Canopy CLI application entry point
//!
//! Command-line front end for selecting items in content collections and
//! deleting or moving them in bulk.
//!
//! # Usage
//!
//! ```bash
//! # Show a collection
//! canopy tree whoniverse --ids
//!
//! # See what deleting two items would take with them
//! canopy plan whoniverse season1 ep7
//!
//! # Delete them (asks for confirmation unless --yes)
//! canopy delete whoniverse season1 ep7
//!
//! # Move everything under another item, 8 store calls at a time
//! canopy move whoniverse --all --to archive -j 8
//!
//! # More logging
//! canopy -vv delete whoniverse season1 --dry-run
//! ```
//!
//! # Configuration
//!
//! On first run, canopy will prompt for initial setup. Configuration is stored in
//! the user's config directory (`~/.config/canopy/config.toml` on Linux).

use canopy::{
    CanopyError,
    cli::{Cli, Commands, ConfigCommands, DbCommands},
    commands,
    config,
    db::Database,
};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, CanopyError>;

/// Install the log subscriber; `RUST_LOG` wins over `-v` flags
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},sled=warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Bare names live under the local data dir, anything else is taken as given
fn resolve_database_path(path: &Path) -> Result<PathBuf> {
    if path.components().count() > 1 {
        return Ok(path.to_path_buf());
    }
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| CanopyError::InvalidInput("Could not determine data directory".into()))?;
    Ok(data_dir.join("canopy").join(path))
}

fn require_database<'a>(config: &'a config::CanopyConfig, name: &str) -> Result<&'a PathBuf> {
    config
        .get_database(name)
        .ok_or_else(|| CanopyError::InvalidInput(format!("No database named '{name}'")))
}

/// Register, list, forget or pick the default content database
///
/// # Errors
///
/// Returns `CanopyError` for unknown or duplicate names, or if the
/// configuration or the database directory cannot be written.
fn handle_db_command(mut config: config::CanopyConfig, command: &DbCommands, quiet: bool) -> Result<()> {
    match command {
        DbCommands::Add { name, path } => {
            if config.get_database(name).is_some() {
                return Err(CanopyError::InvalidInput(format!("A database named '{name}' is already registered")));
            }
            let path = resolve_database_path(path)?;
            std::fs::create_dir_all(&path)?;
            config.add_database(name.clone(), path.clone())?;
            let first = config.databases.len() == 1;
            if first {
                config.set_default_database(name.clone())?;
            }
            tracing::info!(database = %name, path = %path.display(), default = first, "database registered");
            if !quiet {
                let suffix = if first { " (default)" } else { "" };
                println!("Registered '{name}' at {}{suffix}", path.display());
            }
        }
        DbCommands::List => {
            let default_db = config.get_default_database();
            for name in config.list_databases() {
                match (quiet, config.get_database(name)) {
                    (true, _) => println!("{name}"),
                    (false, Some(path)) => {
                        let marker = if default_db == Some(name) { "*" } else { " " };
                        println!("{marker} {name:<16} {}", path.display());
                    }
                    (false, None) => {}
                }
            }
            if config.databases.is_empty() && !quiet {
                println!("No databases yet. Register one with: canopy db add <name> <path>");
            }
        }
        DbCommands::Remove { name, delete_files } => {
            require_database(&config, name)?;
            let Some(path) = config.remove_database(name)? else {
                return Ok(());
            };
            if *delete_files && path.exists() {
                std::fs::remove_dir_all(&path)?;
            }
            if !quiet {
                let files = if *delete_files { "deleted" } else { "kept" };
                println!("Forgot '{name}'; files at {} {files}", path.display());
                if config.get_default_database().is_none() && !config.databases.is_empty() {
                    println!("No default database now; pick one with: canopy db set-default <name>");
                }
            }
        }
        DbCommands::SetDefault { name } => {
            require_database(&config, name)?;
            config.set_default_database(name.clone())?;
            if !quiet {
                println!("'{name}' is now the default database");
            }
        }
    }
    Ok(())
}

const CONFIG_KEYS: &str = "quiet, max_concurrency";

/// Handle the config command - manage application settings
///
/// # Errors
///
/// Returns `CanopyError` if the configuration key is invalid, value parsing fails,
/// or configuration save fails.
fn handle_config_command(mut config: config::CanopyConfig, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Set { setting } => {
            let (key, value) = setting
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| CanopyError::InvalidInput(
                    "Invalid format. Use: canopy config set key=value".into()
                ))?;

            match key {
                "quiet" => {
                    config.quiet = value.parse::<bool>().map_err(|_| {
                        CanopyError::InvalidInput(
                            format!("Invalid value for quiet: '{value}'. Use 'true' or 'false'")
                        )
                    })?;
                }
                "max_concurrency" => {
                    config.max_concurrency = value
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| CanopyError::InvalidInput(
                            format!("Invalid value for max_concurrency: '{value}'. Use a positive number")
                        ))?;
                }
                _ => {
                    return Err(CanopyError::InvalidInput(
                        format!("Unknown configuration key: '{key}'. Available keys: {CONFIG_KEYS}")
                    ));
                }
            }
            config.save()?;
            if !quiet {
                println!("Set {key} = {value}");
            }
        }
        ConfigCommands::Get { key } => match key.as_str() {
            "quiet" => println!("{}", config.quiet),
            "max_concurrency" => println!("{}", config.max_concurrency),
            _ => {
                return Err(CanopyError::InvalidInput(
                    format!("Unknown configuration key: '{key}'. Available keys: {CONFIG_KEYS}")
                ));
            }
        },
    }
    Ok(())
}

/// Open the database named on the command line, or the default one
fn open_database(config: &config::CanopyConfig, name: Option<String>) -> Result<Database> {
    let db_name = name.or_else(|| config.get_default_database().cloned()).ok_or_else(|| {
        CanopyError::InvalidInput(
            "No default database set. Use 'canopy db add <name> <path>' to create one, or specify --db <name>.".into()
        )
    })?;

    let db_path = require_database(config, &db_name)?;

    tracing::debug!(database = %db_name, path = %db_path.display(), "opening database");
    Ok(Database::open(db_path)?)
}

fn run(cli: Cli) -> Result<()> {
    let config = config::CanopyConfig::load_or_setup()?;
    let quiet = cli.quiet || config.quiet;
    let command = cli.command;

    match &command {
        Commands::Db { command } => return handle_db_command(config, command, quiet),
        Commands::Config { command } => return handle_config_command(config, command, quiet),
        _ => {}
    }

    let db = open_database(&config, command.get_db())?;
    let defaults = config.execute_options();

    match command {
        Commands::Tree { collection, show_ids, .. } => {
            commands::tree(&db, &collection, show_ids, quiet)
        }
        Commands::Add { collection, title, parent, kind, id, description, .. } => {
            let item = commands::NewItem { id, title, parent, kind, description };
            commands::add(&db, &collection, item, quiet).map(|_| ())
        }
        Commands::Rename { id, title, .. } => commands::rename(&db, &id, &title, quiet),
        Commands::Context { collection, id, .. } => commands::context(&db, &collection, &id, quiet),
        Commands::Plan { collection, selection, .. } => {
            commands::plan(&db, &collection, &selection, quiet)
        }
        Commands::Delete { collection, selection, bulk, .. } => {
            commands::delete(&db, &collection, &selection, &bulk, &defaults, quiet)
        }
        Commands::Move { collection, selection, to, bulk, .. } => {
            commands::relocate(&db, &collection, &selection, &to, &bulk, &defaults, quiet)
        }
        Commands::Import { file, replace, .. } => commands::import(&db, &file, replace, quiet),
        Commands::Export { collection, output, .. } => {
            commands::export(&db, &collection, output.as_deref(), quiet)
        }
        Commands::Collections { command, .. } => commands::collections(&db, &command, quiet),
        Commands::Db { .. } | Commands::Config { .. } => unreachable!(),
    }
}

/// Main entry point for the canopy application
///
/// Parses command-line arguments, sets up logging and dispatches to the
/// appropriate command handler. Errors are printed in red and exit with 1.
fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.log_level());

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

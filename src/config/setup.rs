//! Interactive setup wizard for first-time configuration

use super::CanopyConfig;
use config::ConfigError;
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::PathBuf;

/// Interactive first-time setup - prompts for database name and location
///
/// Guides the user through creating their first database configuration:
/// 1. Prompts for a database name (default: "default")
/// 2. Prompts for database location (default: system data directory)
/// 3. Prompts for how many store calls a bulk operation may run at once
///
/// # Errors
///
/// Returns `ConfigError` if the system data directory cannot be determined,
/// user input cannot be read, or the configuration cannot be saved.
pub fn first_time_setup() -> Result<CanopyConfig, ConfigError> {
    println!("Welcome to canopy! Let's set up your first database.\n");

    let default_data_dir = dirs::data_local_dir()
        .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))?
        .join("canopy");

    let db_name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Database name")
        .default("default".to_string())
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let default_path = default_data_dir.join(&db_name);
    let db_path_str: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Database location")
        .default(default_path.to_string_lossy().to_string())
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let max_concurrency: usize = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Parallel store calls for bulk operations")
        .default(crate::bulk::DEFAULT_CONCURRENCY)
        .validate_with(|n: &usize| if *n == 0 { Err("must be at least 1") } else { Ok(()) })
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let mut config = CanopyConfig::default();
    config.databases.insert(db_name.clone(), PathBuf::from(db_path_str));
    config.default_database = Some(db_name);
    config.max_concurrency = max_concurrency;

    config.save()?;

    println!("\nConfiguration saved successfully!");
    Ok(config)
}

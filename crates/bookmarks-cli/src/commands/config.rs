//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use bookmarks_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "database": config.database_path(),
                    "fetch_timeout_secs": config.fetch_timeout_secs,
                    "conflict_status": config.conflict_status.to_string(),
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!("  fetch_timeout_secs: {}", config.fetch_timeout_secs);
            println!("  conflict_status:    {}", config.conflict_status);
            println!(
                "  log_file:           {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Database:    {}", config.database_path().display());
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "fetch_timeout_secs" => {
            config.fetch_timeout_secs = value
                .trim()
                .parse()
                .context("Invalid value for fetch_timeout_secs. Use a whole number of seconds.")?;
        }
        "conflict_status" => {
            config.conflict_status = value
                .parse()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .context("Invalid value for conflict_status. Use 'internal' or 'conflict'.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, fetch_timeout_secs, conflict_status, log_file",
                key
            );
        }
    }
    Ok(())
}

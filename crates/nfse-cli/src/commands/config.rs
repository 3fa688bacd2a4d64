//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &mut Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("{}", render(config, formatter.format())?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            println!("{}", formatter.success(&format!("Set {} = {}", key, value)));
        }
        ConfigAction::Reset => {
            *config = Config::default();
            config.save_to(path)?;
            println!("{}", formatter.success("Configuration reset to defaults"));
        }
    }

    Ok(())
}

fn render(config: &Config, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Table | OutputFormat::Quiet => toml::to_string_pretty(config)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e))),
    }
}

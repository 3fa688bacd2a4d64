//! nfse - Command-line front end for splitting and classifying NFS-e batches.

use clap::Parser;
use nfse_cli::commands;
use nfse_cli::{Cli, Command, Config, Formatter};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> nfse_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // A broken config file must not block `config reset`
    let config_path = Config::resolve(cli.config.as_deref())?;
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Command::Config(_)) => {
            warn!("{}; using defaults", e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Classify(args) => {
            commands::execute_classify(args, &config, &formatter).await?;
        }
        Command::Config(args) => {
            commands::execute_config(args, &mut config, &config_path, &formatter)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the -v flags.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use nfse_domain::Category;
use std::path::PathBuf;

/// nfse - Split NFS-e batches and sort the notes by ISS withholding.
#[derive(Debug, Parser)]
#[command(name = "nfse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "NFSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (file names only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split and classify XML files and zip archives
    Classify(ClassifyArgs),

    /// Manage the saved classification rule and settings
    Config(ConfigArgs),
}

/// Arguments for the classify command.
#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// XML files, zip archives or directories holding them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Tag whose value decides the category
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Value that marks a note as Tomador
    #[arg(long)]
    pub tomador: Option<String>,

    /// Value that marks a note as Prestador
    #[arg(long)]
    pub prestador: Option<String>,

    /// Only list and export this category
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Write each note into <DIR>/<category>/
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bundle the notes into a new zip archive
    #[arg(long)]
    pub zip: Option<PathBuf>,

    /// Maximum number of files processed at the same time
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Exit with an error when any file could not be read
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for config management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Change one setting
    Set {
        /// Setting name (tag, tomador, prestador, color, format, parallel)
        key: String,
        /// New value
        value: String,
    },

    /// Restore the default configuration
    Reset,
}

/// Category argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CategoryArg {
    /// ISS withheld by the service taker
    Tomador,
    /// ISS due by the service provider
    Prestador,
    /// Neither value matched
    SemCategoria,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<CategoryArg> for Category {
    fn from(category: CategoryArg) -> Self {
        match category {
            CategoryArg::Tomador => Category::Tomador,
            CategoryArg::Prestador => Category::Prestador,
            CategoryArg::SemCategoria => Category::SemCategoria,
        }
    }
}

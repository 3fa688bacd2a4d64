//! NFS-e CLI library.
//!
//! Reads XML and zip batches from disk, runs them through the extractor
//! pipeline and reports or exports the notes per category.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

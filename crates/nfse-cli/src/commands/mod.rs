//! Command implementations.

pub mod classify;
pub mod config;

pub use self::classify::execute_classify;
pub use self::config::execute_config;

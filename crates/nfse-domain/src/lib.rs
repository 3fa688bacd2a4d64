//! NFS-e Sorter Domain Layer
//!
//! Core data model shared by every other crate in the workspace. Nothing here
//! touches the filesystem, archives or regular expressions; those live in
//! `nfse-extractor`. The domain only defines what flows between the stages:
//!
//! ```text
//! InputFile → RecordFragment → ClassifiedRecord → RecordSink
//! ```
//!
//! ## Key Concepts
//!
//! - **InputFile**: a named byte blob handed over by whoever acquired it
//! - **RecordFragment**: one `<Nfse>` envelope cut out of an input file
//! - **ClassifiedRecord**: a fragment after the tag/value rule assigned it a [`Category`]
//! - **ClassificationConfig**: the tag name and the two accepted values
//! - **RunId**: identifies one pipeline run; later runs compare greater
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Classification is a pure function of (content, config); the config is always
//!   passed in explicitly, never read from ambient state

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod config;
pub mod record;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use category::Category;
pub use config::ClassificationConfig;
pub use record::{ClassifiedRecord, InputFile, RecordFragment};
pub use run::RunId;

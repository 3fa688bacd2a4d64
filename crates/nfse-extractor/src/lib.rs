//! NFS-e Extractor
//!
//! Turns batches of XML payloads (loose or zipped) into classified notes.
//!
//! # Overview
//!
//! Each input file goes through the same stages:
//!
//! ```text
//! InputFile → ArchiveExtractor → RecordSplitter → TagClassifier → RecordSink
//! ```
//!
//! - **ArchiveExtractor**: lazily yields the `.xml` members of a zip container
//! - **RecordSplitter**: cuts every complete `<Nfse>...</Nfse>` envelope out of a document
//! - **TagClassifier**: reads the configured tag and maps its value to a category
//! - **Pipeline**: runs the stages over a batch, collects per-file issues and
//!   commits the result set to the store in one step
//!
//! Everything is lexical. Documents are scanned as text, never parsed as XML,
//! so irregular real-world payloads still split and classify.
//!
//! # Example Usage
//!
//! ```no_run
//! use nfse_domain::InputFile;
//! use nfse_extractor::{ExtractorConfig, Pipeline};
//! use nfse_store::CategoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(CategoryStore::new(), ExtractorConfig::default());
//!
//! let files = vec![
//!     InputFile::new("lote.xml", std::fs::read("lote.xml")?),
//!     InputFile::new("notas.zip", std::fs::read("notas.zip")?),
//! ];
//!
//! let outcome = pipeline.run(files).await?;
//!
//! println!("{}", outcome.summary.summary());
//! for issue in &outcome.issues {
//!     println!("{}", issue);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod archive;
mod classifier;
mod config;
mod error;
mod pipeline;
mod splitter;
mod types;


pub use archive::{ArchiveEntries, ArchiveError, ArchiveExtractor};
pub use classifier::{classify, LexicalTagLookup, TagClassifier};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use pipeline::{Pipeline, PipelineState};
pub use splitter::{note_identifier, split_records, RecordSplitter};
pub use types::{BatchIssue, BatchOutcome, BatchSummary, InputKind, IssueKind};

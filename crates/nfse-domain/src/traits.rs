//! Trait definitions for the seams between stages
//!
//! Implementations live in other crates: the lexical tag lookup in
//! `nfse-extractor`, the category store in `nfse-store`.

use crate::{ClassifiedRecord, RunId};

/// Finds the value of one configured tag inside a note
///
/// Implemented by the extractor (regex scanning). Kept narrow so a
/// structural XML reader can replace it without touching classification or
/// the pipeline.
pub trait TagLookup {
    /// Text between the first opening tag and its closing tag, untrimmed
    fn first_value<'t>(&self, text: &'t str) -> Option<&'t str>;
}

/// Receives the records of a finished run
///
/// Implemented by the storage layer (nfse-store). Records are only ever
/// replaced wholesale; there is no per-record mutation.
pub trait RecordSink {
    /// Error type for sink operations
    type Error;

    /// Replace everything held with the records of `run`
    fn replace(&mut self, run: RunId, records: Vec<ClassifiedRecord>) -> Result<(), Self::Error>;

    /// Drop every record
    fn clear(&mut self) -> Result<(), Self::Error>;
}

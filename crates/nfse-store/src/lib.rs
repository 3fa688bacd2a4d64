//! NFS-e Category Store
//!
//! Holds the classified notes of the latest run in memory, partitioned by
//! category, and turns them into export payloads.
//!
//! # Architecture
//!
//! - One ordered `Vec` of records; category views are stable filters over it
//! - Whole-set replacement per run, guarded by the run id so an older run can
//!   never overwrite a newer one
//! - Nothing is persisted; clearing or dropping the store discards everything
//!
//! # Examples
//!
//! ```
//! use nfse_domain::{Category, RunId};
//! use nfse_domain::traits::RecordSink;
//! use nfse_store::CategoryStore;
//!
//! let mut store = CategoryStore::new();
//! store.replace(RunId::new(), Vec::new()).unwrap();
//! assert_eq!(store.count(Category::Tomador), 0);
//! ```

#![warn(missing_docs)]

mod export;

pub use export::{
    export_entries, write_archive, write_directory, ExportEntry, XML_CONTENT_TYPE,
};

use nfse_domain::traits::RecordSink;
use nfse_domain::{Category, ClassifiedRecord, RunId};
use thiserror::Error;

/// Errors that can occur during store and export operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Results from a run older than the one already held
    #[error("Stale run {attempted}: store already holds run {current}")]
    StaleRun {
        /// Run currently held
        current: RunId,
        /// Run that tried to commit
        attempted: RunId,
    },

    /// Filesystem error while exporting
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive writer error while exporting
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// In-memory store of the latest run's records
#[derive(Debug, Default)]
pub struct CategoryStore {
    records: Vec<ClassifiedRecord>,
    run: Option<RunId>,
}

impl CategoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, in the order the run produced them
    pub fn records(&self) -> &[ClassifiedRecord] {
        &self.records
    }

    /// Records of one category, original order preserved
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &ClassifiedRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    /// Collected view of one category
    pub fn view(&self, category: Category) -> Vec<&ClassifiedRecord> {
        self.by_category(category).collect()
    }

    /// Number of records in one category
    pub fn count(&self, category: Category) -> usize {
        self.by_category(category).count()
    }

    /// Find a record by category and display name
    pub fn get(&self, category: Category, display_name: &str) -> Option<&ClassifiedRecord> {
        self.by_category(category)
            .find(|r| r.display_name == display_name)
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run whose records were last committed
    pub fn current_run(&self) -> Option<RunId> {
        self.run
    }
}

impl RecordSink for CategoryStore {
    type Error = StoreError;

    fn replace(&mut self, run: RunId, records: Vec<ClassifiedRecord>) -> Result<(), Self::Error> {
        if let Some(current) = self.run {
            if run < current {
                return Err(StoreError::StaleRun {
                    current,
                    attempted: run,
                });
            }
        }

        tracing::debug!(
            "Committing {} record(s) from run {} (replacing {})",
            records.len(),
            run,
            self.records.len()
        );
        self.records = records;
        self.run = Some(run);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        // The run watermark stays, so a late commit from an older run is still refused
        self.records = Vec::new();
        Ok(())
    }
}

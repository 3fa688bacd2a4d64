//! Batch ingestion: archives → documents → notes → categories

use crate::archive::ArchiveExtractor;
use crate::classifier::TagClassifier;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::splitter::RecordSplitter;
use crate::types::{BatchIssue, BatchOutcome, BatchSummary, FileOutcome, InputKind};
use nfse_domain::traits::RecordSink;
use nfse_domain::{ClassificationConfig, ClassifiedRecord, InputFile, RunId};
use std::io::Cursor;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Lifecycle of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No run has happened yet (or the last one was abandoned)
    Idle,
    /// A run is in progress; new runs are rejected
    Processing,
    /// The last run finished and its records were committed
    Completed,
}

/// Orchestrates a batch run and commits its records to a sink
///
/// Files are processed on blocking worker threads, at most
/// `max_parallel_files` at a time, and merged back in input order. Nothing
/// reaches the sink until every file is done, and then the whole result set
/// replaces what the sink held before.
pub struct Pipeline<S>
where
    S: RecordSink,
{
    store: Arc<Mutex<S>>,
    config: RwLock<ExtractorConfig>,
    state: Mutex<PipelineState>,
}

impl<S> Pipeline<S>
where
    S: RecordSink,
    S::Error: std::fmt::Display,
{
    /// Create a new Pipeline owning `store`
    pub fn new(store: S, config: ExtractorConfig) -> Self {
        Self::with_shared_store(Arc::new(Mutex::new(store)), config)
    }

    /// Create a new Pipeline over a store shared with readers
    pub fn with_shared_store(store: Arc<Mutex<S>>, config: ExtractorConfig) -> Self {
        Self {
            store,
            config: RwLock::new(config),
            state: Mutex::new(PipelineState::Idle),
        }
    }

    /// Handle to the underlying store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(PipelineState::Idle)
    }

    /// Copy of the current configuration
    pub fn config(&self) -> Result<ExtractorConfig, ExtractorError> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|e| ExtractorError::Lock(e.to_string()))
    }

    /// Replace the configuration used by future runs
    pub fn update_config(&self, config: ExtractorConfig) -> Result<(), ExtractorError> {
        config.validate().map_err(ExtractorError::Configuration)?;
        let mut current = self
            .config
            .write()
            .map_err(|e| ExtractorError::Lock(e.to_string()))?;
        *current = config;
        Ok(())
    }

    /// Replace only the classification rule used by future runs
    pub fn update_classification(
        &self,
        classification: ClassificationConfig,
    ) -> Result<(), ExtractorError> {
        let mut config = self.config()?;
        config.classification = classification;
        self.update_config(config)
    }

    /// Drop every committed record
    pub fn clear(&self) -> Result<(), ExtractorError> {
        if self.state() == PipelineState::Processing {
            return Err(ExtractorError::Busy);
        }
        let mut store = self
            .store
            .lock()
            .map_err(|e| ExtractorError::Lock(e.to_string()))?;
        store
            .clear()
            .map_err(|e| ExtractorError::Store(e.to_string()))?;
        info!("Cleared all records");
        Ok(())
    }

    /// Run a batch
    ///
    /// Fails up front with [`ExtractorError::Configuration`] before touching
    /// any file, and with [`ExtractorError::Busy`] if another run is in
    /// progress. Every per-file problem ends up in the outcome's issue list.
    pub async fn run(&self, inputs: Vec<InputFile>) -> Result<BatchOutcome, ExtractorError> {
        let config = self.config()?;
        config.validate().map_err(ExtractorError::Configuration)?;
        let classifier = Arc::new(TagClassifier::new(&config.classification)?);

        let mut guard = RunGuard::begin(&self.state)?;
        let run_id = RunId::new();
        let start_time = Instant::now();
        let files_received = inputs.len();

        info!(
            "Starting run {} with {} file(s), tag '{}'",
            run_id,
            files_received,
            config.classification.tag_name
        );

        let semaphore = Arc::new(Semaphore::new(config.max_parallel_files));
        let config = Arc::new(config);
        let mut handles = Vec::with_capacity(files_received);

        for input in inputs {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ExtractorError::Worker(e.to_string()))?;
            let classifier = Arc::clone(&classifier);
            let config = Arc::clone(&config);
            let name = input.name.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                process_input(input, &classifier, &config)
            });
            handles.push((name, handle));
        }

        // Merge in input order, not completion order
        let mut records = Vec::new();
        let mut issues = Vec::new();
        let mut files_scanned = 0;

        for (name, handle) in handles {
            match handle.await {
                Ok(outcome) => {
                    files_scanned += outcome.files_scanned;
                    records.extend(outcome.records);
                    issues.extend(outcome.issues);
                }
                Err(e) => {
                    warn!("Worker for '{}' failed: {}", name, e);
                    issues.push(BatchIssue::FileRead {
                        file: name,
                        reason: format!("worker failed: {}", e),
                    });
                }
            }
        }

        let summary = BatchSummary::tally(files_received, files_scanned, &records, &issues);

        {
            let mut store = self
                .store
                .lock()
                .map_err(|e| ExtractorError::Lock(e.to_string()))?;
            store
                .replace(run_id, records.clone())
                .map_err(|e| ExtractorError::Store(e.to_string()))?;
        }
        guard.complete();

        for issue in &issues {
            if issue.is_warning() {
                warn!("{}", issue);
            } else {
                warn!("Error: {}", issue);
            }
        }
        info!(
            "Run {} complete in {} ms: {}",
            run_id,
            start_time.elapsed().as_millis(),
            summary.summary()
        );

        Ok(BatchOutcome {
            run_id,
            records,
            summary,
            issues,
        })
    }
}

/// Marks the pipeline as processing for the lifetime of a run
///
/// Dropped without `complete` (error or abandoned future) it returns the
/// pipeline to `Idle`.
struct RunGuard<'a> {
    state: &'a Mutex<PipelineState>,
    completed: bool,
}

impl<'a> RunGuard<'a> {
    fn begin(state: &'a Mutex<PipelineState>) -> Result<Self, ExtractorError> {
        let mut current = state
            .lock()
            .map_err(|e| ExtractorError::Lock(e.to_string()))?;
        if *current == PipelineState::Processing {
            debug!("Rejecting run: pipeline is busy");
            return Err(ExtractorError::Busy);
        }
        *current = PipelineState::Processing;
        Ok(Self {
            state,
            completed: false,
        })
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            *state = if self.completed {
                PipelineState::Completed
            } else {
                PipelineState::Idle
            };
        }
    }
}

/// Process one input file: expand, decode, split, classify
pub(crate) fn process_input(
    input: InputFile,
    classifier: &TagClassifier,
    config: &ExtractorConfig,
) -> FileOutcome {
    let mut outcome = FileOutcome::default();

    match InputKind::detect(&input, config) {
        InputKind::Content => {
            let label = input.name.clone();
            scan_content(input, &label, classifier, config, &mut outcome);
        }
        InputKind::Archive => expand_archive(input, classifier, config, &mut outcome),
        InputKind::Unsupported => {
            debug!("Skipping unsupported input '{}'", input.name);
            outcome
                .issues
                .push(BatchIssue::UnsupportedInput { file: input.name });
        }
    }

    outcome
}

fn expand_archive(
    input: InputFile,
    classifier: &TagClassifier,
    config: &ExtractorConfig,
    outcome: &mut FileOutcome,
) {
    let container = input.name;
    let extractor = ArchiveExtractor::new(config.content_extension.as_str())
        .with_max_entry_size(config.max_file_size as u64);

    let entries = match extractor.open(Cursor::new(input.bytes)) {
        Ok(entries) => entries,
        Err(e) => {
            outcome.issues.push(BatchIssue::ArchiveRead {
                file: container,
                member: None,
                reason: e.to_string(),
            });
            return;
        }
    };

    let mut yielded = 0;
    for entry in entries {
        yielded += 1;
        match entry {
            Ok(member) => {
                let label = format!("{}/{}", container, member.name);
                scan_content(member, &label, classifier, config, outcome);
            }
            Err(e) => outcome.issues.push(BatchIssue::ArchiveRead {
                file: container.clone(),
                member: e.entry_path().map(str::to_string),
                reason: e.to_string(),
            }),
        }
    }

    if yielded == 0 {
        outcome.issues.push(BatchIssue::NoRecords { file: container });
    }
}

fn scan_content(
    input: InputFile,
    label: &str,
    classifier: &TagClassifier,
    config: &ExtractorConfig,
    outcome: &mut FileOutcome,
) {
    if input.bytes.len() > config.max_file_size {
        outcome.issues.push(BatchIssue::FileRead {
            file: label.to_string(),
            reason: format!(
                "file too large: {} bytes (max: {})",
                input.bytes.len(),
                config.max_file_size
            ),
        });
        return;
    }

    let text = match std::str::from_utf8(&input.bytes) {
        Ok(text) => text,
        Err(e) => {
            outcome.issues.push(BatchIssue::FileRead {
                file: label.to_string(),
                reason: format!("not valid UTF-8 text: {}", e),
            });
            return;
        }
    };
    outcome.files_scanned += 1;

    let before = outcome.records.len();
    let splitter = RecordSplitter::new(text, input.name.as_str());
    for fragment in splitter.fragments() {
        let category = classifier.classify(&fragment.raw_text);
        outcome
            .records
            .push(ClassifiedRecord::from_fragment(fragment, category));
    }

    let found = outcome.records.len() - before;
    debug!("'{}': {} record(s)", label, found);
    if found == 0 {
        outcome.issues.push(BatchIssue::NoRecords {
            file: label.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfse_domain::Category;
    use nfse_store::CategoryStore;

    fn classifier() -> TagClassifier {
        TagClassifier::new(&ClassificationConfig::default()).unwrap()
    }

    #[test]
    fn test_process_content_file() {
        let input = InputFile::new(
            "lote.xml",
            b"<Nfse><Numero>5</Numero><IssRetido>1</IssRetido></Nfse>".to_vec(),
        );
        let outcome = process_input(input, &classifier(), &ExtractorConfig::default());

        assert_eq!(outcome.files_scanned, 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].category, Category::Tomador);
        assert_eq!(outcome.records[0].display_name, "lote_5.xml");
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_file_read_issue() {
        let input = InputFile::new("bad.xml", vec![0x3c, 0xff, 0xfe, 0x3e]);
        let outcome = process_input(input, &classifier(), &ExtractorConfig::default());

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.files_scanned, 0);
        assert!(matches!(outcome.issues[0], BatchIssue::FileRead { .. }));
    }

    #[test]
    fn test_oversized_file_is_not_decoded() {
        let mut config = ExtractorConfig::default();
        config.max_file_size = 8;
        let input = InputFile::new("big.xml", b"<Nfse>0123456789</Nfse>".to_vec());
        let outcome = process_input(input, &classifier(), &config);

        assert!(outcome.records.is_empty());
        assert!(matches!(outcome.issues[0], BatchIssue::FileRead { .. }));
    }

    #[test]
    fn test_empty_document_is_warning() {
        let input = InputFile::new("empty.xml", b"<Lote/>".to_vec());
        let outcome = process_input(input, &classifier(), &ExtractorConfig::default());

        assert_eq!(outcome.files_scanned, 1);
        assert_eq!(
            outcome.issues,
            vec![BatchIssue::NoRecords {
                file: "empty.xml".to_string()
            }]
        );
    }

    #[test]
    fn test_unsupported_input() {
        let input = InputFile::new("photo.png", vec![0x89, 0x50]);
        let outcome = process_input(input, &classifier(), &ExtractorConfig::default());

        assert!(matches!(outcome.issues[0], BatchIssue::UnsupportedInput { .. }));
        assert_eq!(outcome.files_scanned, 0);
    }

    #[test]
    fn test_corrupt_archive() {
        let input = InputFile::new("lote.zip", b"PK broken".to_vec());
        let outcome = process_input(input, &classifier(), &ExtractorConfig::default());

        assert!(outcome.records.is_empty());
        assert!(matches!(
            &outcome.issues[0],
            BatchIssue::ArchiveRead { member: None, .. }
        ));
    }

    #[test]
    fn test_run_guard_rejects_second_run() {
        let state = Mutex::new(PipelineState::Idle);

        let mut guard = RunGuard::begin(&state).unwrap();
        assert!(matches!(RunGuard::begin(&state), Err(ExtractorError::Busy)));

        guard.complete();
        drop(guard);
        assert_eq!(*state.lock().unwrap(), PipelineState::Completed);
    }

    #[test]
    fn test_abandoned_run_returns_to_idle() {
        let state = Mutex::new(PipelineState::Completed);

        let guard = RunGuard::begin(&state).unwrap();
        assert_eq!(*state.lock().unwrap(), PipelineState::Processing);
        drop(guard);

        assert_eq!(*state.lock().unwrap(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_run_while_processing_is_busy() {
        let pipeline = Pipeline::new(CategoryStore::new(), ExtractorConfig::default());
        *pipeline.state.lock().unwrap() = PipelineState::Processing;

        let result = pipeline.run(Vec::new()).await;
        assert!(matches!(result, Err(ExtractorError::Busy)));
        assert!(matches!(pipeline.clear(), Err(ExtractorError::Busy)));
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let pipeline = Pipeline::new(CategoryStore::new(), ExtractorConfig::default());
        assert_eq!(pipeline.state(), PipelineState::Idle);

        pipeline.run(Vec::new()).await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Completed);

        pipeline.run(Vec::new()).await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Completed);
    }
}

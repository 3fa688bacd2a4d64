//! Request and result types for batch ingestion

use crate::config::ExtractorConfig;
use nfse_domain::{Category, ClassifiedRecord, InputFile, RunId};
use serde::Serialize;
use std::fmt;

const CONTENT_MEDIA_TYPES: &[&str] = &["text/xml", "application/xml"];

const ARCHIVE_MEDIA_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip",
    "application/x-zip-compressed",
];

/// How an input file is going to be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Text document scanned for notes directly
    Content,
    /// Container whose matching members are scanned
    Archive,
    /// Neither; skipped with a warning
    Unsupported,
}

impl InputKind {
    /// Detect the kind from the file name, falling back to the declared media type
    pub fn detect(file: &InputFile, config: &ExtractorConfig) -> Self {
        if file.has_extension(&config.content_extension) {
            return InputKind::Content;
        }
        if file.has_extension(&config.archive_extension) {
            return InputKind::Archive;
        }

        let media_type = file
            .media_type
            .as_deref()
            .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

        match media_type.as_deref() {
            Some(m) if CONTENT_MEDIA_TYPES.contains(&m) => InputKind::Content,
            Some(m) if ARCHIVE_MEDIA_TYPES.contains(&m) => InputKind::Archive,
            _ => InputKind::Unsupported,
        }
    }
}

/// Kind of a per-file problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Container unreadable or corrupt
    ArchiveReadError,
    /// Bytes could not be read as text
    FileReadError,
    /// File contained no note envelopes
    NoRecordsWarning,
    /// File is neither a content file nor an archive
    UnsupportedInput,
}

impl IssueKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::ArchiveReadError => "archive_read_error",
            IssueKind::FileReadError => "file_read_error",
            IssueKind::NoRecordsWarning => "no_records_warning",
            IssueKind::UnsupportedInput => "unsupported_input",
        }
    }
}

/// A problem with one input file
///
/// Issues are collected across the whole batch and reported together once it
/// finishes; none of them stops sibling files from being processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchIssue {
    /// Container (or one of its members) could not be read
    ArchiveRead {
        /// Container file name
        file: String,
        /// Member path, when only one member failed
        member: Option<String>,
        /// Underlying cause
        reason: String,
    },

    /// Bytes are not valid text, or the file is too large
    FileRead {
        /// File name
        file: String,
        /// Underlying cause
        reason: String,
    },

    /// File produced zero note envelopes
    NoRecords {
        /// File name
        file: String,
    },

    /// File skipped because it is neither XML nor an archive
    UnsupportedInput {
        /// File name
        file: String,
    },
}

impl BatchIssue {
    /// Kind of this issue
    pub fn kind(&self) -> IssueKind {
        match self {
            BatchIssue::ArchiveRead { .. } => IssueKind::ArchiveReadError,
            BatchIssue::FileRead { .. } => IssueKind::FileReadError,
            BatchIssue::NoRecords { .. } => IssueKind::NoRecordsWarning,
            BatchIssue::UnsupportedInput { .. } => IssueKind::UnsupportedInput,
        }
    }

    /// Name of the file the issue is about
    pub fn file(&self) -> &str {
        match self {
            BatchIssue::ArchiveRead { file, .. }
            | BatchIssue::FileRead { file, .. }
            | BatchIssue::NoRecords { file }
            | BatchIssue::UnsupportedInput { file } => file,
        }
    }

    /// Warnings are notices; everything else is an error
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            BatchIssue::NoRecords { .. } | BatchIssue::UnsupportedInput { .. }
        )
    }
}

impl fmt::Display for BatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchIssue::ArchiveRead { file, member: Some(member), reason } => {
                write!(f, "{}: could not read member '{}': {}", file, member, reason)
            }
            BatchIssue::ArchiveRead { file, member: None, reason } => {
                write!(f, "{}: could not read archive: {}", file, reason)
            }
            BatchIssue::FileRead { file, reason } => {
                write!(f, "{}: could not read file: {}", file, reason)
            }
            BatchIssue::NoRecords { file } => {
                write!(f, "{}: no <Nfse> records found", file)
            }
            BatchIssue::UnsupportedInput { file } => {
                write!(f, "{}: ignored, not an XML file or archive", file)
            }
        }
    }
}

/// Counts reported at the end of every run, even an empty one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Input files handed to the run
    pub files_received: usize,

    /// Content files (including archive members) that were scanned for notes
    pub files_scanned: usize,

    /// Records produced
    pub total_records: usize,

    /// Records classified as tomador
    pub tomador: usize,

    /// Records classified as prestador
    pub prestador: usize,

    /// Records without a category
    pub sem_categoria: usize,

    /// Issues that are errors
    pub errors: usize,

    /// Issues that are warnings
    pub warnings: usize,
}

impl BatchSummary {
    /// Tally records and issues
    pub fn tally(
        files_received: usize,
        files_scanned: usize,
        records: &[ClassifiedRecord],
        issues: &[BatchIssue],
    ) -> Self {
        let mut summary = Self {
            files_received,
            files_scanned,
            total_records: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.category {
                Category::Tomador => summary.tomador += 1,
                Category::Prestador => summary.prestador += 1,
                Category::SemCategoria => summary.sem_categoria += 1,
            }
        }

        summary.warnings = issues.iter().filter(|i| i.is_warning()).count();
        summary.errors = issues.len() - summary.warnings;
        summary
    }

    /// Number of records in a category
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Tomador => self.tomador,
            Category::Prestador => self.prestador,
            Category::SemCategoria => self.sem_categoria,
        }
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} record(s) from {} file(s): {} for Tomador, {} for Prestador, {} without category ({} error(s), {} warning(s))",
            self.total_records,
            self.files_scanned,
            self.tomador,
            self.prestador,
            self.sem_categoria,
            self.errors,
            self.warnings,
        )
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Run that produced this outcome
    pub run_id: RunId,

    /// Every record, in input-file order then envelope order
    pub records: Vec<ClassifiedRecord>,

    /// Counts
    pub summary: BatchSummary,

    /// Per-file problems, in input-file order
    pub issues: Vec<BatchIssue>,
}

impl BatchOutcome {
    /// Records of one category, original order preserved
    pub fn records_in(&self, category: Category) -> impl Iterator<Item = &ClassifiedRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    /// Issues that are errors
    pub fn errors(&self) -> impl Iterator<Item = &BatchIssue> {
        self.issues.iter().filter(|i| !i.is_warning())
    }

    /// Issues that are warnings
    pub fn warnings(&self) -> impl Iterator<Item = &BatchIssue> {
        self.issues.iter().filter(|i| i.is_warning())
    }
}

/// What one worker produced for one input file
#[derive(Debug, Default)]
pub(crate) struct FileOutcome {
    pub records: Vec<ClassifiedRecord>,
    pub issues: Vec<BatchIssue>,
    pub files_scanned: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: Category) -> ClassifiedRecord {
        ClassifiedRecord {
            display_name: "lote_1.xml".to_string(),
            content: "<Nfse></Nfse>".to_string(),
            category,
            source_file_name: "lote.xml".to_string(),
        }
    }

    #[test]
    fn test_detect_by_extension() {
        let config = ExtractorConfig::default();
        assert_eq!(InputKind::detect(&InputFile::new("a.XML", Vec::new()), &config), InputKind::Content);
        assert_eq!(InputKind::detect(&InputFile::new("a.zip", Vec::new()), &config), InputKind::Archive);
        assert_eq!(InputKind::detect(&InputFile::new("a.pdf", Vec::new()), &config), InputKind::Unsupported);
    }

    #[test]
    fn test_detect_by_media_type() {
        let config = ExtractorConfig::default();
        let xml = InputFile::new("upload", Vec::new()).with_media_type("text/xml; charset=utf-8");
        let zip = InputFile::new("upload", Vec::new()).with_media_type("application/x-zip-compressed");
        let pdf = InputFile::new("upload", Vec::new()).with_media_type("application/pdf");

        assert_eq!(InputKind::detect(&xml, &config), InputKind::Content);
        assert_eq!(InputKind::detect(&zip, &config), InputKind::Archive);
        assert_eq!(InputKind::detect(&pdf, &config), InputKind::Unsupported);
    }

    #[test]
    fn test_issue_classification() {
        let no_records = BatchIssue::NoRecords { file: "a.xml".to_string() };
        let read = BatchIssue::FileRead {
            file: "b.xml".to_string(),
            reason: "invalid utf-8".to_string(),
        };

        assert!(no_records.is_warning());
        assert!(!read.is_warning());
        assert_eq!(read.kind(), IssueKind::FileReadError);
        assert_eq!(read.file(), "b.xml");
        assert_eq!(no_records.kind().as_str(), "no_records_warning");
    }

    #[test]
    fn test_summary_tally() {
        let records = vec![
            record(Category::Tomador),
            record(Category::Tomador),
            record(Category::SemCategoria),
        ];
        let issues = vec![
            BatchIssue::NoRecords { file: "a.xml".to_string() },
            BatchIssue::ArchiveRead {
                file: "b.zip".to_string(),
                member: None,
                reason: "invalid".to_string(),
            },
        ];

        let summary = BatchSummary::tally(3, 2, &records, &issues);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.count(Category::Tomador), 2);
        assert_eq!(summary.count(Category::Prestador), 0);
        assert_eq!(summary.count(Category::SemCategoria), 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 1);
        assert!(summary.summary().contains("2 for Tomador"));
    }

    #[test]
    fn test_empty_summary_still_reports() {
        let summary = BatchSummary::tally(0, 0, &[], &[]);
        assert!(summary.summary().starts_with("0 record(s)"));
    }

    #[test]
    fn test_issue_serializes_with_kind_tag() {
        let issue = BatchIssue::NoRecords { file: "a.xml".to_string() };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["kind"], "no_records");
        assert_eq!(value["file"], "a.xml");
    }
}

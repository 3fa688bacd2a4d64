//! Archive extraction for note files bundled in zip containers
//!
//! Opening a container only reads its central directory. Member bytes are
//! decompressed one at a time as the returned iterator is advanced.

use nfse_domain::InputFile;
use std::io::{Read, Seek};
use thiserror::Error;
use zip::ZipArchive;

const CONTENT_MEDIA_TYPE: &str = "application/xml";

/// Errors that can occur while reading a container
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Container is malformed or unreadable
    #[error("Failed to open archive: {0}")]
    OpenFailed(String),

    /// A single member could not be decompressed
    #[error("Failed to read archive entry '{path}': {reason}")]
    ReadEntry {
        /// Member path inside the archive
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// A member is larger than the configured limit
    #[error("Archive entry '{path}' is too large: {size} bytes (max: {max})")]
    EntryTooLarge {
        /// Member path inside the archive
        path: String,
        /// Uncompressed size
        size: u64,
        /// Configured limit
        max: u64,
    },
}

impl ArchiveError {
    /// Member path, when the error concerns a single member
    pub fn entry_path(&self) -> Option<&str> {
        match self {
            ArchiveError::OpenFailed(_) => None,
            ArchiveError::ReadEntry { path, .. } | ArchiveError::EntryTooLarge { path, .. } => {
                Some(path)
            }
        }
    }
}

/// Selects content members out of zip containers
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    extension: String,
    max_entry_size: u64,
}

impl ArchiveExtractor {
    /// Create an extractor keeping members whose name ends in `extension`
    pub fn new(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
            max_entry_size: u64::MAX,
        }
    }

    /// Refuse members whose uncompressed size exceeds `max` bytes
    pub fn with_max_entry_size(mut self, max: u64) -> Self {
        self.max_entry_size = max;
        self
    }

    /// Whether a member path passes the name filter
    pub fn matches(&self, path: &str) -> bool {
        match path.rsplit_once('.') {
            Some((_, ext)) => ext.eq_ignore_ascii_case(&self.extension),
            None => false,
        }
    }

    /// Open a container and list the matching members
    ///
    /// Directory entries are skipped. Fails with [`ArchiveError::OpenFailed`]
    /// when the container itself cannot be read.
    pub fn open<R: Read + Seek>(&self, reader: R) -> Result<ArchiveEntries<R>, ArchiveError> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| ArchiveError::OpenFailed(e.to_string()))?;

        let mut pending = Vec::new();
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| ArchiveError::OpenFailed(e.to_string()))?;

            if entry.is_dir() || !self.matches(entry.name()) {
                continue;
            }
            pending.push(index);
        }

        tracing::debug!("Archive has {} matching member(s) out of {}", pending.len(), archive.len());

        Ok(ArchiveEntries {
            archive,
            pending: pending.into_iter(),
            max_entry_size: self.max_entry_size,
        })
    }
}

/// Lazy, single-pass sequence of matching archive members
///
/// Each call to `next` decompresses one member. The sequence is finite and
/// cannot be restarted; open the container again to read it twice.
pub struct ArchiveEntries<R> {
    archive: ZipArchive<R>,
    pending: std::vec::IntoIter<usize>,
    max_entry_size: u64,
}

impl<R: Read + Seek> ArchiveEntries<R> {
    /// Number of members not yet yielded
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn read_entry(&mut self, index: usize) -> Result<InputFile, ArchiveError> {
        let mut entry = self.archive.by_index(index).map_err(|e| ArchiveError::ReadEntry {
            path: format!("#{}", index),
            reason: e.to_string(),
        })?;

        let path = entry.name().to_string();
        if entry.size() > self.max_entry_size {
            return Err(ArchiveError::EntryTooLarge {
                path,
                size: entry.size(),
                max: self.max_entry_size,
            });
        }

        let mut bytes = Vec::with_capacity(entry.size().min(1 << 20) as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ArchiveError::ReadEntry {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Ok(InputFile::new(name, bytes).with_media_type(CONTENT_MEDIA_TYPE))
    }
}

impl<R: Read + Seek> Iterator for ArchiveEntries<R> {
    type Item = Result<InputFile, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.pending.next()?;
        Some(self.read_entry(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

//! Export payloads for classified notes
//!
//! Each record becomes one `application/xml` document whose bytes are the
//! record content, unchanged. Records can be exported one at a time, written
//! into a directory, or bundled into a new zip archive.

use crate::StoreError;
use nfse_domain::ClassifiedRecord;
use std::collections::HashSet;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Content type of every exported document
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// One document ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    /// File name to save under
    pub file_name: String,

    /// Always [`XML_CONTENT_TYPE`]
    pub content_type: &'static str,

    /// Record content as bytes
    pub bytes: Vec<u8>,
}

impl ExportEntry {
    /// Export a single record under its display name
    pub fn from_record(record: &ClassifiedRecord) -> Self {
        Self {
            file_name: record.display_name.clone(),
            content_type: XML_CONTENT_TYPE,
            bytes: record.content.as_bytes().to_vec(),
        }
    }
}

/// Export several records, renaming duplicates
///
/// Two notes can share a display name (same number in two batches). The
/// second becomes `name (2).xml`, the third `name (3).xml`, and so on.
pub fn export_entries<'a, I>(records: I) -> Vec<ExportEntry>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    let mut taken = HashSet::new();
    records
        .into_iter()
        .map(|record| {
            let mut entry = ExportEntry::from_record(record);
            entry.file_name = unique_name(&entry.file_name, &mut taken);
            entry
        })
        .collect()
}

/// Bundle records into a new zip archive written to `writer`
pub fn write_archive<'a, I, W>(records: I, writer: W) -> Result<W, StoreError>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
    W: Write + Seek,
{
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default();

    let mut count = 0;
    for entry in export_entries(records) {
        zip.start_file(entry.file_name.as_str(), options)?;
        zip.write_all(&entry.bytes)?;
        count += 1;
    }

    tracing::debug!("Wrote {} document(s) to archive", count);
    Ok(zip.finish()?)
}

/// Save records as individual files inside `dir`, creating it if needed
pub fn write_directory<'a, I>(records: I, dir: &Path) -> Result<Vec<PathBuf>, StoreError>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for entry in export_entries(records) {
        let path = dir.join(&entry.file_name);
        fs::write(&path, &entry.bytes)?;
        written.push(path);
    }
    Ok(written)
}

fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfse_domain::Category;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn record(name: &str, content: &str) -> ClassifiedRecord {
        ClassifiedRecord {
            display_name: name.to_string(),
            content: content.to_string(),
            category: Category::Tomador,
            source_file_name: "lote.xml".to_string(),
        }
    }

    #[test]
    fn test_single_entry() {
        let entry = ExportEntry::from_record(&record("lote_1.xml", "<Nfse>é</Nfse>"));
        assert_eq!(entry.file_name, "lote_1.xml");
        assert_eq!(entry.content_type, "application/xml");
        assert_eq!(entry.bytes, "<Nfse>é</Nfse>".as_bytes());
    }

    #[test]
    fn test_duplicate_names_are_renamed() {
        let records = vec![
            record("lote_1.xml", "a"),
            record("lote_1.xml", "b"),
            record("lote_1.xml", "c"),
            record("plain", "d"),
            record("plain", "e"),
        ];
        let names: Vec<String> = export_entries(&records)
            .into_iter()
            .map(|e| e.file_name)
            .collect();

        assert_eq!(
            names,
            vec!["lote_1.xml", "lote_1 (2).xml", "lote_1 (3).xml", "plain", "plain (2)"]
        );
    }

    #[test]
    fn test_archive_round_trip_preserves_bytes() {
        let records = vec![record("a.xml", "<Nfse>1</Nfse>"), record("a.xml", "<Nfse>2</Nfse>")];
        let cursor = write_archive(&records, Cursor::new(Vec::new())).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("a (2).xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<Nfse>2</Nfse>");
    }

    #[test]
    fn test_write_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tomador");
        let records = vec![record("a.xml", "<Nfse>1</Nfse>")];

        let written = write_directory(&records, &target).unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "<Nfse>1</Nfse>");
    }
}

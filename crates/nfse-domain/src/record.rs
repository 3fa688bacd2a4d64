//! Record module - the values that flow through a batch run

use crate::Category;
use std::ops::Range;

/// A named byte blob handed to the pipeline
///
/// Created from user-supplied files or from archive members. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File name as supplied (archive members use the last path component)
    pub name: String,

    /// Raw bytes, exactly as read
    pub bytes: Vec<u8>,

    /// Media type declared by the collaborator that acquired the file, if any
    pub media_type: Option<String>,
}

impl InputFile {
    /// Create an input file without a declared media type
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            media_type: None,
        }
    }

    /// Attach a declared media type
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Whether the name ends in `extension` (case-insensitive, leading dot optional)
    pub fn has_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        match self.name.rsplit_once('.') {
            Some((_, ext)) => ext.eq_ignore_ascii_case(extension),
            None => false,
        }
    }

    /// File name without its final extension
    pub fn stem(&self) -> &str {
        file_stem(&self.name)
    }
}

/// One `<Nfse>` envelope cut out of an input file
///
/// Ephemeral: produced by the splitter and consumed right away by classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFragment {
    /// 0-based position of the envelope within its source file
    pub ordinal_index: usize,

    /// The envelope text, byte-identical to the source
    pub raw_text: String,

    /// Byte span of `raw_text` inside the source text
    pub span: Range<usize>,

    /// Name of the file the envelope came from
    pub source_file_name: String,

    /// `<Numero>` value, or the 1-based position when there is none
    pub identifier: String,
}

impl RecordFragment {
    /// File name used when the note is listed or exported on its own
    ///
    /// `lote.xml` with note number `123` becomes `lote_123.xml`.
    pub fn display_name(&self) -> String {
        format!(
            "{}_{}.xml",
            file_stem(&self.source_file_name),
            sanitize_file_component(&self.identifier)
        )
    }
}

/// A note after classification
///
/// Immutable after creation. Records live in the category store until the
/// batch is cleared or replaced by a newer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRecord {
    /// Name used for listing and export
    pub display_name: String,

    /// The envelope text, byte-identical to the source
    pub content: String,

    /// Assigned category
    pub category: Category,

    /// Name of the file the envelope came from
    pub source_file_name: String,
}

impl ClassifiedRecord {
    /// Build a record from a fragment and the category it was assigned
    pub fn from_fragment(fragment: RecordFragment, category: Category) -> Self {
        Self {
            display_name: fragment.display_name(),
            content: fragment.raw_text,
            category,
            source_file_name: fragment.source_file_name,
        }
    }
}

fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Replace characters that are not safe inside a file name
fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(source: &str, identifier: &str) -> RecordFragment {
        RecordFragment {
            ordinal_index: 0,
            raw_text: "<Nfse></Nfse>".to_string(),
            span: 0..13,
            source_file_name: source.to_string(),
            identifier: identifier.to_string(),
        }
    }

    #[test]
    fn test_has_extension_is_case_insensitive() {
        let file = InputFile::new("LOTE.XML", Vec::new());
        assert!(file.has_extension("xml"));
        assert!(file.has_extension(".xml"));
        assert!(!file.has_extension("zip"));
        assert!(!InputFile::new("xml", Vec::new()).has_extension("xml"));
    }

    #[test]
    fn test_stem() {
        assert_eq!(InputFile::new("lote.xml", Vec::new()).stem(), "lote");
        assert_eq!(InputFile::new("a.b.xml", Vec::new()).stem(), "a.b");
        assert_eq!(InputFile::new("noext", Vec::new()).stem(), "noext");
        assert_eq!(InputFile::new(".hidden", Vec::new()).stem(), ".hidden");
    }

    #[test]
    fn test_display_name_uses_identifier() {
        assert_eq!(fragment("lote.xml", "123").display_name(), "lote_123.xml");
        assert_eq!(fragment("lote", "2").display_name(), "lote_2.xml");
    }

    #[test]
    fn test_display_name_sanitizes_identifier() {
        assert_eq!(fragment("lote.xml", "12/3 A").display_name(), "lote_12_3_A.xml");
    }

    #[test]
    fn test_classified_record_keeps_content() {
        let record = ClassifiedRecord::from_fragment(fragment("lote.xml", "9"), Category::Prestador);
        assert_eq!(record.content, "<Nfse></Nfse>");
        assert_eq!(record.display_name, "lote_9.xml");
        assert_eq!(record.category, Category::Prestador);
        assert_eq!(record.source_file_name, "lote.xml");
    }
}

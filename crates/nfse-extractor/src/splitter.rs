//! Split multi-note documents into individual `<Nfse>` envelopes
//!
//! Matching is lexical: the text is never parsed as XML, so irregular or
//! slightly malformed payloads still split as long as the envelope tags are
//! intact.

use nfse_domain::RecordFragment;
use regex::Regex;
use std::sync::LazyLock;

/// Complete envelope, non-greedy, case-sensitive. The open tag may carry attributes.
static ENVELOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<Nfse(?:\s[^>]*)?>.*?</Nfse>").expect("envelope pattern is valid")
});

/// First note number inside an envelope
static NUMERO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<Numero\s*>(.*?)</Numero\s*>").expect("numero pattern is valid")
});

/// Splits document text into note fragments
pub struct RecordSplitter<'t> {
    text: &'t str,
    source_file_name: String,
}

impl<'t> RecordSplitter<'t> {
    /// Create a splitter over one document
    pub fn new(text: &'t str, source_file_name: impl Into<String>) -> Self {
        Self {
            text,
            source_file_name: source_file_name.into(),
        }
    }

    /// Envelopes in first-occurrence order
    ///
    /// Unterminated envelopes are never yielded. An empty result means the
    /// document held no notes; the caller decides how to report that.
    pub fn fragments<'s>(&'s self) -> impl Iterator<Item = RecordFragment> + 's {
        let text: &'s str = self.text;
        let source_file_name: &'s str = &self.source_file_name;

        ENVELOPE
            .find_iter(text)
            .enumerate()
            .map(move |(ordinal_index, m)| RecordFragment {
                ordinal_index,
                raw_text: m.as_str().to_string(),
                span: m.range(),
                source_file_name: source_file_name.to_string(),
                identifier: note_identifier(m.as_str())
                    .unwrap_or_else(|| (ordinal_index + 1).to_string()),
            })
    }

    /// Number of complete envelopes in the text
    pub fn count(&self) -> usize {
        ENVELOPE.find_iter(self.text).count()
    }
}

/// Split a document into fragments
pub fn split_records(text: &str, source_file_name: &str) -> Vec<RecordFragment> {
    RecordSplitter::new(text, source_file_name).fragments().collect()
}

/// Trimmed value of the first `<Numero>` tag, if present and non-empty
pub fn note_identifier(envelope: &str) -> Option<String> {
    let captures = NUMERO.captures(envelope)?;
    let value = captures.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_NOTES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ConsultarNfseResposta>
  <ListaNfse>
    <CompNfse>
      <Nfse versao="2.04"><InfNfse><Numero>101</Numero><IssRetido>1</IssRetido></InfNfse></Nfse>
    </CompNfse>
    <CompNfse>
      <Nfse><InfNfse><Numero> 102 </Numero><IssRetido>2</IssRetido></InfNfse></Nfse>
    </CompNfse>
  </ListaNfse>
</ConsultarNfseResposta>"#;

    #[test]
    fn test_splits_in_source_order() {
        let fragments = split_records(TWO_NOTES, "lote.xml");

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].ordinal_index, 0);
        assert_eq!(fragments[0].identifier, "101");
        assert_eq!(fragments[1].identifier, "102");
        assert!(fragments[0].raw_text.starts_with("<Nfse versao=\"2.04\">"));
        assert!(fragments[1].raw_text.ends_with("</Nfse>"));
        assert_eq!(fragments[1].source_file_name, "lote.xml");
    }

    #[test]
    fn test_fragments_are_exact_substrings() {
        for fragment in split_records(TWO_NOTES, "lote.xml") {
            assert_eq!(&TWO_NOTES[fragment.span.clone()], fragment.raw_text);
        }
    }

    #[test]
    fn test_no_envelopes() {
        assert!(split_records("<Other>1</Other>", "a.xml").is_empty());
        assert!(split_records("", "a.xml").is_empty());
    }

    #[test]
    fn test_unterminated_envelope_is_dropped() {
        let text = "<Nfse><Numero>1</Numero></Nfse><Nfse><Numero>2</Numero>";
        let fragments = split_records(text, "a.xml");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].identifier, "1");
    }

    #[test]
    fn test_tag_match_is_case_sensitive() {
        assert!(split_records("<nfse>x</nfse>", "a.xml").is_empty());
        assert!(split_records("<NFSE>x</NFSE>", "a.xml").is_empty());
        assert!(split_records("<NfseCancelamento>x</NfseCancelamento>", "a.xml").is_empty());
    }

    #[test]
    fn test_identifier_falls_back_to_position() {
        let text = "<Nfse>a</Nfse><Nfse><Numero></Numero></Nfse><Nfse><Numero>77</Numero></Nfse>";
        let ids: Vec<String> = split_records(text, "a.xml")
            .into_iter()
            .map(|f| f.identifier)
            .collect();
        assert_eq!(ids, vec!["1", "2", "77"]);
    }

    #[test]
    fn test_count_matches_fragments() {
        let splitter = RecordSplitter::new(TWO_NOTES, "lote.xml");
        assert_eq!(splitter.count(), splitter.fragments().count());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Number of fragments equals the number of complete envelopes written,
        /// and every fragment is recoverable from its span
        #[test]
        fn test_split_count_and_spans(
            bodies in proptest::collection::vec("[a-zA-Z0-9 ]{0,20}", 0..8),
            filler in "[a-zA-Z0-9 \n]{0,10}",
        ) {
            let mut text = String::new();
            for body in &bodies {
                text.push_str(&filler);
                text.push_str("<Nfse>");
                text.push_str(body);
                text.push_str("</Nfse>");
            }
            text.push_str(&filler);

            let fragments = split_records(&text, "p.xml");
            prop_assert_eq!(fragments.len(), bodies.len());
            for (fragment, body) in fragments.iter().zip(&bodies) {
                prop_assert_eq!(&text[fragment.span.clone()], fragment.raw_text.as_str());
                prop_assert_eq!(fragment.raw_text.clone(), format!("<Nfse>{}</Nfse>", body));
            }
        }
    }
}

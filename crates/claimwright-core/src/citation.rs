//! Citations derived from the prior-art passages a document was generated against.

use serde::{Deserialize, Serialize};

use crate::request::PriorArtPassage;

/// Characters of passage text kept in a citation snippet.
pub const SNIPPET_CHARS: usize = 200;

/// A reference to a prior-art document, listed in the references appendix.
///
/// Serialised with the field names the export endpoint accepted, so
/// citation files written by one run can be fed back to `export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub patent_id: String,
    #[serde(rename = "relevance", default)]
    pub relevance_score: f32,
    #[serde(rename = "text_snippet", default)]
    pub snippet: String,
}

impl Citation {
    pub fn from_passage(passage: &PriorArtPassage) -> Self {
        Self {
            patent_id: passage.doc_id.clone(),
            relevance_score: passage.score,
            snippet: snippet(&passage.text),
        }
    }
}

/// One citation per passage, in input order. No filtering or deduplication.
pub fn citations_from(prior_art: &[PriorArtPassage]) -> Vec<Citation> {
    prior_art.iter().map(Citation::from_passage).collect()
}

/// First [`SNIPPET_CHARS`] characters followed by an ellipsis.
///
/// Empty text yields an empty snippet, which the exporter skips.
fn snippet(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out: String = text.chars().take(SNIPPET_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_citation_per_passage_in_order() {
        let passages = vec![
            PriorArtPassage::new("US10000001", "first", 0.91),
            PriorArtPassage::new("US10000002", "second", 0.55),
            PriorArtPassage::new("US10000001", "duplicate id", 0.40),
        ];
        let citations = citations_from(&passages);
        assert_eq!(citations.len(), passages.len());
        for (c, p) in citations.iter().zip(&passages) {
            assert_eq!(c.patent_id, p.doc_id);
            assert_eq!(c.relevance_score, p.score);
        }
    }

    #[test]
    fn empty_prior_art_gives_no_citations() {
        assert!(citations_from(&[]).is_empty());
    }

    #[test]
    fn snippet_truncated_to_200_chars() {
        let text = "x".repeat(500);
        let c = Citation::from_passage(&PriorArtPassage::new("US1", text, 0.5));
        assert_eq!(c.snippet.len(), 203);
        assert!(c.snippet.ends_with("..."));
    }

    #[test]
    fn short_snippet_still_marked() {
        let c = Citation::from_passage(&PriorArtPassage::new("US1", "short text", 0.5));
        assert_eq!(c.snippet, "short text...");
    }

    #[test]
    fn snippet_counts_chars_not_bytes() {
        let text = "é".repeat(250);
        let c = Citation::from_passage(&PriorArtPassage::new("EP1", text, 0.5));
        assert_eq!(c.snippet.chars().count(), 203);
    }

    #[test]
    fn empty_text_has_no_snippet() {
        let c = Citation::from_passage(&PriorArtPassage::new("US1", "", 0.5));
        assert!(c.snippet.is_empty());
    }

    #[test]
    fn json_uses_export_field_names() {
        let c = Citation {
            patent_id: "US10000001".into(),
            relevance_score: 0.75,
            snippet: "A drone...".into(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["patent_id"], "US10000001");
        assert_eq!(json["text_snippet"], "A drone...");
        assert!(json.get("relevance").is_some());
    }
}

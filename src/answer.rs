//! Decoding of query-service responses.
//!
//! The service is tolerant in what it sends, so each logical field has an
//! ordered list of candidate keys and the first present one wins:
//!
//! | Field | Candidate keys | Fallback |
//! |-------|----------------|----------|
//! | answer text | `answer`, `response`, `text` | `"No response"` |
//! | citations | `citations`, `sources` | empty |
//! | citation label | `source_file`, `document`, `file`, `source` | `"Unknown document"` |
//! | section title | `section_title`, `section` | none |
//!
//! The last alias of each citation field matches the raw chunk metadata the
//! indexer attaches: state-page chunks name their PDF under `source`, and
//! model-law chunks carry the bare section number under `section`.
//!
//! A key is present when it holds a non-null value of the expected kind
//! (non-empty string for text fields, array for citation lists). Page numbers
//! only need to be non-null: page `0` is kept.

use serde_json::Value;

use crate::models::Citation;

pub const ANSWER_KEYS: &[&str] = &["answer", "response", "text"];
pub const CITATION_LIST_KEYS: &[&str] = &["citations", "sources"];
pub const CITATION_LABEL_KEYS: &[&str] = &["source_file", "document", "file", "source"];
pub const SECTION_KEYS: &[&str] = &["section_title", "section"];

pub const NO_RESPONSE: &str = "No response";
pub const UNKNOWN_DOCUMENT: &str = "Unknown document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Decode a query response body.
pub fn decode_answer(body: &Value) -> Answer {
    let text = first_text(body, ANSWER_KEYS)
        .unwrap_or(NO_RESPONSE)
        .to_string();

    let citations = CITATION_LIST_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .map(|items| items.iter().map(decode_citation).collect())
        .unwrap_or_default();

    Answer { text, citations }
}

/// Decode one citation object. Non-object entries become an unlabeled citation.
pub fn decode_citation(value: &Value) -> Citation {
    let source_file = first_text(value, CITATION_LABEL_KEYS)
        .unwrap_or(UNKNOWN_DOCUMENT)
        .to_string();

    let page_number = value.get("page_number").and_then(scalar_to_string);

    let section_title = SECTION_KEYS
        .iter()
        .filter_map(|key| value.get(*key).and_then(scalar_to_string))
        .find(|s| !s.is_empty());

    Citation {
        source_file,
        page_number,
        section_title,
    }
}

fn first_text<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primary_fields() {
        let answer = decode_answer(&json!({
            "answer": "Hi\n\nBye",
            "citations": [{"source_file": "a.pdf", "page_number": 2}]
        }));
        assert_eq!(answer.text, "Hi\n\nBye");
        assert_eq!(
            answer.citations,
            vec![Citation {
                source_file: "a.pdf".into(),
                page_number: Some("2".into()),
                section_title: None,
            }]
        );
    }

    #[test]
    fn alias_fields() {
        let answer = decode_answer(&json!({"response": "ok", "sources": []}));
        assert_eq!(answer.text, "ok");
        assert!(answer.citations.is_empty());

        let answer = decode_answer(&json!({"text": "plain"}));
        assert_eq!(answer.text, "plain");
    }

    #[test]
    fn priority_order_first_present_wins() {
        let answer = decode_answer(&json!({
            "text": "third",
            "response": "second",
            "answer": "first",
            "sources": [{"file": "s.pdf"}],
            "citations": [{"file": "c.pdf"}]
        }));
        assert_eq!(answer.text, "first");
        assert_eq!(answer.citations[0].source_file, "c.pdf");
    }

    #[test]
    fn null_or_empty_falls_through() {
        let answer = decode_answer(&json!({"answer": null, "response": "", "text": "t"}));
        assert_eq!(answer.text, "t");

        let answer = decode_answer(&json!({"citations": null, "sources": [{"document": "d.pdf"}]}));
        assert_eq!(answer.citations[0].source_file, "d.pdf");
    }

    #[test]
    fn missing_everything_uses_fallbacks() {
        let answer = decode_answer(&json!({}));
        assert_eq!(answer.text, NO_RESPONSE);
        assert!(answer.citations.is_empty());
    }

    #[test]
    fn citation_label_aliases_and_fallback() {
        assert_eq!(decode_citation(&json!({"document": "d"})).source_file, "d");
        assert_eq!(decode_citation(&json!({"file": "f"})).source_file, "f");
        assert_eq!(
            decode_citation(&json!({"section_title": "Scope"})).source_file,
            UNKNOWN_DOCUMENT
        );
        assert_eq!(decode_citation(&json!("loose")).source_file, UNKNOWN_DOCUMENT);
    }

    #[test]
    fn page_zero_kept_null_dropped() {
        let c = decode_citation(&json!({"source_file": "a.pdf", "page_number": 0}));
        assert_eq!(c.page_number.as_deref(), Some("0"));

        let c = decode_citation(&json!({"source_file": "a.pdf", "page_number": null}));
        assert_eq!(c.page_number, None);

        let c = decode_citation(&json!({"source_file": "a.pdf", "page_number": "iv"}));
        assert_eq!(c.page_number.as_deref(), Some("iv"));
    }

    #[test]
    fn section_title_optional() {
        let c = decode_citation(&json!({"source_file": "a.pdf", "section_title": "Section 4. Definitions"}));
        assert_eq!(c.section_title.as_deref(), Some("Section 4. Definitions"));
        let c = decode_citation(&json!({"source_file": "a.pdf", "section_title": ""}));
        assert_eq!(c.section_title, None);
    }

    #[test]
    fn state_page_chunk_metadata() {
        let c = decode_citation(&json!({
            "source": "docs/state-pages/alabama.pdf",
            "section_title": "Alabama",
            "content_type": "state_page_explanation"
        }));
        assert_eq!(c.source_file, "docs/state-pages/alabama.pdf");
        assert_eq!(c.section_title.as_deref(), Some("Alabama"));
        assert_eq!(c.page_number, None);
    }

    #[test]
    fn model_law_chunk_metadata() {
        let c = decode_citation(&json!({
            "source_file": "model-law-565.pdf",
            "section": "4",
            "page_number": 3
        }));
        assert_eq!(c.source_file, "model-law-565.pdf");
        assert_eq!(c.section_title.as_deref(), Some("4"));
        assert_eq!(c.page_number.as_deref(), Some("3"));

        let c = decode_citation(&json!({"source_file": "m.pdf", "section": 7}));
        assert_eq!(c.section_title.as_deref(), Some("7"));
    }

    #[test]
    fn raw_metadata_keys_have_lowest_priority() {
        let c = decode_citation(&json!({
            "source": "raw.pdf",
            "file": "f.pdf",
            "section": "4",
            "section_title": "Section 4. Definitions"
        }));
        assert_eq!(c.source_file, "f.pdf");
        assert_eq!(c.section_title.as_deref(), Some("Section 4. Definitions"));

        let c = decode_citation(&json!({"source_file": "a.pdf", "section_title": "", "section": null}));
        assert_eq!(c.section_title, None);
    }
}

//! Layout-independent JSON extractor.

use moltreader_core::{ExtractionError, Segment, SegmentExtractor};
use serde::Deserialize;

/// Speaker used when an entry carries no usable name.
const ANONYMOUS_SPEAKER: &str = "Commenter";

#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(alias = "author", alias = "agent")]
    speaker: Option<String>,
    #[serde(alias = "content", alias = "body")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<RawSegment>),
    Wrapped { segments: Vec<RawSegment> },
}

/// Reads segments from a JSON document.
///
/// Accepts either a bare array or an object with a `segments` array. Each
/// entry needs `speaker` (or `author`) and `text` (or `content`). Entries
/// whose text is blank after whitespace cleanup are dropped; order is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSegmentExtractor;

impl JsonSegmentExtractor {
    pub const fn new() -> Self {
        Self
    }
}

impl SegmentExtractor for JsonSegmentExtractor {
    fn extract(&self, raw: &str) -> Result<Vec<Segment>, ExtractionError> {
        let document: RawDocument =
            serde_json::from_str(raw).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

        let entries = match document {
            RawDocument::List(entries) | RawDocument::Wrapped { segments: entries } => entries,
        };

        let total = entries.len();
        let segments: Vec<Segment> = entries
            .into_iter()
            .filter_map(|entry| {
                let text = normalize_text(entry.text.as_deref().unwrap_or_default());
                if text.is_empty() {
                    return None;
                }
                let speaker = normalize_speaker(entry.speaker.as_deref().unwrap_or_default());
                Some(Segment::new(speaker, text))
            })
            .collect();

        if segments.len() < total {
            tracing::debug!(
                dropped = total - segments.len(),
                "Dropped entries without text"
            );
        }
        Ok(segments)
    }
}

/// Strip a leading `u/` handle prefix so names read naturally.
pub fn normalize_speaker(raw: &str) -> String {
    let name = raw.trim();
    let name = name.strip_prefix("u/").unwrap_or(name).trim();
    if name.is_empty() {
        ANONYMOUS_SPEAKER.to_string()
    } else {
        name.to_string()
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array_in_order() {
        let raw = r#"[
            {"speaker": "alice", "text": "hi"},
            {"speaker": "bob", "text": "hello"}
        ]"#;
        let segments = JsonSegmentExtractor.extract(raw).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new("alice", "hi"), Segment::new("bob", "hello")]
        );
    }

    #[test]
    fn parses_wrapped_document_with_aliases() {
        let raw = r#"{"segments": [{"author": "u/carol", "content": "  a\n\n  b "}]}"#;
        let segments = JsonSegmentExtractor.extract(raw).unwrap();
        assert_eq!(segments, vec![Segment::new("carol", "a b")]);
    }

    #[test]
    fn drops_blank_text_and_names_anonymous_speakers() {
        let raw = r#"[
            {"speaker": "alice", "text": "   "},
            {"text": "orphan"}
        ]"#;
        let segments = JsonSegmentExtractor.extract(raw).unwrap();
        assert_eq!(segments, vec![Segment::new("Commenter", "orphan")]);
    }

    #[test]
    fn empty_list_is_not_an_error_here() {
        assert!(JsonSegmentExtractor.extract("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_input_is_reported() {
        let err = JsonSegmentExtractor.extract("<html>").unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[test]
    fn normalize_speaker_strips_handle_prefix() {
        assert_eq!(normalize_speaker(" u/dave "), "dave");
        assert_eq!(normalize_speaker("u/"), "Commenter");
        assert_eq!(normalize_speaker("eve"), "eve");
    }
}

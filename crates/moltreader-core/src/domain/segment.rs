use serde::{Deserialize, Serialize};

/// One unit of attributed text (a post or a comment) to be spoken.
///
/// Segments are produced in reading order by an extractor and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Who wrote the text. Used as the voice assignment key.
    pub speaker: String,

    /// The text to read aloud.
    pub text: String,
}

impl Segment {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    /// The spoken form of this segment: the speaker attribution followed by
    /// the text, so turns stay distinguishable in audio-only playback.
    pub fn utterance(&self) -> String {
        format!("{} says, {}", self.speaker, self.text)
    }
}

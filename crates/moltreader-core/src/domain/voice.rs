//! Voices, voice pools and per-session speaker → voice assignment.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A selectable synthetic voice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voice {
    /// Backend voice identifier (e.g. `"en-US-AvaNeural"` or `"Samantha"`).
    pub id: String,

    /// Human-readable name shown in progress lines.
    pub name: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Errors raised when constructing a [`VoicePool`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoicePoolError {
    #[error("Voice pool must contain at least one voice")]
    Empty,
}

/// English neural voices of the cloud TTS backend: `(id, display name)`.
const NEURAL_VOICES: &[(&str, &str)] = &[
    ("en-US-AvaNeural", "Ava"),
    ("en-US-AndrewNeural", "Andrew"),
    ("en-US-EmmaNeural", "Emma"),
    ("en-US-BrianNeural", "Brian"),
    ("en-US-JennyNeural", "Jenny"),
    ("en-US-GuyNeural", "Guy"),
    ("en-US-AriaNeural", "Aria"),
    ("en-US-ChristopherNeural", "Christopher"),
    ("en-US-EricNeural", "Eric"),
    ("en-US-MichelleNeural", "Michelle"),
    ("en-US-RogerNeural", "Roger"),
    ("en-US-SteffanNeural", "Steffan"),
    ("en-US-AnaNeural", "Ana"),
    ("en-GB-SoniaNeural", "Sonia"),
    ("en-GB-RyanNeural", "Ryan"),
    ("en-GB-LibbyNeural", "Libby"),
    ("en-GB-MaisieNeural", "Maisie"),
    ("en-GB-ThomasNeural", "Thomas"),
    ("en-AU-NatashaNeural", "Natasha"),
    ("en-CA-ClaraNeural", "Clara"),
    ("en-CA-LiamNeural", "Liam"),
    ("en-IE-EmilyNeural", "Emily"),
    ("en-IE-ConnorNeural", "Connor"),
    ("en-NZ-MollyNeural", "Molly"),
    ("en-NZ-MitchellNeural", "Mitchell"),
];

/// Voices that ship with every macOS install, used when discovery fails.
const SAY_FALLBACK_VOICES: &[&str] = &["Alex", "Samantha", "Victoria", "Tom", "Karen", "Daniel"];

/// Fixed, ordered, non-empty set of voices. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePool {
    voices: Arc<[Voice]>,
}

impl VoicePool {
    pub fn new(voices: Vec<Voice>) -> Result<Self, VoicePoolError> {
        if voices.is_empty() {
            return Err(VoicePoolError::Empty);
        }
        Ok(Self {
            voices: voices.into(),
        })
    }

    /// The English neural voice set used by the buffered (cloud) backend.
    pub fn neural() -> Self {
        Self {
            voices: NEURAL_VOICES
                .iter()
                .map(|(id, name)| Voice::new(*id, *name))
                .collect(),
        }
    }

    /// The stock macOS `say` voices. Id and display name are the same.
    pub fn say_fallback() -> Self {
        Self::from_names(SAY_FALLBACK_VOICES.iter().copied())
            .unwrap_or_else(|_| unreachable!("fallback list is non-empty"))
    }

    /// Build a pool where each voice's id doubles as its display name.
    pub fn from_names<I, S>(names: I) -> Result<Self, VoicePoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| {
                    let name = name.into();
                    Voice::new(name.clone(), name)
                })
                .collect(),
        )
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// Always `false`; a pool cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    fn first(&self) -> &Voice {
        &self.voices[0]
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::neural()
    }
}

/// Serializable assignment state: which speaker got which voice, and which
/// voice ids are already taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAssignments {
    by_speaker: HashMap<String, Voice>,
    assigned_ids: HashSet<String>,
}

impl VoiceAssignments {
    pub fn get(&self, speaker: &str) -> Option<&Voice> {
        self.by_speaker.get(speaker)
    }

    pub fn len(&self) -> usize {
        self.by_speaker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_speaker.is_empty()
    }

    fn is_taken(&self, voice: &Voice) -> bool {
        self.assigned_ids.contains(&voice.id)
    }

    fn record(&mut self, speaker: &str, voice: Voice) {
        self.assigned_ids.insert(voice.id.clone());
        self.by_speaker.insert(speaker.to_string(), voice);
    }

    fn clear(&mut self) {
        self.by_speaker.clear();
        self.assigned_ids.clear();
    }
}

/// Assigns each distinct speaker a voice from a [`VoicePool`].
///
/// Voices are drawn at random from the ones nobody has yet; once the pool is
/// exhausted the draw falls back to the whole pool, so voices start to repeat.
/// A speaker's voice never changes until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct VoiceAssigner {
    pool: VoicePool,
    assignments: VoiceAssignments,
}

impl VoiceAssigner {
    pub fn new(pool: VoicePool) -> Self {
        Self {
            pool,
            assignments: VoiceAssignments::default(),
        }
    }

    /// Resume from previously stored assignments (web sessions).
    pub const fn from_assignments(pool: VoicePool, assignments: VoiceAssignments) -> Self {
        Self { pool, assignments }
    }

    pub const fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub const fn assignments(&self) -> &VoiceAssignments {
        &self.assignments
    }

    pub fn into_assignments(self) -> VoiceAssignments {
        self.assignments
    }

    /// Get the speaker's voice, assigning one on first encounter.
    pub fn assign(&mut self, speaker: &str) -> Voice {
        self.assign_with(speaker, &mut rand::rng())
    }

    /// [`assign`](Self::assign) with a caller-provided random source.
    pub fn assign_with<R: Rng + ?Sized>(&mut self, speaker: &str, rng: &mut R) -> Voice {
        if let Some(voice) = self.assignments.get(speaker) {
            return voice.clone();
        }

        let unassigned: Vec<&Voice> = self
            .pool
            .voices()
            .iter()
            .filter(|voice| !self.assignments.is_taken(voice))
            .collect();

        let voice = unassigned
            .choose(rng)
            .copied()
            .or_else(|| self.pool.voices().choose(rng))
            .unwrap_or_else(|| self.pool.first())
            .clone();

        tracing::debug!(speaker, voice = %voice.id, "Assigned voice");
        self.assignments.record(speaker, voice.clone());
        voice
    }

    /// Forget every assignment. Call whenever a new page is loaded.
    pub fn reset(&mut self) {
        self.assignments.clear();
    }
}

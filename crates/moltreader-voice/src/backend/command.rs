//! Direct synthesis through an external speech command.

use std::process::Stdio;

use async_trait::async_trait;
use moltreader_core::{
    SpeakOutcome, SpeechSynthesizer, SynthesisError, TransportSignal, UtteranceTransport, VoicePool,
};
use tokio::process::Command;

const VOICE_PLACEHOLDER: &str = "{voice}";
const TEXT_PLACEHOLDER: &str = "{text}";

/// Voices that `espeak-ng` ships with, used when no list is configured.
const ESPEAK_FALLBACK_VOICES: &[&str] = &["en-us", "en-gb", "en-gb-scotland", "en-gb-x-rp", "en-029"];

/// English voice names known to ship with macOS `say`.
const SAY_ENGLISH_VOICES: &[&str] = &[
    "Alex", "Samantha", "Victoria", "Tom", "Karen", "Daniel", "Moira", "Tessa", "Veena", "Fiona",
    "Rishi", "Aaron", "Nicky", "Allison", "Ava", "Susan", "Zoe", "Evan", "Nathan", "Oliver",
    "Matilda", "Reed", "Rocko", "Sandy", "Shelley", "Fred", "Ralph", "Kathy", "Vicki", "Bruce",
    "Junior", "Albert",
];

/// Program + argument template for one utterance.
///
/// `{voice}` and `{text}` are substituted per argument; the text is never
/// passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCommand {
    program: String,
    args: Vec<String>,
    /// Arguments that make the program list its voices, if it can.
    list_voices_args: Option<Vec<String>>,
}

impl VoiceCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            list_voices_args: None,
        }
    }

    /// macOS `say -v {voice} {text}`.
    pub fn say() -> Self {
        Self {
            program: "say".to_string(),
            args: vec!["-v".into(), VOICE_PLACEHOLDER.into(), TEXT_PLACEHOLDER.into()],
            list_voices_args: Some(vec!["-v".into(), "?".into()]),
        }
    }

    /// `espeak-ng -v {voice} {text}`.
    pub fn espeak() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            args: vec!["-v".into(), VOICE_PLACEHOLDER.into(), TEXT_PLACEHOLDER.into()],
            list_voices_args: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Concrete arguments for one utterance.
    pub fn render_args(&self, text: &str, voice_id: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace(VOICE_PLACEHOLDER, voice_id)
                    .replace(TEXT_PLACEHOLDER, text)
            })
            .collect()
    }

    /// Static pool for this command when discovery is unavailable.
    pub fn fallback_pool(&self) -> VoicePool {
        if self.program == "espeak-ng" || self.program == "espeak" {
            VoicePool::from_names(ESPEAK_FALLBACK_VOICES.iter().copied())
                .unwrap_or_else(|_| VoicePool::say_fallback())
        } else {
            VoicePool::say_fallback()
        }
    }
}

/// Speaks by running a [`VoiceCommand`] to completion.
///
/// The command cannot be suspended, so pause terminates it like cancel does;
/// the controller re-issues the segment on resume.
pub struct CommandSynthesizer {
    command: VoiceCommand,
}

impl CommandSynthesizer {
    pub const fn new(command: VoiceCommand) -> Self {
        Self { command }
    }

    pub const fn command(&self) -> &VoiceCommand {
        &self.command
    }

    /// Ask the program for its voices, preferring English ones.
    ///
    /// Falls back to [`VoiceCommand::fallback_pool`] if the program cannot
    /// list voices, fails, or lists none.
    pub async fn discover_voices(&self) -> VoicePool {
        let Some(list_args) = &self.command.list_voices_args else {
            return self.command.fallback_pool();
        };

        let output = Command::new(&self.command.program)
            .args(list_args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                let names = parse_say_voices(&String::from_utf8_lossy(&output.stdout));
                tracing::debug!(count = names.len(), "Discovered voices");
                VoicePool::from_names(names).unwrap_or_else(|_| self.command.fallback_pool())
            }
            Ok(output) => {
                tracing::warn!(status = %output.status, "Voice listing failed, using fallback voices");
                self.command.fallback_pool()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Voice listing unavailable, using fallback voices");
                self.command.fallback_pool()
            }
        }
    }
}

/// Parse `say -v ?` output: the first token of each line is the voice name.
///
/// Known English voices are preferred; if none are present every listed
/// voice is returned.
pub fn parse_say_voices(listing: &str) -> Vec<String> {
    let voices: Vec<String> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect();

    let english: Vec<String> = voices
        .iter()
        .filter(|name| SAY_ENGLISH_VOICES.contains(&name.as_str()))
        .cloned()
        .collect();

    if english.is_empty() { voices } else { english }
}

/// Resolve once the transport asks the utterance to stop speaking.
async fn interrupted(transport: &mut UtteranceTransport) -> TransportSignal {
    loop {
        match transport.current() {
            TransportSignal::Run => {
                transport.changed().await;
            }
            signal => return signal,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(
        &self,
        text: &str,
        voice_id: &str,
        mut transport: UtteranceTransport,
    ) -> SpeakOutcome {
        if transport.wait_while_paused().await == TransportSignal::Cancel {
            return SpeakOutcome::Interrupted;
        }

        let program = &self.command.program;
        let spawned = Command::new(program)
            .args(self.command.render_args(text, voice_id))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                return SpeakOutcome::Failed(SynthesisError::Process(format!(
                    "failed to start {program}: {e}"
                )));
            }
        };
        tracing::debug!(%program, voice = voice_id, pid = ?child.id(), "Speech command started");

        tokio::select! {
            status = child.wait() => match status {
                Ok(status) if status.success() => SpeakOutcome::Completed,
                Ok(status) => SpeakOutcome::Failed(SynthesisError::Process(format!(
                    "{program} exited with {status}"
                ))),
                Err(e) => SpeakOutcome::Failed(SynthesisError::Io(e)),
            },
            signal = interrupted(&mut transport) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(%program, error = %e, "Failed to kill speech command");
                }
                tracing::debug!(%program, ?signal, "Speech command interrupted");
                SpeakOutcome::Interrupted
            }
        }
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moltreader_core::TransportHandle;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn placeholders_are_substituted_per_argument() {
        let args = VoiceCommand::say().render_args("alice says, it's \"fine\"", "Samantha");
        assert_eq!(args, vec!["-v", "Samantha", "alice says, it's \"fine\""]);
    }

    #[test]
    fn parse_prefers_english_voices() {
        let listing = "\
Alex                en_US    # Most people recognize me by my voice.
Amelie              fr_CA    # Bonjour, je m'appelle Amelie.
Samantha            en_US    # Hello, my name is Samantha.
";
        assert_eq!(parse_say_voices(listing), vec!["Alex", "Samantha"]);
    }

    #[test]
    fn parse_keeps_everything_without_english_voices() {
        let listing = "Amelie fr_CA # Bonjour\n\nAnna de_DE # Hallo\n";
        assert_eq!(parse_say_voices(listing), vec!["Amelie", "Anna"]);
    }

    #[test]
    fn fallback_pool_matches_program() {
        assert_eq!(VoiceCommand::say().fallback_pool(), VoicePool::say_fallback());
        assert!(
            VoiceCommand::espeak()
                .fallback_pool()
                .voices()
                .iter()
                .any(|v| v.id == "en-us")
        );
    }

    #[tokio::test]
    async fn discover_without_listing_support_uses_fallback() {
        let synth = CommandSynthesizer::new(VoiceCommand::espeak());
        assert_eq!(synth.discover_voices().await, VoiceCommand::espeak().fallback_pool());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_command_completes() {
        let synth = CommandSynthesizer::new(VoiceCommand::new("true", vec![]));
        let (_handle, transport) = TransportHandle::new();
        assert!(synth.speak("hi", "v", transport).await.is_completed());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_a_failure() {
        let synth = CommandSynthesizer::new(VoiceCommand::new("false", vec![]));
        let (_handle, transport) = TransportHandle::new();
        let outcome = synth.speak("hi", "v", transport).await;
        assert!(matches!(outcome, SpeakOutcome::Failed(SynthesisError::Process(_))));
    }

    #[tokio::test]
    async fn missing_program_is_a_failure() {
        let synth = CommandSynthesizer::new(VoiceCommand::new(
            "moltreader-no-such-speech-command",
            vec![],
        ));
        let (_handle, transport) = TransportHandle::new();
        let outcome = synth.speak("hi", "v", transport).await;
        assert!(matches!(outcome, SpeakOutcome::Failed(SynthesisError::Process(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancel_kills_the_process_promptly() {
        let synth = Arc::new(CommandSynthesizer::new(VoiceCommand::new(
            "sleep",
            vec!["10".into()],
        )));
        let (handle, transport) = TransportHandle::new();

        let task = {
            let synth = Arc::clone(&synth);
            tokio::spawn(async move { synth.speak("hi", "v", transport).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        handle.send(TransportSignal::Cancel);
        let outcome = task.await.unwrap();

        assert!(outcome.is_interrupted());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pause_also_interrupts() {
        let synth = Arc::new(CommandSynthesizer::new(VoiceCommand::new(
            "sleep",
            vec!["10".into()],
        )));
        let (handle, transport) = TransportHandle::new();

        let task = {
            let synth = Arc::clone(&synth);
            tokio::spawn(async move { synth.speak("hi", "v", transport).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.send(TransportSignal::Pause);

        let outcome = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.is_interrupted());
    }
}

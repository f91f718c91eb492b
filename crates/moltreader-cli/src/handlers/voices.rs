//! Voices command handler.

use anyhow::Result;
use moltreader_core::{Voice, VoicePool};

use crate::bootstrap::CliContext;
use crate::commands::{Backend, SpeechProgram};

/// Print the voice pool for `backend`.
///
/// For the command backend this asks the speech program for its voices,
/// without opening any audio device.
pub async fn execute(
    ctx: &CliContext,
    backend: Backend,
    program: SpeechProgram,
    json: bool,
) -> Result<()> {
    let pool = match backend {
        Backend::Buffered => ctx.settings.voice_pool_or(VoicePool::neural())?,
        Backend::Command => {
            let synthesizer = moltreader_voice::CommandSynthesizer::new(program.voice_command());
            match ctx.settings.voices {
                Some(_) => ctx.settings.voice_pool_or(VoicePool::say_fallback())?,
                None => synthesizer.discover_voices().await,
            }
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(pool.voices())?);
    } else {
        print!("{}", format_voices(pool.voices()));
    }
    Ok(())
}

fn format_voices(voices: &[Voice]) -> String {
    let width = voices.iter().map(|v| v.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for voice in voices {
        if voice.name == voice.id {
            out.push_str(&format!("{}\n", voice.name));
        } else {
            out.push_str(&format!("{:<width$}  {}\n", voice.name, voice.id));
        }
    }
    out.push_str(&format!("{} voices\n", voices.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_aligned() {
        let voices = vec![
            Voice::new("en-US-AvaNeural", "Ava"),
            Voice::new("en-US-ChristopherNeural", "Christopher"),
            Voice::new("Samantha", "Samantha"),
        ];
        let out = format_voices(&voices);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Ava          en-US-AvaNeural");
        assert_eq!(lines[1], "Christopher  en-US-ChristopherNeural");
        assert_eq!(lines[2], "Samantha");
        assert_eq!(lines[3], "3 voices");
    }
}

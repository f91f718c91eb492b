//! Read command handler.
//!
//! Loads a thread, starts a [`PlaybackController`] on the chosen backend and
//! forwards stdin lines to it as transport commands while printing the
//! controller's events.

use std::path::{Path, PathBuf};

use anyhow::Result;
use moltreader_core::{
    ExtractionError, LoadError, Segment, SegmentExtractor, VoiceAssigner,
};
use moltreader_fetch::JsonSegmentExtractor;
use moltreader_voice::{PlaybackController, PlaybackEvent, PlaybackState, PlaybackStatus};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bootstrap::CliContext;
use crate::commands::{Backend, SpeechProgram};
use crate::error::CliError;
use crate::input::{READER_HELP, ReaderInput};

/// Arguments for the read command.
#[derive(Debug, Clone)]
pub struct ReadArgs {
    pub url: Option<String>,
    pub segments: Option<PathBuf>,
    pub backend: Backend,
    pub speech_program: SpeechProgram,
    pub autoplay: bool,
}

/// Execute the read command.
pub async fn execute(ctx: &CliContext, args: ReadArgs) -> Result<()> {
    let segments = match (&args.segments, &args.url) {
        (Some(path), _) => load_segments_file(path)?,
        (None, Some(url)) => {
            println!("Loading {url} ...");
            ctx.loader.load(url).await.map_err(CliError::from)?
        }
        (None, None) => {
            return Err(CliError::Arguments("provide a URL or --segments FILE".into()).into());
        }
    };
    println!("Found {} items to read", segments.len());

    let (synthesizer, pool) = ctx.synthesizer(args.backend, args.speech_program).await?;
    tracing::info!(
        backend = synthesizer.name(),
        voices = pool.len(),
        segments = segments.len(),
        "Starting reader"
    );

    let (controller, mut events) = PlaybackController::spawn(synthesizer, VoiceAssigner::new(pool));
    controller.load(segments).await?;
    if args.autoplay {
        controller.play().await?;
    }
    println!("{READER_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event);
                // Without a terminal to take commands from, run to the end.
                if !stdin_open && ends_unattended_run(&event) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        if !handle_line(&controller, &line).await? {
                            break;
                        }
                    }
                    None => {
                        stdin_open = false;
                        if controller.status().await?.state != PlaybackState::Playing {
                            break;
                        }
                    }
                }
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

/// Apply one stdin line. Returns `false` when the user asked to quit.
async fn handle_line(controller: &PlaybackController, line: &str) -> Result<bool> {
    let Some(input) = ReaderInput::parse(line) else {
        if !line.trim().is_empty() {
            println!("Unknown command: {}. {READER_HELP}", line.trim());
        }
        return Ok(true);
    };

    tracing::debug!(?input, "Reader input");
    match input {
        ReaderInput::Play => {
            controller.play().await?;
        }
        ReaderInput::Pause => {
            controller.pause().await?;
        }
        ReaderInput::Skip => {
            controller.skip().await?;
        }
        ReaderInput::Stop => {
            controller.stop().await?;
        }
        ReaderInput::Status => println!("{}", format_status(&controller.status().await?)),
        ReaderInput::Help => println!("{READER_HELP}"),
        ReaderInput::Quit => return Ok(false),
    }
    Ok(true)
}

fn print_event(event: &PlaybackEvent) {
    match event {
        PlaybackEvent::StateChanged(state) => tracing::debug!(%state, "Playback state"),
        PlaybackEvent::Progress(_) | PlaybackEvent::Finished => println!("{event}"),
        PlaybackEvent::Text(text) => println!("  {text}"),
        PlaybackEvent::Failed(_) => eprintln!("{event}"),
    }
}

const fn ends_unattended_run(event: &PlaybackEvent) -> bool {
    matches!(
        event,
        PlaybackEvent::Finished
            | PlaybackEvent::Failed(_)
            | PlaybackEvent::StateChanged(PlaybackState::Idle)
    )
}

fn format_status(status: &PlaybackStatus) -> String {
    let position = if status.total == 0 {
        "nothing loaded".to_string()
    } else {
        format!("item {} of {}", status.current_index + 1, status.total)
    };
    match &status.progress_text {
        Some(progress) => format!("{} - {position} - {progress}", status.state),
        None => format!("{} - {position}", status.state),
    }
}

/// Read segments from a JSON file in the same shape the page extractor
/// accepts.
fn load_segments_file(path: &Path) -> Result<Vec<Segment>, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let segments = JsonSegmentExtractor::new()
        .extract(&raw)
        .map_err(LoadError::from)?;
    if segments.is_empty() {
        return Err(LoadError::from(ExtractionError::NoContent).into());
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn segments_file_is_parsed_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"author": "u/alice", "text": "hi"}}, {{"author": "bob", "text": "hello"}}]"#
        )
        .unwrap();

        let segments = load_segments_file(file.path()).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new("alice", "hi"), Segment::new("bob", "hello")]
        );
    }

    #[test]
    fn empty_segments_file_is_no_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        let err = load_segments_file(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "No posts or comments found on this page");
    }

    #[test]
    fn missing_segments_file_is_io_error() {
        let err = load_segments_file(Path::new("/nonexistent/thread.json")).unwrap_err();
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn status_line() {
        let status = PlaybackStatus {
            state: PlaybackState::Paused,
            current_index: 1,
            total: 3,
            progress_text: Some("[2/3] bob (voice: Ava)".into()),
        };
        assert_eq!(
            format_status(&status),
            "paused - item 2 of 3 - [2/3] bob (voice: Ava)"
        );

        let empty = PlaybackStatus {
            state: PlaybackState::Idle,
            current_index: 0,
            total: 0,
            progress_text: None,
        };
        assert_eq!(format_status(&empty), "idle - nothing loaded");
    }

    #[test]
    fn unattended_run_ends_on_terminal_events() {
        assert!(ends_unattended_run(&PlaybackEvent::Finished));
        assert!(ends_unattended_run(&PlaybackEvent::Failed("x".into())));
        assert!(!ends_unattended_run(&PlaybackEvent::StateChanged(
            PlaybackState::Paused
        )));
    }
}

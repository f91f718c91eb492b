//! Tests for the playback controller state machine.
//!
//! A scripted synthesizer stands in for real speech: every utterance stays
//! "speaking" until the test releases a permit or the controller cancels it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moltreader_core::{
    Segment, SpeakOutcome, SpeechSynthesizer, SynthesisError, TransportSignal, UtteranceTransport,
    Voice, VoiceAssigner, VoicePool,
};
use moltreader_voice::{
    ControllerConfig, PlaybackController, PlaybackEvent, PlaybackState, PlaybackStatus,
};
use tokio::sync::{Semaphore, mpsc};

const WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ended {
    Completed,
    Interrupted,
    Failed,
}

struct ScriptedSynth {
    release: Arc<Semaphore>,
    started: mpsc::UnboundedSender<String>,
    ended: mpsc::UnboundedSender<Ended>,
    fail_containing: Option<&'static str>,
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynth {
    async fn speak(
        &self,
        text: &str,
        _voice_id: &str,
        mut transport: UtteranceTransport,
    ) -> SpeakOutcome {
        let _ = self.started.send(text.to_string());

        if self.fail_containing.is_some_and(|needle| text.contains(needle)) {
            let _ = self.ended.send(Ended::Failed);
            return SpeakOutcome::Failed(SynthesisError::Engine("voice unavailable".into()));
        }

        loop {
            if transport.current() == TransportSignal::Cancel {
                let _ = self.ended.send(Ended::Interrupted);
                return SpeakOutcome::Interrupted;
            }
            tokio::select! {
                permit = self.release.acquire() => {
                    permit.unwrap().forget();
                    let _ = self.ended.send(Ended::Completed);
                    return SpeakOutcome::Completed;
                }
                _ = transport.changed() => {}
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct Harness {
    controller: PlaybackController,
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
    started: mpsc::UnboundedReceiver<String>,
    ended: mpsc::UnboundedReceiver<Ended>,
    release: Arc<Semaphore>,
}

impl Harness {
    fn new(permits: usize) -> Self {
        Self::build(permits, None, VoicePool::neural())
    }

    fn build(permits: usize, fail_containing: Option<&'static str>, pool: VoicePool) -> Self {
        let release = Arc::new(Semaphore::new(permits));
        let (started_tx, started) = mpsc::unbounded_channel();
        let (ended_tx, ended) = mpsc::unbounded_channel();
        let synth = ScriptedSynth {
            release: Arc::clone(&release),
            started: started_tx,
            ended: ended_tx,
            fail_containing,
        };
        let (controller, events) = PlaybackController::with_config(
            Arc::new(synth),
            VoiceAssigner::new(pool),
            ControllerConfig {
                cancel_grace: Duration::from_millis(500),
            },
        );
        Self {
            controller,
            events,
            started,
            ended,
            release,
        }
    }

    async fn next_started(&mut self) -> String {
        tokio::time::timeout(WAIT, self.started.recv())
            .await
            .expect("no utterance started")
            .expect("synth dropped")
    }

    async fn next_ended(&mut self) -> Ended {
        tokio::time::timeout(WAIT, self.ended.recv())
            .await
            .expect("no utterance ended")
            .expect("synth dropped")
    }

    /// Collect events until `Finished` arrives.
    async fn events_until_finished(&mut self) -> Vec<PlaybackEvent> {
        let mut seen = Vec::new();
        loop {
            let event = tokio::time::timeout(WAIT, self.events.recv())
                .await
                .expect("playback did not finish")
                .expect("controller dropped");
            let done = event == PlaybackEvent::Finished;
            seen.push(event);
            if done {
                return seen;
            }
        }
    }

    fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            seen.push(event);
        }
        seen
    }

    /// Wait until the controller has applied the last utterance outcome.
    async fn settle(&self) -> PlaybackStatus {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.controller.status().await.unwrap()
    }
}

fn segments(n: usize) -> Vec<Segment> {
    (0..n)
        .map(|i| Segment::new(format!("speaker{i}"), format!("text {i}")))
        .collect()
}

fn progress_lines(events: &[PlaybackEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::Progress(update) => Some(update.to_string()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn two_speakers_get_distinct_voices_then_finish() {
    let pool = VoicePool::new(vec![Voice::new("v1", "One"), Voice::new("v2", "Two")]).unwrap();
    let mut h = Harness::build(usize::MAX >> 4, None, pool);

    h.controller
        .load(vec![Segment::new("alice", "hi"), Segment::new("bob", "hello")])
        .await
        .unwrap();
    h.controller.play().await.unwrap();

    let events = h.events_until_finished().await;
    let lines = progress_lines(&events);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[1/2] alice (voice: "));
    assert!(lines[1].starts_with("[2/2] bob (voice: "));
    assert_ne!(
        lines[0].trim_start_matches("[1/2] alice"),
        lines[1].trim_start_matches("[2/2] bob")
    );
    assert_eq!(events.last().unwrap().to_string(), "Finished reading");
    assert!(events.contains(&PlaybackEvent::Text("hi".into())));

    assert_eq!(h.next_started().await, "alice says, hi");
    assert_eq!(h.next_started().await, "bob says, hello");

    let status = h.controller.status().await.unwrap();
    assert_eq!(status.state, PlaybackState::Finished);
    assert_eq!(status.current_index, 2);
    assert_eq!(status.progress_text.as_deref(), Some("Finished reading"));
}

#[tokio::test]
async fn pause_and_skip_from_idle_are_silent_no_ops() {
    let mut h = Harness::new(0);
    h.controller.load(segments(2)).await.unwrap();
    assert!(h.drain_events().is_empty());

    let paused = h.controller.pause().await.unwrap();
    let skipped = h.controller.skip().await.unwrap();

    for status in [paused, skipped] {
        assert_eq!(status.state, PlaybackState::Idle);
        assert_eq!(status.current_index, 0);
    }
    assert!(h.drain_events().is_empty());
}

#[tokio::test]
async fn play_on_empty_queue_stays_idle() {
    let mut h = Harness::new(0);
    let status = h.controller.play().await.unwrap();
    assert_eq!(status.state, PlaybackState::Idle);
    assert!(h.drain_events().is_empty());
}

#[tokio::test]
async fn stop_mid_utterance_rewinds_and_never_finishes() {
    let mut h = Harness::new(1);
    h.controller.load(segments(3)).await.unwrap();
    h.controller.play().await.unwrap();

    // First segment completes on the single permit, second one hangs.
    assert_eq!(h.next_started().await, "speaker0 says, text 0");
    assert_eq!(h.next_started().await, "speaker1 says, text 1");
    assert_eq!(h.next_ended().await, Ended::Completed);

    let status = h.controller.stop().await.unwrap();
    assert_eq!(status.state, PlaybackState::Idle);
    assert_eq!(status.current_index, 0);
    assert_eq!(status.progress_text, None);
    assert_eq!(h.next_ended().await, Ended::Interrupted);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let events = h.drain_events();
    assert!(!events.contains(&PlaybackEvent::Finished));
    assert_eq!(
        events.last(),
        Some(&PlaybackEvent::StateChanged(PlaybackState::Idle))
    );
}

#[tokio::test]
async fn skip_moves_to_next_segment_exactly_once() {
    let mut h = Harness::new(0);
    h.controller.load(segments(3)).await.unwrap();
    h.controller.play().await.unwrap();
    assert_eq!(h.next_started().await, "speaker0 says, text 0");

    h.controller.skip().await.unwrap();
    assert_eq!(h.next_ended().await, Ended::Interrupted);
    assert_eq!(h.next_started().await, "speaker1 says, text 1");

    h.release.add_permits(2);
    assert_eq!(h.next_started().await, "speaker2 says, text 2");
    let lines = progress_lines(&h.events_until_finished().await);
    assert_eq!(lines.len(), 3, "unexpected progress: {lines:?}");
    assert_eq!(lines.iter().filter(|l| l.starts_with("[2/3]")).count(), 1);

    // Segment 0 was not spoken again.
    assert!(h.started.try_recv().is_err());
}

#[tokio::test]
async fn skip_progress_for_next_segment_fires_once() {
    let mut h = Harness::new(0);
    h.controller.load(segments(3)).await.unwrap();
    h.controller.play().await.unwrap();
    h.next_started().await;

    h.controller.skip().await.unwrap();
    h.next_started().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let lines = progress_lines(&h.drain_events());
    let second = lines.iter().filter(|l| l.starts_with("[2/3] speaker1")).count();
    let first = lines.iter().filter(|l| l.starts_with("[1/3] speaker0")).count();
    assert_eq!(first, 1);
    assert_eq!(second, 1);
    assert_eq!(h.controller.status().await.unwrap().current_index, 1);
}

#[tokio::test]
async fn pause_resume_keeps_index() {
    let mut h = Harness::new(0);
    h.controller.load(segments(2)).await.unwrap();
    h.controller.play().await.unwrap();
    h.next_started().await;

    let paused = h.controller.pause().await.unwrap();
    assert_eq!(paused.state, PlaybackState::Paused);
    assert_eq!(paused.current_index, 0);

    let resumed = h.controller.play().await.unwrap();
    assert_eq!(resumed.state, PlaybackState::Playing);
    assert_eq!(resumed.current_index, 0);

    // The same utterance carries on; it is not re-issued.
    h.release.add_permits(1);
    assert_eq!(h.next_ended().await, Ended::Completed);
    assert_eq!(h.next_started().await, "speaker1 says, text 1");
}

#[tokio::test]
async fn pause_wins_over_completion() {
    let mut h = Harness::new(0);
    h.controller.load(segments(2)).await.unwrap();
    h.controller.play().await.unwrap();
    h.next_started().await;

    h.controller.pause().await.unwrap();
    h.release.add_permits(1);
    assert_eq!(h.next_ended().await, Ended::Completed);

    let status = h.settle().await;
    assert_eq!(status.state, PlaybackState::Paused);
    assert_eq!(status.current_index, 0);
    assert!(h.started.try_recv().is_err());

    let resumed = h.controller.play().await.unwrap();
    assert_eq!(resumed.current_index, 1);
    assert_eq!(h.next_started().await, "speaker1 says, text 1");
}

#[tokio::test]
async fn skip_while_paused_unpauses_and_advances() {
    let mut h = Harness::new(0);
    h.controller.load(segments(3)).await.unwrap();
    h.controller.play().await.unwrap();
    h.next_started().await;
    h.controller.pause().await.unwrap();

    let status = h.controller.skip().await.unwrap();
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(h.next_started().await, "speaker1 says, text 1");
    assert_eq!(h.controller.status().await.unwrap().current_index, 1);
}

#[tokio::test]
async fn play_while_playing_does_not_start_a_second_utterance() {
    let mut h = Harness::new(0);
    h.controller.load(segments(2)).await.unwrap();
    h.controller.play().await.unwrap();
    h.next_started().await;

    h.controller.play().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.started.try_recv().is_err());
}

#[tokio::test]
async fn synthesis_failure_stops_playback_and_keeps_index() {
    let mut h = Harness::build(8, Some("text 1"), VoicePool::neural());
    h.controller.load(segments(3)).await.unwrap();
    h.controller.play().await.unwrap();

    h.next_started().await;
    h.next_started().await;
    assert_eq!(h.next_ended().await, Ended::Completed);
    assert_eq!(h.next_ended().await, Ended::Failed);

    let status = h.settle().await;
    assert_eq!(status.state, PlaybackState::Idle);
    assert_eq!(status.current_index, 1);

    let events = h.drain_events();
    assert!(events.iter().any(|e| matches!(e, PlaybackEvent::Failed(reason) if reason.contains("voice unavailable"))));
    assert!(!events.contains(&PlaybackEvent::Finished));
}

#[tokio::test]
async fn play_after_finished_starts_over() {
    let mut h = Harness::new(usize::MAX >> 4);
    h.controller.load(segments(1)).await.unwrap();
    h.controller.play().await.unwrap();
    h.events_until_finished().await;
    h.next_started().await;

    let status = h.controller.play().await.unwrap();
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(status.current_index, 0);
    assert_eq!(h.next_started().await, "speaker0 says, text 0");
}

#[tokio::test]
async fn load_keeps_voices_but_stop_resets_them() {
    let pool = VoicePool::new((0..50).map(|i| Voice::new(format!("v{i}"), format!("V{i}"))).collect())
        .unwrap();
    let mut h = Harness::build(usize::MAX >> 4, None, pool);
    let page = vec![Segment::new("alice", "hi")];

    h.controller.load(page.clone()).await.unwrap();
    h.controller.play().await.unwrap();
    let first = progress_lines(&h.events_until_finished().await);

    h.controller.load(page.clone()).await.unwrap();
    h.controller.play().await.unwrap();
    let second = progress_lines(&h.events_until_finished().await);
    assert_eq!(first, second);

    // After a stop the assignment is drawn again; with 50 voices a repeat
    // across several attempts is vanishingly unlikely.
    let mut changed = false;
    for _ in 0..5 {
        h.controller.stop().await.unwrap();
        h.controller.play().await.unwrap();
        let again = progress_lines(&h.events_until_finished().await);
        if again != first {
            changed = true;
            break;
        }
    }
    assert!(changed);
}

#[tokio::test]
async fn current_item_reports_progress_line() {
    let mut h = Harness::new(0);
    h.controller.load(segments(2)).await.unwrap();
    assert_eq!(h.controller.current_item().await.unwrap(), (0, None));

    h.controller.play().await.unwrap();
    h.next_started().await;
    let (index, text) = h.controller.current_item().await.unwrap();
    assert_eq!(index, 0);
    assert!(text.unwrap().starts_with("[1/2] speaker0 (voice: "));
}

#[tokio::test]
async fn dropping_the_handle_interrupts_the_utterance() {
    let mut h = Harness::new(0);
    h.controller.load(segments(2)).await.unwrap();
    h.controller.play().await.unwrap();
    h.next_started().await;

    let Harness {
        controller,
        mut ended,
        ..
    } = h;
    controller.shutdown().await;

    let outcome = tokio::time::timeout(WAIT, ended.recv()).await.unwrap();
    assert_eq!(outcome, Some(Ended::Interrupted));
}

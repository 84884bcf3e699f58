//! Live recognition provider.
//!
//! Accumulates text from a continuous recognizer: finalized segments are
//! appended permanently (space-separated) and a single interim segment
//! replaces the previous one on every event. When the recognizer's stream
//! ends while the provider is still Running, a new session is opened; only
//! `stop()` exits the loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use super::{EventSender, ProviderEvent, ProviderState, StateCell, TranscriptionBackend};
use crate::recognizer::{RecognitionEvent, SessionEvent, SpeechRecognizer};

/// Pause between restart attempts so a recognizer that fails immediately does
/// not spin the loop.
const RESTART_PAUSE: Duration = Duration::from_millis(250);

/// Running text: permanently finalized segments plus one replaceable interim tail.
#[derive(Debug, Default)]
pub(crate) struct LiveTranscript {
    finalized: String,
    interim: String,
}

impl LiveTranscript {
    pub(crate) fn apply(&mut self, event: RecognitionEvent) {
        if event.is_final {
            if !event.text.is_empty() {
                self.finalized.push_str(&event.text);
                self.finalized.push(' ');
            }
            self.interim.clear();
        } else {
            self.interim = event.text;
        }
    }

    /// Latest consistent snapshot: everything finalized so far plus the
    /// current interim tail.
    pub(crate) fn snapshot(&self) -> String {
        format!("{}{}", self.finalized, self.interim)
    }
}

/// Streams microphone audio through a continuous recognizer until stopped.
pub struct LiveRecognitionProvider {
    recognizer: Arc<dyn SpeechRecognizer>,
    language: Option<String>,
    state: StateCell,
    stop: watch::Sender<bool>,
}

impl LiveRecognitionProvider {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, language: Option<String>) -> Self {
        let (stop, _) = watch::channel(false);
        LiveRecognitionProvider {
            recognizer,
            language,
            state: StateCell::new(),
            stop,
        }
    }
}

/// Wait out the restart pause; returns true if stop arrived first.
async fn pause_or_stopped(stopped: &mut watch::Receiver<bool>, pause: Duration) -> bool {
    tokio::select! {
        _ = stopped.changed() => true,
        _ = tokio::time::sleep(pause) => false,
    }
}

#[async_trait]
impl TranscriptionBackend for LiveRecognitionProvider {
    fn name(&self) -> &'static str {
        "live-recognition"
    }

    fn state(&self) -> ProviderState {
        self.state.get()
    }

    async fn start(&self, events: EventSender) {
        self.state.set(ProviderState::Running);
        let mut stopped = self.stop.subscribe();
        let mut transcript = LiveTranscript::default();

        'capture: while self.state.get() == ProviderState::Running && !*stopped.borrow() {
            let mut session = tokio::select! {
                _ = stopped.changed() => break 'capture,
                opened = self.recognizer.start_session(self.language.as_deref()) => {
                    match opened {
                        Ok(session) => session,
                        Err(e) => {
                            crate::verbose!("recognizer session failed: {e}");
                            let _ = events.send(ProviderEvent::Warning(e.warning()));
                            if pause_or_stopped(&mut stopped, RESTART_PAUSE).await {
                                break 'capture;
                            }
                            continue;
                        }
                    }
                }
            };

            loop {
                tokio::select! {
                    _ = stopped.changed() => break 'capture,
                    event = session.events.recv() => match event {
                        Some(SessionEvent::Recognized(recognition)) => {
                            transcript.apply(recognition);
                            let _ = events.send(ProviderEvent::Update(transcript.snapshot()));
                        }
                        Some(SessionEvent::Warning(warning)) => {
                            let _ = events.send(ProviderEvent::Warning(warning));
                        }
                        None => {
                            // Spontaneous end-of-stream with the provider still
                            // Running: reopen the session.
                            crate::verbose!("recognition stream ended, restarting");
                            if pause_or_stopped(&mut stopped, RESTART_PAUSE).await {
                                break 'capture;
                            }
                            break;
                        }
                    }
                }
            }
        }

        self.state.stop_if_running();
        let _ = events.send(ProviderEvent::Done(transcript.snapshot()));
    }

    fn stop(&self) {
        self.state.stop_if_running();
        let _ = self.stop.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LiveWarning;
    use crate::recognizer::{RecognizerSession, SessionError};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Replays pre-scripted sessions; once exhausted, every new session ends
    /// immediately (empty stream).
    struct ScriptedRecognizer {
        sessions: Mutex<VecDeque<Vec<SessionEvent>>>,
    }

    impl ScriptedRecognizer {
        fn new(sessions: Vec<Vec<SessionEvent>>) -> Arc<Self> {
            Arc::new(ScriptedRecognizer {
                sessions: Mutex::new(sessions.into()),
            })
        }
    }

    #[async_trait]
    impl SpeechRecognizer for ScriptedRecognizer {
        async fn start_session(
            &self,
            _language: Option<&str>,
        ) -> Result<RecognizerSession, SessionError> {
            let script = self.sessions.lock().unwrap().pop_front().unwrap_or_default();
            let (tx, rx) = mpsc::unbounded_channel();
            for event in script {
                let _ = tx.send(event);
            }
            // tx dropped here: the stream ends after the scripted events
            Ok(RecognizerSession::new(rx))
        }
    }

    fn recognized(text: &str, is_final: bool) -> SessionEvent {
        SessionEvent::Recognized(RecognitionEvent {
            text: text.to_string(),
            is_final,
        })
    }

    #[test]
    fn interim_replaced_finals_accumulate() {
        let mut transcript = LiveTranscript::default();
        transcript.apply(RecognitionEvent::interim("hi"));
        assert_eq!(transcript.snapshot(), "hi");

        transcript.apply(RecognitionEvent::finalized("hi there"));
        assert_eq!(transcript.snapshot(), "hi there ");

        transcript.apply(RecognitionEvent::interim("how"));
        transcript.apply(RecognitionEvent::interim("how are"));
        assert_eq!(transcript.snapshot(), "hi there how are");

        transcript.apply(RecognitionEvent::finalized("how are you"));
        assert_eq!(transcript.snapshot(), "hi there how are you ");
    }

    #[test]
    fn empty_final_clears_interim_without_appending() {
        let mut transcript = LiveTranscript::default();
        transcript.apply(RecognitionEvent::interim("uh"));
        transcript.apply(RecognitionEvent::finalized(""));
        assert_eq!(transcript.snapshot(), "");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn sessions_restart_until_stopped() {
        let recognizer = ScriptedRecognizer::new(vec![
            vec![recognized("hi", false), recognized("hi there", true)],
            vec![
                SessionEvent::Warning(LiveWarning::NoSpeechDetected),
                recognized("again", true),
            ],
        ]);
        let provider = Arc::new(LiveRecognitionProvider::new(recognizer, None));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let runner = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.start(tx).await })
        };

        let mut updates = Vec::new();
        let mut warnings = Vec::new();
        let done = loop {
            match rx.recv().await.expect("event stream ended early") {
                ProviderEvent::Update(text) => {
                    updates.push(text);
                    // Both scripted sessions consumed: the provider is now in
                    // its self-healing restart loop; stop it.
                    if updates.last().map(String::as_str) == Some("hi there again ") {
                        provider.stop();
                    }
                }
                ProviderEvent::Warning(w) => warnings.push(w),
                ProviderEvent::Done(text) => break text,
                ProviderEvent::Failed(e) => panic!("unexpected failure: {e}"),
            }
        };

        runner.await.unwrap();
        assert_eq!(
            updates,
            vec!["hi", "hi there ", "hi there again "]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(warnings, vec![LiveWarning::NoSpeechDetected]);
        assert_eq!(done, "hi there again ");
        assert_eq!(provider.state(), ProviderState::Stopped);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn stop_is_idempotent() {
        let recognizer = ScriptedRecognizer::new(vec![]);
        let provider = Arc::new(LiveRecognitionProvider::new(recognizer, None));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let runner = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.start(tx).await })
        };

        // Let the provider enter its restart loop before stopping.
        tokio::time::sleep(Duration::from_millis(10)).await;
        provider.stop();
        provider.stop();

        runner.await.unwrap();
        assert_eq!(provider.state(), ProviderState::Stopped);

        // Events up to Done, then the channel closes.
        let mut saw_done = false;
        while let Some(event) = rx.recv().await {
            if matches!(event, ProviderEvent::Done(_)) {
                saw_done = true;
            }
        }
        assert!(saw_done);

        provider.stop();
        assert_eq!(provider.state(), ProviderState::Stopped);
    }
}

//! Session object tying intake, provider, store, and notifier together.
//!
//! Replaces the original's global mutable state: the session owns the current
//! selection, the result store, and at most one provider handle, so
//! single-writer discipline holds by construction.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::intake::{SelectedFile, is_supported_media_type};
use crate::notify::Notifier;
use crate::provider::{ProviderEvent, ProviderState, TranscriptionBackend};
use crate::store::ResultStore;

pub struct Session {
    selected: Option<SelectedFile>,
    store: Arc<ResultStore>,
    provider: Option<Arc<dyn TranscriptionBackend>>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            selected: None,
            store: Arc::new(ResultStore::new()),
            provider: None,
        }
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Accept a candidate selection.
    ///
    /// Only `audio/*` and `video/*` media types pass; on failure the prior
    /// selection is untouched. Success discards any prior provider (the
    /// Errored → Idle reset) and sets the default document title from the
    /// filename stem.
    pub fn select(&mut self, candidate: SelectedFile) -> Result<&SelectedFile> {
        if !is_supported_media_type(&candidate.mime_type) {
            return Err(Error::UnsupportedType(candidate.mime_type));
        }

        self.provider = None;
        self.store
            .set_title(format!("Transcription: {}", candidate.stem()));
        Ok(self.selected.insert(candidate))
    }

    /// State of the active provider; Idle when none is attached.
    pub fn provider_state(&self) -> ProviderState {
        self.provider
            .as_ref()
            .map(|p| p.state())
            .unwrap_or(ProviderState::Idle)
    }

    /// Run a provider to completion, applying its events to the store.
    ///
    /// Updates and the final text land in the store; warnings route through
    /// the notifier; a fatal failure leaves the store untouched and is
    /// returned. Attaching here is what enforces "at most one active
    /// provider": any previous handle is dropped first.
    pub async fn run(
        &mut self,
        provider: Arc<dyn TranscriptionBackend>,
        notifier: &Notifier,
    ) -> Result<String> {
        self.provider = Some(Arc::clone(&provider));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.start(tx).await })
        };

        let mut outcome: Option<Result<String>> = None;
        while let Some(event) = rx.recv().await {
            match event {
                ProviderEvent::Update(text) => self.store.set(text),
                ProviderEvent::Warning(warning) => notifier.error(warning.to_string()),
                ProviderEvent::Done(text) => {
                    self.store.set(text.clone());
                    outcome = Some(Ok(text));
                }
                ProviderEvent::Failed(e) => outcome = Some(Err(e)),
            }
        }
        let _ = runner.await;

        outcome.unwrap_or_else(|| {
            Err(Error::Network(
                "provider ended without a result".to_string(),
            ))
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{EventSender, StateCell};
    use async_trait::async_trait;
    use std::path::PathBuf;

    fn candidate(name: &str, mime: &str) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            size: 2048,
            mime_type: mime.to_string(),
            path: PathBuf::from(name),
        }
    }

    /// Emits a fixed event script, then reports Stopped.
    struct ScriptedBackend {
        script: std::sync::Mutex<Vec<ProviderEvent>>,
        state: StateCell,
    }

    impl ScriptedBackend {
        fn new(script: Vec<ProviderEvent>) -> Arc<Self> {
            Arc::new(ScriptedBackend {
                script: std::sync::Mutex::new(script),
                state: StateCell::new(),
            })
        }
    }

    #[async_trait]
    impl TranscriptionBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn state(&self) -> ProviderState {
            self.state.get()
        }

        async fn start(&self, events: EventSender) {
            self.state.set(ProviderState::Running);
            for event in self.script.lock().unwrap().drain(..) {
                let _ = events.send(event);
            }
            self.state.set(ProviderState::Stopped);
        }

        fn stop(&self) {}
    }

    #[test]
    fn unsupported_candidate_keeps_prior_selection() {
        let mut session = Session::new();
        session.select(candidate("talk.mp3", "audio/mpeg")).unwrap();

        let err = session
            .select(candidate("notes.pdf", "application/pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref m) if m == "application/pdf"));
        assert_eq!(session.selected().unwrap().name, "talk.mp3");
    }

    #[test]
    fn select_resets_provider_and_titles_store() {
        let mut session = Session::new();
        session.provider = Some(ScriptedBackend::new(vec![]));
        session
            .select(candidate("interview.mp4", "video/mp4"))
            .unwrap();

        assert_eq!(session.provider_state(), ProviderState::Idle);
        assert_eq!(session.store().snapshot().title, "Transcription: interview");
    }

    #[tokio::test]
    async fn run_applies_done_to_store() {
        let mut session = Session::new();
        let notifier = Notifier::new();
        let backend = ScriptedBackend::new(vec![ProviderEvent::Done("hello".to_string())]);

        let text = session.run(backend, &notifier).await.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(session.store().snapshot().text, "hello");
    }

    #[tokio::test]
    async fn run_failure_leaves_store_untouched() {
        let mut session = Session::new();
        let notifier = Notifier::new();
        session.store().set("previous result");

        let backend = ScriptedBackend::new(vec![ProviderEvent::Failed(Error::Auth(
            "Incorrect API key".to_string(),
        ))]);

        let err = session.run(backend, &notifier).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(session.store().snapshot().text, "previous result");
    }

    #[tokio::test]
    async fn run_routes_warnings_to_notifier() {
        use crate::provider::LiveWarning;

        let mut session = Session::new();
        let notifier = Notifier::new();
        let backend = ScriptedBackend::new(vec![
            ProviderEvent::Warning(LiveWarning::NoSpeechDetected),
            ProviderEvent::Done(String::new()),
        ]);

        session.run(backend, &notifier).await.unwrap();
        let visible = notifier.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "no speech detected");
    }
}

//! Transcription providers.
//!
//! Two strategies share one capability contract: start, stop, and a stream of
//! events. [`remote::RemoteApiProvider`] uploads the selected file to a hosted
//! speech-to-text endpoint and finishes in one shot;
//! [`live::LiveRecognitionProvider`] accumulates interim and final fragments
//! from a continuous recognizer until stopped.

pub mod live;
pub mod remote;

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Error;

/// Lifecycle of a provider instance.
///
/// Idle → Running (start), Running → Stopped (stop or stream end without
/// restart), Running → Errored (unrecoverable failure). A new file selection
/// discards the provider, which is the Errored → Idle reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Idle,
    Running,
    Stopped,
    Errored,
}

/// Recoverable live-capture conditions, surfaced as warnings.
///
/// None of these halt the recognition loop; it keeps restarting while the
/// provider remains Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveWarning {
    NoSpeechDetected,
    PermissionDenied,
    CaptureFailure,
}

impl fmt::Display for LiveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LiveWarning::NoSpeechDetected => "no speech detected",
            LiveWarning::PermissionDenied => "microphone permission denied",
            LiveWarning::CaptureFailure => "audio capture failed",
        };
        write!(f, "{msg}")
    }
}

/// Events emitted while a provider runs.
#[derive(Debug)]
pub enum ProviderEvent {
    /// Latest consistent text snapshot (finalized segments plus interim tail).
    Update(String),
    /// Recoverable condition on the live path.
    Warning(LiveWarning),
    /// Final text; emitted exactly once, ends the run.
    Done(String),
    /// Fatal error; ends the run.
    Failed(Error),
}

pub type EventSender = mpsc::UnboundedSender<ProviderEvent>;

/// Shared capability contract for both transcription strategies.
///
/// At most one backend is active per session; the session enforces this by
/// holding a single handle.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn state(&self) -> ProviderState;

    /// Run the transcription, emitting events until `Done` or `Failed`.
    async fn start(&self, events: EventSender);

    /// Request the provider stop. Idempotent and safe to call when already
    /// Stopped; a no-op for backends that cannot cancel mid-flight.
    fn stop(&self);
}

/// Interior-mutable state holder shared by both provider implementations.
#[derive(Debug)]
pub(crate) struct StateCell(Mutex<ProviderState>);

impl StateCell {
    pub(crate) fn new() -> Self {
        StateCell(Mutex::new(ProviderState::Idle))
    }

    pub(crate) fn get(&self) -> ProviderState {
        *self.0.lock().unwrap()
    }

    pub(crate) fn set(&self, state: ProviderState) {
        *self.0.lock().unwrap() = state;
    }

    /// Move Running → Stopped; other states are left alone.
    pub(crate) fn stop_if_running(&self) {
        let mut guard = self.0.lock().unwrap();
        if *guard == ProviderState::Running {
            *guard = ProviderState::Stopped;
        }
    }
}

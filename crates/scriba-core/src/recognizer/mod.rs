//! Continuous speech recognition boundary.
//!
//! The live provider drives a [`SpeechRecognizer`]: one call opens a capture
//! session whose events arrive on a channel until the stream ends. The
//! production implementation streams microphone audio over a WebSocket
//! ([`websocket::WsRecognizer`]); tests script the event sequence directly.

#[cfg(feature = "live")]
pub mod websocket;

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::provider::LiveWarning;

/// One recognition hypothesis.
///
/// Interim events replace each other; a final event commits the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionEvent {
    pub text: String,
    pub is_final: bool,
}

impl RecognitionEvent {
    pub fn interim(text: impl Into<String>) -> Self {
        RecognitionEvent {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        RecognitionEvent {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Events flowing out of an open recognition session.
#[derive(Debug)]
pub enum SessionEvent {
    Recognized(RecognitionEvent),
    Warning(LiveWarning),
}

/// Failure to open a capture session.
///
/// Never fatal: the live provider reports the matching warning and keeps
/// retrying while it remains Running.
#[derive(Debug)]
pub enum SessionError {
    PermissionDenied(String),
    CaptureFailure(String),
}

impl SessionError {
    pub fn warning(&self) -> LiveWarning {
        match self {
            SessionError::PermissionDenied(_) => LiveWarning::PermissionDenied,
            SessionError::CaptureFailure(_) => LiveWarning::CaptureFailure,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::PermissionDenied(detail) => {
                write!(f, "microphone permission denied: {detail}")
            }
            SessionError::CaptureFailure(detail) => write!(f, "capture failure: {detail}"),
        }
    }
}

/// An open recognition session.
///
/// The stream has ended when `events` yields `None`. Dropping the session
/// releases its capture resources.
pub struct RecognizerSession {
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    _guard: Option<Box<dyn std::any::Any + Send>>,
}

impl RecognizerSession {
    pub fn new(events: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        RecognizerSession {
            events,
            _guard: None,
        }
    }

    /// Attach a guard whose drop tears down capture tasks.
    pub fn with_guard(
        events: mpsc::UnboundedReceiver<SessionEvent>,
        guard: Box<dyn std::any::Any + Send>,
    ) -> Self {
        RecognizerSession {
            events,
            _guard: Some(guard),
        }
    }
}

/// A continuous recognizer keyed by a language tag.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Open one capture session. Events arrive on the returned receiver until
    /// the stream ends spontaneously or the session is dropped.
    async fn start_session(&self, language: Option<&str>)
    -> Result<RecognizerSession, SessionError>;
}

//! Failure taxonomy shared across the transcription pipeline.
//!
//! Fatal errors end the current attempt and are surfaced to the user verbatim.
//! The live path additionally reports recoverable conditions as
//! [`LiveWarning`](crate::provider::LiveWarning)s, which never end the session
//! on their own.

use thiserror::Error;

/// Errors surfaced by intake, providers, export, and clipboard.
#[derive(Debug, Error)]
pub enum Error {
    /// The selected file's declared media type is neither `audio/*` nor `video/*`.
    #[error("unsupported file type '{0}': only audio and video files are accepted")]
    UnsupportedType(String),

    /// Missing or rejected API credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure before an HTTP status was received.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response from the transcription endpoint.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Every clipboard method failed.
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// Filesystem failure while reading the selection or writing an export.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error came from the credential rather than the service.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

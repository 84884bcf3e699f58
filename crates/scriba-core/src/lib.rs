pub mod audio;
#[cfg(feature = "clipboard")]
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod intake;
pub mod notify;
pub mod provider;
pub mod recognizer;
pub mod resample;
pub mod session;
pub mod settings;
pub mod store;
pub mod verbose;

#[cfg(feature = "clipboard")]
pub use clipboard::copy_to_clipboard;
pub use config::ProviderKind;
pub use error::Error;
pub use export::{ExportFormat, sanitize_filename, to_plain_text, to_rich_text, write_export};
pub use http::{DEFAULT_TIMEOUT_SECS, get_http_client};
pub use intake::{SelectedFile, format_file_size};
pub use notify::{Notifier, Severity};
pub use provider::{
    LiveWarning, ProviderEvent, ProviderState, TranscriptionBackend,
    live::LiveRecognitionProvider,
    remote::{RemoteApiConfig, RemoteApiProvider, UploadRequest},
};
pub use recognizer::SpeechRecognizer;
#[cfg(feature = "live")]
pub use recognizer::websocket::{WsRecognizer, WsRecognizerConfig};
pub use session::Session;
pub use settings::Settings;
pub use store::{ResultStore, Transcript};
pub use verbose::set_verbose;

//! Remote transcription provider.
//!
//! One multipart upload of the selected file to an OpenAI-compatible
//! speech-to-text endpoint: `file` + `model` fields, optional `language` hint,
//! bearer-token credential. Success is a JSON object with a `text` field;
//! errors carry `error.message`, falling back to the HTTP status text.
//!
//! No retry is attempted: a single failure terminates the attempt and the
//! message is surfaced to the caller verbatim.

use async_trait::async_trait;
use serde::Deserialize;

use super::{EventSender, ProviderEvent, ProviderState, StateCell, TranscriptionBackend};
use crate::error::{Error, Result};
use crate::http::get_http_client;
use crate::intake::SelectedFile;

/// Configuration for the remote endpoint.
#[derive(Debug, Clone)]
pub struct RemoteApiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub language: Option<String>,
}

/// The file payload to upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl UploadRequest {
    pub fn from_selection(file: &SelectedFile) -> Result<Self> {
        Ok(UploadRequest {
            data: file.read_bytes()?,
            filename: file.name.clone(),
            mime_type: file.mime_type.clone(),
        })
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Uploads the selection once and emits `Done` with the final text.
///
/// `stop()` is a no-op: the upload is not cancellable mid-flight.
pub struct RemoteApiProvider {
    config: RemoteApiConfig,
    upload: UploadRequest,
    state: StateCell,
}

impl RemoteApiProvider {
    pub fn new(config: RemoteApiConfig, upload: UploadRequest) -> Self {
        RemoteApiProvider {
            config,
            upload,
            state: StateCell::new(),
        }
    }

    async fn transcribe(&self) -> Result<String> {
        let endpoint = validate_endpoint(&self.config.endpoint)?;

        if self.config.api_key.trim().is_empty() {
            return Err(Error::Auth(
                "no API credential configured; set one with `scriba config` or the SCRIBA_API_KEY \
                 environment variable"
                    .to_string(),
            ));
        }

        let client = get_http_client().map_err(|e| Error::Network(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.config.model.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(self.upload.data.clone())
                    .file_name(self.upload.filename.clone())
                    .mime_str(&self.upload.mime_type)
                    .map_err(|e| Error::Network(e.to_string()))?,
            );

        if let Some(lang) = self.config.language.clone() {
            form = form.text("language", lang);
        }

        crate::verbose!(
            "Uploading {} ({} bytes) to {}",
            self.upload.filename,
            self.upload.data.len(),
            endpoint
        );

        let response = client
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), &body));
        }

        decode_success(&body)
    }
}

#[async_trait]
impl TranscriptionBackend for RemoteApiProvider {
    fn name(&self) -> &'static str {
        "remote-api"
    }

    fn state(&self) -> ProviderState {
        self.state.get()
    }

    async fn start(&self, events: EventSender) {
        self.state.set(ProviderState::Running);

        match self.transcribe().await {
            Ok(text) => {
                self.state.set(ProviderState::Stopped);
                let _ = events.send(ProviderEvent::Done(text));
            }
            Err(e) => {
                self.state.set(ProviderState::Errored);
                let _ = events.send(ProviderEvent::Failed(e));
            }
        }
    }

    fn stop(&self) {
        // Not cancellable once the upload is in flight.
    }
}

/// Check the endpoint is a plausible http(s) URL before building a request.
fn validate_endpoint(endpoint: &str) -> Result<&str> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(Error::Network(
            "transcription endpoint not configured".to_string(),
        ));
    }
    let after_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match after_scheme {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(trimmed),
        _ => Err(Error::Network(format!(
            "invalid transcription endpoint '{trimmed}': expected an http(s) URL with a host"
        ))),
    }
}

/// Decode a 2xx response body.
fn decode_success(body: &str) -> Result<String> {
    let resp: TranscriptionResponse = serde_json::from_str(body)
        .map_err(|e| Error::Network(format!("failed to parse API response: {e}")))?;
    Ok(resp.text)
}

/// Map a non-2xx response to the error taxonomy.
///
/// 401/403 become `Auth`; everything else is `Api` with the decoded
/// `error.message`, falling back to the HTTP status text.
fn error_for_status(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|r| r.error.message)
        .unwrap_or_else(|_| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        401 | 403 => Error::Auth(message),
        _ => Error::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_yields_text() {
        assert_eq!(decode_success(r#"{"text":"hello"}"#).unwrap(), "hello");
        assert!(decode_success("not json").is_err());
    }

    #[test]
    fn unauthorized_maps_to_auth_error() {
        let err = error_for_status(401, r#"{"error":{"message":"Incorrect API key"}}"#);
        assert!(matches!(err, Error::Auth(ref m) if m == "Incorrect API key"));
    }

    #[test]
    fn other_statuses_map_to_api_error() {
        let err = error_for_status(429, r#"{"error":{"message":"Rate limit reached"}}"#);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undecodable_error_body_falls_back_to_status_text() {
        let err = error_for_status(500, "<html>oops</html>");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn endpoint_validation() {
        assert!(validate_endpoint("https://api.openai.com/v1/audio/transcriptions").is_ok());
        assert!(validate_endpoint("http://localhost:8765/v1/audio/transcriptions").is_ok());
        assert!(validate_endpoint("").is_err());
        assert!(validate_endpoint("ftp://example.com").is_err());
        assert!(validate_endpoint("https:///nohost").is_err());
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let provider = RemoteApiProvider::new(
            RemoteApiConfig {
                endpoint: "https://api.example.com/v1/audio/transcriptions".to_string(),
                model: "whisper-1".to_string(),
                api_key: "  ".to_string(),
                language: None,
            },
            UploadRequest {
                data: vec![1, 2, 3],
                filename: "clip.mp3".to_string(),
                mime_type: "audio/mpeg".to_string(),
            },
        );

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        provider.start(tx).await;

        match rx.recv().await {
            Some(ProviderEvent::Failed(e)) => assert!(e.is_auth()),
            other => panic!("expected auth failure, got {other:?}"),
        }
        assert_eq!(provider.state(), ProviderState::Errored);
    }
}

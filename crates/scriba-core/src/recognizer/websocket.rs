//! WebSocket streaming recognizer.
//!
//! Opens a live-listening WebSocket session, streams microphone audio as
//! PCM16 binary frames, and translates interim/final transcript messages into
//! [`SessionEvent`]s. A keepalive task holds the connection open during
//! silence. The session ends when the server closes the socket or the session
//! is dropped, whichever comes first.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        Message,
        client::IntoClientRequest,
        http::header::{AUTHORIZATION, HeaderValue},
    },
};

use super::{RecognitionEvent, RecognizerSession, SessionError, SessionEvent, SpeechRecognizer};
use crate::audio::{CaptureFormat, start_capture};
use crate::provider::LiveWarning;
use crate::resample::{RECOGNIZER_SAMPLE_RATE, resample_to_16k};

const CONNECT_TIMEOUT_SECS: u64 = 30;
/// Keepalive interval; well under the server's idle timeout
const KEEPALIVE_INTERVAL_SECS: u64 = 4;
/// Audio is batched to roughly this many 16kHz samples per frame (~200ms)
const FRAME_SAMPLES: usize = 3200;

/// Endpoint, model, and credential for the streaming service.
#[derive(Debug, Clone)]
pub struct WsRecognizerConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

/// Production [`SpeechRecognizer`] backed by a streaming WebSocket API.
pub struct WsRecognizer {
    config: WsRecognizerConfig,
}

impl WsRecognizer {
    pub fn new(config: WsRecognizerConfig) -> Self {
        WsRecognizer { config }
    }
}

// Server message shapes

#[derive(Deserialize, Debug)]
struct WsEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    is_final: bool,
    #[serde(default)]
    channel: Option<Channel>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Channel {
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize, Debug)]
struct Alternative {
    transcript: String,
}

/// Tears down the session's tasks and capture when dropped.
struct SessionTasks {
    _capture: crate::audio::CaptureHandle,
    forward: JoinHandle<()>,
    keepalive: JoinHandle<()>,
    read: JoinHandle<()>,
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        self.forward.abort();
        self.keepalive.abort();
        self.read.abort();
    }
}

#[async_trait]
impl SpeechRecognizer for WsRecognizer {
    async fn start_session(
        &self,
        language: Option<&str>,
    ) -> Result<RecognizerSession, SessionError> {
        // Capture first: permission problems surface before any network work.
        let (audio_tx, audio_rx) = mpsc::unbounded_channel::<Vec<f32>>();
        let (capture, format) = start_capture(audio_tx)?;

        let mut url = format!(
            "{}?model={}&encoding=linear16&sample_rate={}&channels=1&interim_results=true",
            self.config.endpoint, self.config.model, RECOGNIZER_SAMPLE_RATE
        );
        if let Some(lang) = language {
            url.push_str(&format!("&language={lang}"));
        }

        let mut request = url
            .into_client_request()
            .map_err(|e| SessionError::CaptureFailure(format!("invalid recognizer URL: {e}")))?;
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Token {}", self.config.api_key))
                .map_err(|e| SessionError::CaptureFailure(format!("invalid credential: {e}")))?,
        );

        let (ws_stream, _response) = timeout(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            connect_async(request),
        )
        .await
        .map_err(|_| SessionError::CaptureFailure("recognizer connection timeout".into()))?
        .map_err(|e| SessionError::CaptureFailure(format!("recognizer connection failed: {e}")))?;

        let (write, read) = ws_stream.split();
        let write = Arc::new(Mutex::new(write));

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let forward = tokio::spawn(forward_audio(Arc::clone(&write), audio_rx, format));
        let keepalive = tokio::spawn(keepalive_task(Arc::clone(&write)));
        let read = tokio::spawn(read_events(read, event_tx));

        let tasks = SessionTasks {
            _capture: capture,
            forward,
            keepalive,
            read,
        };

        Ok(RecognizerSession::with_guard(event_rx, Box::new(tasks)))
    }
}

type WsSink = futures_util::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    Message,
>;

type WsSource = futures_util::stream::SplitStream<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
>;

/// Batch captured samples, resample to 16kHz mono, and send PCM16 frames.
async fn forward_audio(
    write: Arc<Mutex<WsSink>>,
    mut audio_rx: mpsc::UnboundedReceiver<Vec<f32>>,
    format: CaptureFormat,
) {
    // Batch in native-rate samples so each resample call sees ~FRAME_SAMPLES
    // of 16kHz output.
    let native_batch =
        FRAME_SAMPLES * format.channels as usize * format.sample_rate as usize
            / RECOGNIZER_SAMPLE_RATE as usize;
    let mut pending: Vec<f32> = Vec::with_capacity(native_batch);

    while let Some(samples) = audio_rx.recv().await {
        pending.extend_from_slice(&samples);
        if pending.len() < native_batch {
            continue;
        }

        let batch = std::mem::take(&mut pending);
        let resampled = match resample_to_16k(&batch, format.sample_rate, format.channels) {
            Ok(resampled) => resampled,
            Err(e) => {
                crate::verbose!("resampling failed, dropping frame: {e}");
                continue;
            }
        };

        let bytes: Vec<u8> = resampled
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .flat_map(|s| s.to_le_bytes())
            .collect();

        if write
            .lock()
            .await
            .send(Message::Binary(bytes.into()))
            .await
            .is_err()
        {
            break;
        }
    }

    // Capture ended: ask the server to flush and close.
    let _ = write
        .lock()
        .await
        .send(Message::Text(
            r#"{"type":"CloseStream"}"#.to_string().into(),
        ))
        .await;
}

async fn keepalive_task(write: Arc<Mutex<WsSink>>) {
    let mut interval = tokio::time::interval(Duration::from_secs(KEEPALIVE_INTERVAL_SECS));
    loop {
        interval.tick().await;
        if write
            .lock()
            .await
            .send(Message::Text(r#"{"type":"KeepAlive"}"#.to_string().into()))
            .await
            .is_err()
        {
            break;
        }
    }
}

/// Translate server messages into session events until the socket closes.
async fn read_events(mut read: WsSource, events: mpsc::UnboundedSender<SessionEvent>) {
    while let Some(message) = read.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let event: WsEvent = match serde_json::from_str(&text) {
            Ok(event) => event,
            Err(e) => {
                crate::verbose!("unparseable recognizer message: {e}");
                continue;
            }
        };

        match event.event_type.as_str() {
            "Results" => {
                let transcript = event
                    .channel
                    .as_ref()
                    .and_then(|c| c.alternatives.first())
                    .map(|a| a.transcript.as_str())
                    .unwrap_or("");

                let session_event = if transcript.is_empty() && event.is_final {
                    SessionEvent::Warning(LiveWarning::NoSpeechDetected)
                } else if transcript.is_empty() {
                    continue;
                } else {
                    SessionEvent::Recognized(RecognitionEvent {
                        text: transcript.to_string(),
                        is_final: event.is_final,
                    })
                };

                if events.send(session_event).is_err() {
                    break;
                }
            }
            "Error" => {
                crate::verbose!(
                    "recognizer error: {}",
                    event.description.as_deref().unwrap_or("unknown")
                );
                if events.send(SessionEvent::Warning(LiveWarning::CaptureFailure)).is_err() {
                    break;
                }
            }
            _ => {}
        }
    }
    // events sender dropped here: downstream sees end-of-stream
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_messages_decode_transcripts() {
        let raw = r#"{"type":"Results","is_final":true,
            "channel":{"alternatives":[{"transcript":"hello world","confidence":0.98}]}}"#;
        let event: WsEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, "Results");
        assert!(event.is_final);
        assert_eq!(
            event.channel.unwrap().alternatives[0].transcript,
            "hello world"
        );
    }

    #[test]
    fn error_messages_decode_description() {
        let raw = r#"{"type":"Error","description":"bad frame"}"#;
        let event: WsEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, "Error");
        assert_eq!(event.description.as_deref(), Some("bad frame"));
    }
}

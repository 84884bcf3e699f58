//! cpal input capture feeding an unbounded sample channel.
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread for the
//! lifetime of the capture; dropping the [`CaptureHandle`] signals that thread
//! to tear the stream down. Samples are forwarded as interleaved f32 chunks in
//! the device's native rate and channel count; the recognizer transport
//! resamples them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use tokio::sync::mpsc;

use crate::recognizer::SessionError;

/// Per-capture stream error counter, for rate-limited reporting.
static STREAM_ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

/// Native format of the captured samples.
#[derive(Debug, Clone, Copy)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Keeps the capture thread alive; dropping stops the stream.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Open the default input device and stream its samples into `tx`.
///
/// Fails with `PermissionDenied` or `CaptureFailure`; both are recoverable
/// conditions the live provider reports as warnings and retries.
pub fn start_capture(
    tx: mpsc::UnboundedSender<Vec<f32>>,
) -> Result<(CaptureHandle, CaptureFormat), SessionError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| SessionError::CaptureFailure("no audio input device available".into()))?;

    let supported = device
        .default_input_config()
        .map_err(|e| classify_capture_error(&e.to_string()))?;

    let format = CaptureFormat {
        sample_rate: supported.sample_rate(),
        channels: supported.channels(),
    };
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();

    STREAM_ERROR_COUNT.store(0, Ordering::Relaxed);

    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);

    std::thread::spawn(move || {
        if let Err(e) = run_stream(&device, &config, sample_format, tx, &thread_stop) {
            crate::verbose!("capture stream ended with error: {e}");
        }
    });

    Ok((CaptureHandle { stop }, format))
}

/// Build and run the input stream until the stop flag is set.
///
/// Runs on the capture thread; the sample channel closes when this returns,
/// which is how downstream consumers observe end-of-capture.
fn run_stream(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    tx: mpsc::UnboundedSender<Vec<f32>>,
    stop: &AtomicBool,
) -> Result<(), String> {
    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(device, config, tx),
        SampleFormat::I16 => build_stream::<i16>(device, config, tx),
        SampleFormat::U16 => build_stream::<u16>(device, config, tx),
        other => Err(format!("unsupported sample format: {other:?}")),
    }?;

    stream.play().map_err(|e| e.to_string())?;

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    // Stream dropped here, which closes the device.
    Ok(())
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    tx: mpsc::UnboundedSender<Vec<f32>>,
) -> Result<cpal::Stream, String>
where
    T: cpal::Sample + cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    // Non-fatal stream errors are common on Linux; report once, then suppress.
    let err_fn = |err| {
        let count = STREAM_ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
        if count == 0 {
            crate::verbose!("audio stream error (non-fatal, further errors suppressed): {err}");
        }
    };

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> = data.iter().map(|&s| cpal::Sample::from_sample(s)).collect();
                // Unbounded send never blocks the audio thread; a closed
                // receiver just means the session is over.
                let _ = tx.send(samples);
            },
            err_fn,
            None,
        )
        .map_err(|e| e.to_string())
}

/// Distinguish permission problems from other capture failures.
fn classify_capture_error(detail: &str) -> SessionError {
    let lowered = detail.to_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") {
        SessionError::PermissionDenied(detail.to_string())
    } else {
        SessionError::CaptureFailure(detail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_are_classified() {
        assert!(matches!(
            classify_capture_error("Operation not permitted: permission denied by user"),
            SessionError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_capture_error("device disconnected"),
            SessionError::CaptureFailure(_)
        ));
    }
}

//! Microphone capture for the live recognition path.

mod capture;

pub use capture::{CaptureFormat, CaptureHandle, start_capture};

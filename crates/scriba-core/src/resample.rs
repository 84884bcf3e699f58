//! Conversion of captured audio into the 16kHz mono stream the recognizer
//! consumes. Input arrives interleaved at whatever rate and channel count the
//! capture device reports.

use anyhow::{Context, Result};
use rubato::{FftFixedIn, Resampler};

/// Sample rate the streaming recognizer consumes
pub const RECOGNIZER_SAMPLE_RATE: u32 = 16000;

/// Nominal frames fed to the resampler per call.
const CHUNK_FRAMES: usize = 1024;

/// Convert interleaved capture samples to 16kHz mono.
///
/// Multi-channel input is downmixed first; input already at 16kHz skips the
/// resampler entirely.
pub fn resample_to_16k(samples: &[f32], source_rate: u32, channels: u16) -> Result<Vec<f32>> {
    let mono = if channels > 1 {
        downmix_to_mono(samples, channels)
    } else {
        samples.to_vec()
    };

    if source_rate == RECOGNIZER_SAMPLE_RATE {
        return Ok(mono);
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        RECOGNIZER_SAMPLE_RATE as usize,
        CHUNK_FRAMES,
        2,
        1,
    )
    .context("Failed to create resampler")?;

    let frames_in = resampler.input_frames_max();
    let mut out = Vec::new();
    for chunk in mono.chunks(frames_in) {
        // The tail chunk is zero-padded up to a full resampler frame.
        let mut frame = chunk.to_vec();
        frame.resize(frames_in, 0.0);
        let processed = resampler
            .process(&[frame], None)
            .context("Resampling failed")?;
        out.extend_from_slice(&processed[0]);
    }

    Ok(out)
}

/// Average each interleaved frame down to a single sample.
fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_interleaved_frames() {
        let quad = [1.0, 0.0, -1.0, 0.0, 0.2, 0.4, 0.6, 0.8];
        let mono = downmix_to_mono(&quad, 4);
        assert_eq!(mono.len(), 2);
        assert!(mono[0].abs() < 1e-6);
        assert!((mono[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn already_16k_mono_is_returned_unchanged() {
        let samples: Vec<f32> = (0..64).map(|i| (i as f32 * 0.4).sin()).collect();
        assert_eq!(resample_to_16k(&samples, 16000, 1).unwrap(), samples);
    }

    #[test]
    fn stereo_16k_input_only_needs_the_downmix() {
        let stereo = [0.25, 0.75, -0.5, 0.5];
        assert_eq!(resample_to_16k(&stereo, 16000, 2).unwrap(), vec![0.5, 0.0]);
    }

    #[test]
    fn output_length_tracks_the_rate_ratio() {
        // 0.1s at 48kHz should come out near 0.1s at 16kHz, plus at most one
        // zero-padded tail chunk.
        let samples = vec![0.0f32; 4800];
        let out = resample_to_16k(&samples, 48000, 1).unwrap();
        assert!(
            (1600..2800).contains(&out.len()),
            "unexpected output length {}",
            out.len()
        );
    }
}

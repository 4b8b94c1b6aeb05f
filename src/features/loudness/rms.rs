//! Windowed RMS loudness in dBFS
//!
//! Algorithm, per channel:
//! 1. Split the samples into consecutive one-second windows (`sample_rate`
//!    samples each, the last one may be shorter)
//! 2. Mean square per window
//! 3. Average of the window mean squares
//! 4. Square root (RMS), then `20 * log10(RMS)`
//!
//! Silence and empty input yield `f64::NEG_INFINITY`, never NaN.
//!
//! # Example
//!
//! ```
//! use tonemeter_dsp::features::loudness::{measure, Channels};
//! use tonemeter_dsp::io::SampleBuffer;
//!
//! let buffer = SampleBuffer::from_planar(vec![vec![0.5f32; 88200]], 44100)?;
//! let loudness = measure(&buffer, Channels::Mono);
//! assert!((loudness.avg.rms_db + 6.0206).abs() < 1e-3);
//! # Ok::<(), tonemeter_dsp::AnalysisError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::io::{load, SampleBuffer};

/// Channels to measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channels {
    /// First channel only
    Mono,
    /// Both channels when the buffer is stereo, first channel otherwise
    Stereo,
}

impl Channels {
    /// Map a requested channel count (1 or 2) to a selection
    pub fn from_count(count: usize) -> Self {
        if count >= 2 {
            Channels::Stereo
        } else {
            Channels::Mono
        }
    }
}

/// Loudness of a single channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelLoudness {
    /// RMS level in dBFS, `-inf` for silence
    pub rms_db: f64,
}

/// Combined loudness across the measured channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageLoudness {
    /// Arithmetic mean of the channel dB values
    pub rms_db: f64,
    /// Sample rate of the measured buffer
    pub sample_rate: u32,
}

/// Result of [`measure`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessMeasurement {
    /// First channel
    pub channel0: ChannelLoudness,
    /// Second channel, present for stereo measurements of stereo buffers
    pub channel1: Option<ChannelLoudness>,
    /// Average over the measured channels
    pub avg: AverageLoudness,
}

/// Measure windowed RMS loudness of a buffer
///
/// For stereo measurements the average is the mean of the two dB values, not
/// a power-domain average.
pub fn measure(buffer: &SampleBuffer, channels: Channels) -> LoudnessMeasurement {
    let sample_rate = buffer.sample_rate();
    let first = buffer.channel(0).unwrap_or(&[]);

    let channel0 = ChannelLoudness {
        rms_db: rms_db(first, sample_rate as usize),
    };

    let channel1 = match (channels, buffer.stereo_pair()) {
        (Channels::Stereo, Some((_, right))) => Some(ChannelLoudness {
            rms_db: rms_db(right, sample_rate as usize),
        }),
        _ => None,
    };

    let avg_db = match channel1 {
        Some(second) => (channel0.rms_db + second.rms_db) / 2.0,
        None => channel0.rms_db,
    };

    log::debug!(
        "Measured loudness over {} channel(s): avg={:.2} dBFS",
        if channel1.is_some() { 2 } else { 1 },
        avg_db
    );

    LoudnessMeasurement {
        channel0,
        channel1,
        avg: AverageLoudness {
            rms_db: avg_db,
            sample_rate,
        },
    }
}

/// Decode a file and measure it
///
/// # Errors
///
/// Returns `AnalysisError::DecodingError` if the file cannot be decoded.
pub fn measure_file<P: AsRef<Path>>(
    path: P,
    channels: Channels,
) -> Result<LoudnessMeasurement, AnalysisError> {
    let buffer = load(path, None)?;
    Ok(measure(&buffer, channels))
}

/// RMS level of one channel in dBFS using windows of `window_size` samples
///
/// A `window_size` of zero measures the whole channel as one window.
pub fn rms_db(samples: &[f32], window_size: usize) -> f64 {
    let window_size = if window_size == 0 {
        samples.len().max(1)
    } else {
        window_size
    };

    let (sum_mean_squares, window_count) = samples
        .chunks(window_size)
        .map(|window| {
            let sum_sq: f64 = window.iter().map(|&x| (x as f64) * (x as f64)).sum();
            sum_sq / window.len() as f64
        })
        .fold((0.0f64, 0usize), |(sum, count), ms| (sum + ms, count + 1));

    if window_count == 0 {
        log::debug!("Empty channel, reporting -inf dBFS");
        return f64::NEG_INFINITY;
    }

    let rms = (sum_mean_squares / window_count as f64).sqrt();
    let db = 20.0 * rms.log10();

    if db.is_nan() || db == f64::NEG_INFINITY {
        log::debug!("Silent or undefined RMS, reporting -inf dBFS");
        f64::NEG_INFINITY
    } else {
        db
    }
}

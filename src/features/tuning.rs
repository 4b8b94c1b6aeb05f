//! Tuning frequency estimation
//!
//! Estimates the concert pitch (frequency of A4) a recording was tuned to.
//!
//! Algorithm:
//! 1. Pick spectral peaks per frame
//! 2. Measure each peak's deviation from the nearest 440 Hz equal-tempered
//!    pitch, in cents (-50 to +50)
//! 3. Accumulate a magnitude-weighted circular histogram of deviations
//! 4. Take the weighted mean deviation around the histogram maximum
//! 5. Tuning = `440 * 2^(deviation / 1200)`

use rustfft::FftPlanner;

use crate::error::AnalysisError;
use crate::features::chroma::peaks::{spectral_peaks, PeakParams};

/// Standard concert pitch in Hz
pub const STANDARD_TUNING: f32 = 440.0;

/// Histogram bins over one semitone (1 cent each)
const BINS: usize = 100;

/// Tuning estimation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningParams {
    /// Framing and peak selection
    pub peaks: PeakParams,
}

impl Default for TuningParams {
    fn default() -> Self {
        Self {
            peaks: PeakParams {
                frame_size: 4096,
                hop_size: 2048,
                min_freq: 80.0,
                max_freq: 5000.0,
                max_peaks: 20,
            },
        }
    }
}

/// Estimate the tuning frequency (A4) of mono samples in Hz
///
/// Signals without spectral peaks report the standard 440 Hz.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty samples, a zero sample
/// rate or invalid framing.
///
/// # Example
///
/// ```
/// use rustfft::FftPlanner;
/// use tonemeter_dsp::features::tuning::{estimate_tuning_frequency, TuningParams};
///
/// // A4 played 20 cents sharp
/// let freq = 440.0 * 2f32.powf(20.0 / 1200.0);
/// let samples: Vec<f32> = (0..44100)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / 44100.0).sin())
///     .collect();
///
/// let mut planner = FftPlanner::new();
/// let tuning = estimate_tuning_frequency(&mut planner, &samples, 44100, &TuningParams::default())?;
/// assert!((tuning - freq).abs() < 1.5);
/// # Ok::<(), tonemeter_dsp::AnalysisError>(())
/// ```
pub fn estimate_tuning_frequency(
    planner: &mut FftPlanner<f32>,
    samples: &[f32],
    sample_rate: u32,
    params: &TuningParams,
) -> Result<f32, AnalysisError> {
    let frames = spectral_peaks(planner, samples, sample_rate, &params.peaks)?;

    let mut weights = [0.0f32; BINS];
    let mut deviation_sums = [0.0f32; BINS];

    for peak in frames.iter().flatten() {
        let cents = 1200.0 * (peak.frequency / STANDARD_TUNING).log2();
        let deviation = cents - 100.0 * (cents / 100.0).round();
        let bin = ((deviation + 50.0).floor() as usize).min(BINS - 1);
        weights[bin] += peak.magnitude;
        deviation_sums[bin] += peak.magnitude * deviation;
    }

    let Some(deviation) = dominant_deviation(&weights, &deviation_sums) else {
        log::warn!(
            "No spectral peaks for tuning estimation, assuming {} Hz",
            STANDARD_TUNING
        );
        return Ok(STANDARD_TUNING);
    };

    let tuning = STANDARD_TUNING * 2f32.powf(deviation / 1200.0);
    log::debug!(
        "Tuning estimate: {:.2} Hz ({:+.1} cents)",
        tuning,
        deviation
    );

    Ok(tuning)
}

/// Weighted mean deviation of the strongest bin and its two circular neighbours
fn dominant_deviation(weights: &[f32; BINS], deviation_sums: &[f32; BINS]) -> Option<f32> {
    let (best, &best_weight) = weights
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;

    if best_weight <= 0.0 {
        return None;
    }

    let (mut total_weight, mut total_deviation) = (0.0f32, 0.0f32);
    for offset in [-1i32, 0, 1] {
        let position = best as i32 + offset;
        let index = position.rem_euclid(BINS as i32) as usize;
        // Bins across the ±50 cent seam are a semitone away in raw deviation
        let shift = match position {
            p if p < 0 => -100.0,
            p if p >= BINS as i32 => 100.0,
            _ => 0.0,
        };
        total_weight += weights[index];
        total_deviation += deviation_sums[index] + shift * weights[index];
    }

    let mean = total_deviation / total_weight;
    // Back into [-50, 50)
    Some(mean - 100.0 * ((mean + 50.0) / 100.0).floor())
}

//! Spectral peak picking
//!
//! Frames the signal with a Hann window, takes the magnitude spectrum of each
//! frame and keeps the strongest local maxima inside a frequency band.
//! Peak positions and heights are refined by parabolic interpolation on the
//! log magnitude. Frames are processed in parallel.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::AnalysisError;

/// Magnitudes below this (after amplitude normalization) are not peaks
const MAGNITUDE_FLOOR: f32 = 1e-4;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-12;

/// A spectral peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Interpolated frequency in Hz
    pub frequency: f32,
    /// Interpolated magnitude; a full-scale sine peaks near 1.0
    pub magnitude: f32,
}

/// Framing and selection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakParams {
    /// FFT frame size in samples
    pub frame_size: usize,
    /// Hop between frames in samples
    pub hop_size: usize,
    /// Lowest accepted peak frequency in Hz
    pub min_freq: f32,
    /// Highest accepted peak frequency in Hz
    pub max_freq: f32,
    /// Maximum peaks kept per frame, strongest first
    pub max_peaks: usize,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            frame_size: 4096,
            hop_size: 4096,
            min_freq: 25.0,
            max_freq: 3500.0,
            max_peaks: 60,
        }
    }
}

/// Spectral peaks of every frame
///
/// A signal shorter than one frame is zero-padded into a single frame.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty input, a zero sample
/// rate, zero frame or hop size, or an empty frequency band.
pub fn spectral_peaks(
    planner: &mut FftPlanner<f32>,
    samples: &[f32],
    sample_rate: u32,
    params: &PeakParams,
) -> Result<Vec<Vec<SpectralPeak>>, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty audio samples".to_string(),
        ));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate".to_string(),
        ));
    }
    if params.frame_size < 4 || params.hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid framing: frame_size={}, hop_size={}",
            params.frame_size, params.hop_size
        )));
    }
    if !(params.min_freq < params.max_freq) {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid frequency band: {} Hz to {} Hz",
            params.min_freq, params.max_freq
        )));
    }

    let frame_size = params.frame_size;
    let n_frames = if samples.len() <= frame_size {
        1
    } else {
        1 + (samples.len() - frame_size) / params.hop_size
    };

    let fft = planner.plan_fft_forward(frame_size);
    let window = hann_window(frame_size);
    // Hann coherent gain is 0.5, so a sine of amplitude A peaks at A * N / 4
    let scale = 4.0 / frame_size as f32;

    log::debug!(
        "Picking spectral peaks: {} frames of {} samples, band {:.0}-{:.0} Hz",
        n_frames,
        frame_size,
        params.min_freq,
        params.max_freq
    );

    let peaks = (0..n_frames)
        .into_par_iter()
        .map(|frame_idx| {
            let start = frame_idx * params.hop_size;
            let end = (start + frame_size).min(samples.len());
            let magnitudes = magnitude_spectrum(&fft, &samples[start..end], &window, scale);
            pick_peaks(&magnitudes, sample_rate, frame_size, params)
        })
        .collect();

    Ok(peaks)
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos())
        })
        .collect()
}

/// Magnitudes of bins `0..=N/2` of one windowed, zero-padded frame
fn magnitude_spectrum(
    fft: &Arc<dyn Fft<f32>>,
    frame: &[f32],
    window: &[f32],
    scale: f32,
) -> Vec<f32> {
    let mut buffer: Vec<Complex<f32>> = window
        .iter()
        .enumerate()
        .map(|(i, &w)| Complex::new(frame.get(i).copied().unwrap_or(0.0) * w, 0.0))
        .collect();

    fft.process(&mut buffer);

    buffer[..=window.len() / 2]
        .iter()
        .map(|c| c.norm() * scale)
        .collect()
}

fn pick_peaks(
    magnitudes: &[f32],
    sample_rate: u32,
    frame_size: usize,
    params: &PeakParams,
) -> Vec<SpectralPeak> {
    let bin_hz = sample_rate as f32 / frame_size as f32;
    let mut peaks: Vec<SpectralPeak> = Vec::new();

    for k in 1..magnitudes.len().saturating_sub(1) {
        let (left, center, right) = (magnitudes[k - 1], magnitudes[k], magnitudes[k + 1]);
        if center < MAGNITUDE_FLOOR || center <= left || center < right {
            continue;
        }

        let a = (left + EPSILON).ln();
        let b = (center + EPSILON).ln();
        let c = (right + EPSILON).ln();
        let denom = a - 2.0 * b + c;
        let offset = if denom.abs() > EPSILON {
            (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };

        let frequency = (k as f32 + offset) * bin_hz;
        if frequency < params.min_freq || frequency > params.max_freq {
            continue;
        }

        peaks.push(SpectralPeak {
            frequency,
            magnitude: (b - 0.25 * (a - c) * offset).exp(),
        });
    }

    peaks.sort_by(|x, y| {
        y.magnitude
            .partial_cmp(&x.magnitude)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    peaks.truncate(params.max_peaks);
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amplitude: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_single_sine_peak() {
        let mut planner = FftPlanner::new();
        let samples = sine(440.0, 0.5, 44100, 44100);
        let frames = spectral_peaks(&mut planner, &samples, 44100, &PeakParams::default()).unwrap();

        assert_eq!(frames.len(), 1 + (44100 - 4096) / 4096);
        for peaks in &frames {
            let strongest = peaks[0];
            assert!(
                (strongest.frequency - 440.0).abs() < 1.0,
                "peak at {:.2} Hz",
                strongest.frequency
            );
            assert!((strongest.magnitude - 0.5).abs() < 0.05);
        }
    }

    #[test]
    fn test_band_limits() {
        let mut planner = FftPlanner::new();
        let samples = sine(5000.0, 0.5, 44100, 8192);
        let frames = spectral_peaks(&mut planner, &samples, 44100, &PeakParams::default()).unwrap();
        assert!(frames.iter().all(|peaks| peaks
            .iter()
            .all(|p| p.frequency <= 3500.0 && p.magnitude < 0.05)));
    }

    #[test]
    fn test_short_signal_is_one_frame() {
        let mut planner = FftPlanner::new();
        let samples = sine(1000.0, 0.5, 44100, 1000);
        let frames = spectral_peaks(&mut planner, &samples, 44100, &PeakParams::default()).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_silence_has_no_peaks() {
        let mut planner = FftPlanner::new();
        let frames =
            spectral_peaks(&mut planner, &vec![0.0; 16384], 44100, &PeakParams::default()).unwrap();
        assert!(frames.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_invalid_input() {
        let mut planner = FftPlanner::new();
        let params = PeakParams::default();
        assert!(spectral_peaks(&mut planner, &[], 44100, &params).is_err());
        assert!(spectral_peaks(&mut planner, &[0.1; 10], 0, &params).is_err());

        let inverted = PeakParams {
            min_freq: 500.0,
            max_freq: 100.0,
            ..params
        };
        assert!(spectral_peaks(&mut planner, &[0.1; 10], 44100, &inverted).is_err());
    }
}

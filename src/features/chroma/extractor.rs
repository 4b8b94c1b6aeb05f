//! Chroma vector extraction
//!
//! Converts spectral peaks to 12-element pitch-class profiles (HPCP style).
//! Each peak adds its squared magnitude to the nearest pitch class, weighted
//! by `cos²(π·d)` where `d` is its distance from that pitch in semitones.
//! Pitch classes are relative to a tuning reference for A4, so the same
//! extractor serves any concert pitch.

use rustfft::FftPlanner;

use super::peaks::{spectral_peaks, PeakParams, SpectralPeak};
use crate::error::AnalysisError;

/// Semitones from C up to A
const A_PITCH_CLASS: f32 = 9.0;

/// Chroma extraction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaParams {
    /// Framing and peak selection
    pub peaks: PeakParams,
    /// Frequency of A4 in Hz
    pub reference_frequency: f32,
}

impl Default for ChromaParams {
    fn default() -> Self {
        Self {
            peaks: PeakParams::default(),
            reference_frequency: 440.0,
        }
    }
}

/// Extract chroma vectors from audio samples
///
/// # Arguments
///
/// * `planner` - FFT planner, reused across calls
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `params` - Framing, frequency band and tuning reference
///
/// # Returns
///
/// One 12-element chroma vector per frame (index 0 = C), each scaled to a
/// maximum of 1.0. Frames without peaks are all zeros.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for invalid samples, framing or a
/// non-positive reference frequency.
pub fn extract_chroma(
    planner: &mut FftPlanner<f32>,
    samples: &[f32],
    sample_rate: u32,
    params: &ChromaParams,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if !(params.reference_frequency > 0.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid reference frequency: {}",
            params.reference_frequency
        )));
    }

    log::debug!(
        "Extracting chroma: {} samples at {} Hz, A4 = {:.1} Hz",
        samples.len(),
        sample_rate,
        params.reference_frequency
    );

    let frames = spectral_peaks(planner, samples, sample_rate, &params.peaks)?;

    Ok(frames
        .iter()
        .map(|peaks| frame_chroma(peaks, params.reference_frequency))
        .collect())
}

fn frame_chroma(peaks: &[SpectralPeak], reference_frequency: f32) -> Vec<f32> {
    let mut chroma = vec![0.0f32; 12];

    for peak in peaks {
        let semitones = 12.0 * (peak.frequency / reference_frequency).log2() + A_PITCH_CLASS;
        let nearest = semitones.round();
        let distance = semitones - nearest;
        let weight = (std::f32::consts::PI * distance).cos().powi(2);
        let pitch_class = (nearest as i64).rem_euclid(12) as usize;
        chroma[pitch_class] += weight * peak.magnitude * peak.magnitude;
    }

    let max = chroma.iter().cloned().fold(0.0f32, f32::max);
    if max > 0.0 {
        for value in &mut chroma {
            *value /= max;
        }
    }
    chroma
}

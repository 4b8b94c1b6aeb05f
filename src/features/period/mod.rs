//! Period estimation modules
//!
//! Convert an onset novelty curve to a tempo:
//! - Autocorrelation with a tempo prior
//! - [`estimate_tempo`] running the whole chain from samples

pub mod autocorrelation;

use crate::error::AnalysisError;
use crate::features::onset::energy_novelty;

pub use autocorrelation::estimate_bpm_from_novelty;

/// BPM candidate with confidence
#[derive(Debug, Clone)]
pub struct BpmCandidate {
    /// BPM estimate
    pub bpm: f32,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,
}

/// Tempo estimation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoParams {
    /// Novelty frame size in samples
    pub frame_size: usize,
    /// Novelty hop size in samples
    pub hop_size: usize,
    /// Slowest tempo reported
    pub min_bpm: f32,
    /// Fastest tempo reported
    pub max_bpm: f32,
}

impl Default for TempoParams {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            hop_size: 512,
            min_bpm: 50.0,
            max_bpm: 210.0,
        }
    }
}

/// Estimate the tempo of mono samples in BPM
///
/// Returns `0.0` when the signal has no detectable periodicity (silence,
/// sustained tones, or audio shorter than a few beats at `min_bpm`).
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for invalid parameters.
pub fn estimate_tempo(
    samples: &[f32],
    sample_rate: u32,
    params: &TempoParams,
) -> Result<f32, AnalysisError> {
    let novelty = energy_novelty(samples, params.frame_size, params.hop_size)?;
    let candidates = estimate_bpm_from_novelty(
        &novelty,
        sample_rate,
        params.hop_size,
        params.min_bpm,
        params.max_bpm,
    )?;

    match candidates.first() {
        Some(best) => {
            log::debug!(
                "Tempo estimate: {:.2} BPM (confidence {:.3}, {} candidates)",
                best.bpm,
                best.confidence,
                candidates.len()
            );
            Ok(best.bpm)
        }
        None => {
            log::warn!("No periodicity found, reporting tempo 0");
            Ok(0.0)
        }
    }
}

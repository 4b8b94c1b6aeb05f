//! Integrated loudness (EBU R128 / ITU-R BS.1770) of a stereo signal

use ebur128::{EbuR128, Mode};

use crate::error::AnalysisError;

/// Measure integrated loudness in LUFS of a left/right pair
///
/// Channels of unequal length are cut to the shorter one. Programmes that
/// stay below the absolute gate (silence) report `f64::NEG_INFINITY`.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty channels or a zero sample
/// rate, and `AnalysisError::ProcessingError` if the meter rejects the input.
pub fn integrated_loudness(
    left: &[f32],
    right: &[f32],
    sample_rate: u32,
) -> Result<f64, AnalysisError> {
    let frames = left.len().min(right.len());
    if frames == 0 {
        return Err(AnalysisError::InvalidInput(
            "Empty audio samples".to_string(),
        ));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate".to_string(),
        ));
    }

    let mut meter = EbuR128::new(2, sample_rate, Mode::I)?;
    meter.add_frames_planar_f32(&[&left[..frames], &right[..frames]])?;
    let lufs = meter.loudness_global()?;

    if lufs.is_finite() {
        log::debug!("Integrated loudness: {:.2} LUFS over {} frames", lufs, frames);
    } else {
        log::warn!("All audio blocks below the absolute loudness gate");
    }

    Ok(lufs)
}

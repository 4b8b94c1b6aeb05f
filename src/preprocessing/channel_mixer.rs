//! Channel mixing utilities (stereo to mono conversion)

use crate::error::AnalysisError;

/// Average a left/right pair into one channel: (L + R) / 2
///
/// The output is as long as the shorter channel.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if either channel is empty
pub fn downmix(left: &[f32], right: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    log::debug!(
        "Downmixing stereo to mono ({} / {} samples)",
        left.len(),
        right.len()
    );

    if left.is_empty() || right.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Cannot mix an empty channel".to_string(),
        ));
    }

    Ok(left.iter().zip(right).map(|(&l, &r)| (l + r) * 0.5).collect())
}

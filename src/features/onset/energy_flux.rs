//! Energy flux novelty curve
//!
//! Measures how sharply the signal energy rises from frame to frame. Peaks
//! of the curve sit on note and drum onsets; its periodicity is the tempo.
//!
//! Algorithm:
//! 1. Divide audio into overlapping frames (frame_size, hop_size)
//! 2. Compute RMS energy per frame
//! 3. Compute energy derivative (flux): E_flux[n] = max(0, E[n+1] - E[n])
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.
//!
//! # Example
//!
//! ```
//! use tonemeter_dsp::features::onset::energy_flux::energy_novelty;
//!
//! let samples = vec![0.0f32; 44100 * 2];
//! let novelty = energy_novelty(&samples, 1024, 512)?;
//! assert!(novelty.iter().all(|&v| v == 0.0));
//! # Ok::<(), tonemeter_dsp::AnalysisError>(())
//! ```

use crate::error::AnalysisError;

/// Compute the energy flux novelty curve
///
/// Value `n` of the curve describes the energy rise into frame `n + 1`,
/// which starts at sample `(n + 1) * hop_size`.
///
/// # Arguments
///
/// * `samples` - Audio samples (mono, normalized to [-1.0, 1.0])
/// * `frame_size` - Frame size for analysis (typically 1024)
/// * `hop_size` - Hop size between frames (typically 512)
///
/// # Returns
///
/// Half-wave rectified energy differences, one per frame transition. Audio
/// shorter than two frames gives an empty curve.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `frame_size` or `hop_size` is zero
pub fn energy_novelty(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<f32>, AnalysisError> {
    if frame_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Frame size must be > 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    if frame_size > samples.len() {
        log::warn!(
            "Frame size ({}) larger than audio length ({}), empty novelty curve",
            frame_size,
            samples.len()
        );
        return Ok(Vec::new());
    }

    let num_frames = (samples.len() - frame_size) / hop_size + 1;

    log::debug!(
        "Computing energy novelty: {} samples, {} frames (frame={}, hop={})",
        samples.len(),
        num_frames,
        frame_size,
        hop_size
    );

    // Step 1-2: RMS energy per frame
    let frame_energies: Vec<f32> = (0..num_frames)
        .map(|i| {
            let start = i * hop_size;
            let frame = &samples[start..start + frame_size];
            let sum_sq: f32 = frame.iter().map(|&x| x * x).sum();
            (sum_sq / frame_size as f32).sqrt()
        })
        .collect();

    // Step 3: rectified derivative
    Ok(frame_energies
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).max(0.0))
        .collect())
}

//! Autocorrelation-based BPM estimation
//!
//! Finds periodicity in an onset novelty curve using FFT-accelerated
//! autocorrelation.
//!
//! # Algorithm
//!
//! 1. Remove the mean of the novelty curve
//! 2. Compute autocorrelation using FFT acceleration: `ACF = IFFT(|FFT(signal)|²)`
//! 3. Find local maxima of the ACF inside the lag range of the BPM range
//! 4. Weight each peak with a log-Gaussian tempo prior centred on 120 BPM
//! 5. Refine the lag by parabolic interpolation and convert to BPM:
//!    `BPM = (60 * sample_rate) / (lag * hop_size)`
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.
//!
//! # Example
//!
//! ```
//! use tonemeter_dsp::features::period::autocorrelation::estimate_bpm_from_novelty;
//!
//! // One impulse every 43 frames: 120.18 BPM at 44.1 kHz with a 512 hop
//! let mut novelty = vec![0.0f32; 860];
//! for i in (0..860).step_by(43) {
//!     novelty[i] = 1.0;
//! }
//! let candidates = estimate_bpm_from_novelty(&novelty, 44100, 512, 50.0, 210.0)?;
//! assert!((candidates[0].bpm - 120.18).abs() < 0.1);
//! # Ok::<(), tonemeter_dsp::AnalysisError>(())
//! ```

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::BpmCandidate;
use crate::error::AnalysisError;

const EPSILON: f32 = 1e-10;

/// Centre of the tempo prior in BPM
const PRIOR_CENTER_BPM: f32 = 120.0;

/// Width of the tempo prior in octaves
const PRIOR_WIDTH_OCTAVES: f32 = 1.0;

/// Estimate BPM candidates from an onset novelty curve
///
/// # Arguments
///
/// * `novelty` - Onset strength per frame
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Hop size used for the novelty curve (samples per frame)
/// * `min_bpm` - Minimum BPM to consider
/// * `max_bpm` - Maximum BPM to consider
///
/// # Returns
///
/// BPM candidates ranked by prior-weighted ACF strength (highest first).
/// Empty when the curve is too short for the BPM range or has no
/// periodicity.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `sample_rate` or `hop_size` is
/// zero, or if the BPM range is empty.
pub fn estimate_bpm_from_novelty(
    novelty: &[f32],
    sample_rate: u32,
    hop_size: usize,
    min_bpm: f32,
    max_bpm: f32,
) -> Result<Vec<BpmCandidate>, AnalysisError> {
    log::debug!(
        "Estimating BPM from autocorrelation: {} frames, {} Hz, hop={}, range=[{:.1}, {:.1}] BPM",
        novelty.len(),
        sample_rate,
        hop_size,
        min_bpm,
        max_bpm
    );

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid hop size: 0".to_string(),
        ));
    }

    if min_bpm <= 0.0 || max_bpm <= 0.0 || min_bpm >= max_bpm {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            min_bpm, max_bpm
        )));
    }

    // lag = (60 * sample_rate) / (BPM * hop_size)
    let frames_per_minute = 60.0 * sample_rate as f32 / hop_size as f32;
    let lag_min = (frames_per_minute / max_bpm).ceil().max(1.0) as usize;
    let lag_max = (frames_per_minute / min_bpm).floor() as usize;

    if lag_min >= lag_max || lag_max + 1 >= novelty.len() {
        log::warn!(
            "Novelty curve of {} frames too short for lag range [{}, {}]",
            novelty.len(),
            lag_min,
            lag_max
        );
        return Ok(vec![]);
    }

    let mean = novelty.iter().sum::<f32>() / novelty.len() as f32;
    let centred: Vec<f32> = novelty.iter().map(|&x| x - mean).collect();
    let acf = compute_autocorrelation_fft(&centred);

    let max_acf = acf[lag_min..=lag_max].iter().copied().fold(0.0f32, f32::max);
    if max_acf < EPSILON {
        log::debug!("No periodicity in novelty curve");
        return Ok(vec![]);
    }

    let mut candidates: Vec<BpmCandidate> = find_peaks_in_acf(&acf, lag_min, lag_max)
        .into_iter()
        .map(|lag| {
            let refined = refine_lag(&acf, lag);
            let bpm = frames_per_minute / refined;
            BpmCandidate {
                bpm,
                confidence: (acf[lag] / max_acf).min(1.0) * tempo_prior(bpm),
            }
        })
        .filter(|c| c.bpm >= min_bpm && c.bpm <= max_bpm)
        .collect();

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::debug!("Autocorrelation found {} BPM candidates", candidates.len());

    Ok(candidates)
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²), with zero-padding to
/// avoid circular wrap-around. Negative values are clamped to zero.
///
/// # Returns
///
/// Autocorrelation function (same length as input)
pub fn compute_autocorrelation_fft(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    // FFT size: next power of 2 >= 2*n (for zero-padding)
    let fft_size = (2 * n).next_power_of_two();

    let mut fft_input: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft_input.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut fft_input);

    // Compute |FFT|²
    for x in &mut fft_input {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut fft_input);

    let scale = 1.0 / (fft_size as f32);
    fft_input[..n]
        .iter()
        .map(|x| (x.re * scale).max(0.0))
        .collect()
}

/// Local maxima of `acf` with lags in `lag_min..=lag_max`
///
/// The caller guarantees `1 <= lag_min` and `lag_max + 1 < acf.len()`.
fn find_peaks_in_acf(acf: &[f32], lag_min: usize, lag_max: usize) -> Vec<usize> {
    (lag_min..=lag_max)
        .filter(|&lag| {
            let value = acf[lag];
            value > EPSILON && value > acf[lag - 1] && value >= acf[lag + 1]
        })
        .collect()
}

/// Sub-frame peak position by parabolic interpolation
fn refine_lag(acf: &[f32], lag: usize) -> f32 {
    let (a, b, c) = (acf[lag - 1], acf[lag], acf[lag + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < EPSILON {
        return lag as f32;
    }
    lag as f32 + (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
}

/// Log-Gaussian preference for tempi near 120 BPM
fn tempo_prior(bpm: f32) -> f32 {
    let octaves = (bpm / PRIOR_CENTER_BPM).log2() / PRIOR_WIDTH_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}

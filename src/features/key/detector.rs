//! Key detection algorithm
//!
//! Averages chroma vectors over all frames and correlates the resulting
//! pitch-class profile with each of the 24 key templates. The key with the
//! highest Pearson correlation wins; that correlation is reported as the
//! key strength. A flat profile (silence, or noise without pitch content)
//! reports [`UNDETERMINED_KEY`] with zero strength.
//!
//! # Reference
//!
//! Krumhansl, C. L. (1990). *Cognitive Foundations of Musical Pitch*.
//! Oxford University Press.

use super::{templates::KeyTemplates, KeyDetectionResult};
use crate::analysis::result::Key;
use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-9;

/// Key reported when the chroma profile carries no pitch information
pub const UNDETERMINED_KEY: Key = Key::Major(0);

/// Detect musical key from chroma vectors
///
/// # Arguments
///
/// * `chroma_vectors` - 12-element chroma vectors, one per frame
/// * `templates` - Key templates of the selected profile
///
/// # Returns
///
/// Key detection result with:
/// - Detected key (major or minor, 0-11)
/// - Strength (correlation of the best key, -1.0 to 1.0; 0.0 for a flat profile)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if chroma vectors are empty or not
/// 12-dimensional.
///
/// # Example
///
/// ```
/// use tonemeter_dsp::features::key::{detect_key, KeyProfile, KeyTemplates};
/// use tonemeter_dsp::analysis::result::Key;
///
/// // C, E and G dominate every frame
/// let mut frame = vec![0.05f32; 12];
/// frame[0] = 1.0;
/// frame[4] = 0.8;
/// frame[7] = 0.9;
///
/// let templates = KeyTemplates::new(KeyProfile::Krumhansl);
/// let result = detect_key(&vec![frame; 8], &templates)?;
/// assert_eq!(result.key, Key::Major(0));
/// # Ok::<(), tonemeter_dsp::AnalysisError>(())
/// ```
pub fn detect_key(
    chroma_vectors: &[Vec<f32>],
    templates: &KeyTemplates,
) -> Result<KeyDetectionResult, AnalysisError> {
    log::debug!(
        "Detecting key from {} chroma vectors ({} profile)",
        chroma_vectors.len(),
        templates.profile()
    );

    if chroma_vectors.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty chroma vectors".to_string(),
        ));
    }

    for (i, chroma) in chroma_vectors.iter().enumerate() {
        if chroma.len() != 12 {
            return Err(AnalysisError::InvalidInput(format!(
                "Chroma vector at index {} has {} elements, expected 12",
                i,
                chroma.len()
            )));
        }
    }

    let profile = average_chroma(chroma_vectors);
    if variance(&profile) < EPSILON {
        log::warn!(
            "Flat chroma profile, reporting {} with zero strength",
            UNDETERMINED_KEY.name()
        );
        return Ok(KeyDetectionResult {
            key: UNDETERMINED_KEY,
            strength: 0.0,
        });
    }

    let (key, strength) = (0..12)
        .map(|k| (Key::Major(k), pearson(&profile, templates.get_major_template(k))))
        .chain((0..12).map(|k| (Key::Minor(k), pearson(&profile, templates.get_minor_template(k)))))
        .fold((UNDETERMINED_KEY, f32::NEG_INFINITY), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    log::debug!("Detected key: {} (strength {:.4})", key.name(), strength);

    Ok(KeyDetectionResult { key, strength })
}

/// Mean of the chroma vectors, per pitch class
fn average_chroma(chroma_vectors: &[Vec<f32>]) -> [f32; 12] {
    let mut sum = [0.0f32; 12];
    for chroma in chroma_vectors {
        for (acc, &value) in sum.iter_mut().zip(chroma.iter()) {
            *acc += value;
        }
    }
    let n = chroma_vectors.len() as f32;
    sum.map(|v| v / n)
}

fn variance(values: &[f32]) -> f32 {
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32
}

/// Pearson correlation coefficient, 0.0 when either side is flat
fn pearson(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len()) as f32;
    let mean_a = a.iter().sum::<f32>() / n;
    let mean_b = b.iter().sum::<f32>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0f32, 0.0f32, 0.0f32);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < EPSILON {
        0.0
    } else {
        cov / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::key::KeyProfile;

    fn triad_frames(root: usize, minor: bool) -> Vec<Vec<f32>> {
        let third = if minor { 3 } else { 4 };
        let mut chroma = vec![0.02f32; 12];
        chroma[root % 12] = 1.0;
        chroma[(root + third) % 12] = 0.7;
        chroma[(root + 7) % 12] = 0.8;
        vec![chroma; 10]
    }

    #[test]
    fn test_detect_key_empty() {
        let templates = KeyTemplates::default();
        let result = detect_key(&[], &templates);
        assert!(result.is_err());
    }

    #[test]
    fn test_detect_key_basic() {
        let templates = KeyTemplates::new(KeyProfile::Krumhansl);
        let detection = detect_key(&triad_frames(0, false), &templates).unwrap();

        // Best key should be C major (index 0)
        assert_eq!(detection.key, Key::Major(0));
        assert!(detection.strength > 0.5 && detection.strength <= 1.0);
    }

    #[test]
    fn test_detect_minor_key() {
        let templates = KeyTemplates::new(KeyProfile::TonicTriad);
        let detection = detect_key(&triad_frames(9, true), &templates).unwrap();
        assert_eq!(detection.key, Key::Minor(9));
        assert!((detection.strength - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_weighted_profiles_find_transposed_triad() {
        // Flat diatonic templates cannot tell a triad's parent scales apart
        for profile in KeyProfile::ALL
            .into_iter()
            .filter(|p| *p != KeyProfile::Diatonic)
        {
            let templates = KeyTemplates::new(profile);
            let detection = detect_key(&triad_frames(7, false), &templates).unwrap();
            assert_eq!(detection.key, Key::Major(7), "{} profile", profile);
        }
    }

    #[test]
    fn test_detect_key_wrong_dimensions() {
        let templates = KeyTemplates::default();
        let chroma_vectors = vec![vec![0.0f32; 10]]; // Wrong size
        let result = detect_key(&chroma_vectors, &templates);
        assert!(result.is_err());
    }

    #[test]
    fn test_flat_profile_reports_undetermined_key() {
        let templates = KeyTemplates::default();

        let silent = detect_key(&vec![vec![0.0f32; 12]; 10], &templates).unwrap();
        assert_eq!(silent.key, UNDETERMINED_KEY);
        assert_eq!(silent.strength, 0.0);

        let noise = detect_key(&vec![vec![0.4f32; 12]; 10], &templates).unwrap();
        assert_eq!(noise.key, UNDETERMINED_KEY);
        assert_eq!(noise.strength, 0.0);
    }

    #[test]
    fn test_pearson() {
        let a = [1.0, 2.0, 3.0];
        assert!((pearson(&a, &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-6);
        assert!((pearson(&a, &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-6);
        assert_eq!(pearson(&a, &[1.0, 1.0, 1.0]), 0.0);
    }
}

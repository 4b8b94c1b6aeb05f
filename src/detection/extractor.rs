//! The computation unit behind detection
//!
//! An [`Extractor`] turns the samples of one request into key, tuning, tempo
//! and loudness figures. The worker creates a fresh extractor per request
//! and drops it as soon as it has an answer, so any resources an
//! implementation holds are released through `Drop`.

use rustfft::FftPlanner;

use crate::analysis::result::Key;
use crate::error::AnalysisError;
use crate::features::chroma::{extract_chroma, ChromaParams, PeakParams};
use crate::features::key::{detect_key, KeyProfile, KeyTemplates};
use crate::features::loudness::integrated_loudness;
use crate::features::period::{estimate_tempo, TempoParams};
use crate::features::tuning::{estimate_tuning_frequency, TuningParams};

/// Everything an extractor receives for one request
#[derive(Debug, Clone, Copy)]
pub struct ExtractorInput<'a> {
    /// Analysed signal (first channel, or the L/R average when downmixing)
    pub mono: &'a [f32],
    /// Left and right channels, only for stereo buffers
    pub stereo: Option<(&'a [f32], &'a [f32])>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Lowest frequency for key analysis in Hz
    pub min_freq: f32,
    /// Highest frequency for key analysis in Hz
    pub max_freq: f32,
    /// Key profile name
    pub profile: &'a str,
    /// Configured A4 reference in Hz
    pub tuning: f32,
    /// Whether the tuning reference should be estimated
    pub auto_tuning: bool,
}

/// Key and its strength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEstimate {
    /// Detected key
    pub key: Key,
    /// Match strength
    pub strength: f32,
}

/// Raw extractor answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorOutput {
    /// Key estimate
    pub key: KeyEstimate,
    /// Tuning reference in Hz: the estimate under auto-tuning, the configured value otherwise
    pub tuning_frequency: f32,
    /// Tempo in BPM
    pub tempo_bpm: f32,
    /// Integrated loudness in LUFS, for stereo input
    pub integrated_loudness: Option<f64>,
}

/// Computation unit used by the detection worker
///
/// Implementations may fail or even panic; the worker turns both into a
/// generic detection failure.
pub trait Extractor: Send {
    /// Analyse one request
    fn extract(&mut self, input: &ExtractorInput<'_>) -> Result<ExtractorOutput, AnalysisError>;
}

/// Default extractor built on this crate's feature modules
///
/// Holds an FFT planner whose cached plans are shared by the tuning and
/// chroma stages of a request.
pub struct DspExtractor {
    planner: FftPlanner<f32>,
    tuning: TuningParams,
    tempo: TempoParams,
    chroma: PeakParams,
}

impl DspExtractor {
    /// Extractor with default analysis parameters
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            tuning: TuningParams::default(),
            tempo: TempoParams::default(),
            chroma: PeakParams::default(),
        }
    }
}

impl Default for DspExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for DspExtractor {
    fn extract(&mut self, input: &ExtractorInput<'_>) -> Result<ExtractorOutput, AnalysisError> {
        let profile: KeyProfile = input.profile.parse()?;

        let tuning_frequency = if input.auto_tuning {
            estimate_tuning_frequency(&mut self.planner, input.mono, input.sample_rate, &self.tuning)?
        } else {
            input.tuning
        };

        let chroma_params = ChromaParams {
            peaks: PeakParams {
                min_freq: input.min_freq,
                max_freq: input.max_freq,
                ..self.chroma
            },
            // Key analysis runs against the whole-Hz reference that is reported
            reference_frequency: tuning_frequency.round(),
        };
        let chroma = extract_chroma(&mut self.planner, input.mono, input.sample_rate, &chroma_params)?;
        let key = detect_key(&chroma, &KeyTemplates::new(profile))?;

        let tempo_bpm = estimate_tempo(input.mono, input.sample_rate, &self.tempo)?;

        let integrated_loudness = input
            .stereo
            .map(|(left, right)| integrated_loudness(left, right, input.sample_rate))
            .transpose()?;

        Ok(ExtractorOutput {
            key: KeyEstimate {
                key: key.key,
                strength: key.strength,
            },
            tuning_frequency,
            tempo_bpm,
            integrated_loudness,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::key::UNDETERMINED_KEY;

    fn triad(sample_rate: u32, seconds: f32) -> Vec<f32> {
        let len = (sample_rate as f32 * seconds) as usize;
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                [261.63f32, 329.63, 392.0]
                    .iter()
                    .map(|f| 0.25 * (2.0 * std::f32::consts::PI * f * t).sin())
                    .sum::<f32>()
            })
            .collect()
    }

    fn input<'a>(mono: &'a [f32], profile: &'a str) -> ExtractorInput<'a> {
        ExtractorInput {
            mono,
            stereo: None,
            sample_rate: 44100,
            min_freq: 25.0,
            max_freq: 3500.0,
            profile,
            tuning: 440.0,
            auto_tuning: false,
        }
    }

    #[test]
    fn test_c_major_triad() {
        let samples = triad(44100, 3.0);
        let output = DspExtractor::new().extract(&input(&samples, "krumhansl")).unwrap();

        assert_eq!(output.key.key, Key::Major(0));
        assert!(output.key.strength > 0.5);
        assert_eq!(output.tuning_frequency, 440.0);
        assert!(output.tempo_bpm.is_finite());
        assert!(output.integrated_loudness.is_none());
    }

    #[test]
    fn test_stereo_input_measures_integrated_loudness() {
        let samples = triad(44100, 3.0);
        let mut request = input(&samples, "temperley");
        request.stereo = Some((&samples, &samples));

        let output = DspExtractor::new().extract(&request).unwrap();
        let lufs = output.integrated_loudness.unwrap();
        assert!(lufs.is_finite() && lufs < 0.0);
    }

    #[test]
    fn test_auto_tuning_reports_estimate() {
        let samples = triad(44100, 2.0);
        let mut request = input(&samples, "krumhansl");
        request.auto_tuning = true;
        request.tuning = 415.0;

        let output = DspExtractor::new().extract(&request).unwrap();
        assert!((output.tuning_frequency - 440.0).abs() < 2.0);
    }

    #[test]
    fn test_unknown_profile_fails() {
        let samples = triad(44100, 1.0);
        let result = DspExtractor::new().extract(&input(&samples, "nonexistent"));
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_silence_reports_neutral_figures() {
        let samples = vec![0.0f32; 44100 * 3];
        let mut request = input(&samples, "krumhansl");
        request.auto_tuning = true;
        request.stereo = Some((&samples, &samples));

        let output = DspExtractor::new().extract(&request).unwrap();
        assert_eq!(output.key.key, UNDETERMINED_KEY);
        assert_eq!(output.key.strength, 0.0);
        assert_eq!(output.tuning_frequency, 440.0);
        assert_eq!(output.tempo_bpm, 0.0);
        assert_eq!(output.integrated_loudness, Some(f64::NEG_INFINITY));
    }
}

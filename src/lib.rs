//! # Tonemeter DSP
//!
//! Measurement pipeline for a desktop music-production tool: loudness,
//! musical key, tuning reference and tempo of recorded audio, plus the
//! equal-temperament pitch tables the tool displays.
//!
//! ## Features
//!
//! - **Loudness**: windowed RMS in dBFS per channel, integrated LUFS for stereo
//! - **Key Detection**: chroma analysis with selectable key profiles
//! - **Tuning**: concert pitch estimation from spectral peaks
//! - **Tempo**: energy-flux novelty with autocorrelation
//! - **Pitch Tables**: one-octave frequency tables with named frequency bands
//! - **Isolated Detection**: key/tempo analysis runs on a worker thread and
//!   reports failures as a single user-facing message
//!
//! ## Quick Start
//!
//! ```no_run
//! use tonemeter_dsp::{detect_audio, measure_audio_file, Channels, DetectionConfig};
//!
//! # async fn run() -> Result<(), tonemeter_dsp::AnalysisError> {
//! let loudness = measure_audio_file("mix.wav", Channels::Stereo)?;
//! println!("Average RMS: {:.2} dBFS", loudness.avg.rms_db);
//!
//! let result = detect_audio("mix.wav", &DetectionConfig::default()).await?;
//! if let Some(detection) = result.detection() {
//!     println!("{} {} at {:.1} BPM", detection.key_data.key, detection.key_data.scale, detection.tempo);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! File → io (decode) → SampleBuffer ─┬→ features::loudness → LoudnessMeasurement
//!                                    └→ detection (worker thread)
//!                                         └→ chroma → key, tuning, onset → period → DetectionResult
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod detection;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod scales;

use std::path::Path;

// Re-export main types
pub use analysis::result::{Detection, DetectionResult, Key, KeyData, DETECTION_FAILED};
pub use config::DetectionConfig;
pub use detection::{Detector, Extractor};
pub use error::AnalysisError;
pub use features::loudness::{Channels, LoudnessMeasurement};
pub use io::{load, DecoderContext, SampleBuffer};
pub use scales::{reference_frequencies, FrequencyRange, PitchFrequencyTable, ReferenceFrequencies};

/// Measure windowed RMS loudness of a decoded buffer
///
/// # Arguments
///
/// * `buffer` - Decoded audio
/// * `channels` - `Channels::Mono` for the first channel only, `Channels::Stereo`
///   to include the second channel of stereo buffers
///
/// # Example
///
/// ```
/// use tonemeter_dsp::{measure_loudness, Channels, SampleBuffer};
///
/// let buffer = SampleBuffer::from_planar(vec![vec![0.0f32; 44100]], 44100)?;
/// let result = measure_loudness(&buffer, Channels::Mono);
/// assert_eq!(result.avg.rms_db, f64::NEG_INFINITY);
/// # Ok::<(), tonemeter_dsp::AnalysisError>(())
/// ```
pub fn measure_loudness(buffer: &SampleBuffer, channels: Channels) -> LoudnessMeasurement {
    features::loudness::measure(buffer, channels)
}

/// Decode an audio file and measure its loudness
///
/// # Errors
///
/// Returns `AnalysisError::DecodingError` if the file cannot be decoded.
pub fn measure_audio_file<P: AsRef<Path>>(
    path: P,
    channels: Channels,
) -> Result<LoudnessMeasurement, AnalysisError> {
    features::loudness::measure_file(path, channels)
}

/// Build the one-octave pitch table for a reference pitch set
///
/// # Example
///
/// ```
/// use tonemeter_dsp::{build_frequency_table, reference_frequencies};
///
/// let table = build_frequency_table(&reference_frequencies(440.0, 4));
/// assert_eq!(table.len(), 8);
/// ```
pub fn build_frequency_table(reference: &ReferenceFrequencies) -> PitchFrequencyTable {
    scales::build_table(reference)
}

/// Decode a file and detect its key, tuning, tempo and integrated loudness
///
/// Uses a default [`Detector`]. Detection faults come back as a failed
/// [`DetectionResult`]; only decoding errors are returned as `Err`.
///
/// # Errors
///
/// Returns `AnalysisError::DecodingError` if the file cannot be decoded.
pub async fn detect_audio<P: AsRef<Path>>(
    path: P,
    config: &DetectionConfig,
) -> Result<DetectionResult, AnalysisError> {
    Detector::new().detect_file(path, config).await
}

//! Chroma extraction modules
//!
//! Extract pitch-class distribution (12 semitones) from audio:
//! - Spectral peak picking
//! - Chroma vector computation relative to a tuning reference

pub mod extractor;
pub mod peaks;

pub use extractor::{extract_chroma, ChromaParams};
pub use peaks::{spectral_peaks, PeakParams, SpectralPeak};

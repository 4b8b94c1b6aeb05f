//! Feature extraction modules
//!
//! This module contains all feature extraction algorithms:
//! - Loudness (windowed RMS, integrated LUFS)
//! - Chroma extraction
//! - Key detection
//! - Tuning estimation
//! - Onset strength and period estimation (BPM detection)

pub mod chroma;
pub mod key;
pub mod loudness;
pub mod onset;
pub mod period;
pub mod tuning;

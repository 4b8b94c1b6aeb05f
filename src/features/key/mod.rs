//! Key detection modules
//!
//! Detect musical key using:
//! - Selectable key profiles (24 templates each)
//! - Correlation-based template matching

pub mod detector;
pub mod templates;

pub use detector::{detect_key, UNDETERMINED_KEY};
pub use templates::{KeyProfile, KeyTemplates};

use crate::analysis::result::Key;

/// Key detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyDetectionResult {
    /// Detected key (best match)
    pub key: Key,

    /// Correlation of the averaged chroma with the best template (-1.0 to 1.0)
    pub strength: f32,
}

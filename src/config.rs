//! Configuration parameters for key, tuning and tempo detection

use serde::{Deserialize, Serialize};

/// Detection configuration
///
/// Mirrors the audio settings persisted by the desktop tool, so it accepts
/// both snake_case and the camelCase keys used in the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Lowest frequency considered for key analysis in Hz (default: 25.0)
    #[serde(alias = "minFreq")]
    pub min_freq: f32,

    /// Highest frequency considered for key analysis in Hz (default: 3500.0)
    #[serde(alias = "maxFreq")]
    pub max_freq: f32,

    /// Key profile name (default: "krumhansl")
    ///
    /// See [`KeyProfile`](crate::features::key::KeyProfile) for accepted values.
    pub profile: String,

    /// Reference tuning in Hz for A4 (default: 440.0)
    /// Used verbatim unless `auto_tuning` is set
    pub tuning: f32,

    /// Estimate the tuning reference from the signal (default: false)
    #[serde(alias = "autoTuning")]
    pub auto_tuning: bool,

    /// Analyse the L/R average instead of the first channel (default: false)
    pub downmix: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_freq: 25.0,
            max_freq: 3500.0,
            profile: "krumhansl".to_string(),
            tuning: 440.0,
            auto_tuning: false,
            downmix: false,
        }
    }
}

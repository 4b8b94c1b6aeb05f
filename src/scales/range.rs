//! Named frequency bands

use serde::{Deserialize, Serialize};

/// Frequency band of a pitch, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyRange {
    /// Up to 60 Hz
    Sub,
    /// Above 60 Hz, up to 250 Hz
    Lows,
    /// Above 250 Hz, up to 600 Hz
    LowMids,
    /// Above 600 Hz, up to 2 kHz
    Mids,
    /// Above 2 kHz, up to 5 kHz
    HighMids,
    /// Above 5 kHz, up to 8 kHz
    Presence,
    /// Above 8 kHz
    Air,
}

/// Lower bounds (exclusive) of every band above `Sub`
const THRESHOLDS: [(f32, FrequencyRange); 6] = [
    (60.0, FrequencyRange::Lows),
    (250.0, FrequencyRange::LowMids),
    (600.0, FrequencyRange::Mids),
    (2000.0, FrequencyRange::HighMids),
    (5000.0, FrequencyRange::Presence),
    (8000.0, FrequencyRange::Air),
];

impl FrequencyRange {
    /// Classify a frequency in Hz
    ///
    /// A value exactly on a boundary stays in the lower band.
    pub fn classify(frequency: f32) -> Self {
        THRESHOLDS
            .iter()
            .rev()
            .find(|(bound, _)| frequency > *bound)
            .map(|(_, range)| *range)
            .unwrap_or(FrequencyRange::Sub)
    }

    /// Short name, as serialized
    pub fn name(&self) -> &'static str {
        match self {
            FrequencyRange::Sub => "sub",
            FrequencyRange::Lows => "lows",
            FrequencyRange::LowMids => "lowmids",
            FrequencyRange::Mids => "mids",
            FrequencyRange::HighMids => "highmids",
            FrequencyRange::Presence => "presence",
            FrequencyRange::Air => "air",
        }
    }

    /// Translation key used by the UI for this band's label
    pub fn message_key(&self) -> String {
        format!("scales.ranges.{}", self.name())
    }
}

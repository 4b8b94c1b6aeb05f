//! Key and detection result types

use serde::{Deserialize, Serialize};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Musical key, indexed by the pitch class of its tonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key on pitch class `n` (0 = C)
    Major(u32),
    /// Minor key on pitch class `n` (0 = C)
    Minor(u32),
}

impl Key {
    /// Display name: tonic for major keys, tonic + "m" for minor keys
    ///
    /// ```
    /// use tonemeter_dsp::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(6).name(), "F#");
    /// assert_eq!(Key::Minor(9).name(), "Am");
    /// ```
    pub fn name(&self) -> String {
        match self {
            Key::Major(_) => self.tonic().to_string(),
            Key::Minor(_) => format!("{}m", self.tonic()),
        }
    }

    /// Tonic spelling without the mode suffix (e.g. "C", "F#")
    pub fn tonic(&self) -> &'static str {
        NOTE_NAMES[self.pitch_class() as usize]
    }

    /// Mode name: "major" or "minor"
    pub fn scale(&self) -> &'static str {
        match self {
            Key::Major(_) => "major",
            Key::Minor(_) => "minor",
        }
    }

    /// Pitch class of the tonic, 0 = C
    pub fn pitch_class(&self) -> u32 {
        let (Key::Major(i) | Key::Minor(i)) = self;
        i % 12
    }
}

/// Message key returned in place of any detection failure
pub const DETECTION_FAILED: &str = "files.errors.detection";

/// Key estimate shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyData {
    /// Tonic spelling (e.g. "C", "F#")
    pub key: String,
    /// "major" or "minor"
    pub scale: String,
    /// Correlation of the chroma profile with the winning template
    pub strength: f32,
}

impl KeyData {
    /// Build from a detected key and its strength
    pub fn new(key: Key, strength: f32) -> Self {
        Self {
            key: key.tonic().to_string(),
            scale: key.scale().to_string(),
            strength,
        }
    }
}

/// Loudness figures computed by the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessMeasures {
    /// Integrated loudness in LUFS, only for stereo input
    ///
    /// `null` for mono input. Stereo input that never rises above the
    /// absolute gate reads `f64::NEG_INFINITY`, written as `"-Infinity"`.
    #[serde(default, with = "lufs")]
    pub integrated: Option<f64>,
}

/// JSON form of a loudness value: finite values as numbers, infinities as
/// `"-Infinity"` / `"Infinity"` so they stay distinct from `null`
mod lufs {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) if v.is_finite() => serializer.serialize_f64(*v),
            Some(v) if *v == f64::NEG_INFINITY => serializer.serialize_str("-Infinity"),
            Some(v) if *v == f64::INFINITY => serializer.serialize_str("Infinity"),
            _ => serializer.serialize_none(),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Number(v)) => Ok(Some(v)),
            Some(Repr::Text(text)) => match text.as_str() {
                "-Infinity" => Ok(Some(f64::NEG_INFINITY)),
                "Infinity" => Ok(Some(f64::INFINITY)),
                other => Err(serde::de::Error::custom(format!(
                    "invalid loudness value: {}",
                    other
                ))),
            },
        }
    }
}

/// Successful detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Sample rate of the analysed buffer
    pub sample_rate: u32,
    /// Duration as "MM:SS"
    pub duration: String,
    /// Key estimate
    pub key_data: KeyData,
    /// Tempo in BPM
    pub tempo: f32,
    /// Tuning reference in whole Hz
    pub tuning: u32,
    /// Loudness figures
    pub loudness: LoudnessMeasures,
}

/// Outcome of a detection request
///
/// Serializes as `{"success": true, ...}` with the [`Detection`] fields
/// inlined, or `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    /// Detection finished
    Success(Detection),
    /// Detection failed; `error` is a message key, never a fault description
    Failure {
        /// Message key for the UI
        error: String,
    },
}

impl DetectionResult {
    /// The generic failure every fault is reported as
    pub fn failed() -> Self {
        DetectionResult::Failure {
            error: DETECTION_FAILED.to_string(),
        }
    }

    /// Whether detection succeeded
    pub fn success(&self) -> bool {
        matches!(self, DetectionResult::Success(_))
    }

    /// Failure message key, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            DetectionResult::Success(_) => None,
            DetectionResult::Failure { error } => Some(error),
        }
    }

    /// Detection data, if any
    pub fn detection(&self) -> Option<&Detection> {
        match self {
            DetectionResult::Success(detection) => Some(detection),
            DetectionResult::Failure { .. } => None,
        }
    }
}

impl From<Detection> for DetectionResult {
    fn from(detection: Detection) -> Self {
        DetectionResult::Success(detection)
    }
}

#[derive(Serialize)]
struct DetectionResultRepr<'a> {
    success: bool,
    #[serde(flatten)]
    detection: Option<&'a Detection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for DetectionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DetectionResultRepr {
            success: self.success(),
            detection: self.detection(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        let majors: Vec<String> = (0..12).map(|i| Key::Major(i).name()).collect();
        assert_eq!(majors, NOTE_NAMES);
        assert_eq!(Key::Minor(0).name(), "Cm");
        assert_eq!(Key::Minor(10).name(), "A#m");
        // Indices wrap around the octave
        assert_eq!(Key::Major(14).name(), "D");
        assert_eq!(Key::Minor(21).pitch_class(), 9);
    }

    #[test]
    fn test_key_tonic_and_scale() {
        assert_eq!(Key::Major(6).tonic(), "F#");
        assert_eq!(Key::Minor(9).tonic(), "A");
        assert_eq!(Key::Major(0).scale(), "major");
        assert_eq!(Key::Minor(0).scale(), "minor");

        let data = KeyData::new(Key::Minor(4), 0.71);
        assert_eq!(data.key, "E");
        assert_eq!(data.scale, "minor");
    }

    fn sample_detection() -> Detection {
        Detection {
            sample_rate: 44100,
            duration: "03:25".to_string(),
            key_data: KeyData::new(Key::Major(0), 0.8),
            tempo: 120.0,
            tuning: 440,
            loudness: LoudnessMeasures {
                integrated: Some(-9.5),
            },
        }
    }

    #[test]
    fn test_success_serialization_is_flat() {
        let result = DetectionResult::from(sample_detection());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["sample_rate"], 44100);
        assert_eq!(json["duration"], "03:25");
        assert_eq!(json["key_data"]["key"], "C");
        assert_eq!(json["key_data"]["scale"], "major");
        assert_eq!(json["tuning"], 440);
        assert_eq!(json["loudness"]["integrated"], -9.5);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_serialization() {
        let result = DetectionResult::failed();
        assert!(!result.success());
        assert_eq!(result.error(), Some(DETECTION_FAILED));
        assert!(result.detection().is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "files.errors.detection"})
        );
    }

    #[test]
    fn test_mono_detection_has_null_integrated_loudness() {
        let mut detection = sample_detection();
        detection.loudness.integrated = None;
        let json = serde_json::to_value(DetectionResult::from(detection)).unwrap();
        assert!(json["loudness"]["integrated"].is_null());
    }

    #[test]
    fn test_gated_stereo_loudness_is_not_null() {
        let mut detection = sample_detection();
        detection.loudness.integrated = Some(f64::NEG_INFINITY);
        let json = serde_json::to_value(DetectionResult::from(detection.clone())).unwrap();
        assert_eq!(json["loudness"]["integrated"], "-Infinity");

        let parsed: LoudnessMeasures =
            serde_json::from_value(json["loudness"].clone()).unwrap();
        assert_eq!(parsed.integrated, Some(f64::NEG_INFINITY));

        let parsed: LoudnessMeasures =
            serde_json::from_str(r#"{"integrated": -9.5}"#).unwrap();
        assert_eq!(parsed.integrated, Some(-9.5));
        let parsed: LoudnessMeasures = serde_json::from_str(r#"{"integrated": null}"#).unwrap();
        assert_eq!(parsed.integrated, None);
    }
}

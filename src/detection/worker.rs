//! Isolated detection worker
//!
//! Each request runs on its own OS thread with a freshly created extractor.
//! The thread answers exactly once over a oneshot channel: with the
//! detection, with the extractor's error, or with a fault if the extractor
//! panicked. The extractor is dropped before the answer is sent.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use tokio::sync::oneshot;

use super::extractor::{Extractor, ExtractorInput};
use crate::analysis::result::{Detection, KeyData, LoudnessMeasures};
use crate::config::DetectionConfig;
use crate::error::AnalysisError;
use crate::io::SampleBuffer;

/// Creates the extractor for one request
pub(crate) type ExtractorFactory =
    Arc<dyn Fn() -> Result<Box<dyn Extractor>, AnalysisError> + Send + Sync>;

/// Receiving end of a worker's single answer
pub(crate) type WorkerReply = oneshot::Receiver<Result<Detection, AnalysisError>>;

/// Start a worker thread for one request
///
/// # Errors
///
/// Returns `AnalysisError::ComputationFault` if the thread cannot be spawned.
pub(crate) fn spawn(
    buffer: SampleBuffer,
    config: DetectionConfig,
    factory: ExtractorFactory,
) -> Result<WorkerReply, AnalysisError> {
    let (tx, rx) = oneshot::channel();

    thread::Builder::new()
        .name("detection-worker".to_string())
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut extractor = factory()?;
                let detection = run(&buffer, &config, extractor.as_mut());
                drop(extractor);
                detection
            }))
            .unwrap_or_else(|payload| {
                Err(AnalysisError::ComputationFault(format!(
                    "extractor panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

            if tx.send(outcome).is_err() {
                log::debug!("Detection finished after the requester gave up, result discarded");
            }
        })
        .map_err(|e| AnalysisError::ComputationFault(format!("cannot start worker: {}", e)))?;

    Ok(rx)
}

/// Run one request against an extractor and shape its answer
pub(crate) fn run(
    buffer: &SampleBuffer,
    config: &DetectionConfig,
    extractor: &mut dyn Extractor,
) -> Result<Detection, AnalysisError> {
    let mono = buffer.mono_signal(config.downmix)?;
    let stereo = buffer.stereo_pair();

    let input = ExtractorInput {
        mono: &mono,
        stereo,
        sample_rate: buffer.sample_rate(),
        min_freq: config.min_freq,
        max_freq: config.max_freq,
        profile: &config.profile,
        tuning: config.tuning,
        auto_tuning: config.auto_tuning,
    };

    let output = extractor.extract(&input)?;

    let tuning = if config.auto_tuning {
        output.tuning_frequency
    } else {
        config.tuning
    };
    if !tuning.is_finite() || tuning <= 0.0 {
        return Err(AnalysisError::ComputationFault(format!(
            "malformed tuning frequency: {}",
            tuning
        )));
    }
    if !output.tempo_bpm.is_finite() || output.tempo_bpm < 0.0 {
        return Err(AnalysisError::ComputationFault(format!(
            "malformed tempo: {}",
            output.tempo_bpm
        )));
    }
    if !output.key.strength.is_finite() {
        return Err(AnalysisError::ComputationFault(format!(
            "malformed key strength: {}",
            output.key.strength
        )));
    }

    Ok(Detection {
        sample_rate: buffer.sample_rate(),
        duration: buffer.duration_string(),
        key_data: KeyData::new(output.key.key, output.key.strength),
        tempo: output.tempo_bpm,
        tuning: tuning.round() as u32,
        loudness: LoudnessMeasures {
            integrated: stereo.and(output.integrated_loudness),
        },
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::Key;
    use crate::detection::extractor::{ExtractorOutput, KeyEstimate};

    struct Fixed(ExtractorOutput);

    impl Extractor for Fixed {
        fn extract(&mut self, _: &ExtractorInput<'_>) -> Result<ExtractorOutput, AnalysisError> {
            Ok(self.0)
        }
    }

    fn output(tuning_frequency: f32, tempo_bpm: f32) -> ExtractorOutput {
        ExtractorOutput {
            key: KeyEstimate {
                key: Key::Minor(9),
                strength: 0.6,
            },
            tuning_frequency,
            tempo_bpm,
            integrated_loudness: Some(-12.0),
        }
    }

    fn mono_buffer() -> SampleBuffer {
        SampleBuffer::from_planar(vec![vec![0.1; 44100 * 65]], 44100).unwrap()
    }

    #[test]
    fn test_run_shapes_detection() {
        let detection = run(
            &mono_buffer(),
            &DetectionConfig::default(),
            &mut Fixed(output(440.0, 128.0)),
        )
        .unwrap();

        assert_eq!(detection.sample_rate, 44100);
        assert_eq!(detection.duration, "01:05");
        assert_eq!(detection.key_data.key, "A");
        assert_eq!(detection.key_data.scale, "minor");
        assert_eq!(detection.tempo, 128.0);
        assert_eq!(detection.tuning, 440);
        // Mono input never reports integrated loudness
        assert_eq!(detection.loudness.integrated, None);
    }

    #[test]
    fn test_run_rejects_malformed_output() {
        let config = DetectionConfig {
            auto_tuning: true,
            ..DetectionConfig::default()
        };
        let buffer = mono_buffer();

        assert!(run(&buffer, &config, &mut Fixed(output(f32::NAN, 120.0))).is_err());
        assert!(run(&buffer, &config, &mut Fixed(output(440.0, f32::INFINITY))).is_err());
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload = panic::catch_unwind(|| panic!("{} failed", "stage")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "stage failed");
    }
}

//! Key, tuning and tempo detection
//!
//! [`Detector`] hands a decoded buffer and a [`DetectionConfig`] to an
//! isolated worker thread, waits for its single answer (bounded by a
//! timeout), and folds every failure into the generic
//! [`DETECTION_FAILED`](crate::analysis::result::DETECTION_FAILED) result.
//! Fault details only go to the log.
//!
//! # Example
//!
//! ```no_run
//! use tonemeter_dsp::config::DetectionConfig;
//! use tonemeter_dsp::detection::Detector;
//!
//! # async fn run() -> Result<(), tonemeter_dsp::AnalysisError> {
//! let detector = Detector::new();
//! let result = detector.detect_file("track.flac", &DetectionConfig::default()).await?;
//! println!("{}", serde_json::to_string(&result).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod extractor;
mod worker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::result::{Detection, DetectionResult};
use crate::config::DetectionConfig;
use crate::error::AnalysisError;
use crate::io::{load, SampleBuffer};

pub use extractor::{DspExtractor, Extractor, ExtractorInput, ExtractorOutput, KeyEstimate};

use worker::ExtractorFactory;

/// Default time a worker gets to answer
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Dispatches detection requests to worker threads
#[derive(Clone)]
pub struct Detector {
    factory: ExtractorFactory,
    timeout: Option<Duration>,
}

impl Detector {
    /// Detector using [`DspExtractor`] and [`DEFAULT_TIMEOUT`]
    pub fn new() -> Self {
        Self::with_extractor(DspExtractor::new)
    }

    /// Detector creating its extractor with `factory`, once per request
    pub fn with_extractor<F, E>(factory: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
        E: Extractor + 'static,
    {
        Self {
            factory: Arc::new(move || Ok(Box::new(factory()) as Box<dyn Extractor>)),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Replace the answer timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for workers without a time limit
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Current answer timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Detect key, tuning, tempo and loudness of a decoded buffer
    ///
    /// Never fails: faults, panics, malformed answers and timeouts all come
    /// back as [`DetectionResult::failed`].
    pub async fn detect(&self, buffer: SampleBuffer, config: &DetectionConfig) -> DetectionResult {
        self.dispatch(buffer, config, None).await
    }

    /// Decode a file, then detect as [`detect`](Self::detect) does
    ///
    /// Decoding runs on tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::DecodingError` if the file cannot be decoded;
    /// detection failures are reported inside the returned result.
    pub async fn detect_file<P: AsRef<Path>>(
        &self,
        path: P,
        config: &DetectionConfig,
    ) -> Result<DetectionResult, AnalysisError> {
        let path = path.as_ref().to_path_buf();
        let decode_path = path.clone();

        let buffer = tokio::task::spawn_blocking(move || load(&decode_path, None))
            .await
            .map_err(|e| AnalysisError::DecodingError(format!("decoder task failed: {}", e)))??;

        Ok(self.dispatch(buffer, config, Some(path)).await)
    }

    async fn dispatch(
        &self,
        buffer: SampleBuffer,
        config: &DetectionConfig,
        source: Option<PathBuf>,
    ) -> DetectionResult {
        log::debug!(
            "Dispatching detection: {} channel(s), {} Hz, {:.2}s",
            buffer.channel_count(),
            buffer.sample_rate(),
            buffer.duration()
        );

        match self.request(buffer, config).await {
            Ok(detection) => {
                log::debug!(
                    "Detection finished: {} {} at {:.2} BPM, tuning {} Hz",
                    detection.key_data.key,
                    detection.key_data.scale,
                    detection.tempo,
                    detection.tuning
                );
                DetectionResult::Success(detection)
            }
            Err(err) => {
                let context = serde_json::json!({
                    "file": source.as_ref().map(|p| p.display().to_string()),
                    "config": config,
                });
                log::error!("Unable to process file: {}. Data: {}", err, context);
                DetectionResult::failed()
            }
        }
    }

    async fn request(
        &self,
        buffer: SampleBuffer,
        config: &DetectionConfig,
    ) -> Result<Detection, AnalysisError> {
        let reply = worker::spawn(buffer, config.clone(), Arc::clone(&self.factory))?;

        let answer = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, reply)
                .await
                .map_err(|_| AnalysisError::Timeout(limit))?,
            None => reply.await,
        };

        answer.map_err(|_| {
            AnalysisError::ComputationFault("worker exited without answering".to_string())
        })?
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

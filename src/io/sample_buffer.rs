//! Decoded audio held as one sample vector per channel

use crate::error::AnalysisError;

/// Maximum number of channels kept from a decoded stream
pub const MAX_CHANNELS: usize = 2;

/// Largest length difference between channels, in samples, accepted as
/// decoder rounding
pub const MAX_CHANNEL_SKEW: usize = 64;

/// Decoded audio: up to two channels of `f32` samples in `[-1.0, 1.0]`
///
/// Built once per analysis request and never mutated afterwards. Channels may
/// differ by a few samples when the decoder rounds frame counts.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
    duration: f64,
}

impl SampleBuffer {
    /// Build a buffer from planar channel data
    ///
    /// Streams with more than two channels keep the first two. The duration
    /// is derived from the longest channel.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` when no channel is given, the
    /// sample rate is zero, or the kept channels differ in length by more
    /// than [`MAX_CHANNEL_SKEW`] samples.
    pub fn from_planar(
        mut channels: Vec<Vec<f32>>,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        if channels.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Audio buffer has no channels".to_string(),
            ));
        }

        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        if channels.len() > MAX_CHANNELS {
            log::warn!(
                "Keeping the first {} of {} channels",
                MAX_CHANNELS,
                channels.len()
            );
            channels.truncate(MAX_CHANNELS);
        }

        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        let shortest = channels.iter().map(Vec::len).min().unwrap_or(0);
        if frames - shortest > MAX_CHANNEL_SKEW {
            return Err(AnalysisError::InvalidInput(format!(
                "Channel lengths differ too much: {} vs {} samples",
                frames, shortest
            )));
        }

        let duration = frames as f64 / sample_rate as f64;

        Ok(Self {
            channels,
            sample_rate,
            duration,
        })
    }

    /// Build a buffer from interleaved samples (`L R L R ...`)
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        if channel_count == 0 {
            return Err(AnalysisError::InvalidInput(
                "Channel count must be > 0".to_string(),
            ));
        }

        let frames = samples.len() / channel_count;
        let kept = channel_count.min(MAX_CHANNELS);
        let mut channels = vec![Vec::with_capacity(frames); kept];

        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        if channel_count > MAX_CHANNELS {
            log::warn!(
                "Keeping the first {} of {} interleaved channels",
                MAX_CHANNELS,
                channel_count
            );
        }

        Self::from_planar(channels, sample_rate)
    }

    /// Number of channels (1 or 2)
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Samples of one channel, `None` if the channel does not exist
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels in order
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Left/right pair for stereo buffers
    pub fn stereo_pair(&self) -> Option<(&[f32], &[f32])> {
        match self.channels.as_slice() {
            [left, right] => Some((left.as_slice(), right.as_slice())),
            _ => None,
        }
    }

    /// Signal used for mono analysis
    ///
    /// The first channel by default; with `downmix` set, stereo buffers are
    /// averaged to mono instead.
    pub fn mono_signal(&self, downmix: bool) -> Result<Vec<f32>, AnalysisError> {
        match (downmix, self.stereo_pair()) {
            (true, Some((left, right))) => crate::preprocessing::channel_mixer::downmix(left, right),
            _ => Ok(self.channels[0].clone()),
        }
    }

    /// Duration formatted as `MM:SS` (minutes wrap at one hour)
    pub fn duration_string(&self) -> String {
        format_duration(self.duration)
    }
}

/// Format seconds as `MM:SS`, minutes modulo 60
pub fn format_duration(seconds: f64) -> String {
    let millis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0) as u64
    } else {
        0
    };
    let minutes = (millis / 60_000) % 60;
    let secs = (millis / 1000) % 60;
    format!("{:02}:{:02}", minutes, secs)
}

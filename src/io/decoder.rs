//! Audio decoding using Symphonia
//!
//! Decoding goes through a [`DecoderContext`], which holds the probe and codec
//! registries together with a PCM scratch buffer. Callers decoding many files
//! can keep one context around; [`load`] creates a temporary one otherwise.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer as PcmBuffer, SignalSpec};
use symphonia::core::codecs::{CodecRegistry, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, Probe};

use super::sample_buffer::{SampleBuffer, MAX_CHANNELS};
use crate::error::AnalysisError;

/// Reusable decoding state
pub struct DecoderContext {
    probe: &'static Probe,
    codecs: &'static CodecRegistry,
    scratch: Option<(SignalSpec, PcmBuffer<f32>)>,
    files_decoded: usize,
}

impl DecoderContext {
    /// Create a context backed by Symphonia's default registries
    pub fn new() -> Self {
        Self {
            probe: symphonia::default::get_probe(),
            codecs: symphonia::default::get_codecs(),
            scratch: None,
            files_decoded: 0,
        }
    }

    /// Number of files decoded successfully with this context
    pub fn files_decoded(&self) -> usize {
        self.files_decoded
    }

    /// Decode a file into a [`SampleBuffer`]
    ///
    /// Corrupt packets inside an otherwise readable stream are skipped.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::DecodingError` if the file cannot be opened,
    /// probed or decoded, or if it yields no audio.
    pub fn decode(&mut self, path: &Path) -> Result<SampleBuffer, AnalysisError> {
        log::debug!("Decoding audio file: {}", path.display());

        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = self.probe.format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                AnalysisError::DecodingError("No supported audio tracks found".to_string())
            })?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut decoder = self
            .codecs
            .make(&track.codec_params, &DecoderOptions::default())?;

        let mut channels: Vec<Vec<f32>> = Vec::new();
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let frames = decoded.frames();
                    if frames == 0 {
                        continue;
                    }

                    if channels.is_empty() {
                        let count = spec.channels.count().clamp(1, MAX_CHANNELS);
                        channels = vec![Vec::new(); count];
                    }
                    if sample_rate.is_none() {
                        sample_rate = Some(spec.rate);
                    }

                    let scratch = self.scratch_for(spec, decoded.capacity());
                    scratch.copy_planar_ref(decoded);
                    let planar = scratch.samples();

                    for (index, channel) in channels.iter_mut().enumerate() {
                        let start = index * frames;
                        if let Some(chunk) = planar.get(start..start + frames) {
                            channel.extend_from_slice(chunk);
                        }
                    }
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    skipped_packets += 1;
                    log::warn!("Skipping corrupt packet in {}: {}", path.display(), msg);
                }
                Err(e) => return Err(e.into()),
            }
        }

        if skipped_packets > 0 {
            log::warn!(
                "{} packet(s) skipped while decoding {}",
                skipped_packets,
                path.display()
            );
        }

        if channels.iter().all(Vec::is_empty) {
            return Err(AnalysisError::DecodingError(format!(
                "No audio frames decoded from {}",
                path.display()
            )));
        }

        let sample_rate = sample_rate.ok_or_else(|| {
            AnalysisError::DecodingError("Unknown sample rate".to_string())
        })?;

        let buffer = SampleBuffer::from_planar(channels, sample_rate)?;
        self.files_decoded += 1;

        log::debug!(
            "Decoded {}: {} channel(s), {} Hz, {:.2}s",
            path.display(),
            buffer.channel_count(),
            buffer.sample_rate(),
            buffer.duration()
        );

        Ok(buffer)
    }

    /// Scratch buffer able to hold `capacity` frames of `spec`, reused when possible
    fn scratch_for(&mut self, spec: SignalSpec, capacity: usize) -> &mut PcmBuffer<f32> {
        let needed = capacity * spec.channels.count();
        let reusable = self.scratch.as_ref().is_some_and(|(held, buf)| {
            held.rate == spec.rate
                && held.channels.count() == spec.channels.count()
                && buf.capacity() >= needed
        });

        if !reusable {
            self.scratch = Some((spec, PcmBuffer::<f32>::new(capacity as u64, spec)));
        }

        let (_, buffer) = self
            .scratch
            .get_or_insert_with(|| (spec, PcmBuffer::<f32>::new(capacity as u64, spec)));
        buffer
    }
}

impl Default for DecoderContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an audio file
///
/// Reuses `context` when given; otherwise a temporary context lives for the
/// duration of this call and is released on every exit path.
///
/// # Example
///
/// ```no_run
/// use tonemeter_dsp::io::decoder::{load, DecoderContext};
///
/// let single = load("track.wav", None)?;
///
/// let mut context = DecoderContext::new();
/// for path in ["a.flac", "b.flac"] {
///     let buffer = load(path, Some(&mut context))?;
///     println!("{}: {} Hz", path, buffer.sample_rate());
/// }
/// # Ok::<(), tonemeter_dsp::AnalysisError>(())
/// ```
pub fn load<P: AsRef<Path>>(
    path: P,
    context: Option<&mut DecoderContext>,
) -> Result<SampleBuffer, AnalysisError> {
    match context {
        Some(context) => context.decode(path.as_ref()),
        None => DecoderContext::new().decode(path.as_ref()),
    }
}

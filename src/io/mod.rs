//! Audio I/O modules
//!
//! Audio decoding and sample buffering using Symphonia.

pub mod decoder;
pub mod sample_buffer;

pub use decoder::{load, DecoderContext};
pub use sample_buffer::SampleBuffer;

//! Loudness measurement modules
//!
//! - Windowed RMS in dBFS per channel, with a stereo average
//! - Integrated loudness (LUFS) of a stereo pair

pub mod integrated;
pub mod rms;

pub use integrated::integrated_loudness;
pub use rms::{
    measure, measure_file, rms_db, AverageLoudness, ChannelLoudness, Channels, LoudnessMeasurement,
};

//! Result types
//!
//! - Musical key representation
//! - Detection outcome and its serialized shape

pub mod result;

pub use result::{Detection, DetectionResult, Key, KeyData, LoudnessMeasures, DETECTION_FAILED};

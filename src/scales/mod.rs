//! Equal-temperament pitch tables
//!
//! - [`octave`]: one-octave table of natural degrees and their chromatic children
//! - [`range`]: named frequency bands for display

pub mod octave;
pub mod range;

pub use octave::{
    build_table, reference_frequencies, PitchFrequencyTable, ReferenceFrequencies, ScaleDegree,
};
pub use range::FrequencyRange;

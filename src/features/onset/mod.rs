//! Onset strength
//!
//! - Energy flux novelty curve, the input to tempo estimation

pub mod energy_flux;

pub use energy_flux::energy_novelty;

//! Key profiles
//!
//! Each profile gives the expected weight of the twelve pitch classes for a
//! major and a minor key with tonic C. Templates for the other tonics are
//! rotations of these.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Named key profile set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyProfile {
    /// Krumhansl & Kessler probe-tone ratings (1982)
    #[default]
    Krumhansl,
    /// Temperley's corpus-derived profile (Kostka-Payne)
    Temperley,
    /// Aarden's Essen folk song profile
    Aarden,
    /// Profile tuned for electronic music (KeyFinder)
    Shaath,
    /// Flat diatonic scale membership
    Diatonic,
    /// Tonic triad only
    TonicTriad,
}

impl KeyProfile {
    /// All profiles, in the order the UI lists them
    pub const ALL: [KeyProfile; 6] = [
        KeyProfile::Krumhansl,
        KeyProfile::Temperley,
        KeyProfile::Aarden,
        KeyProfile::Shaath,
        KeyProfile::Diatonic,
        KeyProfile::TonicTriad,
    ];

    /// Identifier accepted by [`FromStr`]
    pub fn name(&self) -> &'static str {
        match self {
            KeyProfile::Krumhansl => "krumhansl",
            KeyProfile::Temperley => "temperley",
            KeyProfile::Aarden => "aarden",
            KeyProfile::Shaath => "shaath",
            KeyProfile::Diatonic => "diatonic",
            KeyProfile::TonicTriad => "tonictriad",
        }
    }

    /// Major and minor profiles with tonic C
    fn weights(&self) -> (&'static [f32; 12], &'static [f32; 12]) {
        match self {
            KeyProfile::Krumhansl => (&KRUMHANSL_MAJOR, &KRUMHANSL_MINOR),
            KeyProfile::Temperley => (&TEMPERLEY_MAJOR, &TEMPERLEY_MINOR),
            KeyProfile::Aarden => (&AARDEN_MAJOR, &AARDEN_MINOR),
            KeyProfile::Shaath => (&SHAATH_MAJOR, &SHAATH_MINOR),
            KeyProfile::Diatonic => (&DIATONIC_MAJOR, &DIATONIC_MINOR),
            KeyProfile::TonicTriad => (&TRIAD_MAJOR, &TRIAD_MINOR),
        }
    }
}

impl fmt::Display for KeyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyProfile {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        KeyProfile::ALL
            .iter()
            .copied()
            .find(|profile| profile.name() == wanted)
            .ok_or_else(|| AnalysisError::InvalidInput(format!("Unknown key profile: {}", s)))
    }
}

const KRUMHANSL_MAJOR: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const KRUMHANSL_MINOR: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

const TEMPERLEY_MAJOR: [f32; 12] = [
    0.748, 0.060, 0.488, 0.082, 0.670, 0.460, 0.096, 0.715, 0.104, 0.366, 0.057, 0.400,
];
const TEMPERLEY_MINOR: [f32; 12] = [
    0.712, 0.084, 0.474, 0.618, 0.049, 0.460, 0.105, 0.747, 0.404, 0.067, 0.133, 0.330,
];

const AARDEN_MAJOR: [f32; 12] = [
    17.7661, 0.145624, 14.9265, 0.160186, 19.8049, 11.3587, 0.291248, 22.062, 0.145624, 8.15494,
    0.232998, 4.95122,
];
const AARDEN_MINOR: [f32; 12] = [
    18.2648, 0.737619, 14.0499, 16.8599, 0.702494, 14.4362, 0.702494, 18.6161, 4.56621, 1.93186,
    7.37619, 1.75623,
];

const SHAATH_MAJOR: [f32; 12] = [
    6.6, 2.0, 3.5, 2.3, 4.6, 4.0, 2.5, 5.2, 2.4, 3.7, 2.3, 3.4,
];
const SHAATH_MINOR: [f32; 12] = [
    6.5, 2.7, 3.5, 5.4, 2.6, 3.5, 2.5, 5.2, 4.0, 2.7, 4.3, 3.2,
];

const DIATONIC_MAJOR: [f32; 12] = [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
const DIATONIC_MINOR: [f32; 12] = [1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0];

const TRIAD_MAJOR: [f32; 12] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
const TRIAD_MINOR: [f32; 12] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];

/// Key templates for all 24 keys
#[derive(Debug, Clone)]
pub struct KeyTemplates {
    /// Major key templates (12 keys: C, C#, D, ..., B)
    pub major: [Vec<f32>; 12],

    /// Minor key templates (12 keys: C, C#, D, ..., B)
    pub minor: [Vec<f32>; 12],

    profile: KeyProfile,
}

impl KeyTemplates {
    /// Templates built from `profile`
    pub fn new(profile: KeyProfile) -> Self {
        let (major, minor) = profile.weights();
        Self {
            major: std::array::from_fn(|tonic| rotate(major, tonic)),
            minor: std::array::from_fn(|tonic| rotate(minor, tonic)),
            profile,
        }
    }

    /// Profile these templates were built from
    pub fn profile(&self) -> KeyProfile {
        self.profile
    }

    /// Template for the major key with tonic `key_idx` (0 = C)
    pub fn get_major_template(&self, key_idx: u32) -> &[f32] {
        &self.major[key_idx as usize % 12]
    }

    /// Template for the minor key with tonic `key_idx` (0 = C)
    pub fn get_minor_template(&self, key_idx: u32) -> &[f32] {
        &self.minor[key_idx as usize % 12]
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new(KeyProfile::default())
    }
}

/// Shift a C-based profile so that index `tonic` carries the tonic weight
fn rotate(profile: &[f32; 12], tonic: usize) -> Vec<f32> {
    (0..12).map(|pc| profile[(pc + 12 - tonic) % 12]).collect()
}

//! One-octave pitch table built from reference frequencies
//!
//! The table has eight natural degrees, C up to the C one octave higher.
//! Every degree that has a chromatic neighbour above it carries that pitch
//! as its `child`. Frequencies are looked up by spelling: the first spelling
//! of a degree present in the reference set wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::range::FrequencyRange;

/// Reference pitch set: spelling (`"C"`, `"C#"`, `"Db"`, `"B#"`, ...) to Hz
pub type ReferenceFrequencies = HashMap<String, f32>;

/// Semitone ratio in twelve-tone equal temperament
pub const SEMITONE_RATIO: f32 = 1.059_463_1;

/// Spelling that names the C of the next octave
const UPPER_C: &str = "B#";

/// Spellings generated by [`reference_frequencies`], with their semitone
/// offset from C of the requested octave
const SPELLINGS: [(&str, i32); 22] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("C##", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("E#", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("F##", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("G##", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
    ("B#", 12),
];

/// Natural degrees with their spellings, the spellings of the chromatic
/// pitch above them, and the frequency multiplier
const DEGREES: [(&[&str], &[&str], f32); 8] = [
    (&["C", "B#"], &["C#", "Db"], 1.0),
    (&["D", "C##"], &["D#", "Eb"], 1.0),
    (&["E"], &[], 1.0),
    (&["F", "E#"], &["F#", "Gb"], 1.0),
    (&["G", "F##"], &["G#", "Ab"], 1.0),
    (&["A", "G##"], &["A#", "Bb"], 1.0),
    (&["B"], &[], 1.0),
    (&["C", "B#"], &[], 2.0),
];

/// A table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleDegree {
    /// Spellings of this pitch, in lookup order
    pub letters: Vec<String>,
    /// Resolved frequency in Hz, `None` when no spelling is in the reference set
    pub frequency: Option<f32>,
    /// Band of `frequency`
    pub range: Option<FrequencyRange>,
    /// Chromatic pitch one semitone up, absent after E and B and for the top C
    pub child: Option<Box<ScaleDegree>>,
}

impl ScaleDegree {
    fn resolve(letters: &[&str], reference: &ReferenceFrequencies, multiplier: f32) -> Self {
        let frequency = lookup(letters, reference).map(|hz| hz * multiplier);

        Self {
            letters: letters.iter().map(|l| l.to_string()).collect(),
            frequency,
            range: frequency.map(FrequencyRange::classify),
            child: None,
        }
    }
}

/// Eight [`ScaleDegree`] entries spanning one octave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchFrequencyTable {
    degrees: Vec<ScaleDegree>,
}

impl PitchFrequencyTable {
    /// All entries, lowest first
    pub fn degrees(&self) -> &[ScaleDegree] {
        &self.degrees
    }

    /// Number of entries (always eight)
    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    /// Whether the table has no entries (never true for a built table)
    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    /// Iterate over the entries
    pub fn iter(&self) -> std::slice::Iter<'_, ScaleDegree> {
        self.degrees.iter()
    }
}

/// First defined spelling wins; a `B#` value belongs to the next octave and is halved
fn lookup(letters: &[&str], reference: &ReferenceFrequencies) -> Option<f32> {
    letters.iter().find_map(|&letter| {
        reference.get(letter).map(|&hz| {
            if letter == UPPER_C {
                hz / 2.0
            } else {
                hz
            }
        })
    })
}

/// Build the one-octave table from a reference pitch set
///
/// Missing spellings leave the corresponding `frequency` and `range` empty;
/// the table still has eight entries.
pub fn build_table(reference: &ReferenceFrequencies) -> PitchFrequencyTable {
    let degrees = DEGREES
        .iter()
        .map(|&(letters, child_letters, multiplier)| {
            let mut degree = ScaleDegree::resolve(letters, reference, multiplier);
            if !child_letters.is_empty() {
                degree.child = Some(Box::new(ScaleDegree::resolve(
                    child_letters,
                    reference,
                    1.0,
                )));
            }
            degree
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Built pitch table from {} reference spellings",
        reference.len()
    );

    PitchFrequencyTable { degrees }
}

/// Equal-tempered reference set for one octave
///
/// `tuning_a4` is the frequency of A4 in Hz; `octave` uses scientific pitch
/// notation (middle C is C4). `B#` is generated as the C of `octave + 1`.
///
/// # Example
///
/// ```
/// use tonemeter_dsp::scales::reference_frequencies;
///
/// let reference = reference_frequencies(440.0, 4);
/// assert!((reference["A"] - 440.0).abs() < 1e-3);
/// assert!((reference["B#"] - 2.0 * reference["C"]).abs() < 1e-3);
/// ```
pub fn reference_frequencies(tuning_a4: f32, octave: i32) -> ReferenceFrequencies {
    // Semitones from A4 to C of the requested octave
    let c_offset = (octave - 4) * 12 - 9;
    let c = tuning_a4 as f64 * 2f64.powf(c_offset as f64 / 12.0);

    SPELLINGS
        .iter()
        .map(|&(spelling, semitones)| {
            let hz = c * 2f64.powf(semitones as f64 / 12.0);
            (spelling.to_string(), hz as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequencies(table: &PitchFrequencyTable) -> Vec<f32> {
        table.iter().filter_map(|d| d.frequency).collect()
    }

    #[test]
    fn test_table_has_eight_entries() {
        let table = build_table(&reference_frequencies(440.0, 4));
        assert_eq!(table.len(), 8);

        let empty = build_table(&ReferenceFrequencies::new());
        assert_eq!(empty.len(), 8);
        assert!(empty.iter().all(|d| d.frequency.is_none() && d.range.is_none()));
    }

    #[test]
    fn test_top_c_doubles_first_c() {
        for (tuning, octave) in [(440.0, 4), (432.0, 2), (446.0, 6)] {
            let table = build_table(&reference_frequencies(tuning, octave));
            let first = table.degrees()[0].frequency.unwrap();
            let top = table.degrees()[7].frequency.unwrap();
            assert!((top - 2.0 * first).abs() < 1e-3, "{} vs {}", top, first);
        }
    }

    #[test]
    fn test_adjacent_semitones_follow_equal_temperament() {
        let reference = reference_frequencies(440.0, 4);
        let order = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B", "B#"];

        for pair in order.windows(2) {
            let ratio = reference[pair[1]] / reference[pair[0]];
            assert!(
                (ratio - SEMITONE_RATIO).abs() < 1e-4,
                "{} -> {}: ratio {:.5}",
                pair[0],
                pair[1],
                ratio
            );
        }
    }

    #[test]
    fn test_middle_c() {
        let reference = reference_frequencies(440.0, 4);
        assert!((reference["C"] - 261.626).abs() < 0.01);
        assert_eq!(reference["C#"], reference["Db"]);
        assert_eq!(reference["E#"], reference["F"]);
    }

    #[test]
    fn test_frequencies_non_decreasing() {
        let table = build_table(&reference_frequencies(440.0, 3));
        let values = frequencies(&table);
        assert_eq!(values.len(), 8);
        for pair in values.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_children() {
        let table = build_table(&reference_frequencies(440.0, 4));
        let degrees = table.degrees();

        assert!(degrees[2].child.is_none(), "E has no sharp neighbour");
        assert!(degrees[6].child.is_none(), "B has no sharp neighbour");
        assert!(degrees[7].child.is_none(), "top C has no child");

        let c_sharp = degrees[0].child.as_ref().unwrap();
        assert_eq!(c_sharp.letters, vec!["C#".to_string(), "Db".to_string()]);
        let c = degrees[0].frequency.unwrap();
        assert!((c_sharp.frequency.unwrap() / c - SEMITONE_RATIO).abs() < 1e-4);
    }

    #[test]
    fn test_upper_c_spelling_is_halved() {
        let mut reference = ReferenceFrequencies::new();
        reference.insert("B#".to_string(), 523.25);

        let table = build_table(&reference);
        assert!((table.degrees()[0].frequency.unwrap() - 261.625).abs() < 1e-3);
        assert!((table.degrees()[7].frequency.unwrap() - 523.25).abs() < 1e-3);
    }

    #[test]
    fn test_first_spelling_has_priority() {
        let mut reference = ReferenceFrequencies::new();
        reference.insert("D".to_string(), 293.66);
        reference.insert("C##".to_string(), 300.0);

        let table = build_table(&reference);
        assert_eq!(table.degrees()[1].frequency, Some(293.66));
        assert_eq!(table.degrees()[0].frequency, None);
    }

    #[test]
    fn test_ranges_follow_frequencies() {
        let table = build_table(&reference_frequencies(440.0, 1));
        let first = &table.degrees()[0];
        // C1 is about 32.7 Hz
        assert_eq!(first.range, Some(FrequencyRange::Sub));

        let high = build_table(&reference_frequencies(440.0, 8));
        assert_eq!(high.degrees()[0].range, Some(FrequencyRange::HighMids));
        assert_eq!(high.degrees()[7].range, Some(FrequencyRange::Air));
    }
}

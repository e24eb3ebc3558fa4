//! Tonal keys and the scales melodic templates walk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Pitch classes conventionally spelled with flats.
const FLAT_ROOTS: [u8; 4] = [1, 3, 8, 10]; // Db, Eb, Ab, Bb

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    Major,
    Minor,
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMode::Major => write!(f, "major"),
            KeyMode::Minor => write!(f, "minor"),
        }
    }
}

/// A tonal key: root pitch class plus major/minor mode.
///
/// Parses from and displays as `"C minor"`, `"F# major"`, `"Bb minor"`.
/// Serialized as that string so catalog files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    /// Pitch class 0-11 (C=0, C#=1, ...)
    pub root: u8,
    pub mode: KeyMode,
}

impl Key {
    pub const fn new(root: u8, mode: KeyMode) -> Self {
        Key {
            root: root % 12,
            mode,
        }
    }

    pub const fn c_minor() -> Self {
        Key::new(0, KeyMode::Minor)
    }

    /// MIDI note number of the root in the given octave (C4 = 60).
    pub fn root_at_octave(&self, octave: u8) -> u8 {
        (octave + 1) * 12 + self.root
    }

    /// Scale implied by the mode when nothing more specific is configured.
    pub fn default_scale(&self) -> Scale {
        match self.mode {
            KeyMode::Major => Scale::Major,
            KeyMode::Minor => Scale::Minor,
        }
    }

    pub fn root_name(&self) -> &'static str {
        if FLAT_ROOTS.contains(&self.root) {
            NOTE_NAMES_FLAT[self.root as usize]
        } else {
            NOTE_NAMES_SHARP[self.root as usize]
        }
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::c_minor()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root_name(), self.mode)
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidKey(s.to_string());
        let mut parts = s.split_whitespace();
        let note = parts.next().ok_or_else(invalid)?;
        let mode = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("major") | Some("maj") => KeyMode::Major,
            Some("minor") | Some("min") | None => KeyMode::Minor,
            Some(_) => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Key::new(parse_pitch_class(note).ok_or_else(invalid)?, mode))
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// Parse a note name like "C", "F#", "Bb" into a pitch class.
fn parse_pitch_class(note: &str) -> Option<u8> {
    let mut chars = note.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base: i8 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let offset: i8 = match chars.as_str() {
        "" => 0,
        "#" | "♯" => 1,
        "b" | "♭" => -1,
        _ => return None,
    };
    Some((base + offset).rem_euclid(12) as u8)
}

/// Seven-note scales available to melodic templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
}

impl Scale {
    pub const ALL: [Scale; 5] = [
        Scale::Major,
        Scale::Minor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
    ];

    /// Semitone offsets of degrees 1-7 from the root.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Scale::Major => [0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => [0, 2, 3, 5, 7, 8, 10],
            Scale::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Scale::Lydian => [0, 2, 4, 6, 7, 9, 11],
        }
    }

    /// Semitones above the root for a (possibly multi-octave) scale degree.
    pub fn semitones(self, degree: usize) -> u8 {
        self.intervals()[degree % 7] + (degree / 7) as u8 * 12
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Dorian => "dorian",
            Scale::Phrygian => "phrygian",
            Scale::Lydian => "lydian",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Scale::ALL
            .into_iter()
            .find(|scale| scale.name() == lower)
            .ok_or_else(|| Error::UnknownScale(s.to_string()))
    }
}

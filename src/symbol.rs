// Symbol types - the vocabulary of the classification pipeline
//
// Every audio frame is classified into exactly one Symbol: a solfège pitch
// name with an octave, a rest (no voiced content), a detection failure
// (the estimator could not run), or the Unknown sentinel that seeds the
// hysteresis state before the first accepted pitch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chromatic pitch class as derived from a frequency (12-TET).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// Pitch class for a semitone index where 0 = C (MIDI convention).
    pub fn from_semitone(semitone: u8) -> Self {
        match semitone % 12 {
            0 => PitchClass::C,
            1 => PitchClass::CSharp,
            2 => PitchClass::D,
            3 => PitchClass::DSharp,
            4 => PitchClass::E,
            5 => PitchClass::F,
            6 => PitchClass::FSharp,
            7 => PitchClass::G,
            8 => PitchClass::GSharp,
            9 => PitchClass::A,
            10 => PitchClass::ASharp,
            _ => PitchClass::B,
        }
    }

    /// Translate to the solfège syllable plus sharp marker.
    ///
    /// Fixed table: C→Do, D→Re, E→Mi, F→Fa, G→Sol, A→La, B→Si.
    /// Sharps map to the same syllable with the sharp flag set.
    pub fn to_solfa(self) -> (SolfaName, bool) {
        match self {
            PitchClass::C => (SolfaName::Do, false),
            PitchClass::CSharp => (SolfaName::Do, true),
            PitchClass::D => (SolfaName::Re, false),
            PitchClass::DSharp => (SolfaName::Re, true),
            PitchClass::E => (SolfaName::Mi, false),
            PitchClass::F => (SolfaName::Fa, false),
            PitchClass::FSharp => (SolfaName::Fa, true),
            PitchClass::G => (SolfaName::Sol, false),
            PitchClass::GSharp => (SolfaName::Sol, true),
            PitchClass::A => (SolfaName::La, false),
            PitchClass::ASharp => (SolfaName::La, true),
            PitchClass::B => (SolfaName::Si, false),
        }
    }
}

/// Solfège syllable names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolfaName {
    Do,
    Re,
    Mi,
    Fa,
    Sol,
    La,
    Si,
}

impl fmt::Display for SolfaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolfaName::Do => "Do",
            SolfaName::Re => "Re",
            SolfaName::Mi => "Mi",
            SolfaName::Fa => "Fa",
            SolfaName::Sol => "Sol",
            SolfaName::La => "La",
            SolfaName::Si => "Si",
        };
        write!(f, "{}", name)
    }
}

/// Policy for sharp notes when deriving a solfège name.
///
/// The gated realtime variant collapses sharps onto the plain syllable
/// (C♯→Do), the ungated variants keep a sharp marker (C♯→Do#). Both are
/// supported as a configuration point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SharpPolicy {
    /// Collapse sharps onto the plain syllable (C♯ → Do).
    #[default]
    DropSharp,
    /// Keep the sharp marker (C♯ → Do#).
    KeepSharp,
}

/// Classification result for one audio frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    /// Named pitch with octave, e.g. Do4 or Fa#5.
    Pitch {
        name: SolfaName,
        sharp: bool,
        octave: i32,
    },
    /// No voiced content in the frame.
    Rest,
    /// The frequency estimator could not run on the frame.
    DetectionFailure,
    /// Sentinel seeding the hysteresis state before the first accepted pitch.
    Unknown,
}

impl Symbol {
    /// Convenience constructor for a natural pitch symbol.
    pub fn pitch(name: SolfaName, octave: i32) -> Self {
        Symbol::Pitch {
            name,
            sharp: false,
            octave,
        }
    }

    /// Convenience constructor for a sharp pitch symbol.
    pub fn sharp(name: SolfaName, octave: i32) -> Self {
        Symbol::Pitch {
            name,
            sharp: true,
            octave,
        }
    }

    /// True if this symbol is a named pitch (not Rest/Failure/Unknown).
    pub fn is_pitch(&self) -> bool {
        matches!(self, Symbol::Pitch { .. })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Pitch {
                name,
                sharp,
                octave,
            } => {
                if *sharp {
                    write!(f, "{}#{}", name, octave)
                } else {
                    write!(f, "{}{}", name, octave)
                }
            }
            Symbol::Rest => write!(f, "Rest"),
            Symbol::DetectionFailure => write!(f, "Failure"),
            Symbol::Unknown => write!(f, "Unknown"),
        }
    }
}

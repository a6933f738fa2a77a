// SymbolMapper - frequency to solfège symbol mapping
//
// Pure mapping from an optional dominant frequency to a Symbol. The single
// most important rule lives here: a derived octave outside the accepted set
// never overwrites the hysteresis state with a fresh value, it only echoes
// the last good one.

use crate::estimator::hz_to_note;
use crate::symbol::{SharpPolicy, Symbol};

/// Maps a dominant frequency (or its absence) to a Symbol.
pub struct SymbolMapper {
    sharp_policy: SharpPolicy,
    accepted_octaves: Vec<i32>,
}

impl SymbolMapper {
    /// Create a mapper with the given sharp policy and accepted octave set.
    pub fn new(sharp_policy: SharpPolicy, accepted_octaves: Vec<i32>) -> Self {
        Self {
            sharp_policy,
            accepted_octaves,
        }
    }

    /// Map a frequency to a Symbol.
    ///
    /// # Arguments
    /// * `frequency` - Dominant frequency of the frame, `None` if unvoiced
    /// * `previous` - Last accepted symbol (hysteresis state)
    ///
    /// # Returns
    /// * `Rest` when no frequency is present
    /// * The derived pitch symbol when its octave is accepted
    /// * A clone of `previous` when the derived octave is out of range
    ///   (hysteresis fallback)
    ///
    /// Pure function: the caller owns the hysteresis update.
    pub fn map(&self, frequency: Option<f64>, previous: &Symbol) -> Symbol {
        let freq = match frequency {
            Some(freq) => freq,
            None => return Symbol::Rest,
        };

        let (pitch_class, octave) = hz_to_note(freq);
        if !self.accepted_octaves.contains(&octave) {
            log::debug!(
                "[Mapper] Octave {} outside accepted set, echoing {}",
                octave,
                previous
            );
            return previous.clone();
        }

        let (name, sharp) = pitch_class.to_solfa();
        let sharp = match self.sharp_policy {
            SharpPolicy::DropSharp => false,
            SharpPolicy::KeepSharp => sharp,
        };

        Symbol::Pitch {
            name,
            sharp,
            octave,
        }
    }
}

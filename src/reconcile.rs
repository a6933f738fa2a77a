// Reconciler - post-hoc length adjustment against the reference score
//
// After the stream ends, the captured symbol count rarely matches the
// reference exactly. The reconciler pads by duplicating the last symbol
// (or Rest when nothing was captured) and truncates overshoot, so the
// result length always equals the reference length.

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// How reconciliation adjusted the performance list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// Lengths already matched
    Unchanged,
    /// Appended this many copies of the final symbol (or Rest)
    Padded(usize),
    /// Dropped this many symbols from the tail
    Truncated(usize),
}

/// Adjust `list` to exactly `reference_length` symbols.
///
/// Postcondition: the returned list's length equals `reference_length`.
pub fn reconcile(
    mut list: Vec<Symbol>,
    reference_length: usize,
) -> (Vec<Symbol>, ReconcileOutcome) {
    let captured = list.len();

    let outcome = if captured < reference_length {
        let missing = reference_length - captured;
        let filler = list.last().cloned().unwrap_or(Symbol::Rest);
        list.extend(std::iter::repeat(filler).take(missing));
        ReconcileOutcome::Padded(missing)
    } else if captured > reference_length {
        let dropped = captured - reference_length;
        list.truncate(reference_length);
        ReconcileOutcome::Truncated(dropped)
    } else {
        ReconcileOutcome::Unchanged
    };

    debug_assert_eq!(list.len(), reference_length);
    (list, outcome)
}

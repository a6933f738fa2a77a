// MeasureBatcher - fixed-capacity measure accumulation
//
// Appends classified symbols to the current measure and the running
// performance list. A full measure is sealed: persisted as a durable record
// and transmitted as one comma-joined payload. Persistence and transmission
// are independent steps; a transmit failure is reported in the outcome and
// never blocks persistence or subsequent appends.

use std::sync::Arc;

use crate::error::{SessionError, TransmitError};
use crate::store::MeasureStore;
use crate::symbol::Symbol;
use crate::transmit::{Transmitter, MEASURE_CHANNEL};

/// What happened during one append or flush.
#[derive(Debug, Default)]
pub struct AppendOutcome {
    /// Index of the measure sealed by this call, if any
    pub sealed: Option<usize>,
    /// Transmit failure for the sealed measure, if any (recoverable)
    pub transmit_error: Option<TransmitError>,
}

pub struct MeasureBatcher {
    capacity: usize,
    current: Vec<Symbol>,
    performance: Vec<Symbol>,
    next_index: usize,
    store: MeasureStore,
    transmitter: Arc<dyn Transmitter>,
}

impl MeasureBatcher {
    pub fn new(capacity: usize, store: MeasureStore, transmitter: Arc<dyn Transmitter>) -> Self {
        Self {
            capacity: capacity.max(1),
            current: Vec::with_capacity(capacity.max(1)),
            performance: Vec::new(),
            next_index: 0,
            store,
            transmitter,
        }
    }

    /// Append one symbol to the current measure and the performance list.
    ///
    /// Seals the measure when it reaches capacity: persists it under the
    /// next sequential index and transmits it as one delimited record.
    pub fn append(&mut self, symbol: Symbol) -> Result<AppendOutcome, SessionError> {
        self.performance.push(symbol.clone());
        self.current.push(symbol);

        if self.current.len() == self.capacity {
            return self.seal(false);
        }

        Ok(AppendOutcome::default())
    }

    /// Persist and transmit a non-empty partial measure at stream end.
    ///
    /// No padding to capacity; an empty current measure is a no-op.
    pub fn flush_partial(&mut self) -> Result<AppendOutcome, SessionError> {
        if self.current.is_empty() {
            return Ok(AppendOutcome::default());
        }
        log::info!(
            "[Batcher] Flushing partial measure with {} symbols",
            self.current.len()
        );
        self.seal(true)
    }

    fn seal(&mut self, partial: bool) -> Result<AppendOutcome, SessionError> {
        let index = self.next_index;

        // Persist first: a transmit failure must never cost the record
        self.store.save(index, &self.current)?;

        let payload = join_symbols(&self.current);
        let transmit_error = match self.transmitter.send(MEASURE_CHANNEL, &payload) {
            Ok(()) => None,
            Err(err) => {
                log::warn!("[Batcher] Transmit failed for measure {}: {}", index, err);
                Some(err)
            }
        };

        log::info!(
            "[Batcher] Sealed {}measure {}: {}",
            if partial { "partial " } else { "" },
            index,
            payload
        );

        self.current.clear();
        self.next_index += 1;

        Ok(AppendOutcome {
            sealed: Some(index),
            transmit_error,
        })
    }

    /// Full-performance symbol list captured so far.
    pub fn performance(&self) -> &[Symbol] {
        &self.performance
    }

    /// Consume the batcher, yielding the performance list.
    pub fn into_performance(self) -> Vec<Symbol> {
        self.performance
    }

    /// Number of measures sealed so far (partial included once flushed).
    pub fn measures_sealed(&self) -> usize {
        self.next_index
    }

    /// Symbols sitting in the unsealed current measure.
    pub fn pending_len(&self) -> usize {
        self.current.len()
    }
}

/// Join symbols into the comma-delimited payload format.
pub fn join_symbols(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

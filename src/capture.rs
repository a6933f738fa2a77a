// CaptureSession - trigger-gated capture state machine
//
// Owns all mutable per-session state (hysteresis, current measure,
// performance list, the capture latch) and is driven synchronously, one
// frame at a time, by a single caller. The stream may end at any frame
// boundary; finish() always runs the partial flush and reconciliation, so
// no symbol is lost and no partial measure is silently dropped.

use std::sync::Arc;

use crate::classifier::FrameClassifier;
use crate::config::PipelineConfig;
use crate::error::SessionError;
use crate::estimator::FrequencyEstimator;
use crate::mapper::SymbolMapper;
use crate::measure::{join_symbols, AppendOutcome, MeasureBatcher};
use crate::reconcile::{reconcile, ReconcileOutcome};
use crate::store::MeasureStore;
use crate::symbol::Symbol;
use crate::transmit::{Transmitter, PERFORMANCE_CHANNEL};

/// Capture gate states. The Idle -> Capturing transition is latched: it
/// fires at most once per session and never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Discarding classified symbols until the trigger fires
    Idle,
    /// Appending every classified symbol to the measure batcher
    Capturing,
}

/// Summary of a completed session.
#[derive(Debug)]
pub struct SessionReport {
    /// Reconciled full-performance symbol list
    pub performance: Vec<Symbol>,
    /// Measures sealed during capture (final partial included)
    pub measures_sealed: usize,
    /// How reconciliation adjusted the captured list
    pub outcome: ReconcileOutcome,
    /// Recoverable transmit failures observed during the session
    pub transmit_failures: usize,
}

pub struct CaptureSession {
    classifier: FrameClassifier,
    batcher: MeasureBatcher,
    state: CaptureState,
    trigger: Option<Symbol>,
    reference_length: usize,
    transmitter: Arc<dyn Transmitter>,
    transmit_failures: usize,
    frames_seen: u64,
}

impl CaptureSession {
    /// Create a session and clear prior durable records.
    ///
    /// # Arguments
    /// * `config` - Pipeline configuration (gating, capacity, octaves, store)
    /// * `estimator` - Injected frequency estimator
    /// * `transmitter` - Outbound record boundary
    /// * `reference_length` - Length of the pre-computed reference list
    ///
    /// # Errors
    /// Fails if the output directory cannot be prepared; nothing else is
    /// touched in that case.
    pub fn new(
        config: &PipelineConfig,
        estimator: Box<dyn FrequencyEstimator>,
        transmitter: Arc<dyn Transmitter>,
        reference_length: usize,
    ) -> Result<Self, SessionError> {
        let store = MeasureStore::new(&config.store.output_dir, &config.store.base_name);
        store.clear_previous()?;

        let mapper = SymbolMapper::new(
            config.capture.sharp_policy,
            config.capture.accepted_octaves.clone(),
        );
        let classifier = FrameClassifier::new(estimator, mapper, config.audio.sample_rate);
        let batcher = MeasureBatcher::new(
            config.capture.measure_capacity,
            store,
            Arc::clone(&transmitter),
        );

        let (state, trigger) = if config.capture.trigger_enabled {
            log::info!(
                "[Session] Waiting for trigger {}",
                config.capture.trigger_symbol
            );
            (CaptureState::Idle, Some(config.capture.trigger_symbol.clone()))
        } else {
            log::info!("[Session] Trigger disabled, capturing from first frame");
            (CaptureState::Capturing, None)
        };

        Ok(Self {
            classifier,
            batcher,
            state,
            trigger,
            reference_length,
            transmitter,
            transmit_failures: 0,
            frames_seen: 0,
        })
    }

    /// Current gate state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Symbols captured so far (post-trigger only).
    pub fn captured(&self) -> &[Symbol] {
        self.batcher.performance()
    }

    /// Classify one frame and route the symbol through the gate.
    ///
    /// While Idle, symbols are discarded; the trigger frame itself opens
    /// the gate but is not appended. While Capturing, every symbol (Rest
    /// and DetectionFailure included) is appended.
    pub fn process_frame(&mut self, frame: &[f32]) -> Result<Symbol, SessionError> {
        self.frames_seen += 1;
        let symbol = self.classifier.classify(frame);

        match self.state {
            CaptureState::Idle => {
                if self.trigger.as_ref() == Some(&symbol) {
                    log::info!(
                        "[Session] Trigger {} detected at frame {}, capture started",
                        symbol,
                        self.frames_seen
                    );
                    self.state = CaptureState::Capturing;
                }
                // Pre-trigger symbols (the trigger itself included) are discarded
            }
            CaptureState::Capturing => {
                let outcome = self.batcher.append(symbol.clone())?;
                self.track_outcome(outcome);
            }
        }

        Ok(symbol)
    }

    fn track_outcome(&mut self, outcome: AppendOutcome) {
        if outcome.transmit_error.is_some() {
            self.transmit_failures += 1;
        }
    }

    /// End the stream: flush the partial measure, reconcile against the
    /// reference length, and transmit the full reconciled list once.
    ///
    /// Safe to call after any number of frames, including zero.
    pub fn finish(mut self) -> Result<SessionReport, SessionError> {
        let outcome = self.batcher.flush_partial()?;
        self.track_outcome(outcome);

        let measures_sealed = self.batcher.measures_sealed();
        let captured = self.batcher.into_performance();
        log::info!(
            "[Session] Stream ended after {} frames: {} symbols captured, {} measures sealed",
            self.frames_seen,
            captured.len(),
            measures_sealed
        );

        let (performance, outcome) = reconcile(captured, self.reference_length);
        match outcome {
            ReconcileOutcome::Unchanged => {
                log::info!("[Session] Captured count already matches reference");
            }
            ReconcileOutcome::Padded(n) => {
                log::info!("[Session] Padded {} symbols to match reference", n);
            }
            ReconcileOutcome::Truncated(n) => {
                log::info!("[Session] Truncated {} symbols to match reference", n);
            }
        }

        if let Err(err) = self
            .transmitter
            .send(PERFORMANCE_CHANNEL, &join_symbols(&performance))
        {
            log::warn!("[Session] Final performance transmit failed: {}", err);
            self.transmit_failures += 1;
        }

        Ok(SessionReport {
            performance,
            measures_sealed,
            outcome,
            transmit_failures: self.transmit_failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, StoreConfig};
    use crate::estimator::EstimateError;
    use crate::symbol::SolfaName;
    use crate::transmit::BroadcastTransmitter;
    use std::collections::VecDeque;

    /// Estimator yielding one scripted dominant frequency per frame.
    struct ScriptedEstimator {
        script: VecDeque<Option<f64>>,
    }

    impl crate::estimator::FrequencyEstimator for ScriptedEstimator {
        fn estimate(
            &mut self,
            _frame: &[f32],
            _sample_rate: u32,
        ) -> Result<Vec<Option<f64>>, EstimateError> {
            match self.script.pop_front().expect("script exhausted") {
                Some(freq) => Ok(vec![Some(freq)]),
                None => Ok(vec![]),
            }
        }
    }

    fn session_with_script(
        script: Vec<Option<f64>>,
        reference_length: usize,
        dir: &std::path::Path,
    ) -> (CaptureSession, Arc<BroadcastTransmitter>) {
        let mut config = PipelineConfig::default();
        config.store = StoreConfig {
            output_dir: dir.to_string_lossy().into_owned(),
            base_name: "measure".to_string(),
        };
        let transmitter = Arc::new(BroadcastTransmitter::new(128));
        let estimator = Box::new(ScriptedEstimator {
            script: script.into(),
        });
        let session = CaptureSession::new(
            &config,
            estimator,
            transmitter.clone() as Arc<dyn Transmitter>,
            reference_length,
        )
        .unwrap();
        (session, transmitter)
    }

    const FA5: f64 = 698.46;
    const DO4: f64 = 261.63;
    const RE4: f64 = 293.66;

    #[test]
    fn test_idle_discards_symbols_before_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _tx) =
            session_with_script(vec![Some(DO4), None, Some(DO4)], 0, dir.path());
        let _keep = _tx.subscribe();

        for _ in 0..3 {
            session.process_frame(&[0.0; 8]).unwrap();
        }
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.captured().is_empty());
    }

    #[test]
    fn test_trigger_opens_gate_but_is_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _tx) =
            session_with_script(vec![Some(FA5), Some(DO4), Some(RE4)], 3, dir.path());
        let _keep = _tx.subscribe();

        let symbol = session.process_frame(&[0.0; 8]).unwrap();
        assert_eq!(symbol, Symbol::pitch(SolfaName::Fa, 5));
        assert_eq!(session.state(), CaptureState::Capturing);
        assert!(session.captured().is_empty(), "trigger frame not captured");

        session.process_frame(&[0.0; 8]).unwrap();
        session.process_frame(&[0.0; 8]).unwrap();
        assert_eq!(
            session.captured(),
            &[
                Symbol::pitch(SolfaName::Do, 4),
                Symbol::pitch(SolfaName::Re, 4)
            ]
        );
    }

    #[test]
    fn test_trigger_latch_fires_once() {
        let dir = tempfile::tempdir().unwrap();
        // A second Fa5 after the trigger is captured like any other symbol
        let (mut session, _tx) =
            session_with_script(vec![Some(FA5), Some(FA5)], 1, dir.path());
        let _keep = _tx.subscribe();

        session.process_frame(&[0.0; 8]).unwrap();
        session.process_frame(&[0.0; 8]).unwrap();
        assert_eq!(session.captured(), &[Symbol::pitch(SolfaName::Fa, 5)]);
    }

    #[test]
    fn test_finish_flushes_and_reconciles() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, tx) =
            session_with_script(vec![Some(FA5), Some(DO4), Some(RE4)], 4, dir.path());
        let mut rx = tx.subscribe();

        for _ in 0..3 {
            session.process_frame(&[0.0; 8]).unwrap();
        }
        let report = session.finish().unwrap();

        assert_eq!(report.measures_sealed, 1, "partial measure flushed");
        assert_eq!(report.outcome, ReconcileOutcome::Padded(2));
        assert_eq!(report.performance.len(), 4);
        assert_eq!(
            report.performance[2..],
            [
                Symbol::pitch(SolfaName::Re, 4),
                Symbol::pitch(SolfaName::Re, 4)
            ]
        );

        // Partial measure record, then the final performance record
        let measure = rx.try_recv().unwrap();
        assert_eq!(measure.channel, crate::transmit::MEASURE_CHANNEL);
        assert_eq!(measure.payload, "Do4,Re4");
        let performance = rx.try_recv().unwrap();
        assert_eq!(performance.channel, PERFORMANCE_CHANNEL);
        assert_eq!(performance.payload, "Do4,Re4,Re4,Re4");
    }

    #[test]
    fn test_finish_with_no_frames_pads_with_rests() {
        let dir = tempfile::tempdir().unwrap();
        let (session, tx) = session_with_script(vec![], 2, dir.path());
        let _keep = tx.subscribe();

        let report = session.finish().unwrap();
        assert_eq!(report.performance, vec![Symbol::Rest, Symbol::Rest]);
        assert_eq!(report.measures_sealed, 0);
    }

    #[test]
    fn test_transmit_failures_are_recoverable_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        // No subscriber at all: every send fails, session still completes
        let (mut session, _tx) =
            session_with_script(vec![Some(FA5), Some(DO4)], 1, dir.path());

        session.process_frame(&[0.0; 8]).unwrap();
        session.process_frame(&[0.0; 8]).unwrap();
        let report = session.finish().unwrap();

        // One for the flushed measure, one for the final performance record
        assert_eq!(report.transmit_failures, 2);
        assert_eq!(report.performance, vec![Symbol::pitch(SolfaName::Do, 4)]);
        assert!(dir.path().join("measure_0.json").exists());
    }
}

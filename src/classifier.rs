// FrameClassifier - one audio frame in, one Symbol out
//
// Orchestrates estimate → reduce → map for a single frame and owns the
// hysteresis state. The reduction strategy is pluggable; the default is the
// arithmetic mean of voiced estimates. Short frames are assumed monophonic
// and roughly steady-pitch, so the mean is a cheap robust-enough estimator;
// no outlier rejection is performed (documented limitation).

use crate::estimator::FrequencyEstimator;
use crate::mapper::SymbolMapper;
use crate::symbol::Symbol;

/// Reduces per-window voiced estimates to one dominant frequency.
///
/// Implementations receive only voiced estimates (never an empty slice);
/// a stronger reducer (median, confidence-weighted) can be substituted
/// without touching the capture state machine.
pub trait FrequencyReducer: Send {
    fn reduce(&self, estimates: &[f64]) -> f64;
}

/// Arithmetic mean of the voiced estimates.
pub struct MeanReducer;

impl FrequencyReducer for MeanReducer {
    fn reduce(&self, estimates: &[f64]) -> f64 {
        estimates.iter().sum::<f64>() / estimates.len() as f64
    }
}

/// Classifies one frame at a time, carrying the hysteresis state across
/// frames for the duration of a streaming session.
pub struct FrameClassifier {
    estimator: Box<dyn FrequencyEstimator>,
    reducer: Box<dyn FrequencyReducer>,
    mapper: SymbolMapper,
    sample_rate: u32,
    hysteresis: Symbol,
}

impl FrameClassifier {
    /// Create a classifier with the default mean reducer.
    pub fn new(
        estimator: Box<dyn FrequencyEstimator>,
        mapper: SymbolMapper,
        sample_rate: u32,
    ) -> Self {
        Self::with_reducer(estimator, Box::new(MeanReducer), mapper, sample_rate)
    }

    /// Create a classifier with a custom frequency reducer.
    pub fn with_reducer(
        estimator: Box<dyn FrequencyEstimator>,
        reducer: Box<dyn FrequencyReducer>,
        mapper: SymbolMapper,
        sample_rate: u32,
    ) -> Self {
        Self {
            estimator,
            reducer,
            mapper,
            sample_rate,
            hysteresis: Symbol::Unknown,
        }
    }

    /// Classify one audio frame.
    ///
    /// Estimator failure maps to `DetectionFailure` and leaves the
    /// hysteresis state untouched; so do `Rest` outcomes, matching the
    /// accepted-pitch-only hysteresis rule.
    pub fn classify(&mut self, frame: &[f32]) -> Symbol {
        let estimates = match self.estimator.estimate(frame, self.sample_rate) {
            Ok(estimates) => estimates,
            Err(err) => {
                log::warn!("[Classifier] Estimator failed: {}", err);
                return Symbol::DetectionFailure;
            }
        };

        let voiced: Vec<f64> = estimates.into_iter().flatten().collect();
        let dominant = if voiced.is_empty() {
            None
        } else {
            Some(self.reducer.reduce(&voiced))
        };

        let symbol = self.mapper.map(dominant, &self.hysteresis);
        match dominant {
            Some(freq) => {
                tracing::debug!("[Classifier] {:.2} Hz -> {}", freq, symbol);
            }
            None => {
                tracing::debug!("[Classifier] unvoiced frame -> {}", symbol);
            }
        }

        // Only accepted pitches advance the hysteresis state
        if symbol.is_pitch() {
            self.hysteresis = symbol.clone();
        }

        symbol
    }

    /// Last accepted symbol (hysteresis state).
    pub fn hysteresis(&self) -> &Symbol {
        &self.hysteresis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EstimateError;
    use crate::symbol::{SharpPolicy, SolfaName};
    use std::collections::VecDeque;

    /// Estimator returning pre-scripted estimate batches, one per frame.
    struct ScriptedEstimator {
        script: VecDeque<Result<Vec<Option<f64>>, EstimateError>>,
    }

    impl ScriptedEstimator {
        fn new(script: Vec<Result<Vec<Option<f64>>, EstimateError>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl FrequencyEstimator for ScriptedEstimator {
        fn estimate(
            &mut self,
            _frame: &[f32],
            _sample_rate: u32,
        ) -> Result<Vec<Option<f64>>, EstimateError> {
            self.script.pop_front().expect("script exhausted")
        }
    }

    fn classifier(script: Vec<Result<Vec<Option<f64>>, EstimateError>>) -> FrameClassifier {
        let mapper = SymbolMapper::new(SharpPolicy::DropSharp, vec![4, 5, 6]);
        FrameClassifier::new(Box::new(ScriptedEstimator::new(script)), mapper, 22_050)
    }

    #[test]
    fn test_mean_reduction_of_voiced_estimates() {
        // Mean of 438 and 442 is 440 -> La4
        let mut c = classifier(vec![Ok(vec![Some(438.0), None, Some(442.0)])]);
        let symbol = c.classify(&[0.0; 64]);
        assert_eq!(symbol, Symbol::pitch(SolfaName::La, 4));
        assert_eq!(c.hysteresis(), &Symbol::pitch(SolfaName::La, 4));
    }

    #[test]
    fn test_all_unvoiced_classifies_rest_without_hysteresis_update() {
        let mut c = classifier(vec![
            Ok(vec![Some(440.0)]),
            Ok(vec![None, None]),
        ]);
        assert_eq!(c.classify(&[0.0; 64]), Symbol::pitch(SolfaName::La, 4));
        assert_eq!(c.classify(&[0.0; 64]), Symbol::Rest);
        // Rest does not displace the last accepted pitch
        assert_eq!(c.hysteresis(), &Symbol::pitch(SolfaName::La, 4));
    }

    #[test]
    fn test_estimator_failure_classifies_detection_failure() {
        let mut c = classifier(vec![
            Ok(vec![Some(440.0)]),
            Err(EstimateError::EmptyFrame),
        ]);
        assert_eq!(c.classify(&[0.0; 64]), Symbol::pitch(SolfaName::La, 4));
        assert_eq!(c.classify(&[]), Symbol::DetectionFailure);
        // Failure does not alter hysteresis
        assert_eq!(c.hysteresis(), &Symbol::pitch(SolfaName::La, 4));
    }

    #[test]
    fn test_out_of_range_octave_echoes_hysteresis() {
        // E5 ~ 659.26 Hz then A7 = 3520 Hz (octave 7, rejected)
        let mut c = classifier(vec![
            Ok(vec![Some(659.26)]),
            Ok(vec![Some(3520.0)]),
        ]);
        assert_eq!(c.classify(&[0.0; 64]), Symbol::pitch(SolfaName::Mi, 5));
        assert_eq!(c.classify(&[0.0; 64]), Symbol::pitch(SolfaName::Mi, 5));
        assert_eq!(c.hysteresis(), &Symbol::pitch(SolfaName::Mi, 5));
    }

    #[test]
    fn test_initial_hysteresis_is_unknown_sentinel() {
        let c = classifier(vec![]);
        assert_eq!(c.hysteresis(), &Symbol::Unknown);
    }
}

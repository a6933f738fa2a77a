//! Frequency estimator boundary
//!
//! The pipeline treats pitch estimation as an injected dependency: given a
//! frame of samples it returns one optional frequency per analysis window,
//! where `None` marks an unvoiced window. The default implementation uses
//! the McLeod pitch method from the `pitch-detection` crate.
//!
//! Also home to `hz_to_note`, the pure 12-TET note-naming function
//! (A4 = 440 Hz) consumed by the symbol mapper.

use std::fmt;

use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;

use crate::config::EstimatorConfig;
use crate::symbol::PitchClass;

/// Failure to run the estimator at all (as opposed to "no pitch found",
/// which is a valid `None` estimate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    /// The frame contained no samples
    EmptyFrame,
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateError::EmptyFrame => write!(f, "frame contained no samples"),
        }
    }
}

impl std::error::Error for EstimateError {}

/// Per-frame frequency estimation
///
/// Implementations must tolerate frames shorter than their internal
/// analysis window by returning an empty estimate list rather than erroring.
pub trait FrequencyEstimator: Send {
    /// Estimate dominant frequencies across a frame.
    ///
    /// # Arguments
    /// * `frame` - Amplitude samples for one classification frame
    /// * `sample_rate` - Sample rate of the frame in Hz
    ///
    /// # Returns
    /// One `Option<f64>` per analysis window (`None` = unvoiced), or
    /// `EstimateError` if the frame is malformed.
    fn estimate(&mut self, frame: &[f32], sample_rate: u32) -> Result<Vec<Option<f64>>, EstimateError>;
}

/// McLeod pitch method estimator
///
/// Slides a fixed-size analysis window across the frame and runs the
/// McLeod detector on each window. Estimates outside the configured
/// frequency band are reported as unvoiced rather than clamped.
pub struct McLeodEstimator {
    detector: McLeodDetector<f64>,
    window_size: usize,
    hop_size: usize,
    min_freq: f64,
    max_freq: f64,
    power_threshold: f64,
    clarity_threshold: f64,
    // Reused between windows to avoid per-window allocation
    window_buf: Vec<f64>,
}

impl McLeodEstimator {
    /// Create an estimator from configuration.
    pub fn new(config: &EstimatorConfig) -> Self {
        let window_size = config.window_size.max(2);
        let hop_size = config.hop_size.clamp(1, window_size);
        Self {
            detector: McLeodDetector::new(window_size, window_size / 2),
            window_size,
            hop_size,
            min_freq: config.min_freq,
            max_freq: config.max_freq,
            power_threshold: config.power_threshold,
            clarity_threshold: config.clarity_threshold,
            window_buf: vec![0.0; window_size],
        }
    }
}

impl FrequencyEstimator for McLeodEstimator {
    fn estimate(&mut self, frame: &[f32], sample_rate: u32) -> Result<Vec<Option<f64>>, EstimateError> {
        if frame.is_empty() {
            return Err(EstimateError::EmptyFrame);
        }

        // Frames shorter than one window degrade to "no estimate"
        if frame.len() < self.window_size {
            return Ok(Vec::new());
        }

        let mut estimates = Vec::with_capacity(frame.len() / self.hop_size + 1);
        let mut start = 0;
        while start + self.window_size <= frame.len() {
            for (dst, src) in self
                .window_buf
                .iter_mut()
                .zip(&frame[start..start + self.window_size])
            {
                *dst = f64::from(*src);
            }

            let estimate = self
                .detector
                .get_pitch(
                    &self.window_buf,
                    sample_rate as usize,
                    self.power_threshold,
                    self.clarity_threshold,
                )
                .map(|pitch| pitch.frequency)
                .filter(|freq| (self.min_freq..=self.max_freq).contains(freq));

            estimates.push(estimate);
            start += self.hop_size;
        }

        Ok(estimates)
    }
}

/// Derive a pitch class and octave from a frequency (12-TET, A4 = 440 Hz).
///
/// Rounds to the nearest semitone; octave numbering follows the MIDI
/// convention where middle C is C4, so 440 Hz maps to (A, 4).
pub fn hz_to_note(freq: f64) -> (PitchClass, i32) {
    let midi = (69.0 + 12.0 * (freq / 440.0).log2()).round() as i32;
    let pitch_class = PitchClass::from_semitone(midi.rem_euclid(12) as u8);
    let octave = midi.div_euclid(12) - 1;
    (pitch_class, octave)
}

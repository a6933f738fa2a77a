//! Configuration management for the capture pipeline
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration without recompilation. Every pipeline variant
//! observed in practice (trigger-gated vs. ungated capture, sharp-note
//! policy, measure capacity) is a configuration point here rather than a
//! separate code path.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::symbol::{SharpPolicy, SolfaName, Symbol};

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub audio: AudioSourceConfig,
    pub capture: CaptureConfig,
    pub estimator: EstimatorConfig,
    pub store: StoreConfig,
}

/// Audio source parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSourceConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Performance tempo in beats per minute; one frame spans an eighth note
    pub bpm: u32,
}

impl AudioSourceConfig {
    /// Number of samples in one classification frame (one eighth note).
    pub fn frame_len(&self) -> usize {
        // seconds per eighth note = 60 / bpm / 2
        (self.sample_rate as f64 * 60.0 / self.bpm as f64 / 2.0) as usize
    }
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            bpm: 110,
        }
    }
}

/// Capture gating and batching parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Gate symbol emission on a trigger cue; when false, capture starts
    /// with the first frame
    pub trigger_enabled: bool,
    /// Symbol that opens the capture gate (the cue note)
    pub trigger_symbol: Symbol,
    /// Symbols per measure
    pub measure_capacity: usize,
    /// Sharp-note handling when deriving solfège names
    pub sharp_policy: SharpPolicy,
    /// Octaves accepted by the mapper; out-of-range octaves fall back to
    /// the previous accepted symbol
    pub accepted_octaves: Vec<i32>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            trigger_enabled: true,
            trigger_symbol: Symbol::pitch(SolfaName::Fa, 5),
            measure_capacity: 8,
            sharp_policy: SharpPolicy::DropSharp,
            accepted_octaves: vec![4, 5, 6],
        }
    }
}

/// Frequency estimator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Analysis window size in samples
    pub window_size: usize,
    /// Hop between analysis windows in samples
    pub hop_size: usize,
    /// Lowest frequency accepted as a valid estimate (Hz)
    pub min_freq: f64,
    /// Highest frequency accepted as a valid estimate (Hz)
    pub max_freq: f64,
    /// Signal power below which a window is treated as unvoiced
    pub power_threshold: f64,
    /// Pitch clarity below which a window is treated as unvoiced
    pub clarity_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_size: 1024,
            hop_size: 512,
            // C2..C7, the violin/voice range the estimator is asked for
            min_freq: 65.41,
            max_freq: 2093.0,
            power_threshold: 5.0,
            clarity_threshold: 0.7,
        }
    }
}

/// Durable measure record storage parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory receiving one JSON record per sealed measure
    pub output_dir: String,
    /// Base name for record files: `<base_name>_<index>.json`
    pub base_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            output_dir: "ms_records".to_string(),
            base_name: "measure".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            audio: AudioSourceConfig::default(),
            capture: CaptureConfig::default(),
            estimator: EstimatorConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or defaults if the file is missing or invalid
    /// (a warning is logged in either case).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.audio.sample_rate, 22_050);
        assert_eq!(config.capture.measure_capacity, 8);
        assert!(config.capture.trigger_enabled);
        assert_eq!(
            config.capture.trigger_symbol,
            Symbol::pitch(SolfaName::Fa, 5)
        );
        assert_eq!(config.capture.accepted_octaves, vec![4, 5, 6]);
        assert_eq!(config.estimator.window_size, 1024);
    }

    #[test]
    fn test_frame_len() {
        let audio = AudioSourceConfig {
            sample_rate: 22_050,
            bpm: 110,
        };
        // 60 / 110 / 2 seconds of samples
        assert_eq!(audio.frame_len(), 6013);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.capture.measure_capacity, config.capture.measure_capacity);
        assert_eq!(parsed.capture.trigger_symbol, config.capture.trigger_symbol);
        assert_eq!(parsed.estimator.min_freq, config.estimator.min_freq);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = PipelineConfig::load_from_file("definitely/not/a/real/path.json");
        assert_eq!(config.capture.measure_capacity, 8);
    }
}

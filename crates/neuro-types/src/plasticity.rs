//! Plasticity event reporting and the config structs that parameterize STDP
//! and structural pruning.

use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlasticityEventKind {
    Ltp,
    Ltd,
    Structural,
    Homeostatic,
}

/// Reported through the synapse callback bus whenever a non-trivial weight
/// adjustment is applied.
#[derive(Debug, Clone)]
pub struct PlasticityEvent {
    pub pre_spike_time: Option<Instant>,
    pub post_spike_time: Option<Instant>,
    /// `post - pre`, in milliseconds. Negative means pre fired after post (LTD).
    pub delta_t_ms: f64,
    pub kind: PlasticityEventKind,
    pub magnitude: f64,
    pub source_synapse_id: String,
}

/// STDP parameterization. Field names are part of the JSON-stable contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlasticityConfig {
    pub enabled: bool,
    /// Typical range [0.001, 0.1].
    pub learning_rate: f64,
    /// Trace time constant in ms, typical range [10, 50].
    pub time_constant_ms: f64,
    /// Pairing window in ms, typical range [50, 200].
    pub window_size_ms: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    /// LTP/LTD asymmetry ratio, typical range [1.0, 1.5].
    pub asymmetry_ratio: f64,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            learning_rate: 0.01,
            time_constant_ms: 20.0,
            window_size_ms: 100.0,
            min_weight: 0.0,
            max_weight: 1.0,
            asymmetry_ratio: 1.0,
        }
    }
}

/// Structural pruning parameterization. Field names are part of the
/// JSON-stable contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PruningConfig {
    pub enabled: bool,
    pub weight_threshold: f64,
    pub inactivity_threshold_ms: f64,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            weight_threshold: 0.02,
            inactivity_threshold_ms: 1000.0,
        }
    }
}

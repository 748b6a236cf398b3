//! Construction-time configuration structs. Field names are the only
//! external-stability (JSON) contract the core exposes; there is no wire
//! protocol beyond this.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::component::Position;
use crate::error::{CoreError, Result};
use crate::ligand::LigandType;
use crate::plasticity::{PlasticityConfig, PruningConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuronConfig {
    pub threshold: f64,
    pub decay_rate: f64,
    pub refractory_period_ms: f64,
    pub fire_factor: f64,
    /// Hz. Zero disables homeostasis together with `homeostasis_strength`.
    pub target_firing_rate: f64,
    /// Zero disables homeostatic threshold adjustment.
    pub homeostasis_strength: f64,
    pub position: Position,
    pub receptors: Vec<LigandType>,
    pub released_ligands: Vec<LigandType>,
    pub signal_types: Vec<crate::ligand::SignalType>,
    pub neuron_type: String,
    pub metadata: HashMap<String, String>,
}

impl NeuronConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold.is_nan() || self.threshold.is_infinite() {
            return Err(CoreError::InvalidConfig("threshold must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.decay_rate) || self.decay_rate <= 0.0 {
            return Err(CoreError::InvalidConfig(
                "decay_rate must be in (0, 1]".into(),
            ));
        }
        if self.refractory_period_ms < 0.0 {
            return Err(CoreError::InvalidConfig(
                "refractory_period_ms must be non-negative".into(),
            ));
        }
        Ok(())
    }

    pub fn refractory_period(&self) -> Duration {
        Duration::from_secs_f64(self.refractory_period_ms / 1000.0)
    }
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            decay_rate: 0.95,
            refractory_period_ms: 5.0,
            fire_factor: 1.0,
            target_firing_rate: 0.0,
            homeostasis_strength: 0.0,
            position: Position::origin(),
            receptors: Vec::new(),
            released_ligands: vec![LigandType::Glutamate],
            signal_types: Vec::new(),
            neuron_type: "generic".to_string(),
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynapseConfig {
    pub pre_id: String,
    pub post_id: String,
    pub initial_weight: f64,
    pub delay_ms: f64,
    pub ligand_type: LigandType,
    pub plasticity_enabled: bool,
    pub plasticity_config: PlasticityConfig,
    pub pruning_config: PruningConfig,
    pub position: Position,
    pub synapse_type: String,
    pub metadata: HashMap<String, String>,
}

impl SynapseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.delay_ms < 0.0 {
            return Err(CoreError::InvalidConfig(
                "delay_ms must be non-negative".into(),
            ));
        }
        let p = &self.plasticity_config;
        if p.min_weight > p.max_weight {
            return Err(CoreError::InvalidConfig(
                "plasticity_config.min_weight must be <= max_weight".into(),
            ));
        }
        if self.ligand_type.is_inhibitory() && p.max_weight > 0.0 {
            return Err(CoreError::InvalidConfig(
                "inhibitory ligand requires max_weight <= 0".into(),
            ));
        }
        if !self.ligand_type.is_inhibitory() && p.min_weight < 0.0 {
            return Err(CoreError::InvalidConfig(
                "excitatory/modulatory ligand requires min_weight >= 0".into(),
            ));
        }
        if self.initial_weight < p.min_weight || self.initial_weight > p.max_weight {
            return Err(CoreError::InvalidConfig(
                "initial_weight out of [min_weight, max_weight]".into(),
            ));
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_ms / 1000.0)
    }
}

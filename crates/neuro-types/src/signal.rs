//! The message quantum passed between neurons, and the telemetry event a
//! neuron broadcasts when it fires.

use std::time::Instant;

use crate::ligand::LigandType;

/// A single neural signal in flight. `timestamp` is always the *generation*
/// time — the instant the signal was produced, not the instant it is
/// expected to (or does) arrive.
#[derive(Debug, Clone)]
pub struct NeuralSignal {
    pub amplitude: f64,
    pub timestamp: Instant,
    pub source_id: String,
    pub target_id: String,
    pub synapse_id: Option<String>,
    pub neurotransmitter: Option<LigandType>,
    pub classification: Option<String>,
}

impl NeuralSignal {
    pub fn new(amplitude: f64, source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            amplitude,
            timestamp: Instant::now(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            synapse_id: None,
            neurotransmitter: None,
            classification: None,
        }
    }

    pub fn with_synapse(mut self, synapse_id: impl Into<String>) -> Self {
        self.synapse_id = Some(synapse_id.into());
        self
    }

    pub fn with_ligand(mut self, ligand: LigandType) -> Self {
        self.neurotransmitter = Some(ligand);
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }
}

/// Loss-tolerant telemetry emitted every time a neuron fires.
#[derive(Debug, Clone)]
pub struct FireEvent {
    pub id: String,
    pub value: f64,
    pub timestamp: Instant,
}

//! Neurotransmitter and electrical-signal tags carried by a [`crate::NeuralSignal`].

use serde::{Deserialize, Serialize};

/// Neurotransmitter tag. `polarity()` encodes Dale's principle: a neuron's
/// released-ligand set determines whether its outgoing synapses are
/// constrained to positive or negative weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LigandType {
    Glutamate,
    Gaba,
    Dopamine,
    Serotonin,
    Acetylcholine,
    Norepinephrine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Excitatory,
    Inhibitory,
    Modulatory,
}

impl LigandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LigandType::Glutamate => "glutamate",
            LigandType::Gaba => "gaba",
            LigandType::Dopamine => "dopamine",
            LigandType::Serotonin => "serotonin",
            LigandType::Acetylcholine => "acetylcholine",
            LigandType::Norepinephrine => "norepinephrine",
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            LigandType::Glutamate => Polarity::Excitatory,
            LigandType::Gaba => Polarity::Inhibitory,
            LigandType::Dopamine | LigandType::Serotonin | LigandType::Norepinephrine => {
                Polarity::Modulatory
            }
            LigandType::Acetylcholine => Polarity::Excitatory,
        }
    }

    pub fn is_inhibitory(&self) -> bool {
        self.polarity() == Polarity::Inhibitory
    }
}

/// Classification of a non-chemical (electrical) signal sent through
/// `NeuronCallbacks::send_electrical_signal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    GapJunction,
    FieldPotential,
    Optogenetic,
    Custom,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::GapJunction => "gap_junction",
            SignalType::FieldPotential => "field_potential",
            SignalType::Optogenetic => "optogenetic",
            SignalType::Custom => "custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaba_is_inhibitory() {
        assert!(LigandType::Gaba.is_inhibitory());
        assert!(!LigandType::Glutamate.is_inhibitory());
    }
}

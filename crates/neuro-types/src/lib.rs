//! Shared identity, signal, and configuration contracts for the neuron and
//! synapse crates.
//!
//! Neurons never depend on the `synapses` crate, and synapses never depend
//! on `neurons` — everything two components need to talk about each other
//! (the signal envelope, lifecycle state, callback traits) lives here
//! instead, breaking the neuron -> synapse -> neuron reference cycle.

pub mod callbacks;
pub mod component;
pub mod config;
pub mod error;
pub mod ligand;
pub mod plasticity;
pub mod signal;

pub use callbacks::{
    ActivityInfo, ComponentInfo, ExtracellularMatrix, MessageReceiver, NeuronCallbacks,
    OutputCallback, SynapseCallbacks, SynapseCriteria, SynapseInfo, SynapticProcessor,
};
pub use component::{ActivityLevel, BaseComponent, ComponentState, ComponentType, Position};
pub use config::{NeuronConfig, SynapseConfig};
pub use error::{CoreError, Result};
pub use ligand::{LigandType, Polarity, SignalType};
pub use plasticity::{PlasticityConfig, PlasticityEvent, PlasticityEventKind, PruningConfig};
pub use signal::{FireEvent, NeuralSignal};

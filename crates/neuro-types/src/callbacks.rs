//! Trait surface the extracellular matrix implements against, and the core
//! consumes. These are the only points of contact between a neuron/synapse
//! and the outside world; none of the implementing types live in this core.

use std::time::{Duration, Instant};

use crate::component::Position;
use crate::config::SynapseConfig;
use crate::error::Result;
use crate::ligand::{LigandType, SignalType};
use crate::plasticity::PlasticityEvent;
use crate::signal::NeuralSignal;

/// A component discoverable through `find_nearby`.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    pub id: String,
    pub component_type: crate::component::ComponentType,
    pub position: Position,
}

/// Summary of a synapse returned by `list_synapses`/`get_synapse`-adjacent queries.
#[derive(Debug, Clone)]
pub struct SynapseInfo {
    pub id: String,
    pub pre_id: String,
    pub post_id: String,
    pub weight: f64,
    pub ligand_type: LigandType,
}

/// Filter passed to `NeuronCallbacks::list_synapses`.
#[derive(Debug, Clone, Default)]
pub struct SynapseCriteria {
    pub pre_id: Option<String>,
    pub post_id: Option<String>,
    pub ligand_type: Option<LigandType>,
}

/// Activity summary a synapse reports after each transmission.
#[derive(Debug, Clone, Copy)]
pub struct ActivityInfo {
    pub firing_rate_hz: f64,
    pub connection_count: usize,
}

/// Minimal fan-out target a neuron holds per outgoing edge. Holding only
/// this (rather than a reference back to the synapse's owner) is what
/// breaks the neuron -> synapse -> neuron reference cycle; full synapse
/// ownership stays with the matrix.
pub trait OutputCallback: Send + Sync {
    /// Scales `value` by the edge weight and returns the outgoing signal.
    /// The caller (the presynaptic neuron) owns delay computation and
    /// delivery-heap scheduling — this never blocks and never touches the
    /// neuron's private state.
    fn transmit(&self, value: f64) -> Result<NeuralSignal>;
    fn weight(&self) -> f64;
    fn delay(&self) -> Duration;
    fn target_id(&self) -> &str;
}

/// The full synaptic-processor capability set, implemented by `Synapse` and
/// handed back to callers of `NeuronCallbacks::get_synapse`.
pub trait SynapticProcessor: OutputCallback {
    fn id(&self) -> &str;
    fn pre_id(&self) -> &str;
    fn post_id(&self) -> &str;
    fn ligand_type(&self) -> LigandType;
    fn position(&self) -> Position;
    fn apply_plasticity(&self, adjustment: f64) -> Result<()>;
    fn should_prune(&self) -> bool;
    fn get_weight(&self) -> f64;
    fn set_weight(&self, weight: f64);

    /// Called by whatever wiring observes this synapse's postsynaptic
    /// neuron firing (the matrix, in a full system). A presynaptic spike
    /// is instead implied by a `transmit` call, so there is no symmetric
    /// `notify_pre_spike`.
    fn notify_post_spike(&self, now: Instant);
}

/// A component a neuron can enqueue signals into. `Neuron` implements this;
/// the delivery scheduler calls it once a scheduled deadline elapses.
pub trait MessageReceiver: Send + Sync {
    fn receive(&self, signal: NeuralSignal) -> Result<()>;
}

/// The geometry/chemistry/registry collaborator. Out of scope to implement;
/// the core only ever calls through this trait.
pub trait ExtracellularMatrix: Send + Sync {
    /// The only method the core strictly requires: total transmission delay
    /// for an edge, given the synapse's configured base delay.
    fn synaptic_delay(
        &self,
        pre_id: &str,
        post_id: &str,
        synapse_id: &str,
        base_delay: Duration,
    ) -> Duration;
}

/// Services a neuron calls into the matrix for. Installed once via
/// `Neuron::set_callbacks`, before `run()`.
pub trait NeuronCallbacks: Send + Sync {
    fn create_synapse(&self, config: SynapseConfig) -> Result<String>;
    fn delete_synapse(&self, id: &str) -> Result<()>;
    fn list_synapses(&self, criteria: &SynapseCriteria) -> Vec<SynapseInfo>;

    fn release_chemical(&self, ligand: LigandType, concentration: f64) -> Result<()>;
    fn send_electrical_signal(&self, signal_type: SignalType, payload: &[u8]);

    fn report_health(&self, activity_level: f64, connection_count: usize);
    fn get_spatial_delay(&self, target_id: &str) -> Duration;

    fn apply_plasticity(&self, synapse_id: &str, adjustment: f64) -> Result<()>;
    fn get_synapse_weight(&self, synapse_id: &str) -> Option<f64>;
    fn set_synapse_weight(&self, synapse_id: &str, weight: f64);

    fn get_synapse(&self, id: &str) -> Option<std::sync::Arc<dyn SynapticProcessor>>;
    fn get_matrix(&self) -> std::sync::Arc<dyn ExtracellularMatrix>;
    fn find_nearby(&self, center: Position, radius: f64) -> Vec<ComponentInfo>;

    fn report_state_change(
        &self,
        old: crate::component::ComponentState,
        new: crate::component::ComponentState,
    );
}

/// Services a synapse calls into the matrix for.
pub trait SynapseCallbacks: Send + Sync {
    fn deliver_message(&self, target_id: &str, signal: NeuralSignal) -> Result<()>;
    fn get_transmission_delay(&self) -> Duration;
    fn release_neurotransmitter(&self, ligand: LigandType, concentration: f64) -> Result<()>;
    fn report_activity(&self, info: ActivityInfo);
    fn report_plasticity(&self, event: PlasticityEvent);
}

//! The autonomous-neuron runtime: one event-loop thread per neuron, a
//! per-neuron delayed-delivery scheduler, and the dendritic/ion-channel
//! integration kernel each neuron runs incoming signals through.
//!
//! Neurons never depend on the `synapses` crate — only on `neuro-types`,
//! whose `OutputCallback`/`MessageReceiver` traits are the only contact
//! surface between a neuron and whatever owns its outgoing synapses.

pub mod channels;
pub mod delivery;
pub mod dendritic;
pub mod neuron;

pub use channels::{
    Cav1_2, ChannelInput, ChannelKind, ChannelStateSnapshot, ChannelTrigger, GabaA, IonChannel,
    IonSelectivity, KineticFeedback, Kv4_2, ModulationResult, Nav1_6,
};
pub use delivery::{DeliveryEntry, DeliveryScheduler};
pub use dendritic::DendriticIntegrator;
pub use neuron::Neuron;

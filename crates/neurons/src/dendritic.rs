//! Dendritic integrator: chains a neuron's ion channels over each incoming
//! signal and folds the result into a net current increment for the soma.

use neuro_types::NeuralSignal;

use crate::channels::{Cav1_2, ChannelInput, GabaA, IonChannel, KineticFeedback, Kv4_2, Nav1_6};

/// The soma accumulator operates on an abstract, neuron-config-scaled
/// threshold unit (typical range 0-2), while channel gating constants and
/// reversal potentials are calibrated on realistic millivolt scales (the
/// voltage trajectories in the channel gate-clamping tests span -200..+200).
/// Reusing the accumulator directly as the channels' membrane voltage would
/// let intrinsic channel current swamp synaptic input. Scaling the summed
/// channel current down by this factor keeps dendritic filtering present
/// but subordinate to passthrough synaptic current, consistent with the
/// "optional dendritic filtering" framing of the single-compartment soma.
const CHANNEL_CURRENT_SCALE: f64 = 1.0e-3;

/// Owns an ordered, boxed list of channels local to one neuron. Never shared
/// across threads — it lives entirely inside the owning neuron's event loop.
pub struct DendriticIntegrator {
    channels: Vec<Box<dyn IonChannel>>,
    calcium: f64,
}

impl DendriticIntegrator {
    /// The default biophysical loadout: one of each of the four channel kinds.
    pub fn new() -> Self {
        Self::with_channels(vec![
            Box::new(Nav1_6::new(1.2)),
            Box::new(Kv4_2::new(0.36)),
            Box::new(Cav1_2::new(0.1)),
            Box::new(GabaA::new(0.08)),
        ])
    }

    pub fn with_channels(channels: Vec<Box<dyn IonChannel>>) -> Self {
        Self { channels, calcium: 0.05 }
    }

    pub fn calcium(&self) -> f64 {
        self.calcium
    }

    /// Runs one incoming signal through every channel in order. Returns
    /// `None` if any channel blocked passage (the signal is dropped
    /// entirely), otherwise the net current increment to add to the soma
    /// accumulator.
    pub fn integrate(&mut self, signal: &NeuralSignal, voltage: f64) -> Option<f64> {
        let mut value = signal.amplitude;
        let mut total_current = 0.0;

        for channel in &mut self.channels {
            let input = ChannelInput { amplitude: value, ligand: signal.neurotransmitter };
            let result = channel.modulate_current(input, voltage, self.calcium);
            if !result.passes {
                return None;
            }
            total_current += result.current_pa;
            value = result.signal_value;
        }

        Some(total_current * CHANNEL_CURRENT_SCALE + value)
    }

    /// Advances every channel's gating kinetics by `dt_ms`, and lets Cav1.2
    /// accumulate whatever calcium influx this tick produced.
    pub fn tick_kinetics(&mut self, contributed_to_firing: bool, dt_ms: f64, voltage: f64) {
        let influx = if contributed_to_firing { 1.0 } else { 0.0 };
        let feedback = KineticFeedback { contributed_to_firing, calcium_influx: influx };
        for channel in &mut self.channels {
            channel.update_kinetics(feedback, dt_ms, voltage);
        }
        self.calcium = self
            .channels
            .iter()
            .find_map(|c| c.get_state().calcium_level)
            .unwrap_or(self.calcium);
        if !self.calcium.is_finite() {
            self.calcium = 0.0;
        }
    }

    pub fn channels(&self) -> &[Box<dyn IonChannel>] {
        &self.channels
    }
}

impl Default for DendriticIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DendriticIntegrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DendriticIntegrator")
            .field("channel_count", &self.channels.len())
            .field("calcium", &self.calcium)
            .finish()
    }
}

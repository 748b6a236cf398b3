//! Weighted, delayed-delivery synapse with spike-timing-dependent
//! plasticity and structural pruning.
//!
//! A `Synapse` is not an actor: it is invoked synchronously by its
//! presynaptic neuron's event loop on fire (`transmit`) and, through
//! whatever wiring observes the postsynaptic neuron's fire events,
//! notified of post-spikes (`notify_post_spike`). It never schedules its
//! own delivery — the presynaptic neuron owns the delivery heap (see the
//! `neurons` crate) and computes the total delay once `transmit` returns
//! the scaled signal.

mod stdp;

use std::sync::RwLock;
use std::time::{Duration, Instant};

use neuro_types::{
    BaseComponent, ComponentType, LigandType, NeuralSignal, OutputCallback, PlasticityEvent,
    Position, PruningConfig, Result, SynapseConfig, SynapticProcessor,
};

use stdp::StdpState;

/// A directional, weighted connection between two neurons.
pub struct Synapse {
    base: BaseComponent,
    pre_id: String,
    post_id: String,
    ligand_type: LigandType,
    base_delay: Duration,
    weight: RwLock<f64>,
    min_weight: f64,
    max_weight: f64,
    plasticity_enabled: bool,
    stdp: RwLock<StdpState>,
    pruning: PruningConfig,
    last_transmission: RwLock<Option<Instant>>,
}

impl Synapse {
    pub fn new(id: impl Into<String>, config: SynapseConfig) -> Result<Self> {
        config.validate()?;
        let plasticity = config.plasticity_config;
        Ok(Self {
            base: BaseComponent::new(id, ComponentType::Synapse, config.position),
            pre_id: config.pre_id,
            post_id: config.post_id,
            ligand_type: config.ligand_type,
            base_delay: config.delay(),
            weight: RwLock::new(config.initial_weight),
            min_weight: plasticity.min_weight,
            max_weight: plasticity.max_weight,
            plasticity_enabled: config.plasticity_enabled && plasticity.enabled,
            stdp: RwLock::new(StdpState::new(plasticity)),
            pruning: config.pruning_config,
            last_transmission: RwLock::new(Some(Instant::now())),
        })
    }

    fn clamp_weight(&self, w: f64) -> f64 {
        if w.is_nan() || w.is_infinite() {
            tracing::warn!(synapse = self.base.id(), "weight went non-finite, resetting to 0");
            return 0.0_f64.clamp(self.min_weight, self.max_weight);
        }
        w.clamp(self.min_weight, self.max_weight)
    }

    /// Apply a computed STDP delta and emit a plasticity event if the
    /// resulting adjustment was non-trivial (i.e. within the pairing window).
    fn apply_stdp_outcome(&self, outcome: stdp::StdpOutcome) -> Option<PlasticityEvent> {
        if outcome.delta_w == 0.0 {
            return None;
        }
        let mut weight = self.weight.write().expect("weight lock poisoned");
        *weight = self.clamp_weight(*weight + outcome.delta_w);
        drop(weight);
        self.base.touch();

        outcome.event.map(|(delta_t_ms, kind)| PlasticityEvent {
            pre_spike_time: None,
            post_spike_time: None,
            delta_t_ms,
            kind,
            magnitude: outcome.delta_w,
            source_synapse_id: self.base.id().to_string(),
        })
    }

    /// Notify the synapse that its presynaptic neuron fired, outside the
    /// `transmit`/`OutputCallback` path (used by tests and direct STDP
    /// drivers that don't route through a full neuron actor).
    pub fn notify_pre_spike(&self, now: Instant) -> Option<PlasticityEvent> {
        if !self.plasticity_enabled {
            return None;
        }
        let outcome = self.stdp.write().expect("stdp lock poisoned").on_pre_spike(now);
        self.apply_stdp_outcome(outcome)
    }
}

impl OutputCallback for Synapse {
    fn transmit(&self, value: f64) -> Result<NeuralSignal> {
        let weight = self.get_weight();
        let out_value = value * weight;
        *self.last_transmission.write().expect("last_transmission lock poisoned") = Some(Instant::now());
        self.base.touch();

        if self.plasticity_enabled {
            self.notify_pre_spike(Instant::now());
        }

        Ok(NeuralSignal::new(out_value, self.pre_id.clone(), self.post_id.clone())
            .with_synapse(self.base.id().to_string())
            .with_ligand(self.ligand_type))
    }

    fn weight(&self) -> f64 {
        self.get_weight()
    }

    fn delay(&self) -> Duration {
        self.base_delay
    }

    fn target_id(&self) -> &str {
        &self.post_id
    }
}

impl SynapticProcessor for Synapse {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn pre_id(&self) -> &str {
        &self.pre_id
    }

    fn post_id(&self) -> &str {
        &self.post_id
    }

    fn ligand_type(&self) -> LigandType {
        self.ligand_type
    }

    fn position(&self) -> Position {
        self.base.position()
    }

    fn apply_plasticity(&self, adjustment: f64) -> Result<()> {
        let mut weight = self.weight.write().expect("weight lock poisoned");
        *weight = self.clamp_weight(*weight + adjustment);
        drop(weight);
        self.base.touch();
        Ok(())
    }

    fn should_prune(&self) -> bool {
        if !self.pruning.enabled {
            return false;
        }
        let under_threshold = self.get_weight().abs() < self.pruning.weight_threshold;
        let last = self.last_transmission.read().expect("last_transmission lock poisoned");
        let inactive = match *last {
            Some(t) => t.elapsed().as_secs_f64() * 1000.0 >= self.pruning.inactivity_threshold_ms,
            None => true,
        };
        under_threshold && inactive
    }

    fn get_weight(&self) -> f64 {
        *self.weight.read().expect("weight lock poisoned")
    }

    fn set_weight(&self, weight: f64) {
        let mut w = self.weight.write().expect("weight lock poisoned");
        *w = self.clamp_weight(weight);
        drop(w);
        self.base.touch();
    }

    fn notify_post_spike(&self, now: Instant) {
        if !self.plasticity_enabled {
            return;
        }
        let outcome = self.stdp.write().expect("stdp lock poisoned").on_post_spike(now);
        self.apply_stdp_outcome(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_types::{PlasticityConfig, PruningConfig};
    use std::collections::HashMap;

    fn excitatory_config() -> SynapseConfig {
        SynapseConfig {
            pre_id: "a".into(),
            post_id: "b".into(),
            initial_weight: 0.5,
            delay_ms: 2.0,
            ligand_type: LigandType::Glutamate,
            plasticity_enabled: true,
            plasticity_config: PlasticityConfig {
                learning_rate: 0.01,
                time_constant_ms: 20.0,
                window_size_ms: 100.0,
                min_weight: 0.0,
                max_weight: 1.0,
                asymmetry_ratio: 1.0,
                enabled: true,
            },
            pruning_config: PruningConfig::default(),
            position: Position::origin(),
            synapse_type: "ampa".into(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn transmit_scales_by_weight() {
        let syn = Synapse::new("s1", excitatory_config()).unwrap();
        let signal = syn.transmit(1.0).unwrap();
        assert!((signal.amplitude - 0.5).abs() < 1e-9);
    }

    #[test]
    fn inhibitory_ligand_requires_nonpositive_bounds() {
        let mut config = excitatory_config();
        config.ligand_type = LigandType::Gaba;
        config.initial_weight = -0.3;
        config.plasticity_config.min_weight = -1.0;
        config.plasticity_config.max_weight = 0.0;
        assert!(Synapse::new("s1", config).is_ok());

        let mut bad = excitatory_config();
        bad.ligand_type = LigandType::Gaba;
        bad.plasticity_config.max_weight = 0.5;
        assert!(Synapse::new("s2", bad).is_err());
    }

    #[test]
    fn stdp_window_ltp_then_ltd() {
        let syn = Synapse::new("s1", excitatory_config()).unwrap();
        let w0 = syn.get_weight();

        let t0 = Instant::now();
        syn.notify_pre_spike(t0);
        syn.notify_post_spike(t0 + Duration::from_millis(10));
        assert!(syn.get_weight() > w0);

        syn.set_weight(0.5);
        let t1 = Instant::now();
        syn.notify_post_spike(t1);
        syn.notify_pre_spike(t1 + Duration::from_millis(10));
        assert!(syn.get_weight() < 0.5);
    }

    #[test]
    fn pruning_requires_both_weak_weight_and_inactivity() {
        let mut config = excitatory_config();
        config.initial_weight = 0.01;
        config.plasticity_config.min_weight = 0.0;
        config.pruning_config = PruningConfig {
            enabled: true,
            weight_threshold: 0.02,
            inactivity_threshold_ms: 5.0,
        };
        let syn = Synapse::new("s1", config).unwrap();
        assert!(!syn.should_prune(), "freshly created synapse has no transmission history yet to be inactive against the threshold window");
        std::thread::sleep(Duration::from_millis(10));
        assert!(syn.should_prune());

        syn.transmit(1.0).unwrap();
        assert!(!syn.should_prune());
    }

    #[test]
    fn get_weight_never_escapes_bounds_after_plasticity() {
        let syn = Synapse::new("s1", excitatory_config()).unwrap();
        for _ in 0..1000 {
            syn.apply_plasticity(10.0).unwrap();
        }
        assert!(syn.get_weight() <= 1.0);
        for _ in 0..1000 {
            syn.apply_plasticity(-10.0).unwrap();
        }
        assert!(syn.get_weight() >= 0.0);
    }
}

//! End-to-end STDP and pruning scenarios, driven at the full pairing counts
//! and durations described for this synapse model.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use neuro_types::{LigandType, PlasticityConfig, Position, PruningConfig, SynapseConfig};
use synapses::Synapse;

fn base_config() -> SynapseConfig {
    SynapseConfig {
        pre_id: "pre".into(),
        post_id: "post".into(),
        initial_weight: 0.5,
        delay_ms: 1.0,
        ligand_type: LigandType::Glutamate,
        plasticity_enabled: true,
        plasticity_config: PlasticityConfig {
            enabled: true,
            learning_rate: 0.01,
            time_constant_ms: 20.0,
            window_size_ms: 100.0,
            min_weight: 0.0,
            max_weight: 1.0,
            asymmetry_ratio: 1.0,
        },
        pruning_config: PruningConfig::default(),
        position: Position::origin(),
        synapse_type: "ampa".into(),
        metadata: HashMap::new(),
    }
}

#[test]
fn stdp_window_scenario() {
    let syn = Synapse::new("s-ltp", base_config()).unwrap();
    let mut t = Instant::now();
    for _ in 0..50 {
        syn.notify_pre_spike(t);
        t += Duration::from_millis(10);
        syn.notify_post_spike(t);
        t += Duration::from_millis(1);
    }
    assert!(syn.get_weight() > 0.5, "50 pre-then-post pairings at +10ms must potentiate the synapse");

    let syn = Synapse::new("s-ltd", base_config()).unwrap();
    let mut t = Instant::now();
    for _ in 0..50 {
        syn.notify_post_spike(t);
        t += Duration::from_millis(10);
        syn.notify_pre_spike(t);
        t += Duration::from_millis(1);
    }
    assert!(syn.get_weight() < 0.5, "50 post-then-pre pairings at -10ms must depress the synapse");

    let syn = Synapse::new("s-outside-window", base_config()).unwrap();
    let w0 = syn.get_weight();
    let mut t = Instant::now();
    for _ in 0..50 {
        syn.notify_pre_spike(t);
        t += Duration::from_millis(200);
        syn.notify_post_spike(t);
        t += Duration::from_millis(1);
    }
    assert!((syn.get_weight() - w0).abs() < 1e-9, "pairs outside the plasticity window must leave the weight unchanged");
}

#[test]
fn pruning_scenario() {
    let mut config = base_config();
    config.initial_weight = 0.01;
    config.plasticity_enabled = false;
    config.plasticity_config.min_weight = 0.0;
    config.pruning_config = PruningConfig {
        enabled: true,
        weight_threshold: 0.02,
        inactivity_threshold_ms: 30.0,
    };
    let syn = Synapse::new("s-prune", config).unwrap();

    assert!(!syn.should_prune(), "a synapse with no elapsed inactivity window yet must not be pruned");
    thread::sleep(Duration::from_millis(40));
    assert!(syn.should_prune(), "a weak, inactive synapse past the inactivity threshold must be prunable");

    syn.transmit(1.0).unwrap();
    assert!(!syn.should_prune(), "a transmission resets the inactivity clock");
}

//! Ion channel gating kinetics for the dendritic integrator.
//!
//! Every channel follows first-order kinetics `dx/dt = (x∞(V) − x)/τ_x`
//! with every gate clamped to `[0,1]` and any NaN/Inf coerced to `0`
//! (invariant 6). Four concrete channels are modeled: `Nav1_6`, `Kv4_2`,
//! `Cav1_2`, and the ligand-gated `GabaA`; all implement [`IonChannel`] so
//! the dendritic integrator can hold them as a boxed, ordered list.

use neuro_types::LigandType;
use serde::{Deserialize, Serialize};

/// Coerces NaN/Inf to `0` and clamps the result to `[0, 1]`.
fn clamp_gate(x: f64) -> f64 {
    if x.is_nan() || x.is_infinite() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

fn first_order_step(x: f64, x_inf: f64, tau_ms: f64, dt_ms: f64) -> f64 {
    clamp_gate(x + (x_inf - x) / tau_ms * dt_ms)
}

fn sigmoid(v: f64, half: f64, slope: f64, invert: bool) -> f64 {
    let z = if invert { (v - half) / slope } else { -(v - half) / slope };
    1.0 / (1.0 + z.exp())
}

/// Coerces a non-finite voltage reading to the channel's last known-good
/// voltage (or `0.0` if it never had one), so `membrane_voltage` in
/// [`ChannelStateSnapshot`] is never NaN/Inf.
fn safe_voltage(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

/// Ion carried through an open channel, for classification only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IonSelectivity {
    Sodium,
    Potassium,
    Calcium,
    Chloride,
}

/// Closed tag set mirroring the `type tag` field of the ion-channel data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    Nav1_6,
    Kv4_2,
    Cav1_2,
    GabaARealistic,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Nav1_6 => "nav1.6",
            ChannelKind::Kv4_2 => "kv4.2",
            ChannelKind::Cav1_2 => "cav1.2",
            ChannelKind::GabaARealistic => "gabaa_realistic",
        }
    }
}

/// What the dendritic integrator hands each channel for one incoming signal.
#[derive(Debug, Clone, Copy)]
pub struct ChannelInput {
    pub amplitude: f64,
    pub ligand: Option<LigandType>,
}

/// What a channel hands back for one incoming signal.
#[derive(Debug, Clone, Copy)]
pub struct ModulationResult {
    pub passes: bool,
    pub current_pa: f64,
    pub signal_value: f64,
}

/// Per-tick feedback a channel receives after the soma has integrated.
#[derive(Debug, Clone, Copy, Default)]
pub struct KineticFeedback {
    pub contributed_to_firing: bool,
    pub calcium_influx: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelStateSnapshot {
    pub is_open: bool,
    pub effective_conductance: f64,
    pub equilibrium_potential: f64,
    pub membrane_voltage: f64,
    pub calcium_level: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelTrigger {
    pub activation_voltage: f64,
    pub activation_slope: f64,
    pub inactivation_voltage: Option<f64>,
    pub tau_activation_ms: f64,
    pub tau_inactivation_ms: Option<f64>,
    pub ligand_threshold: Option<f64>,
}

/// Capability set implemented by every dendritic ion channel.
pub trait IonChannel: std::fmt::Debug + Send {
    fn name(&self) -> &'static str;
    fn channel_type(&self) -> ChannelKind;
    fn get_ion_selectivity(&self) -> IonSelectivity;
    fn get_reversal(&self) -> f64;
    fn get_conductance(&self) -> f64;
    fn should_open(&self, voltage: f64) -> bool;
    fn modulate_current(&mut self, input: ChannelInput, voltage: f64, calcium: f64) -> ModulationResult;
    fn update_kinetics(&mut self, feedback: KineticFeedback, dt_ms: f64, voltage: f64);
    fn get_state(&self) -> ChannelStateSnapshot;
    fn get_trigger(&self) -> ChannelTrigger;
    fn close(&mut self);
}

/// Axon-initial-segment-style fast sodium channel. Gating: m³·h.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nav1_6 {
    pub g_max: f64,
    e_na: f64,
    m: f64,
    h: f64,
    last_conductance: f64,
    last_voltage: f64,
    closed: bool,
}

impl Nav1_6 {
    const M_HALF: f64 = -40.0;
    const M_SLOPE: f64 = 5.0;
    const H_HALF: f64 = -60.0;
    const H_SLOPE: f64 = 5.0;
    const TAU_M_MS: f64 = 1.0;
    const TAU_H_MS: f64 = 10.0;

    pub fn new(g_max: f64) -> Self {
        Self {
            g_max,
            e_na: 60.0,
            m: 0.0,
            h: 1.0,
            last_conductance: 0.0,
            last_voltage: 0.0,
            closed: false,
        }
    }
}

impl IonChannel for Nav1_6 {
    fn name(&self) -> &'static str {
        "Nav1.6"
    }

    fn channel_type(&self) -> ChannelKind {
        ChannelKind::Nav1_6
    }

    fn get_ion_selectivity(&self) -> IonSelectivity {
        IonSelectivity::Sodium
    }

    fn get_reversal(&self) -> f64 {
        self.e_na
    }

    fn get_conductance(&self) -> f64 {
        self.last_conductance
    }

    fn should_open(&self, voltage: f64) -> bool {
        sigmoid(voltage, Self::M_HALF, Self::M_SLOPE, false) > 0.5
    }

    fn modulate_current(&mut self, input: ChannelInput, voltage: f64, _calcium: f64) -> ModulationResult {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        self.last_conductance = if self.closed {
            0.0
        } else {
            self.g_max * self.m.powi(3) * self.h
        };
        ModulationResult {
            passes: true,
            current_pa: self.last_conductance * (voltage - self.e_na),
            signal_value: input.amplitude,
        }
    }

    fn update_kinetics(&mut self, _feedback: KineticFeedback, dt_ms: f64, voltage: f64) {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        let m_inf = sigmoid(voltage, Self::M_HALF, Self::M_SLOPE, false);
        let h_inf = sigmoid(voltage, Self::H_HALF, Self::H_SLOPE, true);
        self.m = first_order_step(self.m, m_inf, Self::TAU_M_MS, dt_ms);
        self.h = first_order_step(self.h, h_inf, Self::TAU_H_MS, dt_ms);
    }

    fn get_state(&self) -> ChannelStateSnapshot {
        ChannelStateSnapshot {
            is_open: self.m > 0.01 && self.h > 0.01,
            effective_conductance: self.last_conductance,
            equilibrium_potential: self.e_na,
            membrane_voltage: self.last_voltage,
            calcium_level: None,
        }
    }

    fn get_trigger(&self) -> ChannelTrigger {
        ChannelTrigger {
            activation_voltage: Self::M_HALF,
            activation_slope: Self::M_SLOPE,
            inactivation_voltage: Some(Self::H_HALF),
            tau_activation_ms: Self::TAU_M_MS,
            tau_inactivation_ms: Some(Self::TAU_H_MS),
            ligand_threshold: None,
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// A-type dendritic potassium channel. Gating: n⁴.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kv4_2 {
    pub g_max: f64,
    e_k: f64,
    n: f64,
    last_conductance: f64,
    last_voltage: f64,
    closed: bool,
}

impl Kv4_2 {
    const N_HALF: f64 = -30.0;
    const N_SLOPE: f64 = 10.0;
    const TAU_N_MS: f64 = 5.0;

    pub fn new(g_max: f64) -> Self {
        Self {
            g_max,
            e_k: -90.0,
            n: 0.0,
            last_conductance: 0.0,
            last_voltage: 0.0,
            closed: false,
        }
    }
}

impl IonChannel for Kv4_2 {
    fn name(&self) -> &'static str {
        "Kv4.2"
    }

    fn channel_type(&self) -> ChannelKind {
        ChannelKind::Kv4_2
    }

    fn get_ion_selectivity(&self) -> IonSelectivity {
        IonSelectivity::Potassium
    }

    fn get_reversal(&self) -> f64 {
        self.e_k
    }

    fn get_conductance(&self) -> f64 {
        self.last_conductance
    }

    fn should_open(&self, voltage: f64) -> bool {
        sigmoid(voltage, Self::N_HALF, Self::N_SLOPE, false) > 0.5
    }

    fn modulate_current(&mut self, input: ChannelInput, voltage: f64, _calcium: f64) -> ModulationResult {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        self.last_conductance = if self.closed { 0.0 } else { self.g_max * self.n.powi(4) };
        ModulationResult {
            passes: true,
            current_pa: self.last_conductance * (voltage - self.e_k),
            signal_value: input.amplitude,
        }
    }

    fn update_kinetics(&mut self, _feedback: KineticFeedback, dt_ms: f64, voltage: f64) {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        let n_inf = sigmoid(voltage, Self::N_HALF, Self::N_SLOPE, false);
        self.n = first_order_step(self.n, n_inf, Self::TAU_N_MS, dt_ms);
    }

    fn get_state(&self) -> ChannelStateSnapshot {
        ChannelStateSnapshot {
            is_open: self.n > 0.01,
            effective_conductance: self.last_conductance,
            equilibrium_potential: self.e_k,
            membrane_voltage: self.last_voltage,
            calcium_level: None,
        }
    }

    fn get_trigger(&self) -> ChannelTrigger {
        ChannelTrigger {
            activation_voltage: Self::N_HALF,
            activation_slope: Self::N_SLOPE,
            inactivation_voltage: None,
            tau_activation_ms: Self::TAU_N_MS,
            tau_inactivation_ms: None,
            ligand_threshold: None,
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// L-type calcium channel with self-inhibition by accumulated calcium.
/// Gating: `m² · 1/(1 + [Ca²⁺]/Ca_base)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cav1_2 {
    pub g_max: f64,
    e_ca: f64,
    m: f64,
    ca_accum: f64,
    last_conductance: f64,
    last_voltage: f64,
    closed: bool,
}

impl Cav1_2 {
    const M_HALF: f64 = -20.0;
    const M_SLOPE: f64 = 8.0;
    const TAU_M_MS: f64 = 3.0;
    /// Calcium half-inhibition constant, µM. Not pinned by the source; chosen
    /// so that a resting [Ca²⁺] surrogate of ~0.05 leaves the channel nearly
    /// uninhibited.
    const CA_BASE: f64 = 1.0;
    /// Decay time constant for the channel's own accumulated influx.
    const CA_DECAY_TAU_MS: f64 = 50.0;

    pub fn new(g_max: f64) -> Self {
        Self {
            g_max,
            e_ca: 120.0,
            m: 0.0,
            ca_accum: 0.0,
            last_conductance: 0.0,
            last_voltage: 0.0,
            closed: false,
        }
    }
}

impl IonChannel for Cav1_2 {
    fn name(&self) -> &'static str {
        "Cav1.2"
    }

    fn channel_type(&self) -> ChannelKind {
        ChannelKind::Cav1_2
    }

    fn get_ion_selectivity(&self) -> IonSelectivity {
        IonSelectivity::Calcium
    }

    fn get_reversal(&self) -> f64 {
        self.e_ca
    }

    fn get_conductance(&self) -> f64 {
        self.last_conductance
    }

    fn should_open(&self, voltage: f64) -> bool {
        sigmoid(voltage, Self::M_HALF, Self::M_SLOPE, false) > 0.5
    }

    fn modulate_current(&mut self, input: ChannelInput, voltage: f64, calcium: f64) -> ModulationResult {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        let calcium = if calcium.is_finite() { calcium.max(0.0) } else { 0.0 };
        let inhibition = 1.0 / (1.0 + calcium / Self::CA_BASE);
        self.last_conductance = if self.closed { 0.0 } else { self.g_max * self.m.powi(2) * inhibition };
        ModulationResult {
            passes: true,
            current_pa: self.last_conductance * (voltage - self.e_ca),
            signal_value: input.amplitude,
        }
    }

    fn update_kinetics(&mut self, feedback: KineticFeedback, dt_ms: f64, voltage: f64) {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        let m_inf = sigmoid(voltage, Self::M_HALF, Self::M_SLOPE, false);
        self.m = first_order_step(self.m, m_inf, Self::TAU_M_MS, dt_ms);
        let influx = if feedback.calcium_influx.is_finite() { feedback.calcium_influx.max(0.0) } else { 0.0 };
        self.ca_accum = (self.ca_accum + influx) * (-dt_ms / Self::CA_DECAY_TAU_MS).exp();
        if !self.ca_accum.is_finite() {
            self.ca_accum = 0.0;
        }
    }

    fn get_state(&self) -> ChannelStateSnapshot {
        ChannelStateSnapshot {
            is_open: self.m > 0.01,
            effective_conductance: self.last_conductance,
            equilibrium_potential: self.e_ca,
            membrane_voltage: self.last_voltage,
            calcium_level: Some(self.ca_accum),
        }
    }

    fn get_trigger(&self) -> ChannelTrigger {
        ChannelTrigger {
            activation_voltage: Self::M_HALF,
            activation_slope: Self::M_SLOPE,
            inactivation_voltage: None,
            tau_activation_ms: Self::TAU_M_MS,
            tau_inactivation_ms: None,
            ligand_threshold: None,
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Ligand-gated chloride channel. Gating: Hill binding `m` (n_H=2, K_d=5µM)
/// times a desensitization gate `h` that floors at 20% occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GabaA {
    pub g_max: f64,
    e_cl: f64,
    m: f64,
    h: f64,
    last_ligand_uM: f64,
    last_conductance: f64,
    last_voltage: f64,
    closed: bool,
}

impl GabaA {
    const K_D: f64 = 5.0;
    const HILL_N: f64 = 2.0;
    const TAU_M_MS: f64 = 2.0;
    const TAU_H_MS: f64 = 100.0;
    const H_FLOOR: f64 = 0.2;

    pub fn new(g_max: f64) -> Self {
        Self {
            g_max,
            e_cl: -70.0,
            m: 0.0,
            h: 1.0,
            last_ligand_uM: 0.0,
            last_conductance: 0.0,
            last_voltage: 0.0,
            closed: false,
        }
    }

    fn hill(conc: f64) -> f64 {
        let c = conc.max(0.0).powf(Self::HILL_N);
        let k = Self::K_D.powf(Self::HILL_N);
        c / (k + c)
    }
}

impl IonChannel for GabaA {
    fn name(&self) -> &'static str {
        "GABA-A (realistic)"
    }

    fn channel_type(&self) -> ChannelKind {
        ChannelKind::GabaARealistic
    }

    fn get_ion_selectivity(&self) -> IonSelectivity {
        IonSelectivity::Chloride
    }

    fn get_reversal(&self) -> f64 {
        self.e_cl
    }

    fn get_conductance(&self) -> f64 {
        self.last_conductance
    }

    fn should_open(&self, _voltage: f64) -> bool {
        Self::hill(self.last_ligand_uM) > 0.5
    }

    fn modulate_current(&mut self, input: ChannelInput, voltage: f64, _calcium: f64) -> ModulationResult {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        if input.ligand == Some(LigandType::Gaba) {
            self.last_ligand_uM = input.amplitude.abs();
        }
        self.last_conductance = if self.closed { 0.0 } else { self.g_max * self.m * self.h };
        ModulationResult {
            passes: true,
            current_pa: self.last_conductance * (voltage - self.e_cl),
            signal_value: input.amplitude,
        }
    }

    fn update_kinetics(&mut self, _feedback: KineticFeedback, dt_ms: f64, voltage: f64) {
        self.last_voltage = safe_voltage(voltage, self.last_voltage);
        let m_inf = clamp_gate(Self::hill(self.last_ligand_uM));
        self.m = first_order_step(self.m, m_inf, Self::TAU_M_MS, dt_ms);
        let h_inf = (1.0 - self.m).max(Self::H_FLOOR);
        self.h = first_order_step(self.h, h_inf, Self::TAU_H_MS, dt_ms);
    }

    fn get_state(&self) -> ChannelStateSnapshot {
        ChannelStateSnapshot {
            is_open: self.m > 0.01,
            effective_conductance: self.last_conductance,
            equilibrium_potential: self.e_cl,
            membrane_voltage: self.last_voltage,
            calcium_level: None,
        }
    }

    fn get_trigger(&self) -> ChannelTrigger {
        ChannelTrigger {
            activation_voltage: 0.0,
            activation_slope: 0.0,
            inactivation_voltage: None,
            tau_activation_ms: Self::TAU_M_MS,
            tau_inactivation_ms: Some(Self::TAU_H_MS),
            ligand_threshold: Some(Self::K_D),
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_gates_stay_in_bounds_across_extreme_voltages() {
        let mut channel = Nav1_6::new(120.0);
        let mut t = 0.0;
        while t < 100.0 {
            for v in [-200.0_f64, 0.0, 200.0] {
                channel.update_kinetics(KineticFeedback::default(), 0.1, v);
                assert!((0.0..=1.0).contains(&channel.m));
                assert!((0.0..=1.0).contains(&channel.h));
                let result = channel.modulate_current(
                    ChannelInput { amplitude: 1.0, ligand: None },
                    v,
                    0.0,
                );
                assert!(channel.get_conductance() >= 0.0);
                assert!(result.current_pa.is_finite());
            }
            t += 0.1;
        }
    }

    #[test]
    fn kv_reaches_expected_equilibrium_at_depolarized_voltage() {
        let mut channel = Kv4_2::new(10.0);
        for _ in 0..10_000 {
            channel.update_kinetics(KineticFeedback::default(), 0.5, 0.0);
        }
        assert!(channel.n > 0.9);
    }

    #[test]
    fn cav_conductance_is_suppressed_by_high_calcium() {
        let mut low = Cav1_2::new(5.0);
        let mut high = Cav1_2::new(5.0);
        for _ in 0..5_000 {
            low.update_kinetics(KineticFeedback::default(), 0.1, 0.0);
            high.update_kinetics(KineticFeedback::default(), 0.1, 0.0);
        }
        let input = ChannelInput { amplitude: 1.0, ligand: None };
        low.modulate_current(input, 0.0, 0.01);
        high.modulate_current(input, 0.0, 50.0);
        assert!(low.get_conductance() > high.get_conductance());
    }

    #[test]
    fn gaba_a_responds_only_to_gaba_ligand() {
        let mut channel = GabaA::new(8.0);
        channel.modulate_current(
            ChannelInput { amplitude: 10.0, ligand: Some(LigandType::Glutamate) },
            -70.0,
            0.0,
        );
        assert_eq!(channel.last_ligand_uM, 0.0);

        channel.modulate_current(
            ChannelInput { amplitude: 10.0, ligand: Some(LigandType::Gaba) },
            -70.0,
            0.0,
        );
        assert_eq!(channel.last_ligand_uM, 10.0);
        for _ in 0..1_000 {
            channel.update_kinetics(KineticFeedback::default(), 1.0, -70.0);
        }
        assert!(channel.m > 0.5);
        assert!(channel.h >= GabaA::H_FLOOR - 1e-9);
    }

    #[test]
    fn gate_helpers_coerce_nonfinite_inputs() {
        assert_eq!(clamp_gate(f64::NAN), 0.0);
        assert_eq!(clamp_gate(f64::INFINITY), 0.0);
        assert_eq!(clamp_gate(2.5), 1.0);
        assert_eq!(clamp_gate(-2.5), 0.0);
    }
}

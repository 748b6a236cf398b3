//! The common component base: identity, position, lifecycle state, and metadata.
//!
//! `Neuron` and `Synapse` each embed a [`BaseComponent`] rather than inherit from
//! it — Rust has no implementation inheritance — and delegate their
//! `id`/`position`/`state`/`metadata` accessors to it. This is the "types-package"
//! component base referenced by the design notes; the alternative (duplicating
//! the base per-crate) was rejected as vestigial.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Closed set of component kinds known to the matrix registry.
///
/// Glial, microglial, and ependymal behavior is out of scope for this core;
/// only their tags are represented so the registry can classify components
/// it did not itself construct here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Neuron,
    Synapse,
    GlialCell,
    MicrogliaCell,
    EpendymalCell,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Neuron => "neuron",
            ComponentType::Synapse => "synapse",
            ComponentType::GlialCell => "glial_cell",
            ComponentType::MicrogliaCell => "microglia_cell",
            ComponentType::EpendymalCell => "ependymal_cell",
        }
    }
}

/// Operational state of a component. Transitions are constrained by
/// [`BaseComponent::start`], [`BaseComponent::stop`], and [`BaseComponent::restart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentState {
    Active,
    Inactive,
    ShuttingDown,
    Stopped,
    Developing,
    Dying,
    Damaged,
    Maintenance,
    Hibernating,
}

impl ComponentState {
    /// Restart is legal only from these states.
    pub fn can_restart(&self) -> bool {
        matches!(
            self,
            ComponentState::Inactive
                | ComponentState::Stopped
                | ComponentState::Maintenance
                | ComponentState::Hibernating
        )
    }
}

/// 3D position in micrometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }
}

/// Derived activity level from time since last touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivityLevel {
    Fresh,
    Stale,
    Idle,
}

impl ActivityLevel {
    pub fn value(&self) -> f64 {
        match self {
            ActivityLevel::Fresh => 1.0,
            ActivityLevel::Stale => 0.5,
            ActivityLevel::Idle => 0.0,
        }
    }
}

/// Identity, position, lifecycle state, and metadata shared by every
/// neuron and synapse. Position/state/metadata are read-write locked so a
/// matrix-owned thread can inspect or adjust them without touching the
/// actor's private hot-path state.
#[derive(Debug)]
pub struct BaseComponent {
    id: String,
    component_type: ComponentType,
    position: RwLock<Position>,
    state: RwLock<ComponentState>,
    metadata: RwLock<HashMap<String, String>>,
    last_activity: RwLock<Instant>,
}

impl BaseComponent {
    pub fn new(id: impl Into<String>, component_type: ComponentType, position: Position) -> Self {
        Self {
            id: id.into(),
            component_type,
            position: RwLock::new(position),
            state: RwLock::new(ComponentState::Active),
            metadata: RwLock::new(HashMap::new()),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn position(&self) -> Position {
        *self.position.read().expect("position lock poisoned")
    }

    pub fn set_position(&self, position: Position) {
        *self.position.write().expect("position lock poisoned") = position;
        self.touch();
    }

    pub fn state(&self) -> ComponentState {
        *self.state.read().expect("state lock poisoned")
    }

    /// Defensive copy — callers cannot mutate the live metadata map through it.
    pub fn metadata(&self) -> HashMap<String, String> {
        self.metadata.read().expect("metadata lock poisoned").clone()
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata
            .write()
            .expect("metadata lock poisoned")
            .insert(key.into(), value.into());
        self.touch();
    }

    pub fn last_activity(&self) -> Instant {
        *self.last_activity.read().expect("activity lock poisoned")
    }

    pub fn touch(&self) {
        *self.last_activity.write().expect("activity lock poisoned") = Instant::now();
    }

    pub fn is_active(&self) -> bool {
        self.state() == ComponentState::Active
    }

    /// `1.0` within 1s of the last touch, `0.5` within 10s, else `0.0`.
    pub fn activity_level(&self) -> ActivityLevel {
        let elapsed = self.last_activity().elapsed();
        if elapsed <= Duration::from_secs(1) {
            ActivityLevel::Fresh
        } else if elapsed <= Duration::from_secs(10) {
            ActivityLevel::Stale
        } else {
            ActivityLevel::Idle
        }
    }

    /// Idempotent: transitions to Active from any state.
    pub fn start(&self) {
        *self.state.write().expect("state lock poisoned") = ComponentState::Active;
        self.touch();
    }

    /// ShuttingDown -> Stopped. Canonical per the design notes: the
    /// source's direct-to-Stopped flavor is vestigial.
    pub fn stop(&self) {
        *self.state.write().expect("state lock poisoned") = ComponentState::ShuttingDown;
        self.touch();
        *self.state.write().expect("state lock poisoned") = ComponentState::Stopped;
    }

    /// Legal only from {Inactive, Stopped, Maintenance, Hibernating}.
    pub fn restart(&self) -> Result<()> {
        let mut state = self.state.write().expect("state lock poisoned");
        if !state.can_restart() {
            return Err(CoreError::NotRestartable);
        }
        *state = ComponentState::Active;
        drop(state);
        self.touch();
        Ok(())
    }
}

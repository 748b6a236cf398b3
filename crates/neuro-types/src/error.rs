//! Shared error surface for the neuron/synapse core.

use thiserror::Error;

/// Errors surfaced by neuron actors, synapses, and the lifecycle base they share.
///
/// Construction-time variants (`InvalidConfig`) are fatal and returned to the
/// creator. Everything else is either a lifecycle misuse surfaced to the
/// offending caller, or a runtime condition the event loop counts and
/// continues past — it never terminates a neuron's loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("queue closed: {0}")]
    QueueClosed(String),

    #[error("actor already running")]
    AlreadyRunning,

    #[error("actor not running")]
    NotRunning,

    #[error("illegal restart from current state")]
    NotRestartable,

    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("numeric anomaly coerced to safe default: {0}")]
    NumericAnomaly(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

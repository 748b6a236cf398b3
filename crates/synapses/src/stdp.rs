//! Trace-based spike-timing-dependent plasticity.
//!
//! Two exponentially decaying traces (`x_pre`, `x_post`) are the reduced
//! form of the teacher's triplet-STDP `r1`/`o1` traces (see the vestigial
//! `TripletSTDP` in `plasticity.rs`), specialized to pair-based STDP per the
//! spec: a pre-spike potentiates `x_pre` and applies LTD proportional to
//! however recently the post side fired (and vice versa).

use std::collections::VecDeque;
use std::time::Instant;

use neuro_types::{PlasticityConfig, PlasticityEventKind};

/// One completed pre/post pairing, kept for introspection and bounded by
/// the plasticity window (oldest entries are evicted as they age out).
#[derive(Debug, Clone, Copy)]
pub struct SpikePairRecord {
    pub delta_t_ms: f64,
    pub kind: PlasticityEventKind,
    pub timestamp: Instant,
}

#[derive(Debug)]
pub struct StdpState {
    config: PlasticityConfig,
    x_pre: f64,
    x_post: f64,
    last_pre_time: Option<Instant>,
    last_post_time: Option<Instant>,
    history: VecDeque<SpikePairRecord>,
}

/// Outcome of observing a spike: the weight delta to apply (already masked
/// to zero when outside the pairing window) and, if non-trivial, the event
/// to report upstream.
pub struct StdpOutcome {
    pub delta_w: f64,
    pub event: Option<(f64, PlasticityEventKind)>,
}

impl StdpState {
    pub fn new(config: PlasticityConfig) -> Self {
        Self {
            config,
            x_pre: 0.0,
            x_post: 0.0,
            last_pre_time: None,
            last_post_time: None,
            history: VecDeque::new(),
        }
    }

    fn decay(trace: f64, elapsed_ms: f64, tau_ms: f64) -> f64 {
        trace * (-elapsed_ms / tau_ms).exp() + 1.0
    }

    fn prune_history(&mut self, now: Instant) {
        let window = self.config.window_size_ms;
        while let Some(front) = self.history.front() {
            if now.duration_since(front.timestamp).as_secs_f64() * 1000.0 > window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Observe a presynaptic spike at `now`. LTD magnitude depends on how
    /// strongly the postsynaptic trace is still elevated.
    pub fn on_pre_spike(&mut self, now: Instant) -> StdpOutcome {
        let elapsed_ms = self
            .last_pre_time
            .map(|t| now.duration_since(t).as_secs_f64() * 1000.0)
            .unwrap_or(f64::INFINITY);
        self.x_pre = Self::decay(self.x_pre, elapsed_ms, self.config.time_constant_ms);
        self.last_pre_time = Some(now);

        let outcome = if let Some(post_t) = self.last_post_time {
            let dt_ms = now.duration_since(post_t).as_secs_f64() * 1000.0;
            if dt_ms <= self.config.window_size_ms {
                let delta_w = -self.config.learning_rate * self.config.asymmetry_ratio * self.x_post;
                // Δt = t_post - t_pre; pre just fired after post, so this is negative.
                self.record(now, -dt_ms, PlasticityEventKind::Ltd);
                StdpOutcome {
                    delta_w,
                    event: Some((-dt_ms, PlasticityEventKind::Ltd)),
                }
            } else {
                StdpOutcome { delta_w: 0.0, event: None }
            }
        } else {
            StdpOutcome { delta_w: 0.0, event: None }
        };
        self.prune_history(now);
        outcome
    }

    /// Observe a postsynaptic spike at `now`. LTP magnitude depends on how
    /// strongly the presynaptic trace is still elevated.
    pub fn on_post_spike(&mut self, now: Instant) -> StdpOutcome {
        let elapsed_ms = self
            .last_post_time
            .map(|t| now.duration_since(t).as_secs_f64() * 1000.0)
            .unwrap_or(f64::INFINITY);
        self.x_post = Self::decay(self.x_post, elapsed_ms, self.config.time_constant_ms);
        self.last_post_time = Some(now);

        let outcome = if let Some(pre_t) = self.last_pre_time {
            let dt_ms = now.duration_since(pre_t).as_secs_f64() * 1000.0;
            if dt_ms <= self.config.window_size_ms {
                let delta_w = self.config.learning_rate * self.x_pre;
                self.record(now, dt_ms, PlasticityEventKind::Ltp);
                StdpOutcome {
                    delta_w,
                    event: Some((dt_ms, PlasticityEventKind::Ltp)),
                }
            } else {
                StdpOutcome { delta_w: 0.0, event: None }
            }
        } else {
            StdpOutcome { delta_w: 0.0, event: None }
        };
        self.prune_history(now);
        outcome
    }

    fn record(&mut self, now: Instant, delta_t_ms: f64, kind: PlasticityEventKind) {
        self.history.push_back(SpikePairRecord {
            delta_t_ms,
            kind,
            timestamp: now,
        });
    }

    pub fn history(&self) -> impl Iterator<Item = &SpikePairRecord> {
        self.history.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pre_then_post_within_window_potentiates() {
        let mut stdp = StdpState::new(PlasticityConfig {
            learning_rate: 0.01,
            time_constant_ms: 20.0,
            window_size_ms: 100.0,
            asymmetry_ratio: 1.0,
            ..Default::default()
        });
        let t0 = Instant::now();
        stdp.on_pre_spike(t0);
        let outcome = stdp.on_post_spike(t0 + Duration::from_millis(10));
        assert!(outcome.delta_w > 0.0);
    }

    #[test]
    fn post_then_pre_within_window_depresses() {
        let mut stdp = StdpState::new(PlasticityConfig {
            learning_rate: 0.01,
            time_constant_ms: 20.0,
            window_size_ms: 100.0,
            asymmetry_ratio: 1.0,
            ..Default::default()
        });
        let t0 = Instant::now();
        stdp.on_post_spike(t0);
        let outcome = stdp.on_pre_spike(t0 + Duration::from_millis(10));
        assert!(outcome.delta_w < 0.0);
    }

    #[test]
    fn pairs_outside_window_are_ignored() {
        let mut stdp = StdpState::new(PlasticityConfig {
            window_size_ms: 100.0,
            ..Default::default()
        });
        let t0 = Instant::now();
        stdp.on_pre_spike(t0);
        let outcome = stdp.on_post_spike(t0 + Duration::from_millis(200));
        assert_eq!(outcome.delta_w, 0.0);
    }
}

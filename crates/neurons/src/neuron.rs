//! The per-neuron actor: event loop, soma integration, firing, and
//! homeostatic threshold adjustment.
//!
//! Everything here after construction is touched only by the neuron's own
//! event-loop thread, except the handful of fields held behind locks for
//! cross-thread registration (`outputs`, `callbacks`, `fire_tx`) and the
//! shared [`BaseComponent`]. This is what lets the hot integration path run
//! lock-free.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{after, select, unbounded, Receiver, Sender};
use neuro_types::{
    BaseComponent, ComponentState, ComponentType, CoreError, FireEvent, MessageReceiver,
    NeuralSignal, NeuronCallbacks, NeuronConfig, OutputCallback, Result,
};

use crate::dendritic::DendriticIntegrator;
use crate::delivery::DeliveryScheduler;

const TIMESTEP_MS: f64 = 1.0;
const HOMEOSTASIS_CAP_MS: f64 = 100.0;
const THRESHOLD_MIN: f64 = 0.01;
const THRESHOLD_MAX: f64 = 1.0e6;

/// An autonomous spiking neuron. Always constructed behind an `Arc` because
/// its own event loop, its callers, and any synapse holding it as an
/// `OutputCallback` target all need shared access to the same instance.
pub struct Neuron {
    base: BaseComponent,
    config: NeuronConfig,
    input_tx: Sender<NeuralSignal>,
    input_rx: Mutex<Option<Receiver<NeuralSignal>>>,
    close_tx: Sender<()>,
    close_rx: Mutex<Option<Receiver<()>>>,
    fire_tx: RwLock<Option<Sender<FireEvent>>>,
    callbacks: RwLock<Option<Arc<dyn NeuronCallbacks>>>,
    outputs: RwLock<HashMap<String, Arc<dyn OutputCallback>>>,
    /// Where to deliver a scheduled signal once its deadline elapses, keyed
    /// by `OutputCallback::target_id()`. In a full system the matrix would
    /// resolve this by id through its registry; wiring it directly here
    /// avoids requiring a matrix for the core to be independently testable.
    receivers: RwLock<HashMap<String, Arc<dyn MessageReceiver>>>,
    running: AtomicBool,
    closed: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Neuron {
    pub fn new(id: impl Into<String>, config: NeuronConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let (input_tx, input_rx) = unbounded();
        let (close_tx, close_rx) = unbounded();
        Ok(Arc::new(Self {
            base: BaseComponent::new(id, ComponentType::Neuron, config.position),
            config,
            input_tx,
            input_rx: Mutex::new(Some(input_rx)),
            close_tx,
            close_rx: Mutex::new(Some(close_rx)),
            fire_tx: RwLock::new(None),
            callbacks: RwLock::new(None),
            outputs: RwLock::new(HashMap::new()),
            receivers: RwLock::new(HashMap::new()),
            running: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            handle: Mutex::new(None),
        }))
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }

    pub fn state(&self) -> ComponentState {
        self.base.state()
    }

    /// Must be called before `run()`.
    pub fn set_callbacks(&self, callbacks: Arc<dyn NeuronCallbacks>) {
        *self.callbacks.write().expect("callbacks lock poisoned") = Some(callbacks);
    }

    pub fn add_output_callback(&self, synapse_id: impl Into<String>, callback: Arc<dyn OutputCallback>) {
        self.outputs
            .write()
            .expect("outputs lock poisoned")
            .insert(synapse_id.into(), callback);
    }

    /// Registers where signals bound for `target_id` should be delivered
    /// once their scheduled deadline elapses.
    pub fn connect_receiver(&self, target_id: impl Into<String>, receiver: Arc<dyn MessageReceiver>) {
        self.receivers
            .write()
            .expect("receivers lock poisoned")
            .insert(target_id.into(), receiver);
    }

    /// Non-blocking; drop-on-full, per the design notes' resolved overflow
    /// policy for loss-tolerant telemetry.
    pub fn fire_event_channel(&self, sender: Sender<FireEvent>) {
        *self.fire_tx.write().expect("fire_tx lock poisoned") = Some(sender);
    }

    /// Starts the event loop thread. Must be called exactly once.
    pub fn run(self: &Arc<Self>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CoreError::AlreadyRunning);
        }
        let input_rx = self
            .input_rx
            .lock()
            .expect("input_rx lock poisoned")
            .take()
            .expect("run called twice past the guard above");
        let close_rx = self
            .close_rx
            .lock()
            .expect("close_rx lock poisoned")
            .take()
            .expect("run called twice past the guard above");

        let this = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("neuron-{}", self.id()))
            .spawn(move || this.event_loop(input_rx, close_rx))
            .expect("failed to spawn neuron event loop thread");
        *self.handle.lock().expect("handle lock poisoned") = Some(handle);
        Ok(())
    }

    /// Requests graceful shutdown. Idempotent.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let _ = self.close_tx.try_send(());
        if let Some(handle) = self.handle.lock().expect("handle lock poisoned").take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn homeostasis_period(&self) -> Duration {
        Duration::from_secs_f64((self.config.refractory_period_ms * 10.0).min(HOMEOSTASIS_CAP_MS) / 1000.0)
    }

    fn spatial_delay(&self, target_id: &str) -> Duration {
        self.callbacks
            .read()
            .expect("callbacks lock poisoned")
            .as_ref()
            .map(|cb| cb.get_spatial_delay(target_id))
            .unwrap_or(Duration::ZERO)
    }

    fn report_state_change(&self, old: ComponentState, new: ComponentState) {
        if let Some(cb) = self.callbacks.read().expect("callbacks lock poisoned").as_ref() {
            cb.report_state_change(old, new);
        }
    }

    fn event_loop(self: Arc<Self>, input_rx: Receiver<NeuralSignal>, close_rx: Receiver<()>) {
        let mut accumulator: f64 = 0.0;
        let mut threshold: f64 = self.config.threshold;
        let mut refractory_until: Option<Instant> = None;
        let mut last_update = Instant::now();
        let mut last_homeostasis = Instant::now();
        let mut fire_times: VecDeque<Instant> = VecDeque::new();
        let mut delivery = DeliveryScheduler::new();
        let mut dendritic = DendriticIntegrator::new();
        let homeostasis_period = self.homeostasis_period();

        tracing::debug!(neuron = self.id(), "event loop starting");

        'outer: loop {
            let now = Instant::now();
            let mut wait = homeostasis_period
                .checked_sub(now.saturating_duration_since(last_homeostasis))
                .unwrap_or(Duration::ZERO);
            if let Some(deadline) = delivery.peek_deadline() {
                let until = deadline.saturating_duration_since(now);
                if until < wait {
                    wait = until;
                }
            }
            let timer = after(wait);

            select! {
                recv(input_rx) -> msg => {
                    match msg {
                        Ok(signal) => {
                            self.handle_signal(
                                &signal,
                                &mut accumulator,
                                &mut threshold,
                                &mut refractory_until,
                                &mut last_update,
                                &mut fire_times,
                                &mut delivery,
                                &mut dendritic,
                            );
                        }
                        Err(_) => break 'outer,
                    }
                }
                recv(close_rx) -> _ => {
                    break 'outer;
                }
                recv(timer) -> _ => {
                    let woke_at = Instant::now();
                    for entry in delivery.drain_due(woke_at) {
                        self.deliver(entry);
                    }
                    if woke_at.saturating_duration_since(last_homeostasis) >= homeostasis_period {
                        self.run_homeostasis(&mut threshold, &fire_times, homeostasis_period, woke_at);
                        last_homeostasis = woke_at;
                    }
                }
            }
        }

        self.shut_down(&mut delivery);
        tracing::debug!(neuron = self.id(), "event loop stopped");
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_signal(
        &self,
        signal: &NeuralSignal,
        accumulator: &mut f64,
        threshold: &mut f64,
        refractory_until: &mut Option<Instant>,
        last_update: &mut Instant,
        fire_times: &mut VecDeque<Instant>,
        delivery: &mut DeliveryScheduler,
        dendritic: &mut DendriticIntegrator,
    ) {
        let now = Instant::now();
        let elapsed_ms = now.saturating_duration_since(*last_update).as_secs_f64() * 1000.0;
        *last_update = now;

        let delta = dendritic.integrate(signal, *accumulator).unwrap_or(0.0);

        let decay_steps = (elapsed_ms / TIMESTEP_MS).max(0.0);
        *accumulator *= self.config.decay_rate.powf(decay_steps);
        *accumulator += delta;
        if !accumulator.is_finite() {
            tracing::warn!(neuron = self.id(), "accumulator went non-finite, resetting");
            *accumulator = 0.0;
        }

        let contributed_to_firing;
        let in_refractory = refractory_until.map(|t| now < t).unwrap_or(false);
        if !in_refractory && *accumulator >= *threshold {
            self.fire(accumulator, refractory_until, fire_times, delivery, now);
            contributed_to_firing = true;
        } else {
            contributed_to_firing = false;
        }

        dendritic.tick_kinetics(contributed_to_firing, elapsed_ms.max(TIMESTEP_MS), *accumulator);
    }

    fn fire(
        &self,
        accumulator: &mut f64,
        refractory_until: &mut Option<Instant>,
        fire_times: &mut VecDeque<Instant>,
        delivery: &mut DeliveryScheduler,
        now: Instant,
    ) {
        *refractory_until = Some(now + self.config.refractory_period());
        *accumulator = 0.0;
        fire_times.push_back(now);

        let outputs = self.outputs.read().expect("outputs lock poisoned");
        for (synapse_id, callback) in outputs.iter() {
            match callback.transmit(self.config.fire_factor) {
                Ok(signal) => {
                    let total_delay = callback.delay() + self.spatial_delay(callback.target_id());
                    delivery.schedule(callback.target_id().to_string(), signal, total_delay);
                }
                Err(err) => {
                    tracing::warn!(neuron = self.id(), synapse = synapse_id.as_str(), error = %err, "transmit failed");
                }
            }
        }
        drop(outputs);

        if let Some(fire_tx) = self.fire_tx.read().expect("fire_tx lock poisoned").as_ref() {
            let event = FireEvent { id: self.id().to_string(), value: self.config.fire_factor, timestamp: now };
            let _ = fire_tx.try_send(event);
        }

        self.base.touch();
        if let Some(cb) = self.callbacks.read().expect("callbacks lock poisoned").as_ref() {
            cb.report_health(self.base.activity_level().value(), self.outputs.read().expect("outputs lock poisoned").len());
        }
    }

    fn deliver(&self, entry: crate::delivery::DeliveryEntry) {
        let receiver = self
            .receivers
            .read()
            .expect("receivers lock poisoned")
            .get(&entry.target_id)
            .cloned();
        match receiver {
            Some(receiver) => {
                if let Err(err) = receiver.receive(entry.signal) {
                    tracing::warn!(neuron = self.id(), target = entry.target_id.as_str(), error = %err, "delivery failed");
                }
            }
            None => {
                tracing::warn!(neuron = self.id(), target = entry.target_id.as_str(), "no receiver registered for delivery target");
            }
        }
    }

    fn run_homeostasis(&self, threshold: &mut f64, fire_times: &VecDeque<Instant>, window: Duration, now: Instant) {
        if self.config.target_firing_rate == 0.0 || self.config.homeostasis_strength == 0.0 {
            return;
        }
        let window_secs = window.as_secs_f64().max(1e-6);
        let cutoff = now - window;
        let count = fire_times.iter().filter(|t| **t >= cutoff).count();
        let rate = count as f64 / window_secs;
        let adjustment = self.config.homeostasis_strength * (rate - self.config.target_firing_rate) * window_secs;
        let mut next = *threshold + adjustment;
        if !next.is_finite() {
            next = self.config.threshold;
        }
        *threshold = next.clamp(THRESHOLD_MIN, THRESHOLD_MAX);
    }

    fn shut_down(&self, delivery: &mut DeliveryScheduler) {
        delivery.clear();
        let old = self.base.state();
        self.base.stop();
        self.report_state_change(old, ComponentState::Stopped);
        *self.fire_tx.write().expect("fire_tx lock poisoned") = None;
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl MessageReceiver for Neuron {
    fn receive(&self, signal: NeuralSignal) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CoreError::QueueClosed(self.id().to_string()));
        }
        self.input_tx
            .try_send(signal)
            .map_err(|_| CoreError::QueueClosed(self.id().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_types::Position;
    use std::time::Duration as StdDuration;

    fn config() -> NeuronConfig {
        NeuronConfig {
            threshold: 0.8,
            decay_rate: 0.98,
            refractory_period_ms: 10.0,
            fire_factor: 1.0,
            target_firing_rate: 0.0,
            homeostasis_strength: 0.0,
            position: Position::origin(),
            receptors: vec![],
            released_ligands: vec![],
            signal_types: vec![],
            neuron_type: "test".into(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn run_twice_fails_with_already_running() {
        let neuron = Neuron::new("n1", config()).unwrap();
        neuron.run().unwrap();
        assert_eq!(neuron.run(), Err(CoreError::AlreadyRunning));
        neuron.close().unwrap();
    }

    #[test]
    fn receive_after_close_fails_with_queue_closed() {
        let neuron = Neuron::new("n1", config()).unwrap();
        neuron.run().unwrap();
        neuron.close().unwrap();
        let signal = NeuralSignal::new(1.0, "x", "n1");
        assert_eq!(neuron.receive(signal), Err(CoreError::QueueClosed("n1".to_string())));
    }

    #[test]
    fn single_suprathreshold_pulse_fires_exactly_once_via_fire_channel() {
        let neuron = Neuron::new("n1", config()).unwrap();
        let (tx, rx) = unbounded();
        neuron.fire_event_channel(tx);
        neuron.run().unwrap();

        neuron.receive(NeuralSignal::new(5.0, "in", "n1")).unwrap();
        let event = rx.recv_timeout(StdDuration::from_millis(200)).unwrap();
        assert_eq!(event.id, "n1");

        assert!(rx.recv_timeout(StdDuration::from_millis(20)).is_err());
        neuron.close().unwrap();
    }

    #[test]
    fn refractory_period_limits_fire_rate_under_rapid_drive() {
        let mut cfg = config();
        cfg.refractory_period_ms = 5.0;
        let neuron = Neuron::new("n1", cfg).unwrap();
        let (tx, rx) = unbounded();
        neuron.fire_event_channel(tx);
        neuron.run().unwrap();

        for _ in 0..100 {
            neuron.receive(NeuralSignal::new(5.0, "in", "n1")).unwrap();
        }
        thread::sleep(StdDuration::from_millis(2));

        let mut fires = 0;
        while rx.recv_timeout(StdDuration::from_millis(5)).is_ok() {
            fires += 1;
        }
        assert_eq!(fires, 1, "refractory period must suppress all but the first fire in a rapid-fire burst");
        neuron.close().unwrap();
    }
}

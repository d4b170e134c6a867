//! Simulation Controller
//!
//! Owns one session: the cache, the order processor, statistics and order
//! history. All mutation happens under a single session lock; the timed
//! phases (preparation and delayed manual removal) are tokio tasks that
//! sleep and then take the lock to apply their effect.
//!
//! # Cancellation
//!
//! Every task captures the session epoch when it is scheduled. `reset()` bumps
//! the epoch and cancels the session's [`CancellationToken`], so a task that
//! was already past its sleep still finds a newer epoch and does nothing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::order::{Order, OrderPhase, OrderProcessor};
use super::snapshot::{PendingRemoval, SimulationSnapshot};
use super::stats::StatisticsAggregator;
use crate::cache::{CacheStore, EvictionEvent, EvictionPolicy, Tick};
use crate::config::SimulationConfig;
use crate::domain::{EventSink, OrderId, SimulationEvent};
use crate::error::{Error, Result};

// =============================================================================
// Session State
// =============================================================================

/// Everything `reset()` recreates
struct Session {
    policy: EvictionPolicy,
    store: CacheStore,
    processor: OrderProcessor,
    stats: StatisticsAggregator,
    history: Vec<Order>,
    next_id: OrderId,
    pending: Vec<PendingRemoval>,
    last_eviction: Option<EvictionEvent>,
    epoch: u64,
    cancel: CancellationToken,
    rng: Box<dyn RngCore + Send>,
}

struct Shared {
    config: SimulationConfig,
    session: Mutex<Session>,
    sink: Arc<dyn EventSink>,
    phase: watch::Sender<OrderPhase>,
    runtime: Handle,
}

// =============================================================================
// Controller
// =============================================================================

/// Handle to a simulation session. Cloning shares the session.
#[derive(Clone)]
pub struct SimulationController {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SimulationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.shared.session.lock();
        f.debug_struct("SimulationController")
            .field("policy", &session.policy)
            .field("phase", &session.processor.phase())
            .field("cached", &session.store.len())
            .field("epoch", &session.epoch)
            .finish()
    }
}

impl SimulationController {
    /// Create a session from a validated configuration.
    ///
    /// Order selection is seeded from `config.seed` when set, from entropy
    /// otherwise. Must be called from within a tokio runtime.
    pub fn new(config: SimulationConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let rng: Box<dyn RngCore + Send> = match config.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        Self::build(config, sink, rng)
    }

    /// Create a session that draws random orders from `rng`
    pub fn with_rng<R>(config: SimulationConfig, sink: Arc<dyn EventSink>, rng: R) -> Result<Self>
    where
        R: RngCore + Send + 'static,
    {
        Self::build(config, sink, Box::new(rng))
    }

    fn build(
        config: SimulationConfig,
        sink: Arc<dyn EventSink>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        config.validate()?;

        let runtime = Handle::try_current()
            .map_err(|e| Error::Runtime(format!("timed phases need a tokio runtime: {}", e)))?;

        let session = Session {
            policy: config.policy,
            store: CacheStore::new(config.capacity)?,
            processor: OrderProcessor::new(config.hit_duration(), config.miss_duration()),
            stats: StatisticsAggregator::new(),
            history: Vec::new(),
            next_id: OrderId(1),
            pending: Vec::new(),
            last_eviction: None,
            epoch: 0,
            cancel: CancellationToken::new(),
            rng,
        };

        info!(
            capacity = config.capacity,
            policy = %config.policy,
            catalog = config.catalog.len(),
            "Simulation session created"
        );

        let (phase, _) = watch::channel(OrderPhase::Idle);
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                session: Mutex::new(session),
                sink,
                phase,
                runtime,
            }),
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order for a random catalog item.
    ///
    /// Returns `None` without drawing from the RNG if an order is in flight.
    pub fn submit_random_order(&self) -> Option<OrderId> {
        let catalog = &self.shared.config.catalog;
        self.try_submit(|session| catalog[session.rng.gen_range(0..catalog.len())].clone())
    }

    /// Submit an order for a specific item.
    ///
    /// Returns `Ok(None)` if an order is in flight.
    pub fn submit_order(&self, item: &str) -> Result<Option<OrderId>> {
        if !self.shared.config.contains_item(item) {
            return Err(Error::UnknownItem(item.to_string()));
        }
        Ok(self.try_submit(|_| item.to_string()))
    }

    fn try_submit(&self, pick: impl FnOnce(&mut Session) -> String) -> Option<OrderId> {
        let mut guard = self.shared.session.lock();
        let session = &mut *guard;

        if !session.processor.is_idle() {
            warn!(
                phase = %session.processor.phase(),
                "Order ignored: another order is in progress"
            );
            return None;
        }

        let item = pick(session);
        let id = session.next_id;
        let policy = session.policy;
        let (outcome, duration) =
            session.processor.receive(id, item.as_str(), policy, &session.store)?;
        session.next_id = id.next();

        info!(
            order_id = %id,
            item = %item,
            policy = %policy,
            outcome = %outcome,
            "Order received"
        );

        self.shared.phase.send_replace(OrderPhase::Preparing);
        self.shared
            .sink
            .publish(SimulationEvent::order_received(id, item, policy, outcome));
        self.schedule(session, duration, |shared, epoch| shared.complete_order(epoch));

        Some(id)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Remove `key` from the cache by hand, whatever the processor is doing.
    ///
    /// With a non-zero removal delay the removal is announced now and applied
    /// later. Returns `false` if `key` is not cached.
    pub fn manual_evict(&self, key: &str) -> bool {
        let mut guard = self.shared.session.lock();
        let session = &mut *guard;

        let inserted_at = match session.store.get(key) {
            Some(entry) => entry.inserted_at(),
            None => {
                debug!(key, "Manual removal ignored: not cached");
                return false;
            }
        };

        let delay = self.shared.config.removal_delay();
        if delay.is_zero() {
            session.store.remove(key);
            self.shared.record_manual_eviction(session, key);
            return true;
        }

        if let Some(index) = session.pending.iter().position(|p| p.key == key) {
            if session.pending[index].inserted_at == inserted_at {
                debug!(key, "Manual removal already scheduled");
                return true;
            }
            // Targets an entry that has since been evicted; its timer will skip
            debug!(key, "Replacing stale scheduled removal");
            session.pending.remove(index);
        }

        let now = Utc::now();
        let due = chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        session.pending.push(PendingRemoval {
            key: key.to_string(),
            requested_at: now,
            apply_at: now + due,
            inserted_at,
        });

        info!(key, delay_ms = delay.as_millis() as u64, "Manual removal scheduled");
        self.shared
            .sink
            .publish(SimulationEvent::removal_scheduled(key, delay));

        let key = key.to_string();
        self.schedule(session, delay, move |shared, epoch| {
            shared.apply_removal(epoch, &key, inserted_at)
        });
        true
    }

    /// Use `policy` for orders submitted from now on
    pub fn set_policy(&self, policy: EvictionPolicy) {
        let mut session = self.shared.session.lock();
        if session.policy == policy {
            return;
        }

        let from = session.policy;
        session.policy = policy;
        info!(from = %from, to = %policy, "Eviction policy changed");
        self.shared
            .sink
            .publish(SimulationEvent::policy_changed(from, policy));
    }

    /// Discard the session: cancel timers, empty the cache, zero statistics.
    pub fn reset(&self) {
        let mut guard = self.shared.session.lock();
        let session = &mut *guard;

        session.epoch += 1;
        session.cancel.cancel();
        session.cancel = CancellationToken::new();

        if let Some(order) = session.processor.cancel() {
            debug!(order_id = %order.id, item = %order.item, "In-flight order discarded");
        }
        session.store.clear();
        session.stats.reset();
        session.history.clear();
        session.pending.clear();
        session.last_eviction = None;
        session.next_id = OrderId(1);

        self.shared.phase.send_replace(OrderPhase::Idle);
        info!(epoch = session.epoch, "Simulation reset");
        self.shared
            .sink
            .publish(SimulationEvent::simulation_reset(session.epoch));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Capture the current state
    pub fn snapshot(&self) -> SimulationSnapshot {
        let session = self.shared.session.lock();
        SimulationSnapshot {
            policy: session.policy,
            capacity: session.store.capacity(),
            entries: session.store.to_vec(),
            phase: session.processor.phase(),
            current_order: session.processor.current().cloned(),
            completed_orders: session.history.clone(),
            statistics: session.stats.snapshot(),
            pending_removals: session.pending.clone(),
            last_eviction: session.last_eviction.clone(),
            eviction_count: session.store.eviction_count(),
        }
    }

    /// Resolve once no order is in flight
    pub async fn wait_idle(&self) {
        let mut phase = self.shared.phase.subscribe();
        // The sender lives in `shared`, which `self` keeps alive
        let _ = phase.wait_for(|p| *p == OrderPhase::Idle).await;
    }

    pub fn phase(&self) -> OrderPhase {
        self.shared.session.lock().processor.phase()
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == OrderPhase::Idle
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.shared.session.lock().policy
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.shared.config
    }

    /// Run `apply` after `delay` unless the session is reset first
    fn schedule<F>(&self, session: &Session, delay: Duration, apply: F)
    where
        F: FnOnce(&Shared, u64) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let epoch = session.epoch;
        let token = session.cancel.clone();

        self.shared.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(epoch, "Timed phase cancelled");
                }
                _ = tokio::time::sleep(delay) => apply(&*shared, epoch),
            }
        });
    }
}

// =============================================================================
// Timer Callbacks
// =============================================================================

impl Shared {
    fn complete_order(&self, epoch: u64) {
        let mut guard = self.session.lock();
        let session = &mut *guard;

        if session.epoch != epoch {
            debug!(epoch, current = session.epoch, "Stale order completion ignored");
            return;
        }

        let done = match session
            .processor
            .complete(&mut session.store, &mut session.stats)
        {
            Some(done) => done,
            None => return,
        };
        let order = done.order;

        let mut events = Vec::with_capacity(3);
        if let Some(eviction) = done.eviction {
            info!(
                victim = %eviction.victim_key,
                reason = %eviction.reason,
                "Cache entry evicted"
            );
            session.last_eviction = Some(eviction.clone());
            events.push(SimulationEvent::EntryEvicted(eviction));
        }
        if done.inserted {
            events.push(SimulationEvent::entry_inserted(&order.item));
        }
        events.push(SimulationEvent::order_completed(
            order.id,
            &order.item,
            order.policy,
            order.outcome,
            order.preparation_time(),
        ));

        info!(
            order_id = %order.id,
            item = %order.item,
            outcome = %order.outcome,
            cached = session.store.len(),
            "Order completed"
        );

        session.history.push(order);
        self.phase.send_replace(OrderPhase::Idle);
        self.sink.publish_all(events);
    }

    fn apply_removal(&self, epoch: u64, key: &str, inserted_at: Tick) {
        let mut guard = self.session.lock();
        let session = &mut *guard;

        if session.epoch != epoch {
            debug!(key, epoch, "Stale removal ignored");
            return;
        }

        let pending = match session
            .pending
            .iter()
            .position(|p| p.key == key && p.inserted_at == inserted_at)
        {
            Some(index) => session.pending.remove(index),
            // Superseded by a later request for the same key
            None => return,
        };

        // The targeted entry may have been evicted and the key cached again
        let same_entry = session
            .store
            .get(key)
            .map(|entry| entry.inserted_at() == pending.inserted_at)
            .unwrap_or(false);
        if !same_entry {
            debug!(key, "Scheduled removal skipped: entry already gone");
            return;
        }

        session.store.remove(key);
        self.record_manual_eviction(session, key);
    }

    fn record_manual_eviction(&self, session: &mut Session, key: &str) {
        let event = EvictionEvent::manual(key);
        info!(key, cached = session.store.len(), "Cache entry removed manually");
        session.last_eviction = Some(event.clone());
        self.sink.publish(SimulationEvent::EntryEvicted(event));
    }
}

// =============================================================================
// Tests
// =============================================================================

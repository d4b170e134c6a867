//! ByteBrew Integration Tests
//!
//! End-to-end scenarios through the public API:
//! - Eviction scenarios per policy
//! - Session lifecycle (single in-flight order, reset, manual removal)
//! - Configuration loading and validation
//! - Snapshot reporting

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use bytebrew::adapters::InMemoryEventCollector;
use bytebrew::{
    Error, EvictionPolicy, OrderId, OrderOutcome, OrderPhase, SimulationConfig,
    SimulationController, SimulationEvent,
};

const HIT: Duration = Duration::from_millis(20);
const MISS: Duration = Duration::from_millis(50);

fn config(capacity: usize, policy: EvictionPolicy) -> SimulationConfig {
    SimulationConfig::default()
        .with_capacity(capacity)
        .with_policy(policy)
        .with_durations(HIT, MISS)
        .with_removal_delay(Duration::from_millis(30))
        .with_seed(5)
}

fn start(config: SimulationConfig) -> (SimulationController, Arc<InMemoryEventCollector>) {
    let events = Arc::new(InMemoryEventCollector::new());
    let sim = SimulationController::new(config, events.clone()).unwrap();
    (sim, events)
}

/// Submit each item in turn and wait for it to finish
async fn serve(sim: &SimulationController, items: &[&str]) {
    for item in items {
        sim.submit_order(item).unwrap().unwrap();
        sim.wait_idle().await;
    }
}

fn evicted_keys(events: &InMemoryEventCollector) -> Vec<String> {
    events
        .events_of_type("EntryEvicted")
        .into_iter()
        .filter_map(|e| match e {
            SimulationEvent::EntryEvicted(event) => Some(event.victim_key),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Eviction Scenarios
// =============================================================================

mod eviction_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_lru_evicts_least_recently_used() {
        let (sim, events) = start(config(2, EvictionPolicy::Lru));

        serve(&sim, &["Espresso", "Latte", "Espresso", "Cappuccino"]).await;

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.keys(), vec!["Espresso", "Cappuccino"]);
        assert_eq!(evicted_keys(&events), vec!["Latte"]);

        let eviction = snapshot.last_eviction.unwrap();
        assert!(eviction.reason.starts_with("Least recently used"));
        assert_eq!(eviction.policy, Some(EvictionPolicy::Lru));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifo_evicts_oldest_insertion() {
        let (sim, events) = start(config(2, EvictionPolicy::Fifo));

        serve(&sim, &["Espresso", "Latte", "Espresso", "Cappuccino"]).await;

        assert_eq!(sim.snapshot().keys(), vec!["Latte", "Cappuccino"]);
        assert_eq!(evicted_keys(&events), vec!["Espresso"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lfu_single_slot() {
        let (sim, events) = start(config(1, EvictionPolicy::Lfu));

        serve(&sim, &["Espresso", "Espresso", "Latte"]).await;

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.keys(), vec!["Latte"]);
        assert_eq!(evicted_keys(&events), vec!["Espresso"]);
        assert_eq!(
            snapshot.last_eviction.unwrap().reason,
            "Least frequently used (used 2 times)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lfu_tie_breaks_on_smallest_key() {
        let (sim, events) = start(config(2, EvictionPolicy::Lfu));

        serve(&sim, &["Mocha", "Americano", "Latte"]).await;

        // Both cached items were used once
        assert_eq!(evicted_keys(&events), vec!["Americano"]);
        assert_eq!(sim.snapshot().keys(), vec!["Mocha", "Latte"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_never_exceeded() {
        let (sim, _) = start(config(3, EvictionPolicy::Lru));

        for _ in 0..40 {
            sim.submit_random_order().unwrap();
            sim.wait_idle().await;
            let snapshot = sim.snapshot();
            assert!(snapshot.entries.len() <= 3);
        }
    }
}

// =============================================================================
// Session Lifecycle
// =============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_single_order_in_flight() {
        let (sim, events) = start(config(2, EvictionPolicy::Lru));

        assert_eq!(sim.submit_random_order(), Some(OrderId(1)));
        for _ in 0..5 {
            assert_eq!(sim.submit_random_order(), None);
            assert_matches!(sim.submit_order("Latte"), Ok(None));
        }
        assert_eq!(events.count_of_type("OrderReceived"), 1);

        let current = sim.snapshot().current_order.unwrap();
        assert_eq!(current.phase, OrderPhase::Preparing);
        assert_eq!(current.steps.len(), 3);

        sim.wait_idle().await;
        assert_eq!(sim.submit_random_order(), Some(OrderId(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_statistics_follow_outcomes() {
        let (sim, _) = start(config(2, EvictionPolicy::Fifo));

        serve(&sim, &["Latte", "Latte", "Mocha", "Latte"]).await;

        let snapshot = sim.snapshot();
        let fifo = snapshot.statistics.fifo;
        assert_eq!(fifo.total_orders, 4);
        assert_eq!(fifo.cache_hits, 2);
        assert!((fifo.hit_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.statistics.lru.total_orders, 0);

        let expected = 2 * MISS.as_millis() as u64 + 2 * HIT.as_millis() as u64;
        assert_eq!(snapshot.statistics.total_preparation_ms, expected);

        let outcomes: Vec<OrderOutcome> = snapshot
            .completed_orders
            .iter()
            .map(|o| o.outcome)
            .collect();
        assert_eq!(
            outcomes,
            vec![
                OrderOutcome::Miss,
                OrderOutcome::Hit,
                OrderOutcome::Miss,
                OrderOutcome::Hit
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_from_any_state() {
        let (sim, events) = start(config(2, EvictionPolicy::Lru));

        // Idle and empty
        sim.reset();

        // Mid-preparation with a pending removal
        serve(&sim, &["Latte", "Mocha"]).await;
        sim.manual_evict("Latte");
        sim.submit_order("Espresso").unwrap();
        sim.reset();

        tokio::time::sleep(Duration::from_secs(1)).await;

        let snapshot = sim.snapshot();
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.is_idle());
        assert!(snapshot.current_order.is_none());
        assert!(snapshot.completed_orders.is_empty());
        assert!(snapshot.pending_removals.is_empty());
        assert!(snapshot.last_eviction.is_none());
        for policy in EvictionPolicy::ALL {
            assert_eq!(snapshot.statistics.for_policy(policy).total_orders, 0);
        }

        // Repeating is harmless
        sim.reset();
        assert_eq!(sim.snapshot(), snapshot);
        assert_eq!(events.count_of_type("SimulationReset"), 3);
        assert_eq!(events.count_of_type("EntryEvicted"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_removal_is_announced_then_applied() {
        let (sim, events) = start(config(2, EvictionPolicy::Lru));
        serve(&sim, &["Americano"]).await;

        assert!(sim.manual_evict("Americano"));
        assert!(!sim.manual_evict("Mocha"));

        let announced = sim.snapshot();
        assert!(announced.is_pending_removal("Americano"));
        assert_eq!(announced.keys(), vec!["Americano"]);

        tokio::time::sleep(Duration::from_millis(31)).await;

        let applied = sim.snapshot();
        assert!(applied.entries.is_empty());
        assert!(applied.pending_removals.is_empty());
        assert_eq!(evicted_keys(&events), vec!["Americano"]);
        assert!(applied.last_eviction.unwrap().is_manual());
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_ids_restart_after_reset() {
        let (sim, _) = start(config(2, EvictionPolicy::Lru));
        serve(&sim, &["Latte", "Mocha"]).await;
        assert_eq!(sim.snapshot().completed_orders[1].id, OrderId(2));

        sim.reset();
        assert_eq!(sim.submit_order("Latte").unwrap(), Some(OrderId(1)));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_not_faster_than_miss_rejected() {
        let events = Arc::new(InMemoryEventCollector::new());
        let bad = SimulationConfig::default().with_durations(MISS, HIT);
        assert_matches!(
            SimulationController::new(bad, events.clone()),
            Err(Error::Config(_))
        );

        let equal = SimulationConfig::default().with_durations(HIT, HIT);
        assert_matches!(
            SimulationController::new(equal, events),
            Err(Error::Config(_))
        );
    }

    #[tokio::test]
    async fn test_yaml_session() {
        let yaml = r#"
capacity: 1
catalog: [Tea, Coffee]
policy: lfu
hit_duration_ms: 5
miss_duration_ms: 10
removal_delay_ms: 0
"#;
        let config = SimulationConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.policy, EvictionPolicy::Lfu);

        let (sim, _) = start(config);
        assert_matches!(sim.submit_order("Latte"), Err(Error::UnknownItem(_)));
        assert_eq!(sim.submit_order("Tea").unwrap(), Some(OrderId(1)));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("fifo".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Fifo);
        assert_matches!("mru".parse::<EvictionPolicy>(), Err(Error::Config(_)));
    }
}

// =============================================================================
// Reporting
// =============================================================================

mod snapshot_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_serializes() {
        let (sim, _) = start(config(2, EvictionPolicy::Lfu));
        serve(&sim, &["Mocha", "Mocha"]).await;
        sim.submit_order("Latte").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&sim.snapshot().to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["policy"], "LFU");
        assert_eq!(json["phase"], "Preparing");
        assert_eq!(json["entries"][0]["key"], "Mocha");
        assert_eq!(json["entries"][0]["access_count"], 2);
        assert_eq!(json["statistics"]["lfu"]["cache_hits"], 1);
        assert_eq!(json["current_order"]["item"], "Latte");
        assert_eq!(
            json["current_order"]["steps"][1]["message"],
            "Cache MISS! Latte not in cache"
        );
        assert_eq!(json["completed_orders"].as_array().unwrap().len(), 2);
    }
}

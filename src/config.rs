//! Simulation Configuration
//!
//! Everything a session needs at construction: capacity, menu, active policy
//! and timing constants. Loaded from YAML or built in code; always validated
//! before a controller is created.
//!
//! ```yaml
//! capacity: 3
//! catalog: [Espresso, Latte, Cappuccino, Americano, Mocha]
//! policy: LFU
//! hit_duration_ms: 2000
//! miss_duration_ms: 4000
//! removal_delay_ms: 2000
//! seed: 42
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{EvictionPolicy, DEFAULT_CAPACITY};
use crate::error::{Error, Result};

/// Default menu
pub const DEFAULT_CATALOG: [&str; 5] = ["Espresso", "Latte", "Cappuccino", "Americano", "Mocha"];

/// Time to serve a cached drink
pub const DEFAULT_HIT_DURATION_MS: u64 = 2_000;

/// Time to brew a fresh drink and put it in the cache
pub const DEFAULT_MISS_DURATION_MS: u64 = 4_000;

/// Time a manual removal stays announced before it is applied
pub const DEFAULT_REMOVAL_DELAY_MS: u64 = 2_000;

/// Configuration for one simulation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum number of cached items
    pub capacity: usize,
    /// Orderable items, in menu order
    pub catalog: Vec<String>,
    /// Policy active at start
    pub policy: EvictionPolicy,
    /// Preparation time for a cache hit
    pub hit_duration_ms: u64,
    /// Preparation time for a cache miss
    pub miss_duration_ms: u64,
    /// Delay before a manual removal takes effect (0 = immediate)
    pub removal_delay_ms: u64,
    /// Seed for order selection; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            catalog: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
            policy: EvictionPolicy::default(),
            hit_duration_ms: DEFAULT_HIT_DURATION_MS,
            miss_duration_ms: DEFAULT_MISS_DURATION_MS,
            removal_delay_ms: DEFAULT_REMOVAL_DELAY_MS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SimulationConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Check every constraint a session relies on
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::config("capacity must be positive"));
        }

        if self.catalog.is_empty() {
            return Err(Error::config("catalog must contain at least one item"));
        }

        let mut seen = HashSet::with_capacity(self.catalog.len());
        for item in &self.catalog {
            if item.trim().is_empty() {
                return Err(Error::config("catalog items must not be blank"));
            }
            if !seen.insert(item.as_str()) {
                return Err(Error::config(format!("duplicate catalog item '{}'", item)));
            }
        }

        if self.hit_duration_ms == 0 || self.miss_duration_ms == 0 {
            return Err(Error::config("preparation durations must be positive"));
        }

        if self.hit_duration_ms >= self.miss_duration_ms {
            return Err(Error::config(format!(
                "hit duration ({}ms) must be shorter than miss duration ({}ms)",
                self.hit_duration_ms, self.miss_duration_ms
            )));
        }

        Ok(())
    }

    /// Set the capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replace the catalog
    pub fn with_catalog<I, S>(mut self, catalog: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog = catalog.into_iter().map(Into::into).collect();
        self
    }

    /// Set the starting policy
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set hit and miss preparation times
    pub fn with_durations(mut self, hit: Duration, miss: Duration) -> Self {
        self.hit_duration_ms = hit.as_millis() as u64;
        self.miss_duration_ms = miss.as_millis() as u64;
        self
    }

    /// Set the manual removal delay
    pub fn with_removal_delay(mut self, delay: Duration) -> Self {
        self.removal_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Seed order selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn hit_duration(&self) -> Duration {
        Duration::from_millis(self.hit_duration_ms)
    }

    pub fn miss_duration(&self) -> Duration {
        Duration::from_millis(self.miss_duration_ms)
    }

    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }

    /// Whether `item` is on the menu
    pub fn contains_item(&self, item: &str) -> bool {
        self.catalog.iter().any(|i| i == item)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();

        assert_eq!(config.capacity, 3);
        assert_eq!(config.catalog.len(), 5);
        assert_eq!(config.policy, EvictionPolicy::Lru);
        assert_eq!(config.hit_duration(), Duration::from_secs(2));
        assert_eq!(config.miss_duration(), Duration::from_secs(4));
        assert!(config.contains_item("Mocha"));
        assert!(!config.contains_item("Frappuccino"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = SimulationConfig::default().with_capacity(0);
        assert_matches!(config.validate(), Err(Error::Config(msg)) if msg.contains("capacity"));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let config = SimulationConfig::default().with_catalog(Vec::<String>::new());
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[test]
    fn test_duplicate_catalog_rejected() {
        let config = SimulationConfig::default().with_catalog(["Latte", "Mocha", "Latte"]);
        assert_matches!(config.validate(), Err(Error::Config(msg)) if msg.contains("Latte"));
    }

    #[test]
    fn test_blank_catalog_item_rejected() {
        let config = SimulationConfig::default().with_catalog(["Latte", "  "]);
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[test]
    fn test_non_positive_durations_rejected() {
        let config = SimulationConfig::default()
            .with_durations(Duration::ZERO, Duration::from_millis(10));
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[test]
    fn test_hit_must_be_faster_than_miss() {
        let equal = SimulationConfig::default()
            .with_durations(Duration::from_millis(50), Duration::from_millis(50));
        assert_matches!(equal.validate(), Err(Error::Config(_)));

        let reversed = SimulationConfig::default()
            .with_durations(Duration::from_millis(80), Duration::from_millis(20));
        assert_matches!(reversed.validate(), Err(Error::Config(msg)) if msg.contains("shorter"));
    }

    #[test]
    fn test_zero_removal_delay_allowed() {
        let config = SimulationConfig::default().with_removal_delay(Duration::ZERO);
        config.validate().unwrap();
        assert_eq!(config.removal_delay(), Duration::ZERO);
    }

    #[test]
    fn test_yaml_loading() {
        let yaml = r#"
capacity: 2
catalog: [Espresso, Latte]
policy: FIFO
hit_duration_ms: 10
miss_duration_ms: 30
seed: 7
"#;
        let config = SimulationConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.capacity, 2);
        assert_eq!(config.policy, EvictionPolicy::Fifo);
        assert_eq!(config.seed, Some(7));
        // Unspecified fields fall back to defaults
        assert_eq!(config.removal_delay_ms, DEFAULT_REMOVAL_DELAY_MS);
    }

    #[test]
    fn test_yaml_validation_applies() {
        let yaml = "capacity: 0\n";
        assert_matches!(SimulationConfig::from_yaml_str(yaml), Err(Error::Config(_)));

        assert_matches!(
            SimulationConfig::from_yaml_str("capacity: [oops"),
            Err(Error::Yaml(_))
        );
    }

    #[test]
    fn test_missing_file() {
        let result = SimulationConfig::from_file("/nonexistent/bytebrew.yaml");
        assert_matches!(result, Err(Error::Io(_)));
    }
}

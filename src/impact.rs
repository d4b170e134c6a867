//! Impact Estimator
//!
//! Back-of-envelope comparison of a cached system against an uncached one for
//! a given hit rate. The model is deliberately simple:
//!
//! - an uncached request costs 100 ms and one unit of server load
//! - a cached request costs `(1 - speedup)` of both
//! - satisfaction drops by half the average response time and a tenth of the
//!   load, floored at zero
//!
//! # Example
//!
//! ```
//! use bytebrew::impact::{ImpactParams, estimate};
//!
//! let report = estimate(&ImpactParams::default()).unwrap();
//! assert!(report.cached.avg_response_ms < report.uncached.avg_response_ms);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Response time of a request that bypasses the cache
pub const BASELINE_RESPONSE_MS: f64 = 100.0;

/// Inputs to the estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactParams {
    /// Cache hit rate in percent (0..=100)
    pub hit_rate: f64,
    /// Requests in the window
    pub request_count: u64,
    /// Requests the server can take before saturating
    pub max_server_capacity: u64,
    /// How much cheaper a cached request is, in percent (0..=100)
    pub cache_speedup: f64,
}

impl Default for ImpactParams {
    fn default() -> Self {
        Self {
            hit_rate: 70.0,
            request_count: 100,
            max_server_capacity: 100,
            cache_speedup: 50.0,
        }
    }
}

impl ImpactParams {
    /// Same parameters with a different hit rate
    pub fn with_hit_rate(mut self, hit_rate: f64) -> Self {
        self.hit_rate = hit_rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.hit_rate) {
            return Err(Error::config(format!(
                "hit rate must be within 0..=100, got {}",
                self.hit_rate
            )));
        }
        if !(0.0..=100.0).contains(&self.cache_speedup) {
            return Err(Error::config(format!(
                "cache speedup must be within 0..=100, got {}",
                self.cache_speedup
            )));
        }
        if self.request_count == 0 {
            return Err(Error::config("request count must be positive"));
        }
        if self.max_server_capacity == 0 {
            return Err(Error::config("server capacity must be positive"));
        }
        Ok(())
    }
}

/// Figures for one system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemMetrics {
    /// Mean response time (ms)
    pub avg_response_ms: f64,
    /// Server load in percent, capped at 100
    pub server_load: f64,
    /// Satisfaction score (0..=100)
    pub user_satisfaction: f64,
}

impl SystemMetrics {
    fn new(avg_response_ms: f64, server_load: f64) -> Self {
        Self {
            avg_response_ms,
            server_load,
            user_satisfaction: (100.0 - avg_response_ms / 2.0 - server_load / 10.0).max(0.0),
        }
    }
}

/// Cached vs uncached comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactReport {
    pub params: ImpactParams,
    /// Requests served from cache
    pub cached_requests: u64,
    pub cached: SystemMetrics,
    pub uncached: SystemMetrics,
}

impl ImpactReport {
    /// Response time saved per request on average (ms)
    pub fn response_time_saved_ms(&self) -> f64 {
        self.uncached.avg_response_ms - self.cached.avg_response_ms
    }
}

/// Compare cached and uncached systems under `params`
pub fn estimate(params: &ImpactParams) -> Result<ImpactReport> {
    params.validate()?;

    let requests = params.request_count as f64;
    let capacity = params.max_server_capacity as f64;
    let factor = 1.0 - params.cache_speedup / 100.0;

    let hits = (requests * params.hit_rate / 100.0).round();
    let misses = requests - hits;

    let cached_response = BASELINE_RESPONSE_MS * factor;
    let avg_response = (hits * cached_response + misses * BASELINE_RESPONSE_MS) / requests;
    let cached_load = ((hits * factor + misses) / capacity * 100.0).min(100.0);
    let uncached_load = (requests / capacity * 100.0).min(100.0);

    Ok(ImpactReport {
        params: *params,
        cached_requests: hits as u64,
        cached: SystemMetrics::new(avg_response, cached_load),
        uncached: SystemMetrics::new(BASELINE_RESPONSE_MS, uncached_load),
    })
}

// =============================================================================
// Tests
// =============================================================================

//! Repository metrics.
//!
//! Counters are labelled by entity. They are no-ops until the binary installs
//! a `metrics` recorder.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const CACHE_HITS_TOTAL: &str = "adminkit_cache_hits_total";
    pub const CACHE_MISSES_TOTAL: &str = "adminkit_cache_misses_total";
    pub const CACHE_PLACEHOLDER_HITS_TOTAL: &str = "adminkit_cache_placeholder_hits_total";
    pub const STORE_LOADS_TOTAL: &str = "adminkit_store_loads_total";
    pub const SHARED_LOADS_TOTAL: &str = "adminkit_shared_loads_total";
    pub const CACHE_WRITE_FAILURES_TOTAL: &str = "adminkit_cache_write_failures_total";
}

pub fn record_cache_hit(entity: &'static str) {
    counter!(names::CACHE_HITS_TOTAL, "entity" => entity).increment(1);
}

pub fn record_cache_hits(entity: &'static str, count: usize) {
    counter!(names::CACHE_HITS_TOTAL, "entity" => entity).increment(count as u64);
}

pub fn record_cache_miss(entity: &'static str) {
    counter!(names::CACHE_MISSES_TOTAL, "entity" => entity).increment(1);
}

pub fn record_placeholder_hit(entity: &'static str) {
    counter!(names::CACHE_PLACEHOLDER_HITS_TOTAL, "entity" => entity).increment(1);
}

pub fn record_placeholder_hits(entity: &'static str, count: usize) {
    counter!(names::CACHE_PLACEHOLDER_HITS_TOTAL, "entity" => entity).increment(count as u64);
}

/// A store query issued on behalf of a cache miss.
pub fn record_store_load(entity: &'static str) {
    counter!(names::STORE_LOADS_TOTAL, "entity" => entity).increment(1);
}

/// A caller that received another caller's load result instead of querying.
pub fn record_shared_load(entity: &'static str) {
    counter!(names::SHARED_LOADS_TOTAL, "entity" => entity).increment(1);
}

pub fn record_write_failure(entity: &'static str, stage: &'static str) {
    counter!(names::CACHE_WRITE_FAILURES_TOTAL, "entity" => entity, "stage" => stage).increment(1);
}

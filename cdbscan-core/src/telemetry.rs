//! Optional `metrics` counters emitted by a clustering run.
//!
//! Every recorder compiles to a no-op unless the `metrics` feature is enabled.

#[cfg(feature = "metrics")]
pub(crate) fn record_local_clusters(count: usize) {
    metrics::counter!("cdbscan_local_clusters").increment(count as u64);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_local_clusters(_count: usize) {}

#[cfg(feature = "metrics")]
pub(crate) fn record_alpha_merge() {
    metrics::counter!("cdbscan_alpha_merges").increment(1);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_alpha_merge() {}

#[cfg(feature = "metrics")]
pub(crate) fn record_vetoed_merge() {
    metrics::counter!("cdbscan_vetoed_merges").increment(1);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_vetoed_merge() {}

#[cfg(feature = "metrics")]
pub(crate) fn record_noise_points(count: usize) {
    metrics::counter!("cdbscan_noise_points").increment(count as u64);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_noise_points(_count: usize) {}

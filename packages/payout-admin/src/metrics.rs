//! Prometheus metrics (lock-free atomics).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub requests_total: AtomicU64,
    pub previews_total: AtomicU64,

    // --- Settings writes ---
    pub config_writes_total: AtomicU64,
    pub config_writes_rejected: AtomicU64,

    // --- Mirror ---
    pub mirror_calls_total: AtomicU64,
    pub mirror_errors: AtomicU64,
    pub reconcile_divergences: AtomicU64,
    pub reconcile_duration_us_sum: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            previews_total: AtomicU64::new(0),
            config_writes_total: AtomicU64::new(0),
            config_writes_rejected: AtomicU64::new(0),
            mirror_calls_total: AtomicU64::new(0),
            mirror_errors: AtomicU64::new(0),
            reconcile_divergences: AtomicU64::new(0),
            reconcile_duration_us_sum: AtomicU64::new(0),
        }
    }

    pub fn record_reconcile(&self, start: Instant, divergences: usize) {
        let us = start.elapsed().as_micros() as u64;
        self.reconcile_duration_us_sum
            .fetch_add(us, Ordering::Relaxed);
        self.reconcile_divergences
            .fetch_add(divergences as u64, Ordering::Relaxed);
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let previews = self.previews_total.load(Ordering::Relaxed);
        let writes = self.config_writes_total.load(Ordering::Relaxed);
        let rejected = self.config_writes_rejected.load(Ordering::Relaxed);
        let mirror_calls = self.mirror_calls_total.load(Ordering::Relaxed);
        let mirror_errors = self.mirror_errors.load(Ordering::Relaxed);
        let divergences = self.reconcile_divergences.load(Ordering::Relaxed);
        let reconcile_sum = self.reconcile_duration_us_sum.load(Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let reconcile_sum_s = reconcile_sum as f64 / 1_000_000.0;

        format!(
            "\
# HELP payout_admin_requests_total Total admin API requests.\n\
# TYPE payout_admin_requests_total counter\n\
payout_admin_requests_total {requests}\n\
# HELP payout_admin_previews_total Fee preview requests.\n\
# TYPE payout_admin_previews_total counter\n\
payout_admin_previews_total {previews}\n\
# HELP payout_admin_config_writes_total Accepted fee setting writes.\n\
# TYPE payout_admin_config_writes_total counter\n\
payout_admin_config_writes_total {writes}\n\
# HELP payout_admin_config_writes_rejected_total Rejected fee setting writes.\n\
# TYPE payout_admin_config_writes_rejected_total counter\n\
payout_admin_config_writes_rejected_total {rejected}\n\
# HELP payout_admin_mirror_calls_total Calls to the mirrored calculation.\n\
# TYPE payout_admin_mirror_calls_total counter\n\
payout_admin_mirror_calls_total {mirror_calls}\n\
# HELP payout_admin_mirror_errors_total Failed mirror calls.\n\
# TYPE payout_admin_mirror_errors_total counter\n\
payout_admin_mirror_errors_total {mirror_errors}\n\
# HELP payout_admin_reconcile_divergences_total Fee mismatches found by reconcile runs.\n\
# TYPE payout_admin_reconcile_divergences_total counter\n\
payout_admin_reconcile_divergences_total {divergences}\n\
# HELP payout_admin_reconcile_duration_seconds_sum Total reconcile time (seconds).\n\
# TYPE payout_admin_reconcile_duration_seconds_sum counter\n\
payout_admin_reconcile_duration_seconds_sum {reconcile_sum_s:.6}\n"
        )
    }
}

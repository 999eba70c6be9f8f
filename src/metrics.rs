// Request counters and running averages for the engine.
//
// `MetricsAggregator` owns the authoritative counts that back the status
// surface. Every update is mirrored onto the `metrics` facade so a process
// that installs a recorder (Prometheus exporter, statsd, ...) gets the same
// signals without any extra wiring; with no recorder installed those calls
// are no-ops.
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use ::metrics::{counter, histogram};
use serde::Serialize;

use crate::types::MatchResult;

const REQUESTS_TOTAL: &str = "codefix_requests_total";
const CONFIDENCE: &str = "codefix_match_confidence";
const LATENCY_SECONDS: &str = "codefix_match_latency_seconds";

#[derive(Debug, Default)]
struct MetricsState {
    total_requests: u64,
    accepted_requests: u64,
    degraded_requests: u64,
    running_confidence_sum: f64,
    running_latency_sum: Duration,
}

/// Point-in-time read of the aggregator, rendered verbatim by status endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub accepted_requests: u64,
    /// Requests that failed per-request validation and were answered with
    /// "no solution".
    pub degraded_requests: u64,
    pub avg_confidence: f64,
    /// Mean request latency in milliseconds.
    pub avg_latency: f64,
}

/// Thread-safe request counters. Counters only grow; there is no reset.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    state: Mutex<MetricsState>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        // Counter updates cannot leave the state half-written, so a poisoned
        // lock is still safe to read.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a completed match.
    pub fn record(&self, outcome: &MatchResult<'_>, elapsed: Duration) {
        {
            let mut state = self.lock();
            state.total_requests += 1;
            if outcome.accepted {
                state.accepted_requests += 1;
            }
            state.running_confidence_sum += f64::from(outcome.confidence);
            state.running_latency_sum += elapsed;
        }

        let label = if outcome.accepted {
            "accepted"
        } else if outcome.record.is_some() {
            "rejected"
        } else {
            "no_candidate"
        };
        counter!(REQUESTS_TOTAL, "outcome" => label).increment(1);
        histogram!(CONFIDENCE).record(f64::from(outcome.confidence));
        histogram!(LATENCY_SECONDS).record(elapsed.as_secs_f64());
    }

    /// Record a request that failed validation. It counts toward the totals
    /// with zero confidence.
    pub fn record_degraded(&self, elapsed: Duration) {
        {
            let mut state = self.lock();
            state.total_requests += 1;
            state.degraded_requests += 1;
            state.running_latency_sum += elapsed;
        }

        counter!(REQUESTS_TOTAL, "outcome" => "degraded").increment(1);
        histogram!(LATENCY_SECONDS).record(elapsed.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        if state.total_requests == 0 {
            return MetricsSnapshot::default();
        }
        let n = state.total_requests as f64;
        MetricsSnapshot {
            total_requests: state.total_requests,
            accepted_requests: state.accepted_requests,
            degraded_requests: state.degraded_requests,
            avg_confidence: state.running_confidence_sum / n,
            avg_latency: state.running_latency_sum.as_secs_f64() * 1000.0 / n,
        }
    }
}

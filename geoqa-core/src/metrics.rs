//! Request counters.

use crate::agent::AgentResponse;
use serde::Serialize;
use std::sync::Mutex;
use std::time::Instant;

/// Thread-safe aggregate of answered questions.
///
/// Owned by whoever serves requests and passed where needed. Recording
/// takes `&self`, so it can sit behind an `Arc` shared between threads.
#[derive(Debug)]
pub struct QueryMetrics {
    started: Instant,
    inner: Mutex<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    total_requests: u64,
    tool_calls: u64,
    retrieval_calls: u64,
    total_response_ms: f64,
}

/// Point-in-time view of [`QueryMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub tool_calls: u64,
    pub retrieval_calls: u64,
    pub avg_response_time_ms: f64,
    pub uptime_seconds: u64,
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            inner: Mutex::new(Counters::default()),
        }
    }

    pub fn record(&self, duration_ms: f64, tools_used: usize, retrieval_used: bool) {
        let mut counters = self.lock();
        counters.total_requests += 1;
        counters.tool_calls += tools_used as u64;
        if retrieval_used {
            counters.retrieval_calls += 1;
        }
        counters.total_response_ms += duration_ms;
    }

    pub fn record_response(&self, response: &AgentResponse) {
        self.record(
            response.total_duration_ms,
            response.tools_used.len(),
            response.retrieval_used,
        );
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.lock();
        let avg_response_time_ms = if counters.total_requests == 0 {
            0.0
        } else {
            counters.total_response_ms / counters.total_requests as f64
        };

        MetricsSnapshot {
            total_requests: counters.total_requests,
            tool_calls: counters.tool_calls,
            retrieval_calls: counters.retrieval_calls,
            avg_response_time_ms,
            uptime_seconds: self.started.elapsed().as_secs(),
        }
    }

    /// Clears the counters. Uptime keeps counting.
    pub fn reset(&self) {
        *self.lock() = Counters::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        // Counters stay consistent even if a recording thread panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

use serde::Serialize;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Request counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub requests_total: Arc<AtomicU64>,
    pub client_errors: Arc<AtomicU64>,
    pub server_errors: Arc<AtomicU64>,
    pub unmatched_routes: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_total: Arc::new(AtomicU64::new(0)),
            client_errors: Arc::new(AtomicU64::new(0)),
            server_errors: Arc::new(AtomicU64::new(0)),
            unmatched_routes: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_client_errors(&self) {
        self.client_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_server_errors(&self) {
        self.server_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_unmatched(&self) {
        self.unmatched_routes.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a finished request by its final status code.
    pub fn record_status(&self, status: u16) {
        match status {
            400..=499 => self.inc_client_errors(),
            500..=599 => self.inc_server_errors(),
            _ => {}
        }
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            unmatched_routes: self.unmatched_routes.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub unmatched_routes: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// Prometheus text exposition format.
    pub fn to_prometheus(&self) -> String {
        let counters = [
            ("ablage_requests_total", "Requests handled by the kernel", self.requests_total),
            ("ablage_client_errors_total", "Responses with a 4xx status", self.client_errors),
            ("ablage_server_errors_total", "Responses with a 5xx status", self.server_errors),
            ("ablage_unmatched_routes_total", "Requests no route accepted", self.unmatched_routes),
        ];
        let mut out = String::new();
        for (name, help, value) in counters {
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} counter", name);
            let _ = writeln!(out, "{} {}", name, value);
        }
        let _ = writeln!(out, "# HELP ablage_uptime_seconds Seconds since startup");
        let _ = writeln!(out, "# TYPE ablage_uptime_seconds gauge");
        let _ = writeln!(out, "ablage_uptime_seconds {}", self.uptime_seconds);
        out
    }
}

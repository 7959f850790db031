//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count requests by method, route and status
//! - Record request latency per method and route
//! - Count audit writes that were dropped
//! - Render a Prometheus text snapshot for `GET /metrics`
//!
//! # Metrics
//! - `http_requests_total` (counter): labels `method`, `path`, `status`
//! - `http_request_duration_seconds` (histogram): labels `method`, `path`
//! - `audit_write_failures_total` (counter): label `reason`
//!
//! # Design Decisions
//! - Each collector owns its own Prometheus recorder instead of installing
//!   a global one, so independent pipelines never share counters
//! - `path` is the matched route template, never the raw URL
//! - Updates are lock-free atomic increments inside the recorder

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const AUDIT_WRITE_FAILURES_TOTAL: &str = "audit_write_failures_total";

/// Latency buckets in seconds.
const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Thread-safe request metrics with a Prometheus text snapshot.
#[derive(Clone)]
pub struct MetricsCollector {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets(&DEFAULT_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
            describe_histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                Unit::Seconds,
                "Duration of HTTP requests"
            );
            describe_counter!(
                AUDIT_WRITE_FAILURES_TOTAL,
                "Operation records that could not be written"
            );
        });

        Ok(Self {
            recorder: Arc::new(recorder),
            handle,
        })
    }

    /// Record one completed request.
    pub fn observe(&self, method: &str, path: &str, status: u16, duration: Duration) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            counter!(
                HTTP_REQUESTS_TOTAL,
                "method" => method.to_owned(),
                "path" => path.to_owned(),
                "status" => status.to_string()
            )
            .increment(1);
            histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                "method" => method.to_owned(),
                "path" => path.to_owned()
            )
            .record(duration.as_secs_f64());
        });
    }

    /// Record an audit write that was abandoned.
    pub fn record_audit_failure(&self, reason: &'static str) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            counter!(AUDIT_WRITE_FAILURES_TOTAL, "reason" => reason).increment(1);
        });
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Value of the first sample line for `name` carrying every `label="value"` pair.
    pub(crate) fn sample(rendered: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        rendered
            .lines()
            .filter(|line| line.starts_with(&format!("{}{{", name)))
            .find(|line| {
                labels
                    .iter()
                    .all(|(k, v)| line.contains(&format!("{}=\"{}\"", k, v)))
            })
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|value| value.parse().ok())
    }

    #[test]
    fn test_counts_by_method_path_status() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.observe("POST", "/multiply", 200, Duration::from_millis(3));
        metrics.observe("POST", "/multiply", 200, Duration::from_millis(4));
        metrics.observe("POST", "/multiply", 401, Duration::from_millis(1));

        let rendered = metrics.render();
        let ok = [("method", "POST"), ("path", "/multiply"), ("status", "200")];
        let denied = [("method", "POST"), ("path", "/multiply"), ("status", "401")];
        assert_eq!(sample(&rendered, HTTP_REQUESTS_TOTAL, &ok), Some(2.0));
        assert_eq!(sample(&rendered, HTTP_REQUESTS_TOTAL, &denied), Some(1.0));
    }

    #[test]
    fn test_latency_histogram() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.observe("GET", "/metrics", 200, Duration::from_millis(20));

        let rendered = metrics.render();
        let labels = [("method", "GET"), ("path", "/metrics")];
        assert_eq!(
            sample(&rendered, "http_request_duration_seconds_count", &labels),
            Some(1.0)
        );
        assert!(rendered.contains("http_request_duration_seconds_bucket"));
        assert!(rendered.contains("le=\"0.025\""));
    }

    #[test]
    fn test_collectors_are_independent() {
        let a = MetricsCollector::new().unwrap();
        let b = MetricsCollector::new().unwrap();
        a.observe("POST", "/divide", 400, Duration::from_millis(1));

        let labels = [("path", "/divide")];
        assert_eq!(sample(&a.render(), HTTP_REQUESTS_TOTAL, &labels), Some(1.0));
        assert_eq!(sample(&b.render(), HTTP_REQUESTS_TOTAL, &labels), None);
    }

    #[test]
    fn test_concurrent_observe() {
        let metrics = MetricsCollector::new().unwrap();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        metrics.observe("POST", "/factorial", 200, Duration::from_micros(50));
                    }
                });
            }
        });

        let labels = [("path", "/factorial"), ("status", "200")];
        assert_eq!(
            sample(&metrics.render(), HTTP_REQUESTS_TOTAL, &labels),
            Some(800.0)
        );
    }

    #[test]
    fn test_audit_failures() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.record_audit_failure("timeout");

        assert_eq!(
            sample(&metrics.render(), AUDIT_WRITE_FAILURES_TOTAL, &[("reason", "timeout")]),
            Some(1.0)
        );
    }
}

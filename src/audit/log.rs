//! Best-effort operation audit log.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::audit::record::OperationRecord;
use crate::audit::store::AuditStore;
use crate::observability::metrics::MetricsCollector;

/// Fire-and-forget writer in front of an [`AuditStore`].
///
/// Each write runs in its own task bounded by `write_timeout`. Failures and
/// timeouts are logged and counted, then dropped. Nothing is retried.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn AuditStore>,
    write_timeout: Duration,
    metrics: MetricsCollector,
}

impl AuditLog {
    pub fn new(store: Arc<dyn AuditStore>, write_timeout: Duration, metrics: MetricsCollector) -> Self {
        Self {
            store,
            write_timeout,
            metrics,
        }
    }

    /// Start writing `record`.
    ///
    /// Callers are free to drop the returned handle; it exists so the write
    /// can be awaited where ordering matters.
    pub fn record(&self, record: OperationRecord) -> JoinHandle<()> {
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let deadline = self.write_timeout;

        tokio::spawn(async move {
            match tokio::time::timeout(deadline, store.insert(&record)).await {
                Ok(Ok(())) => {
                    tracing::debug!(
                        id = %record.id,
                        operation = %record.operation,
                        "Operation recorded"
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        id = %record.id,
                        operation = %record.operation,
                        error = %e,
                        "Failed to record operation"
                    );
                    metrics.record_audit_failure("store");
                }
                Err(_) => {
                    tracing::warn!(
                        id = %record.id,
                        operation = %record.operation,
                        timeout_ms = deadline.as_millis() as u64,
                        "Audit write timed out, record dropped"
                    );
                    metrics.record_audit_failure("timeout");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::store::{AuditError, MemoryAuditStore};
    use crate::observability::metrics::tests::sample;
    use crate::observability::metrics::AUDIT_WRITE_FAILURES_TOTAL;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl AuditStore for FailingStore {
        async fn insert(&self, _record: &OperationRecord) -> Result<(), AuditError> {
            Err(AuditError::Unavailable("connection refused".into()))
        }
    }

    struct SlowStore;

    #[async_trait]
    impl AuditStore for SlowStore {
        async fn insert(&self, _record: &OperationRecord) -> Result<(), AuditError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_successful_write() {
        let store = MemoryAuditStore::new();
        let metrics = MetricsCollector::new().unwrap();
        let log = AuditLog::new(Arc::new(store.clone()), Duration::from_secs(1), metrics.clone());

        log.record(OperationRecord::multiply(3.0, 4.0, 12.0)).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            sample(&metrics.render(), AUDIT_WRITE_FAILURES_TOTAL, &[]),
            None
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed_and_counted() {
        let metrics = MetricsCollector::new().unwrap();
        let log = AuditLog::new(Arc::new(FailingStore), Duration::from_secs(1), metrics.clone());

        log.record(OperationRecord::divide(1.0, 2.0, 0.5)).await.unwrap();

        assert_eq!(
            sample(&metrics.render(), AUDIT_WRITE_FAILURES_TOTAL, &[("reason", "store")]),
            Some(1.0)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_is_abandoned() {
        let metrics = MetricsCollector::new().unwrap();
        let log = AuditLog::new(Arc::new(SlowStore), Duration::from_millis(100), metrics.clone());

        log.record(OperationRecord::factorial(3, "6".into())).await.unwrap();

        assert_eq!(
            sample(&metrics.render(), AUDIT_WRITE_FAILURES_TOTAL, &[("reason", "timeout")]),
            Some(1.0)
        );
    }
}

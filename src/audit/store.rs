//! Audit storage backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use crate::audit::record::OperationRecord;

/// Failure writing an operation record.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Insert-only sink for operation records.
///
/// Implementations must accept concurrent writers.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(&self, record: &OperationRecord) -> Result<(), AuditError>;
}

/// In-process store kept behind a mutex.
#[derive(Clone, Default)]
pub struct MemoryAuditStore {
    records: Arc<Mutex<Vec<OperationRecord>>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far, in write order.
    pub fn records(&self) -> Vec<OperationRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, record: &OperationRecord) -> Result<(), AuditError> {
        self.records
            .lock()
            .map_err(|_| AuditError::Unavailable("memory store lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}

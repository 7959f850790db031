//! Operation audit subsystem.
//!
//! # Data Flow
//! ```text
//! handler (after a successful computation)
//!     → record.rs (OperationRecord)
//!     → log.rs (AuditLog::record, detached task with deadline)
//!     → store.rs / sqlite.rs (AuditStore::insert)
//!
//! On failure or deadline:
//!     → tracing warn + audit_write_failures_total
//! ```
//!
//! # Design Decisions
//! - At-most-once: a failed write is dropped, never retried
//! - Audit failures never change the HTTP response
//! - Storage sits behind an insert-only trait

pub mod log;
pub mod record;
pub mod sqlite;
pub mod store;

pub use log::AuditLog;
pub use record::{Operand, Operation, OperationRecord};
pub use sqlite::SqliteAuditStore;
pub use store::{AuditError, AuditStore, MemoryAuditStore};

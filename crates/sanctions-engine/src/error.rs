//! Storage and reconciliation errors.

use thiserror::Error;

/// Errors from a region catalog or seller store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store failed (connection, query, timeout).
    #[error("{operation} failed: {source}")]
    Backend {
        /// Store operation that failed.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored row could not be interpreted.
    #[error("corrupt row in {table}: {reason}")]
    Corrupt {
        /// Table or collection name.
        table: &'static str,
        /// What is wrong.
        reason: String,
    },
}

impl StoreError {
    /// Wrap a backend error.
    pub fn backend<E>(operation: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            operation,
            source: Box::new(source),
        }
    }
}

/// Reasons a reconciliation pass stops early.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Another pass is still running.
    #[error("a reconciliation pass is already running")]
    AlreadyRunning,

    /// The region catalog could not be read.
    #[error("region catalog unavailable: {0}")]
    CatalogUnavailable(#[source] StoreError),

    /// The region catalog is empty and the pass is configured to abort.
    #[error("region catalog is empty; refusing to reconcile")]
    EmptyCatalog,

    /// A read or reset against the seller store failed.
    #[error("seller store {step} failed: {source}")]
    Store {
        /// Pipeline step.
        step: &'static str,
        /// Underlying error.
        #[source]
        source: StoreError,
    },

    /// A bulk write failed as a whole.
    #[error("bulk write for phase {phase} failed: {source}")]
    BulkWrite {
        /// `A` or `B`.
        phase: char,
        /// Underlying error.
        #[source]
        source: StoreError,
    },
}

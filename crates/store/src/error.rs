use common::BoatId;
use thiserror::Error;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A second non-cancelled booking overlapped the same boat's period.
    /// Raised by the database exclusion constraint (or the in-memory
    /// equivalent) at insert time.
    #[error("Booking conflict for boat {boat}: period overlaps an existing reservation")]
    Conflict { boat: BoatId },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted row could not be decoded into a domain value.
    #[error("Row decode error: {0}")]
    Decode(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

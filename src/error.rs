use crate::domain::transaction::{TransactionId, TransactionKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("A pending {0} transaction already exists")]
    DuplicateSubmission(TransactionKind),
    #[error("Transaction {0} not found")]
    NotFound(TransactionId),
    #[error("Transaction {0} has already been processed")]
    AlreadyProcessed(TransactionId),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Delivery error: {0}")]
    Delivery(String),
    #[error("Store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

impl BotError {
    /// Wraps any backend failure as a store error.
    pub fn store(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Store(err.into())
    }

    /// Validation failures keep the dialogue alive; everything else ends it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

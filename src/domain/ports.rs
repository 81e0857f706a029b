use super::message::OutboundMessage;
use super::settings::Settings;
use super::transaction::{NewTransaction, Transaction, TransactionId, TransactionKind};
use super::user::User;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_session(&self, session_id: &str) -> Result<Option<User>>;
    async fn upsert(&self, user: User) -> Result<()>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists `new` as a PENDING transaction unless the same user already has a
    /// PENDING transaction of the same kind, in which case it fails with
    /// `BotError::DuplicateSubmission`. Check and insert happen as one atomic step.
    async fn create_pending(&self, new: NewTransaction) -> Result<Transaction>;
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>>;
    async fn find_pending(&self, user: &str, kind: TransactionKind)
    -> Result<Option<Transaction>>;
    /// Replaces the stored record only while it is still PENDING, failing with
    /// `BotError::AlreadyProcessed` otherwise.
    async fn update_pending(&self, tx: Transaction) -> Result<()>;
    /// Total count and one newest-first page of a user's transactions.
    async fn count_and_list(
        &self,
        user: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(usize, Vec<Transaction>)>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self) -> Result<Option<Settings>>;
    async fn upsert(&self, settings: Settings) -> Result<()>;
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<()>;
    /// Answers a button press, optionally with a short toast.
    async fn acknowledge(&self, session_id: &str, text: Option<&str>) -> Result<()>;
}

pub type UserStoreBox = Arc<dyn UserStore>;
pub type TransactionStoreBox = Arc<dyn TransactionStore>;
pub type SettingsStoreBox = Arc<dyn SettingsStore>;
pub type NotifierBox = Arc<dyn Notifier>;

use crate::domain::ports::{SettingsStore, TransactionStore, UserStore};
use crate::domain::settings::Settings;
use crate::domain::transaction::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStatus,
};
use crate::domain::user::User;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for users.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_session(&self, session_id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(session_id).cloned())
    }

    async fn upsert(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.session_id.clone(), user);
        Ok(())
    }
}

#[derive(Default)]
struct TransactionTable {
    by_id: HashMap<TransactionId, Transaction>,
    /// Unique index over (user, kind) for PENDING records.
    pending: HashMap<(String, TransactionKind), TransactionId>,
}

/// A thread-safe in-memory store for transactions.
///
/// All writes go through one `RwLock` write guard, so the duplicate-pending check
/// and the insert it guards cannot interleave with another submission.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    table: Arc<RwLock<TransactionTable>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create_pending(&self, new: NewTransaction) -> Result<Transaction> {
        let mut table = self.table.write().await;
        let key = (new.user.clone(), new.order.kind());
        if table.pending.contains_key(&key) {
            return Err(BotError::DuplicateSubmission(key.1));
        }

        let tx = Transaction::from_new(new, TransactionId::new(), Utc::now());
        table.pending.insert(key, tx.id);
        table.by_id.insert(tx.id, tx.clone());
        Ok(tx)
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let table = self.table.read().await;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn find_pending(
        &self,
        user: &str,
        kind: TransactionKind,
    ) -> Result<Option<Transaction>> {
        let table = self.table.read().await;
        Ok(table
            .pending
            .get(&(user.to_string(), kind))
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn update_pending(&self, tx: Transaction) -> Result<()> {
        let mut table = self.table.write().await;
        let stored = table.by_id.get(&tx.id).ok_or(BotError::NotFound(tx.id))?;
        stored.ensure_pending()?;
        let key = (stored.user.clone(), stored.kind());

        if tx.status != TransactionStatus::Pending {
            table.pending.remove(&key);
        }
        table.by_id.insert(tx.id, tx);
        Ok(())
    }

    async fn count_and_list(
        &self,
        user: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(usize, Vec<Transaction>)> {
        let table = self.table.read().await;
        let mut mine: Vec<&Transaction> =
            table.by_id.values().filter(|tx| tx.user == user).collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = mine.len();
        let page = mine.into_iter().skip(skip).take(limit).cloned().collect();
        Ok((total, page))
    }
}

/// Holds the singleton settings record.
#[derive(Default, Clone)]
pub struct InMemorySettingsStore {
    settings: Arc<RwLock<Option<Settings>>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self) -> Result<Option<Settings>> {
        Ok(self.settings.read().await.clone())
    }

    async fn upsert(&self, settings: Settings) -> Result<()> {
        *self.settings.write().await = Some(settings);
        Ok(())
    }
}

use crate::domain::ports::{SettingsStore, TransactionStore, UserStore};
use crate::domain::settings::Settings;
use crate::domain::transaction::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStatus,
};
use crate::domain::user::User;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const CF_USERS: &str = "users";
pub const CF_TRANSACTIONS: &str = "transactions";
/// Unique index: `user \0 kind` -> id of the PENDING transaction.
pub const CF_PENDING: &str = "pending";
/// Per-user history index: `user \0 created_millis id` -> empty.
pub const CF_HISTORY: &str = "history";
pub const CF_SETTINGS: &str = "settings";

const SETTINGS_KEY: &[u8] = b"settings";

/// A persistent store implementation using RocksDB.
///
/// Implements all three store ports over separate column families. Writes that must
/// observe and change the pending index are serialized through `write_gate` and
/// committed as a single `WriteBatch`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_USERS, CF_TRANSACTIONS, CF_PENDING, CF_HISTORY, CF_SETTINGS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BotError::store(format!("{name} column family not found")))
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &'static str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, cf: &'static str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    /// Ids of a user's transactions, newest first.
    fn history_ids(&self, user: &str) -> Result<Vec<TransactionId>> {
        let prefix = history_prefix(user);
        let iter = self.db.iterator_cf(
            self.cf(CF_HISTORY)?,
            IteratorMode::From(&prefix, Direction::Forward),
        );

        let mut ids = Vec::new();
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let id = Uuid::from_slice(&key[key.len() - 16..]).map_err(BotError::store)?;
            ids.push(TransactionId(id));
        }
        ids.reverse();
        Ok(ids)
    }
}

fn pending_key(user: &str, kind: TransactionKind) -> Vec<u8> {
    let mut key = history_prefix(user);
    key.extend_from_slice(kind.as_str().as_bytes());
    key
}

fn history_prefix(user: &str) -> Vec<u8> {
    let mut key = user.as_bytes().to_vec();
    key.push(0);
    key
}

fn history_key(tx: &Transaction) -> Vec<u8> {
    let mut key = history_prefix(&tx.user);
    let millis = tx.created_at.timestamp_millis().max(0) as u64;
    key.extend_from_slice(&millis.to_be_bytes());
    key.extend_from_slice(tx.id.0.as_bytes());
    key
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn find_by_session(&self, session_id: &str) -> Result<Option<User>> {
        self.get_json(CF_USERS, session_id.as_bytes())
    }

    async fn upsert(&self, user: User) -> Result<()> {
        self.put_json(CF_USERS, user.session_id.as_bytes(), &user)
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn create_pending(&self, new: NewTransaction) -> Result<Transaction> {
        let _gate = self.write_gate.lock().await;
        let kind = new.order.kind();
        let pending = pending_key(&new.user, kind);
        if self.db.get_pinned_cf(self.cf(CF_PENDING)?, &pending)?.is_some() {
            return Err(BotError::DuplicateSubmission(kind));
        }

        let tx = Transaction::from_new(new, TransactionId::new(), Utc::now());
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_TRANSACTIONS)?, tx.id.0.as_bytes(), serde_json::to_vec(&tx)?);
        batch.put_cf(self.cf(CF_PENDING)?, &pending, tx.id.0.as_bytes());
        batch.put_cf(self.cf(CF_HISTORY)?, history_key(&tx), b"");
        self.db.write(batch)?;
        Ok(tx)
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.get_json(CF_TRANSACTIONS, id.0.as_bytes())
    }

    async fn find_pending(
        &self,
        user: &str,
        kind: TransactionKind,
    ) -> Result<Option<Transaction>> {
        let Some(id) = self.db.get_cf(self.cf(CF_PENDING)?, pending_key(user, kind))? else {
            return Ok(None);
        };
        let id = Uuid::from_slice(&id).map_err(BotError::store)?;
        self.find_by_id(TransactionId(id)).await
    }

    async fn update_pending(&self, tx: Transaction) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let stored: Transaction = self
            .get_json(CF_TRANSACTIONS, tx.id.0.as_bytes())?
            .ok_or(BotError::NotFound(tx.id))?;
        stored.ensure_pending()?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_TRANSACTIONS)?, tx.id.0.as_bytes(), serde_json::to_vec(&tx)?);
        if tx.status != TransactionStatus::Pending {
            batch.delete_cf(self.cf(CF_PENDING)?, pending_key(&stored.user, stored.kind()));
        }
        self.db.write(batch)?;
        Ok(())
    }

    async fn count_and_list(
        &self,
        user: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(usize, Vec<Transaction>)> {
        let ids = self.history_ids(user)?;

        let mut page = Vec::with_capacity(limit);
        for id in ids.iter().skip(skip).take(limit) {
            let tx = self
                .find_by_id(*id)
                .await?
                .ok_or_else(|| BotError::store(format!("history entry {id} has no record")))?;
            page.push(tx);
        }
        Ok((ids.len(), page))
    }
}

#[async_trait]
impl SettingsStore for RocksDBStore {
    async fn get(&self) -> Result<Option<Settings>> {
        self.get_json(CF_SETTINGS, SETTINGS_KEY)
    }

    async fn upsert(&self, settings: Settings) -> Result<()> {
        self.put_json(CF_SETTINGS, SETTINGS_KEY, &settings)
    }
}

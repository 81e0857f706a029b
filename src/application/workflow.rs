use crate::application::outbox::Outbox;
use crate::domain::ports::TransactionStoreBox;
use crate::domain::transaction::{NewTransaction, Transaction, TransactionId};
use crate::error::{BotError, Result};
use chrono::Utc;
use tracing::info;

/// One page of a user's history, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    /// 1-based page number actually served.
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    /// Position of the first item across the whole history.
    pub offset: usize,
    pub items: Vec<Transaction>,
}

/// Lifecycle of persisted transactions: submission, review, completion or rejection.
///
/// `TransactionWorkflow` owns the transaction store. The at-most-one-pending rule
/// and the PENDING-only transitions are enforced by the store's conditional writes,
/// so concurrent callers cannot break them.
pub struct TransactionWorkflow {
    transactions: TransactionStoreBox,
    outbox: Outbox,
    page_size: usize,
}

impl TransactionWorkflow {
    pub const DEFAULT_PAGE_SIZE: usize = 5;

    /// Creates a new `TransactionWorkflow`.
    ///
    /// # Arguments
    ///
    /// * `transactions` - The store for transaction records.
    /// * `outbox` - Where user and admin notices are delivered.
    /// * `page_size` - Entries per history page.
    pub fn new(transactions: TransactionStoreBox, outbox: Outbox, page_size: usize) -> Self {
        Self {
            transactions,
            outbox,
            page_size: page_size.max(1),
        }
    }

    /// Persists a completed dialogue as a PENDING transaction.
    ///
    /// Fails with `DuplicateSubmission` if the user already has a PENDING
    /// transaction of the same kind.
    pub async fn submit(&self, new: NewTransaction) -> Result<Transaction> {
        let tx = self.transactions.create_pending(new).await?;
        info!(tx_id = %tx.id, user = %tx.user, kind = %tx.kind(), "transaction submitted");
        Ok(tx)
    }

    /// Looks up a transaction that is still awaiting review.
    pub async fn pending(&self, id: TransactionId) -> Result<Transaction> {
        let tx = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(BotError::NotFound(id))?;
        tx.ensure_pending()?;
        Ok(tx)
    }

    /// Approves a PENDING transaction. The status stays PENDING until the user
    /// answers with payment details through [`complete`](Self::complete).
    pub async fn approve(&self, id: TransactionId, admin: &str) -> Result<Transaction> {
        let tx = self.pending(id).await?;
        info!(tx_id = %id, admin, "transaction approved, awaiting payment details");
        Ok(tx)
    }

    /// Rejects a PENDING transaction and tells the submitting user why.
    pub async fn reject(&self, id: TransactionId, reason: String, admin: &str) -> Result<Transaction> {
        let mut tx = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(BotError::NotFound(id))?;
        tx.reject(reason, admin, Utc::now())?;
        self.transactions.update_pending(tx.clone()).await?;
        info!(tx_id = %id, admin, "transaction rejected");

        let reason = tx.reject_reason.as_deref().unwrap_or_default();
        self.outbox
            .text(
                &tx.user,
                format!(
                    "❌ Your transaction has been rejected.\n\nTransaction ID: {}\nReason: {reason}\n\nPlease contact support for more information.",
                    tx.id
                ),
            )
            .await;
        Ok(tx)
    }

    /// Completes an approved transaction with the user's settlement instructions
    /// and tells the admins.
    pub async fn complete(&self, id: TransactionId, payment_details: String) -> Result<Transaction> {
        let mut tx = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(BotError::NotFound(id))?;
        tx.complete(payment_details, Utc::now())?;
        self.transactions.update_pending(tx.clone()).await?;
        info!(tx_id = %id, user = %tx.user, "transaction completed");

        let details = tx.payment_details.as_deref().unwrap_or_default();
        self.outbox
            .to_admins(
                &format!("✅ Transaction {} completed!\nPayment details: {details}", tx.id),
                None,
            )
            .await;
        Ok(tx)
    }

    /// Returns page `page` (1-based, clamped to the last page) of `user`'s history.
    pub async fn list_page(&self, user: &str, page: usize) -> Result<HistoryPage> {
        let (total, _) = self.transactions.count_and_list(user, 0, 0).await?;
        let total_pages = total.div_ceil(self.page_size);
        let page = page.clamp(1, total_pages.max(1));
        let offset = (page - 1) * self.page_size;
        let (total, items) = self
            .transactions
            .count_and_list(user, offset, self.page_size)
            .await?;
        Ok(HistoryPage {
            page,
            total_pages: total.div_ceil(self.page_size),
            total,
            offset,
            items,
        })
    }
}

use crate::domain::asset::{CryptoAsset, GiftCardBrand};
use crate::error::{BotError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned identifier of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Sell,
    SellGiftCard,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::SellGiftCard => "sell_gift_card",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Rejected,
    /// Only ever describes an abandoned dialogue; never written to the store.
    Cancelled,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// What the user asked for. The variant fixes the transaction kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Order {
    Buy {
        asset: CryptoAsset,
        amount: Decimal,
    },
    Sell {
        asset: CryptoAsset,
        amount: Decimal,
    },
    SellGiftCard {
        brand: GiftCardBrand,
        card_value: Decimal,
        country: String,
    },
}

impl Order {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Buy { .. } => TransactionKind::Buy,
            Self::Sell { .. } => TransactionKind::Sell,
            Self::SellGiftCard { .. } => TransactionKind::SellGiftCard,
        }
    }

    /// Human readable title, e.g. "Buy BTC" or "Sell Steam Gift Card".
    pub fn title(&self) -> String {
        match self {
            Self::Buy { asset, .. } => format!("Buy {asset}"),
            Self::Sell { asset, .. } => format!("Sell {asset}"),
            Self::SellGiftCard { brand, .. } => format!("Sell {brand} Gift Card"),
        }
    }
}

/// Proof supplied with a submission: an uploaded artifact reference, a free-text
/// hash or card code, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub artifact: Option<String>,
    pub code: Option<String>,
}

impl Evidence {
    pub fn new(artifact: Option<String>, code: Option<String>) -> Result<Self> {
        if artifact.is_none() && code.is_none() {
            return Err(BotError::Validation(
                "a proof upload or a text code is required".to_string(),
            ));
        }
        Ok(Self { artifact, code })
    }

    pub fn artifact(artifact: impl Into<String>) -> Self {
        Self {
            artifact: Some(artifact.into()),
            code: None,
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self {
            artifact: None,
            code: Some(code.into()),
        }
    }
}

/// A completed dialogue, ready to be persisted as a PENDING transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user: String,
    pub order: Order,
    /// Price or payout ratio at submission time.
    pub rate: Decimal,
    pub fiat_amount: Decimal,
    pub evidence: Evidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Session id of the submitting user.
    pub user: String,
    pub order: Order,
    pub rate: Decimal,
    pub fiat_amount: Decimal,
    pub evidence: Evidence,
    pub status: TransactionStatus,
    pub payment_details: Option<String>,
    pub reject_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn from_new(new: NewTransaction, id: TransactionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user: new.user,
            order: new.order,
            rate: new.rate,
            fiat_amount: new.fiat_amount,
            evidence: new.evidence,
            status: TransactionStatus::Pending,
            payment_details: None,
            reject_reason: None,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.order.kind()
    }

    pub fn ensure_pending(&self) -> Result<()> {
        if self.status == TransactionStatus::Pending {
            Ok(())
        } else {
            Err(BotError::AlreadyProcessed(self.id))
        }
    }

    /// Marks the transaction rejected by `admin`.
    pub fn reject(&mut self, reason: String, admin: &str, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending()?;
        self.status = TransactionStatus::Rejected;
        self.reject_reason = Some(reason);
        self.reviewed_by = Some(admin.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// Marks the transaction completed with the user's settlement instructions.
    pub fn complete(&mut self, payment_details: String, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending()?;
        self.status = TransactionStatus::Completed;
        self.payment_details = Some(payment_details);
        self.updated_at = now;
        Ok(())
    }
}

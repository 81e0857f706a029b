//! Dialogue states for users and admins.

use crate::domain::asset::{CryptoAsset, GiftCardBrand, PerAsset, PerBrand};
use crate::domain::settings::SettingsUpdate;
use crate::domain::transaction::TransactionId;
use crate::domain::validation::{parse_rate, parse_ratio, parse_wallet_address};
use crate::error::{BotError, Result};
use rust_decimal::Decimal;
use std::fmt;

/// Where a user is in a multi-step request, with everything collected so far.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialogue {
    BuyAmount {
        asset: CryptoAsset,
    },
    BuyProof {
        asset: CryptoAsset,
        amount: Decimal,
        rate: Decimal,
        fiat_amount: Decimal,
    },
    SellAmount {
        asset: CryptoAsset,
    },
    SellEvidence {
        asset: CryptoAsset,
        amount: Decimal,
    },
    GiftDetails {
        brand: GiftCardBrand,
    },
    GiftEvidence {
        brand: GiftCardBrand,
        card_value: Decimal,
        country: String,
        rate: Decimal,
        payout: Decimal,
    },
    PaymentDetails {
        tx_id: TransactionId,
    },
}

impl Dialogue {
    /// Stable name of the step, used in logs.
    pub fn step(&self) -> &'static str {
        match self {
            Self::BuyAmount { .. } => "waiting_amount",
            Self::BuyProof { .. } => "waiting_proof",
            Self::SellAmount { .. } => "waiting_amount_sell",
            Self::SellEvidence { .. } => "waiting_tx_sell",
            Self::GiftDetails { .. } => "waiting_gift_details",
            Self::GiftEvidence { .. } => "waiting_gift_upload",
            Self::PaymentDetails { .. } => "waiting_payment_details",
        }
    }
}

impl fmt::Display for Dialogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step())
    }
}

/// Admin settings wizards. Each collects one value per fixed step and commits the
/// whole set only after the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardKind {
    CryptoRates,
    GiftCardRates,
    Wallets,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardValue {
    Number(Decimal),
    Text(String),
}

impl WizardKind {
    pub fn steps(self) -> usize {
        match self {
            Self::CryptoRates | Self::Wallets => CryptoAsset::ALL.len(),
            Self::GiftCardRates => GiftCardBrand::ALL.len(),
        }
    }

    pub fn prompt(self, step: usize) -> String {
        match self {
            Self::CryptoRates => format!("Enter the new {} rate (in USD):", CryptoAsset::ALL[step]),
            Self::GiftCardRates if step == 0 => format!(
                "Enter the new {} gift card payout rate (e.g., 0.85 for 85%):",
                GiftCardBrand::ALL[step]
            ),
            Self::GiftCardRates => format!(
                "Enter the new {} gift card payout rate:",
                GiftCardBrand::ALL[step]
            ),
            Self::Wallets => format!("Enter the new {} wallet address:", CryptoAsset::ALL[step]),
        }
    }

    pub fn parse(self, input: &str) -> Result<WizardValue> {
        match self {
            Self::CryptoRates => parse_rate(input).map(WizardValue::Number),
            Self::GiftCardRates => parse_ratio(input).map(WizardValue::Number),
            Self::Wallets => parse_wallet_address(input).map(WizardValue::Text),
        }
    }

    pub fn finish(self, values: Vec<WizardValue>) -> Result<SettingsUpdate> {
        let incomplete = || BotError::Validation(format!("{self:?} wizard is incomplete"));
        match self {
            Self::CryptoRates => numbers(values)
                .map(|rates| SettingsUpdate::CryptoRates(PerAsset::from_ordered(rates)))
                .ok_or_else(incomplete),
            Self::GiftCardRates => numbers(values)
                .map(|rates| SettingsUpdate::GiftCardRates(PerBrand::from_ordered(rates)))
                .ok_or_else(incomplete),
            Self::Wallets => texts(values)
                .map(|wallets| SettingsUpdate::Wallets(PerAsset::from_ordered(wallets)))
                .ok_or_else(incomplete),
        }
    }

    pub fn done_message(self) -> &'static str {
        match self {
            Self::CryptoRates => "✅ Crypto rates updated successfully!",
            Self::GiftCardRates => "✅ Gift card rates updated successfully!",
            Self::Wallets => "✅ Wallet addresses updated successfully!",
        }
    }
}

fn numbers<const N: usize>(values: Vec<WizardValue>) -> Option<[Decimal; N]> {
    values
        .into_iter()
        .map(|value| match value {
            WizardValue::Number(n) => Some(n),
            WizardValue::Text(_) => None,
        })
        .collect::<Option<Vec<_>>>()?
        .try_into()
        .ok()
}

fn texts<const N: usize>(values: Vec<WizardValue>) -> Option<[String; N]> {
    values
        .into_iter()
        .map(|value| match value {
            WizardValue::Text(s) => Some(s),
            WizardValue::Number(_) => None,
        })
        .collect::<Option<Vec<_>>>()?
        .try_into()
        .ok()
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminDialogue {
    Wizard {
        kind: WizardKind,
        values: Vec<WizardValue>,
    },
    RejectReason {
        tx_id: TransactionId,
    },
}

impl AdminDialogue {
    pub fn wizard(kind: WizardKind) -> Self {
        Self::Wizard {
            kind,
            values: Vec::with_capacity(kind.steps()),
        }
    }
}

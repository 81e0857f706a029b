use crate::domain::asset::{CryptoAsset, GiftCardBrand, PerAsset, PerBrand};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// The single shared record of exchange rates and receiving wallets.
///
/// Readers always see a whole `Settings` value; updates replace it wholesale and bump
/// `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// USD price per unit of each asset.
    pub crypto_rates: PerAsset<Decimal>,
    /// Payout ratio per brand, in (0, 1].
    pub gift_card_rates: PerBrand<Decimal>,
    /// Receiving address per asset; empty means not configured.
    pub wallets: PerAsset<String>,
    pub version: u64,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            crypto_rates: PerAsset::from_ordered([dec!(50000), dec!(3000), dec!(1)]),
            gift_card_rates: PerBrand::from_ordered([dec!(0.85), dec!(0.80), dec!(0.82), dec!(0.88)]),
            wallets: PerAsset::default(),
            version: 0,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }
}

/// One admin-initiated replacement of a settings section.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    CryptoRates(PerAsset<Decimal>),
    GiftCardRates(PerBrand<Decimal>),
    Wallets(PerAsset<String>),
}

impl Settings {
    pub fn crypto_rate(&self, asset: CryptoAsset) -> Decimal {
        *self.crypto_rates.get(asset)
    }

    pub fn gift_card_rate(&self, brand: GiftCardBrand) -> Decimal {
        *self.gift_card_rates.get(brand)
    }

    /// The configured wallet for `asset`, if any.
    pub fn wallet(&self, asset: CryptoAsset) -> Option<&str> {
        let address = self.wallets.get(asset).trim();
        (!address.is_empty()).then_some(address)
    }

    /// Returns the next version of these settings with `update` applied.
    pub fn with_update(&self, update: SettingsUpdate, admin: &str, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        match update {
            SettingsUpdate::CryptoRates(rates) => next.crypto_rates = rates,
            SettingsUpdate::GiftCardRates(rates) => next.gift_card_rates = rates,
            SettingsUpdate::Wallets(wallets) => next.wallets = wallets,
        }
        next.version = self.version + 1;
        next.updated_by = Some(admin.to_string());
        next.updated_at = now;
        next
    }
}

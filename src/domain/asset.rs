use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cryptocurrencies the desk trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CryptoAsset {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "USDT")]
    Usdt,
}

impl CryptoAsset {
    pub const ALL: [CryptoAsset; 3] = [Self::Btc, Self::Eth, Self::Usdt];

    pub fn code(self) -> &'static str {
        match self {
            Self::Btc => "BTC",
            Self::Eth => "ETH",
            Self::Usdt => "USDT",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Btc => "Bitcoin",
            Self::Eth => "Ethereum",
            Self::Usdt => "Tether",
        }
    }
}

impl fmt::Display for CryptoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CryptoAsset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|asset| asset.code() == s)
            .ok_or_else(|| format!("unknown crypto asset: {s}"))
    }
}

/// Gift card brands accepted for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GiftCardBrand {
    Amazon,
    Apple,
    #[serde(rename = "Google Play")]
    GooglePlay,
    Steam,
}

impl GiftCardBrand {
    pub const ALL: [GiftCardBrand; 4] = [Self::Amazon, Self::Apple, Self::GooglePlay, Self::Steam];

    pub fn name(self) -> &'static str {
        match self {
            Self::Amazon => "Amazon",
            Self::Apple => "Apple",
            Self::GooglePlay => "Google Play",
            Self::Steam => "Steam",
        }
    }

    /// Short token used inside button actions, where spaces are awkward.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Amazon => "amazon",
            Self::Apple => "apple",
            Self::GooglePlay => "google",
            Self::Steam => "steam",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|brand| brand.slug() == slug)
    }
}

impl fmt::Display for GiftCardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GiftCardBrand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|brand| brand.name() == s)
            .ok_or_else(|| format!("unknown gift card brand: {s}"))
    }
}

/// One value per crypto asset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerAsset<T> {
    #[serde(rename = "BTC")]
    pub btc: T,
    #[serde(rename = "ETH")]
    pub eth: T,
    #[serde(rename = "USDT")]
    pub usdt: T,
}

impl<T> PerAsset<T> {
    pub fn get(&self, asset: CryptoAsset) -> &T {
        match asset {
            CryptoAsset::Btc => &self.btc,
            CryptoAsset::Eth => &self.eth,
            CryptoAsset::Usdt => &self.usdt,
        }
    }

    /// Builds a full set from values listed in `CryptoAsset::ALL` order.
    pub fn from_ordered(values: [T; 3]) -> Self {
        let [btc, eth, usdt] = values;
        Self { btc, eth, usdt }
    }
}

/// One value per gift card brand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerBrand<T> {
    #[serde(rename = "Amazon")]
    pub amazon: T,
    #[serde(rename = "Apple")]
    pub apple: T,
    #[serde(rename = "Google Play")]
    pub google_play: T,
    #[serde(rename = "Steam")]
    pub steam: T,
}

impl<T> PerBrand<T> {
    pub fn get(&self, brand: GiftCardBrand) -> &T {
        match brand {
            GiftCardBrand::Amazon => &self.amazon,
            GiftCardBrand::Apple => &self.apple,
            GiftCardBrand::GooglePlay => &self.google_play,
            GiftCardBrand::Steam => &self.steam,
        }
    }

    /// Builds a full set from values listed in `GiftCardBrand::ALL` order.
    pub fn from_ordered(values: [T; 4]) -> Self {
        let [amazon, apple, google_play, steam] = values;
        Self {
            amazon,
            apple,
            google_play,
            steam,
        }
    }
}

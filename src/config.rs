//! Operator configuration, layered with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `./swapdesk.toml`, or the file passed with `--config`
//! 3. `SWAPDESK_*` environment variables

use crate::domain::asset::{PerAsset, PerBrand};
use crate::domain::settings::Settings;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "swapdesk.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Session ids allowed to review transactions and change settings.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Chat that receives admin notices. Every admin id receives them when unset.
    #[serde(default)]
    pub notify_chat: Option<String>,
}

impl AdminConfig {
    pub fn is_admin(&self, session_id: &str) -> bool {
        self.ids.iter().any(|id| id == session_id)
    }

    pub fn notice_chats(&self) -> Vec<String> {
        match &self.notify_chat {
            Some(chat) => vec![chat.clone()],
            None => self.ids.clone(),
        }
    }
}

/// Values written to the settings record the first time the store has none.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    pub crypto_rates: PerAsset<Decimal>,
    pub gift_card_rates: PerBrand<Decimal>,
    #[serde(default)]
    pub wallets: PerAsset<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            crypto_rates: settings.crypto_rates,
            gift_card_rates: settings.gift_card_rates,
            wallets: settings.wallets,
        }
    }
}

impl DefaultsConfig {
    pub fn to_settings(&self) -> Settings {
        Settings {
            crypto_rates: self.crypto_rates.clone(),
            gift_card_rates: self.gift_card_rates.clone(),
            wallets: self.wallets.clone(),
            ..Settings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_rate_limit_events")]
    pub rate_limit_events: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_limit_events: default_rate_limit_events(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
            session_capacity: default_session_capacity(),
            history_page_size: default_history_page_size(),
        }
    }
}

impl LimitsConfig {
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }
}

fn default_rate_limit_events() -> u32 {
    10
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_session_idle_timeout_secs() -> u64 {
    30 * 60
}

fn default_session_capacity() -> usize {
    10_000
}

fn default_history_page_size() -> usize {
    5
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// RocksDB directory. In-memory storage is used when unset.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Loads `./swapdesk.toml` (or `path`) with env var overrides, then validates it.
///
/// A missing `./swapdesk.toml` is fine; a missing explicit `path` is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, figment::Error> {
    let file = match path {
        Some(path) => Toml::file_exact(path),
        None => Toml::file(DEFAULT_CONFIG_FILE),
    };
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(file)
        .merge(env_provider())
        .extract()?;
    validate(&config)?;
    Ok(config)
}

/// Loads configuration from TOML text only, without env overrides.
pub fn load_config_from_str(toml: &str) -> Result<Config, figment::Error> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::string(toml))
        .extract()?;
    validate(&config)?;
    Ok(config)
}

/// Maps `SWAPDESK_LIMITS_SESSION_CAPACITY` to `limits.session_capacity`. Only the
/// section prefix is split so that key names keep their underscores.
fn env_provider() -> Env {
    Env::prefixed("SWAPDESK_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        for section in ["admin", "defaults", "limits", "storage"] {
            if let Some(rest) = key.strip_prefix(section).and_then(|k| k.strip_prefix('_')) {
                return format!("{section}.{rest}").into();
            }
        }
        key.into()
    })
}

fn validate(config: &Config) -> Result<(), figment::Error> {
    let limits = &config.limits;
    if limits.rate_limit_events == 0 {
        return Err(figment::Error::from(
            "limits.rate_limit_events must be at least 1".to_string(),
        ));
    }
    if limits.history_page_size == 0 {
        return Err(figment::Error::from(
            "limits.history_page_size must be at least 1".to_string(),
        ));
    }

    let defaults = &config.defaults;
    let rates = [defaults.crypto_rates.btc, defaults.crypto_rates.eth, defaults.crypto_rates.usdt];
    if rates.iter().any(|rate| *rate <= Decimal::ZERO) {
        return Err(figment::Error::from(
            "defaults.crypto_rates must all be positive".to_string(),
        ));
    }
    let ratios = [
        defaults.gift_card_rates.amazon,
        defaults.gift_card_rates.apple,
        defaults.gift_card_rates.google_play,
        defaults.gift_card_rates.steam,
    ];
    if ratios.iter().any(|r| *r <= Decimal::ZERO || *r > Decimal::ONE) {
        return Err(figment::Error::from(
            "defaults.gift_card_rates must be in (0, 1]".to_string(),
        ));
    }
    Ok(())
}

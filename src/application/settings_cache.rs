use crate::domain::ports::SettingsStoreBox;
use crate::domain::settings::{Settings, SettingsUpdate};
use crate::error::Result;
use arc_swap::ArcSwap;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Process-wide view of the settings record.
///
/// Readers take a snapshot with [`current`](Self::current) and never block.
/// Writers are serialized, persist the next version first, and then swap the whole
/// value in, so a reader sees either the old settings or the new ones in full.
pub struct SettingsCache {
    current: ArcSwap<Settings>,
    store: SettingsStoreBox,
    writer: Mutex<()>,
}

impl SettingsCache {
    /// Loads the stored settings, persisting `defaults` when none exist yet.
    pub async fn load(store: SettingsStoreBox, defaults: Settings) -> Result<Self> {
        let settings = match store.get().await? {
            Some(settings) => {
                info!(version = settings.version, "settings loaded from store");
                settings
            }
            None => {
                store.upsert(defaults.clone()).await?;
                info!("default settings created");
                defaults
            }
        };
        Ok(Self {
            current: ArcSwap::from_pointee(settings),
            store,
            writer: Mutex::new(()),
        })
    }

    pub fn current(&self) -> Arc<Settings> {
        self.current.load_full()
    }

    pub async fn apply(&self, update: SettingsUpdate, admin: &str) -> Result<Arc<Settings>> {
        let _writer = self.writer.lock().await;
        let next = Arc::new(self.current().with_update(update, admin, Utc::now()));
        self.store.upsert(next.as_ref().clone()).await?;
        self.current.store(next.clone());
        info!(version = next.version, admin, "settings updated");
        Ok(next)
    }
}

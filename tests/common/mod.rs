#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use swapdesk::application::engine::{ConversationEngine, Dispatch, Stores};
use swapdesk::config::{AdminConfig, Config, LimitsConfig};
use swapdesk::domain::message::{InboundEvent, OutboundMessage, Upload};
use swapdesk::domain::ports::Notifier;
use swapdesk::domain::transaction::{Transaction, TransactionKind, TransactionStatus};
use swapdesk::error::Result;
use swapdesk::infrastructure::in_memory::{
    InMemorySettingsStore, InMemoryTransactionStore, InMemoryUserStore,
};

pub const ADMIN: &str = "900";

/// A notifier that keeps every outbound action in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<OutboundMessage>>,
    acks: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingNotifier {
    pub fn messages_for(&self, session_id: &str) -> Vec<OutboundMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn last_for(&self, session_id: &str) -> OutboundMessage {
        self.messages_for(session_id)
            .pop()
            .unwrap_or_else(|| panic!("no message for session {session_id}"))
    }

    pub fn acks_for(&self, session_id: &str) -> Vec<Option<String>> {
        self.acks
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == session_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.messages.lock().unwrap().len() + self.acks.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }

    async fn acknowledge(&self, session_id: &str, text: Option<&str>) -> Result<()> {
        self.acks
            .lock()
            .unwrap()
            .push((session_id.to_string(), text.map(str::to_string)));
        Ok(())
    }
}

/// One admin and a rate limit loose enough for long scripted sessions.
pub fn test_config() -> Config {
    Config {
        admin: AdminConfig {
            ids: vec![ADMIN.to_string()],
            notify_chat: None,
        },
        limits: LimitsConfig {
            rate_limit_events: 1000,
            ..LimitsConfig::default()
        },
        ..Config::default()
    }
}

pub struct TestBot {
    pub engine: Arc<ConversationEngine>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestBot {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let stores = Stores {
            users: Arc::new(InMemoryUserStore::new()),
            transactions: Arc::new(InMemoryTransactionStore::new()),
            settings: Arc::new(InMemorySettingsStore::new()),
        };
        Self::with_stores(config, stores).await
    }

    pub async fn with_stores(config: Config, stores: Stores) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = ConversationEngine::new(&config, stores, notifier.clone())
            .await
            .unwrap();
        Self {
            engine: Arc::new(engine),
            notifier,
        }
    }

    pub async fn text(&self, session_id: &str, text: &str) -> Dispatch {
        self.engine.handle(InboundEvent::text(session_id, text)).await
    }

    pub async fn press(&self, session_id: &str, action: &str) -> Dispatch {
        self.engine.handle(InboundEvent::button(session_id, action)).await
    }

    pub async fn photo(&self, session_id: &str, file_id: &str) -> Dispatch {
        let upload = Upload::Photo {
            file_id: file_id.to_string(),
            size: 2048,
        };
        self.engine.handle(InboundEvent::upload(session_id, upload)).await
    }

    pub async fn history(&self, session_id: &str) -> Vec<Transaction> {
        self.engine
            .workflow()
            .list_page(session_id, 1)
            .await
            .unwrap()
            .items
    }

    /// Runs a complete buy of 0.5 BTC and returns the stored transaction.
    pub async fn submit_buy(&self, session_id: &str) -> Transaction {
        self.press(session_id, "buy_btc").await;
        self.text(session_id, "0.5").await;
        self.photo(session_id, "proof-1").await;
        self.history(session_id)
            .await
            .into_iter()
            .find(|tx| tx.kind() == TransactionKind::Buy && tx.status == TransactionStatus::Pending)
            .expect("buy was not stored")
    }
}

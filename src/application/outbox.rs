use crate::domain::message::{Keyboard, OutboundMessage};
use crate::domain::ports::NotifierBox;
use std::sync::Arc;
use tracing::warn;

/// Fire-and-forget delivery on top of a [`Notifier`](crate::domain::ports::Notifier).
///
/// Failures are logged and swallowed: a lost notification never rolls back the
/// state change that produced it.
#[derive(Clone)]
pub struct Outbox {
    notifier: NotifierBox,
    admin_chats: Arc<[String]>,
}

impl Outbox {
    pub fn new(notifier: NotifierBox, admin_chats: Vec<String>) -> Self {
        Self {
            notifier,
            admin_chats: admin_chats.into(),
        }
    }

    pub async fn send(&self, message: OutboundMessage) {
        let session_id = message.session_id.clone();
        if let Err(e) = self.notifier.send(message).await {
            warn!(session_id = %session_id, error = %e, "failed to deliver message");
        }
    }

    pub async fn text(&self, session_id: &str, text: impl Into<String>) {
        self.send(OutboundMessage::new(session_id, text)).await;
    }

    pub async fn with_keyboard(&self, session_id: &str, text: impl Into<String>, keyboard: Keyboard) {
        self.send(OutboundMessage::new(session_id, text).with_keyboard(keyboard))
            .await;
    }

    pub async fn acknowledge(&self, session_id: &str, text: Option<&str>) {
        if let Err(e) = self.notifier.acknowledge(session_id, text).await {
            warn!(session_id, error = %e, "failed to acknowledge button");
        }
    }

    /// Sends the same notice to every admin chat.
    pub async fn to_admins(&self, text: &str, keyboard: Option<Keyboard>) {
        for chat in self.admin_chats.iter() {
            let mut message = OutboundMessage::new(chat.as_str(), text);
            message.keyboard = keyboard.clone();
            self.send(message).await;
        }
    }
}

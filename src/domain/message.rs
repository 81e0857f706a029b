//! Transport-neutral shapes of inbound events and outbound messages.

use serde::{Deserialize, Serialize};

/// An uploaded file as described by the transport. Only the opaque `file_id`
/// ever crosses into the core; the bytes stay with the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Upload {
    Photo {
        file_id: String,
        size: u64,
    },
    Document {
        file_id: String,
        size: u64,
        mime_type: Option<String>,
    },
}

impl Upload {
    pub fn file_id(&self) -> &str {
        match self {
            Self::Photo { file_id, .. } | Self::Document { file_id, .. } => file_id,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::Photo { size, .. } | Self::Document { size, .. } => *size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Text(String),
    Upload(Upload),
    /// The action string attached to a pressed button.
    Button(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub session_id: String,
    pub display_name: Option<String>,
    pub payload: EventPayload,
}

impl InboundEvent {
    pub fn text(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(session_id, EventPayload::Text(text.into()))
    }

    pub fn button(session_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(session_id, EventPayload::Button(action.into()))
    }

    pub fn upload(session_id: impl Into<String>, upload: Upload) -> Self {
        Self::new(session_id, EventPayload::Upload(upload))
    }

    pub fn new(session_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            session_id: session_id.into(),
            display_name: None,
            payload,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl ToString) -> Self {
        Self {
            label: label.into(),
            action: action.to_string(),
        }
    }
}

/// Rows of buttons.
pub type Keyboard = Vec<Vec<Button>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub session_id: String,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// All button actions in display order.
    pub fn actions(&self) -> Vec<&str> {
        self.keyboard
            .iter()
            .flatten()
            .flatten()
            .map(|button| button.action.as_str())
            .collect()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat user, keyed by the transport's session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub session_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(session_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }
}

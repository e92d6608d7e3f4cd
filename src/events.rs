use chrono::{DateTime, Utc};
use serde::Serialize;

/// Events emitted by a running query task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    /// Decoded text fragment of a streamed reply
    Fragment(String),
    /// Final, normalized reply text
    Completed(String),
    /// The query failed; carries the detailed cause
    Failed(String),
}

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "Coach",
        }
    }
}

/// One message in the conversation. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    text: String,
    role: Role,
    #[serde(skip)]
    sent_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role,
            sent_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

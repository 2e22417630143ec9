use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn sent upstream. Text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

impl From<&recovery_core::ChatTurn> for Message {
    fn from(turn: &recovery_core::ChatTurn) -> Self {
        let role = match turn.role {
            recovery_core::Role::User => Role::User,
            recovery_core::Role::Assistant => Role::Assistant,
        };
        Self {
            role,
            text: turn.text.clone(),
        }
    }
}

/// Events emitted by a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental text; callers accumulate.
    TextDelta(String),
    Done { stop_reason: Option<String> },
    Error(String),
}

//! Interaction response payloads and the response-state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message body sent as a response or follow-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Whether only the invoking user can see the message.
    #[serde(default)]
    pub ephemeral: bool,
}

impl ResponsePayload {
    /// Creates a payload with text content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ephemeral: false,
        }
    }

    /// Marks the message as visible to the invoking user only.
    #[must_use]
    pub const fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

impl From<&str> for ResponsePayload {
    fn from(content: &str) -> Self {
        Self::content(content)
    }
}

impl From<String> for ResponsePayload {
    fn from(content: String) -> Self {
        Self::content(content)
    }
}

/// First response sent for an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InitialResponse {
    /// Immediate message.
    Message(ResponsePayload),
    /// Acknowledgement; the message follows through an edit.
    DeferredMessage,
}

/// Where an interaction stands in the one-initial-response protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseState {
    /// No initial response has been sent.
    NotResponded,
    /// A deferred acknowledgement has been sent.
    Deferred,
    /// An initial message has been sent.
    Responded,
    /// An initial response and at least one follow-up have been sent.
    RespondedWithFollowups,
}

impl ResponseState {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotResponded => "not_responded",
            Self::Deferred => "deferred",
            Self::Responded => "responded",
            Self::RespondedWithFollowups => "responded_with_followups",
        }
    }

    /// Returns whether an initial response exists.
    #[must_use]
    pub const fn has_initial_response(self) -> bool {
        !matches!(self, Self::NotResponded)
    }
}

impl fmt::Display for ResponseState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

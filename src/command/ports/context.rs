//! Per-interaction response handle.
//!
//! The platform accepts exactly one initial response per interaction. The
//! context tracks which responses have been sent and rejects calls that would
//! violate that protocol before they reach the network.

use super::platform::{PlatformClient, PlatformError, PlatformResult};
use crate::command::domain::{
    InitialResponse, Interaction, InteractionId, InteractionToken, ResponsePayload, ResponseState,
    ScopeId, Snowflake,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised by response operations.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// Edit or follow-up attempted before any initial response.
    #[error("interaction has no initial response yet")]
    NotYetResponded,

    /// A second initial response was attempted.
    #[error("interaction already has an initial response (state: {0})")]
    AlreadyResponded(ResponseState),

    /// The platform rejected the call.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The platform did not answer in time.
    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        /// Operation that timed out.
        operation: &'static str,
        /// Configured bound.
        after: Duration,
    },
}

/// Result type for response operations.
pub type ContextResult<T> = Result<T, ContextError>;

/// Handle onto one interaction, passed to its handler.
///
/// Cloning is cheap; clones share the response state. A failed platform call
/// leaves the state unchanged so the caller may retry.
#[derive(Clone)]
pub struct InteractionContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    interaction: Interaction,
    platform: Arc<dyn PlatformClient>,
    state: Mutex<ResponseState>,
    timeout: Duration,
}

impl InteractionContext {
    /// Creates a context for an interaction that has not been answered.
    #[must_use]
    pub fn new(
        interaction: Interaction,
        platform: Arc<dyn PlatformClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                interaction,
                platform,
                state: Mutex::new(ResponseState::NotResponded),
                timeout,
            }),
        }
    }

    /// Returns the interaction being answered.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.inner.interaction
    }

    /// Returns the interaction identifier.
    #[must_use]
    pub fn id(&self) -> InteractionId {
        self.inner.interaction.id
    }

    /// Returns the scope the interaction arrived in.
    #[must_use]
    pub fn scope(&self) -> Option<ScopeId> {
        self.inner.interaction.scope
    }

    /// Returns the channel the interaction was invoked in, when known.
    #[must_use]
    pub fn channel_id(&self) -> Option<Snowflake> {
        self.inner.interaction.channel_id
    }

    /// Returns the invoking user, when known.
    #[must_use]
    pub fn user_id(&self) -> Option<Snowflake> {
        self.inner.interaction.user_id
    }

    /// Returns the current response state.
    #[must_use]
    pub async fn response_state(&self) -> ResponseState {
        *self.inner.state.lock().await
    }

    /// Sends the initial response.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::AlreadyResponded`] when an initial response
    /// exists, or a platform or timeout error from the call.
    pub async fn create_response(&self, payload: impl Into<ResponsePayload>) -> ContextResult<()> {
        let response = InitialResponse::Message(payload.into());
        self.initial(response, ResponseState::Responded).await
    }

    /// Acknowledges the interaction now and responds later through
    /// [`Self::edit_response`].
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::AlreadyResponded`] when an initial response
    /// exists, or a platform or timeout error from the call.
    pub async fn defer(&self) -> ContextResult<()> {
        self.initial(InitialResponse::DeferredMessage, ResponseState::Deferred)
            .await
    }

    /// Replaces the initial response.
    ///
    /// Editing a deferred acknowledgement completes it.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::NotYetResponded`] before any initial response,
    /// or a platform or timeout error from the call.
    pub async fn edit_response(&self, payload: impl Into<ResponsePayload>) -> ContextResult<()> {
        let body = payload.into();
        let mut state = self.inner.state.lock().await;
        if !state.has_initial_response() {
            return Err(ContextError::NotYetResponded);
        }
        let token = self.token();
        self.bounded(
            "edit_interaction_response",
            self.inner.platform.edit_interaction_response(token, &body),
        )
        .await?;
        if *state == ResponseState::Deferred {
            *state = ResponseState::Responded;
        }
        Ok(())
    }

    /// Sends a follow-up message.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::NotYetResponded`] before any initial response,
    /// or a platform or timeout error from the call.
    pub async fn send_followup(&self, payload: impl Into<ResponsePayload>) -> ContextResult<()> {
        let body = payload.into();
        let mut state = self.inner.state.lock().await;
        if !state.has_initial_response() {
            return Err(ContextError::NotYetResponded);
        }
        let token = self.token();
        self.bounded(
            "create_followup",
            self.inner.platform.create_followup(token, &body),
        )
        .await?;
        *state = ResponseState::RespondedWithFollowups;
        Ok(())
    }

    async fn initial(&self, response: InitialResponse, next: ResponseState) -> ContextResult<()> {
        let mut state = self.inner.state.lock().await;
        if state.has_initial_response() {
            return Err(ContextError::AlreadyResponded(*state));
        }
        let token = self.token();
        self.bounded(
            "create_interaction_response",
            self.inner
                .platform
                .create_interaction_response(token, &response),
        )
        .await?;
        *state = next;
        Ok(())
    }

    async fn bounded(
        &self,
        operation: &'static str,
        request: impl Future<Output = PlatformResult<()>>,
    ) -> ContextResult<()> {
        let after = self.inner.timeout;
        tokio::time::timeout(after, request)
            .await
            .map_err(|_| ContextError::TimedOut { operation, after })?
            .map_err(ContextError::from)
    }

    fn token(&self) -> &InteractionToken {
        &self.inner.interaction.token
    }
}

impl fmt::Debug for InteractionContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InteractionContext")
            .field("interaction_id", &self.inner.interaction.id)
            .field("command", &self.inner.interaction.command_path())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

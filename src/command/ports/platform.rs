//! Outbound port onto the external chat-platform client.

use crate::command::domain::{
    CommandDefinition, CommandId, Entity, EntityKind, InitialResponse, InteractionToken,
    OptionChoice, RegisteredCommand, ResponsePayload, ScopeId, ScopeTarget, Snowflake,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for platform client operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// REST capabilities the command layer needs from the platform client.
///
/// Implementations own transport, authentication, and rate limiting. None of
/// the calls are retried by the command layer.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Lists the commands currently registered in a scope.
    async fn fetch_commands(&self, scope: ScopeTarget) -> PlatformResult<Vec<RegisteredCommand>>;

    /// Creates or replaces the given commands in a scope, matching by name.
    async fn upsert_commands(
        &self,
        scope: ScopeTarget,
        commands: &[CommandDefinition],
    ) -> PlatformResult<Vec<RegisteredCommand>>;

    /// Deletes one registered command from a scope.
    async fn delete_command(&self, scope: ScopeTarget, id: CommandId) -> PlatformResult<()>;

    /// Sends the initial response to an interaction.
    async fn create_interaction_response(
        &self,
        token: &InteractionToken,
        response: &InitialResponse,
    ) -> PlatformResult<()>;

    /// Replaces the content of the initial response.
    async fn edit_interaction_response(
        &self,
        token: &InteractionToken,
        payload: &ResponsePayload,
    ) -> PlatformResult<()>;

    /// Sends a follow-up message after the initial response.
    async fn create_followup(
        &self,
        token: &InteractionToken,
        payload: &ResponsePayload,
    ) -> PlatformResult<()>;

    /// Answers an autocomplete request with suggestions.
    async fn create_autocomplete_response(
        &self,
        token: &InteractionToken,
        choices: &[OptionChoice],
    ) -> PlatformResult<()>;

    /// Looks up an entity from the client's cache or REST API.
    ///
    /// Returns `Ok(None)` when the entity does not exist.
    async fn resolve_entity(
        &self,
        scope: Option<ScopeId>,
        kind: EntityKind,
        id: Snowflake,
    ) -> PlatformResult<Option<Entity>>;
}

/// Errors returned by platform client adapters.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The platform answered with an error status.
    #[error("platform rejected the request: {0}")]
    Rejected(String),

    /// The interaction token is unknown or expired.
    #[error("interaction token is unknown or expired")]
    UnknownInteraction,

    /// Transport-level failure.
    #[error("platform request failed: {0}")]
    Request(Arc<dyn std::error::Error + Send + Sync>),
}

impl PlatformError {
    /// Wraps a transport-level failure.
    #[must_use]
    pub fn request(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Request(Arc::new(err))
    }
}

//! Application-supplied command and autocomplete handlers.

use super::context::{ContextError, InteractionContext};
use crate::command::domain::{CommandArguments, Interaction, OptionChoice};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Result type returned by command handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Result type returned by autocomplete handlers.
pub type AutocompleteResult = Result<Vec<OptionChoice>, HandlerError>;

/// Errors a handler reports back to the dispatcher.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// A response operation failed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The handler gave up with a message.
    #[error("{0}")]
    Failed(String),

    /// Any other failure raised inside the handler.
    #[error("handler failed: {0}")]
    Other(Arc<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a failure from a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wraps an arbitrary error.
    #[must_use]
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Arc::new(err))
    }
}

/// Runs when an invocable command node is invoked.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handles one invocation with its decoded arguments.
    async fn handle(&self, context: InteractionContext, arguments: CommandArguments)
    -> HandlerResult;
}

/// Provides suggestions for an autocomplete option.
#[async_trait]
pub trait AutocompleteHandler: Send + Sync {
    /// Returns suggestions for the partially typed value.
    async fn suggest(&self, request: AutocompleteRequest) -> AutocompleteResult;
}

/// Partially typed option of an autocomplete interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteRequest {
    /// The originating interaction.
    pub interaction: Interaction,
    /// Name of the focused option.
    pub option: String,
    /// Raw value typed so far.
    pub value: Value,
}

impl AutocompleteRequest {
    /// Returns the typed text, or an empty string for non-text values.
    #[must_use]
    pub fn text(&self) -> &str {
        self.value.as_str().unwrap_or_default()
    }
}

/// Command handler backed by a closure; see [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Adapts an async closure into a [`CommandHandler`].
///
/// # Examples
///
/// ```
/// use dawn::command::ports::handler_fn;
///
/// let ping = handler_fn(|context, _arguments| async move {
///     context.create_response("Pong!").await?;
///     Ok(())
/// });
/// # let _ = ping;
/// ```
#[must_use]
pub const fn handler_fn<F, Fut>(callback: F) -> HandlerFn<F>
where
    F: Fn(InteractionContext, CommandArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    HandlerFn(callback)
}

#[async_trait]
impl<F, Fut> CommandHandler for HandlerFn<F>
where
    F: Fn(InteractionContext, CommandArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(
        &self,
        context: InteractionContext,
        arguments: CommandArguments,
    ) -> HandlerResult {
        (self.0)(context, arguments).await
    }
}

/// Autocomplete handler backed by a closure; see [`autocomplete_fn`].
#[derive(Clone)]
pub struct AutocompleteFn<F>(F);

/// Adapts an async closure into an [`AutocompleteHandler`].
#[must_use]
pub const fn autocomplete_fn<F, Fut>(callback: F) -> AutocompleteFn<F>
where
    F: Fn(AutocompleteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AutocompleteResult> + Send + 'static,
{
    AutocompleteFn(callback)
}

#[async_trait]
impl<F, Fut> AutocompleteHandler for AutocompleteFn<F>
where
    F: Fn(AutocompleteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AutocompleteResult> + Send + 'static,
{
    async fn suggest(&self, request: AutocompleteRequest) -> AutocompleteResult {
        (self.0)(request).await
    }
}

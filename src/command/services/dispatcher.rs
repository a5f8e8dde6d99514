//! Routing of inbound interactions to their handlers.

use super::decode::{DecodeError, decode_arguments};
use super::registry::{CommandRegistry, ResolveError, ResolvedCommand};
use crate::command::domain::{Interaction, InteractionKind, OptionChoice, ResponseState};
use crate::command::ports::{
    AutocompleteRequest, DispatchFailure, DispatchReporter, DispatchStage, HandlerError,
    InteractionContext, PlatformClient, PlatformError,
};
use mockable::Clock;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;

/// Maximum number of suggestions the platform accepts.
const MAX_SUGGESTIONS: usize = 25;

/// Errors ending the processing of one interaction.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The registry lock was poisoned by a panicking writer.
    #[error("command registry lock poisoned")]
    RegistryPoisoned,

    /// The interaction names no registered command; it is dropped.
    #[error(transparent)]
    Unresolved(#[from] ResolveError),

    /// The options could not be decoded; the handler was not invoked.
    #[error("cannot decode `{command}`: {source}")]
    Decode {
        /// Command path.
        command: String,
        /// Decoding failure.
        #[source]
        source: DecodeError,
    },

    /// The resolved node has no handler.
    #[error("`{0}` has no handler bound")]
    MissingHandler(String),

    /// The handler returned an error.
    #[error("handler for `{command}` failed: {source}")]
    Handler {
        /// Command path.
        command: String,
        /// Handler failure.
        #[source]
        source: HandlerError,
    },

    /// The handler panicked; the panic was contained to this interaction.
    #[error("handler for `{command}` panicked: {message}")]
    HandlerPanicked {
        /// Command path.
        command: String,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// An autocomplete event carried no focused option.
    #[error("autocomplete for `{0}` has no focused option")]
    NoFocusedOption(String),

    /// The focused option has no autocomplete handler bound.
    #[error("option `{option}` of `{command}` has no autocomplete handler")]
    NoAutocompleteHandler {
        /// Command path.
        command: String,
        /// Focused option.
        option: String,
    },

    /// The autocomplete handler returned an error.
    #[error("autocomplete for `{command}` option `{option}` failed: {source}")]
    Autocomplete {
        /// Command path.
        command: String,
        /// Focused option.
        option: String,
        /// Handler failure.
        #[source]
        source: HandlerError,
    },

    /// Suggestions could not be delivered.
    #[error("cannot deliver suggestions for `{command}`: {source}")]
    Suggestions {
        /// Command path.
        command: String,
        /// Platform failure.
        #[source]
        source: PlatformError,
    },
}

impl DispatchError {
    /// Returns the phase this error belongs to, or `None` for dropped events.
    #[must_use]
    pub const fn stage(&self) -> Option<DispatchStage> {
        match self {
            Self::RegistryPoisoned | Self::Unresolved(_) => None,
            Self::Decode { .. } => Some(DispatchStage::Decoding),
            Self::MissingHandler(_) | Self::Handler { .. } | Self::HandlerPanicked { .. } => {
                Some(DispatchStage::Invoking)
            }
            Self::NoFocusedOption(_)
            | Self::NoAutocompleteHandler { .. }
            | Self::Autocomplete { .. }
            | Self::Suggestions { .. } => Some(DispatchStage::Autocompleting),
        }
    }
}

/// Result type for dispatch.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// How an interaction finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion.
    Completed {
        /// Response state the handler left behind.
        state: ResponseState,
    },
    /// Autocomplete suggestions were delivered.
    Suggested {
        /// Number of suggestions sent.
        count: usize,
    },
}

/// Resolves, decodes, and invokes one interaction at a time.
///
/// The registry read lock is held only during resolution, never across a
/// suspension point. Handlers run on their own task, so a panicking handler
/// surfaces as [`DispatchError::HandlerPanicked`]. Failures past resolution
/// are sent to the reporter and returned to the caller.
pub struct Dispatcher {
    registry: Arc<RwLock<CommandRegistry>>,
    platform: Arc<dyn PlatformClient>,
    reporter: Arc<dyn DispatchReporter>,
    clock: Arc<dyn Clock + Send + Sync>,
    response_timeout: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher over a shared registry.
    #[must_use]
    pub fn new(
        registry: Arc<RwLock<CommandRegistry>>,
        platform: Arc<dyn PlatformClient>,
        reporter: Arc<dyn DispatchReporter>,
        clock: Arc<dyn Clock + Send + Sync>,
        response_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            platform,
            reporter,
            clock,
            response_timeout,
        }
    }

    /// Processes one interaction.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unresolved`] for events naming no registered
    /// command, and reports then returns every later failure.
    pub async fn dispatch(&self, interaction: Interaction) -> DispatchResult<DispatchOutcome> {
        let resolved = match self.resolve(&interaction) {
            Ok(resolved) => resolved,
            Err(err) => {
                debug!(
                    interaction_id = %interaction.id,
                    command = %interaction.command_path(),
                    error = %err,
                    "dropping interaction"
                );
                return Err(err);
            }
        };

        let result = match interaction.kind {
            InteractionKind::Command => self.invoke(&resolved, interaction.clone()).await,
            InteractionKind::Autocomplete => self.suggest(&resolved, interaction.clone()).await,
        };
        if let Err(err) = &result {
            self.report(&interaction, err);
        }
        result
    }

    fn resolve(&self, interaction: &Interaction) -> DispatchResult<ResolvedCommand> {
        let registry = self
            .registry
            .read()
            .map_err(|_| DispatchError::RegistryPoisoned)?;
        Ok(registry.resolve(
            interaction.scope,
            &interaction.command_name,
            &interaction.subcommand_path,
        )?)
    }

    async fn invoke(
        &self,
        resolved: &ResolvedCommand,
        interaction: Interaction,
    ) -> DispatchResult<DispatchOutcome> {
        let command = interaction.command_path();
        let arguments = decode_arguments(&*self.platform, &resolved.leaf, &interaction)
            .await
            .map_err(|source| DispatchError::Decode {
                command: command.clone(),
                source,
            })?;
        let handler = resolved
            .leaf
            .handler()
            .ok_or_else(|| DispatchError::MissingHandler(command.clone()))?;

        let context = InteractionContext::new(
            interaction,
            Arc::clone(&self.platform),
            self.response_timeout,
        );
        let task_handler = Arc::clone(handler);
        let task_context = context.clone();
        contain(async move { task_handler.handle(task_context, arguments).await })
            .await
            .map_err(|message| DispatchError::HandlerPanicked {
                command: command.clone(),
                message,
            })?
            .map_err(|source| DispatchError::Handler { command, source })?;
        Ok(DispatchOutcome::Completed {
            state: context.response_state().await,
        })
    }

    async fn suggest(
        &self,
        resolved: &ResolvedCommand,
        interaction: Interaction,
    ) -> DispatchResult<DispatchOutcome> {
        let command = interaction.command_path();
        let focused = interaction
            .focused_option()
            .cloned()
            .ok_or_else(|| DispatchError::NoFocusedOption(command.clone()))?;
        let handler = resolved
            .leaf
            .autocomplete_handler(&focused.name)
            .ok_or_else(|| DispatchError::NoAutocompleteHandler {
                command: command.clone(),
                option: focused.name.clone(),
            })?;

        let token = interaction.token.clone();
        let request = AutocompleteRequest {
            interaction,
            option: focused.name.clone(),
            value: focused.value,
        };
        let task_handler = Arc::clone(handler);
        let mut choices: Vec<OptionChoice> =
            contain(async move { task_handler.suggest(request).await })
                .await
                .unwrap_or_else(|message| Err(HandlerError::failed(format!("panicked: {message}"))))
                .map_err(|source| DispatchError::Autocomplete {
                    command: command.clone(),
                    option: focused.name,
                    source,
                })?;
        choices.truncate(MAX_SUGGESTIONS);

        self.platform
            .create_autocomplete_response(&token, &choices)
            .await
            .map_err(|source| DispatchError::Suggestions { command, source })?;
        Ok(DispatchOutcome::Suggested {
            count: choices.len(),
        })
    }

    fn report(&self, interaction: &Interaction, error: &DispatchError) {
        let Some(stage) = error.stage() else {
            return;
        };
        self.reporter.report(&DispatchFailure {
            interaction_id: interaction.id,
            command: interaction.command_path(),
            scope: interaction.scope,
            stage,
            reason: error.to_string(),
            occurred_at: self.clock.utc(),
        });
    }
}

/// Runs handler code on its own task so a panic ends only that task.
async fn contain<T>(work: impl Future<Output = T> + Send + 'static) -> Result<T, String>
where
    T: Send + 'static,
{
    tokio::spawn(work).await.map_err(panic_message)
}

fn panic_message(err: JoinError) -> String {
    err.try_into_panic().map_or_else(
        |_| "handler task was cancelled".to_owned(),
        |payload| {
            payload
                .downcast_ref::<&str>()
                .map(|message| (*message).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_owned())
        },
    )
}

//! In-memory platform adapter for tests and offline runs.

use crate::command::{
    domain::{
        CommandDefinition, CommandId, Entity, EntityKind, InitialResponse, InteractionToken,
        OptionChoice, RegisteredCommand, ResponsePayload, ScopeId, ScopeTarget, Snowflake,
    },
    ports::{PlatformClient, PlatformError, PlatformResult},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// First identifier handed out for created commands.
const FIRST_COMMAND_ID: u64 = 1_000;

/// Kinds of calls the platform accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformOperation {
    /// `fetch_commands`.
    FetchCommands,
    /// `upsert_commands`.
    UpsertCommands,
    /// `delete_command`.
    DeleteCommand,
    /// `create_interaction_response`.
    CreateResponse,
    /// `edit_interaction_response`.
    EditResponse,
    /// `create_followup`.
    CreateFollowup,
    /// `create_autocomplete_response`.
    CreateAutocompleteResponse,
    /// `resolve_entity`.
    ResolveEntity,
}

/// One recorded call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    /// Commands of a scope were listed.
    FetchCommands(ScopeTarget),
    /// Commands were upserted into a scope.
    UpsertCommands {
        /// Target scope.
        scope: ScopeTarget,
        /// Upserted definitions.
        commands: Vec<CommandDefinition>,
    },
    /// A command was deleted.
    DeleteCommand {
        /// Target scope.
        scope: ScopeTarget,
        /// Deleted command.
        id: CommandId,
    },
    /// An initial response was sent.
    CreateResponse {
        /// Raw interaction token.
        token: String,
        /// Sent response.
        response: InitialResponse,
    },
    /// The initial response was edited.
    EditResponse {
        /// Raw interaction token.
        token: String,
        /// New content.
        payload: ResponsePayload,
    },
    /// A follow-up was sent.
    CreateFollowup {
        /// Raw interaction token.
        token: String,
        /// Follow-up content.
        payload: ResponsePayload,
    },
    /// Autocomplete suggestions were sent.
    CreateAutocompleteResponse {
        /// Raw interaction token.
        token: String,
        /// Sent suggestions.
        choices: Vec<OptionChoice>,
    },
    /// An entity was looked up.
    ResolveEntity {
        /// Requested kind.
        kind: EntityKind,
        /// Requested identifier.
        id: Snowflake,
    },
}

impl PlatformCall {
    /// Returns the operation this call belongs to.
    #[must_use]
    pub const fn operation(&self) -> PlatformOperation {
        match self {
            Self::FetchCommands(_) => PlatformOperation::FetchCommands,
            Self::UpsertCommands { .. } => PlatformOperation::UpsertCommands,
            Self::DeleteCommand { .. } => PlatformOperation::DeleteCommand,
            Self::CreateResponse { .. } => PlatformOperation::CreateResponse,
            Self::EditResponse { .. } => PlatformOperation::EditResponse,
            Self::CreateFollowup { .. } => PlatformOperation::CreateFollowup,
            Self::CreateAutocompleteResponse { .. } => {
                PlatformOperation::CreateAutocompleteResponse
            }
            Self::ResolveEntity { .. } => PlatformOperation::ResolveEntity,
        }
    }
}

/// Deterministic platform double.
///
/// Keeps registered commands per scope, records every call, answers entity
/// lookups from a seeded table, and can be told to fail or stall specific
/// operations. Failed calls are recorded but change nothing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlatform {
    state: Arc<RwLock<InMemoryPlatformState>>,
}

#[derive(Debug, Default)]
struct InMemoryPlatformState {
    commands: BTreeMap<ScopeTarget, Vec<RegisteredCommand>>,
    issued_ids: u64,
    calls: Vec<PlatformCall>,
    entities: BTreeMap<Snowflake, Entity>,
    failures: BTreeMap<PlatformOperation, PlatformError>,
    latency: Option<Duration>,
}

impl InMemoryPlatform {
    /// Creates an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command remotely without recording a call.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn seed_command(
        &self,
        scope: ScopeTarget,
        definition: CommandDefinition,
    ) -> PlatformResult<CommandId> {
        let mut state = self.write()?;
        Ok(state.store(scope, definition).id)
    }

    /// Makes an entity available to lookups.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn add_entity(&self, entity: Entity) -> PlatformResult<()> {
        self.write()?.entities.insert(entity.id, entity);
        Ok(())
    }

    /// Makes every later call of `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn fail_on(
        &self,
        operation: PlatformOperation,
        error: PlatformError,
    ) -> PlatformResult<()> {
        self.write()?.failures.insert(operation, error);
        Ok(())
    }

    /// Removes every injected failure.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn clear_failures(&self) -> PlatformResult<()> {
        self.write()?.failures.clear();
        Ok(())
    }

    /// Delays every response-related call by `latency`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn set_latency(&self, latency: Duration) -> PlatformResult<()> {
        self.write()?.latency = Some(latency);
        Ok(())
    }

    /// Returns every recorded call.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn calls(&self) -> PlatformResult<Vec<PlatformCall>> {
        Ok(self.read()?.calls.clone())
    }

    /// Returns the recorded calls of one operation.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn calls_of(&self, operation: PlatformOperation) -> PlatformResult<Vec<PlatformCall>> {
        Ok(self
            .read()?
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect())
    }

    /// Returns the commands registered in a scope.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when lock acquisition fails.
    pub fn commands(&self, scope: ScopeTarget) -> PlatformResult<Vec<RegisteredCommand>> {
        Ok(self
            .read()?
            .commands
            .get(&scope)
            .cloned()
            .unwrap_or_default())
    }

    fn read(&self) -> PlatformResult<RwLockReadGuard<'_, InMemoryPlatformState>> {
        self.state
            .read()
            .map_err(|err| PlatformError::request(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> PlatformResult<RwLockWriteGuard<'_, InMemoryPlatformState>> {
        self.state
            .write()
            .map_err(|err| PlatformError::request(std::io::Error::other(err.to_string())))
    }

    /// Records a call and returns the injected failure for its operation.
    fn record(
        &self,
        call: PlatformCall,
    ) -> PlatformResult<RwLockWriteGuard<'_, InMemoryPlatformState>> {
        let mut state = self.write()?;
        let operation = call.operation();
        state.calls.push(call);
        if let Some(error) = state.failures.get(&operation).cloned() {
            return Err(error);
        }
        Ok(state)
    }

    async fn stall(&self) -> PlatformResult<()> {
        let latency = self.read()?.latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn respond(&self, call: PlatformCall) -> PlatformResult<()> {
        self.stall().await?;
        let state = self.record(call)?;
        drop(state);
        Ok(())
    }
}

impl InMemoryPlatformState {
    fn store(&mut self, scope: ScopeTarget, definition: CommandDefinition) -> RegisteredCommand {
        let commands = self.commands.entry(scope).or_default();
        if let Some(existing) = commands
            .iter_mut()
            .find(|command| command.name() == definition.name)
        {
            existing.definition = definition;
            return existing.clone();
        }
        self.issued_ids += 1;
        let registered = RegisteredCommand::new(
            CommandId::new(FIRST_COMMAND_ID + self.issued_ids),
            definition,
        );
        commands.push(registered.clone());
        registered
    }
}

#[async_trait]
impl PlatformClient for InMemoryPlatform {
    async fn fetch_commands(&self, scope: ScopeTarget) -> PlatformResult<Vec<RegisteredCommand>> {
        let state = self.record(PlatformCall::FetchCommands(scope))?;
        Ok(state.commands.get(&scope).cloned().unwrap_or_default())
    }

    async fn upsert_commands(
        &self,
        scope: ScopeTarget,
        commands: &[CommandDefinition],
    ) -> PlatformResult<Vec<RegisteredCommand>> {
        let mut state = self.record(PlatformCall::UpsertCommands {
            scope,
            commands: commands.to_vec(),
        })?;
        Ok(commands
            .iter()
            .map(|definition| state.store(scope, definition.clone()))
            .collect())
    }

    async fn delete_command(&self, scope: ScopeTarget, id: CommandId) -> PlatformResult<()> {
        let mut state = self.record(PlatformCall::DeleteCommand { scope, id })?;
        let commands = state.commands.entry(scope).or_default();
        let before = commands.len();
        commands.retain(|command| command.id != id);
        if commands.len() == before {
            return Err(PlatformError::Rejected(format!(
                "unknown command {id} in {scope}"
            )));
        }
        if commands.is_empty() {
            state.commands.remove(&scope);
        }
        Ok(())
    }

    async fn create_interaction_response(
        &self,
        token: &InteractionToken,
        response: &InitialResponse,
    ) -> PlatformResult<()> {
        self.respond(PlatformCall::CreateResponse {
            token: token.as_str().to_owned(),
            response: response.clone(),
        })
        .await
    }

    async fn edit_interaction_response(
        &self,
        token: &InteractionToken,
        payload: &ResponsePayload,
    ) -> PlatformResult<()> {
        self.respond(PlatformCall::EditResponse {
            token: token.as_str().to_owned(),
            payload: payload.clone(),
        })
        .await
    }

    async fn create_followup(
        &self,
        token: &InteractionToken,
        payload: &ResponsePayload,
    ) -> PlatformResult<()> {
        self.respond(PlatformCall::CreateFollowup {
            token: token.as_str().to_owned(),
            payload: payload.clone(),
        })
        .await
    }

    async fn create_autocomplete_response(
        &self,
        token: &InteractionToken,
        choices: &[OptionChoice],
    ) -> PlatformResult<()> {
        self.respond(PlatformCall::CreateAutocompleteResponse {
            token: token.as_str().to_owned(),
            choices: choices.to_vec(),
        })
        .await
    }

    async fn resolve_entity(
        &self,
        _scope: Option<ScopeId>,
        kind: EntityKind,
        id: Snowflake,
    ) -> PlatformResult<Option<Entity>> {
        let state = self.record(PlatformCall::ResolveEntity { kind, id })?;
        Ok(state.entities.get(&id).cloned())
    }
}

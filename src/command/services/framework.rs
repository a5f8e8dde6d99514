//! Composition root tying registry, synchronizer, and dispatcher together.

use super::dispatcher::{DispatchError, DispatchOutcome, DispatchResult, Dispatcher};
use super::module::CommandModule;
use super::node::CommandNode;
use super::registry::{CommandRegistry, RegistryError};
use super::synchronizer::{CommandSynchronizer, SyncError, SyncReport};
use crate::command::adapters::TracingDispatchReporter;
use crate::command::domain::{CommandDefinition, CommandName, Interaction, ScopeTarget};
use crate::command::ports::{DispatchReporter, PlatformClient};
use crate::config::FrameworkConfig;
use mockable::{Clock, DefaultClock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Errors raised by framework operations.
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    /// Registration or removal was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Synchronization failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A lock was poisoned by a panicking writer.
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),

    /// A module with the same name is already loaded.
    #[error("module `{0}` is already loaded")]
    ModuleAlreadyLoaded(String),

    /// No module with that name is loaded.
    #[error("module `{0}` is not loaded")]
    ModuleNotLoaded(String),

    /// A module declares two commands with the same name.
    #[error("module `{module}` already declares command `{command}`")]
    DuplicateModuleCommand {
        /// Module name.
        module: String,
        /// Command name.
        command: String,
    },
}

/// Result type for framework operations.
pub type FrameworkResult<T> = Result<T, FrameworkError>;

type ModuleEntries = Vec<(ScopeTarget, CommandName)>;

/// Entry point for host applications.
///
/// Build command trees, register them (directly or through modules), call
/// [`Self::on_ready`] once the platform client is connected, then feed every
/// inbound interaction to [`Self::handle_interaction`].
pub struct CommandFramework {
    registry: Arc<RwLock<CommandRegistry>>,
    platform: Arc<dyn PlatformClient>,
    reporter: Arc<dyn DispatchReporter>,
    clock: Arc<dyn Clock + Send + Sync>,
    config: FrameworkConfig,
    synchronizer: Arc<CommandSynchronizer>,
    dispatcher: Arc<Dispatcher>,
    modules: Mutex<BTreeMap<String, ModuleEntries>>,
}

impl CommandFramework {
    /// Creates a framework reporting failures through `tracing`.
    #[must_use]
    pub fn new(platform: Arc<dyn PlatformClient>, config: FrameworkConfig) -> Self {
        let registry = Arc::new(RwLock::new(CommandRegistry::with_default_scopes(
            config.default_scopes.iter().copied(),
        )));
        let reporter: Arc<dyn DispatchReporter> = Arc::new(TracingDispatchReporter::new());
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
        let synchronizer = Arc::new(CommandSynchronizer::new(
            Arc::clone(&platform),
            Arc::clone(&clock),
            config.prune_remote,
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&platform),
            Arc::clone(&reporter),
            Arc::clone(&clock),
            config.response_timeout(),
        ));
        Self {
            registry,
            platform,
            reporter,
            clock,
            config,
            synchronizer,
            dispatcher,
            modules: Mutex::new(BTreeMap::new()),
        }
    }

    /// Replaces the failure reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn DispatchReporter>) -> Self {
        self.reporter = reporter;
        self.dispatcher = self.build_dispatcher();
        self
    }

    /// Replaces the clock used for report timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self.dispatcher = self.build_dispatcher();
        self.synchronizer = Arc::new(CommandSynchronizer::new(
            Arc::clone(&self.platform),
            Arc::clone(&self.clock),
            self.config.prune_remote,
        ));
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    /// Registers a root command.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::Registry`] when the registry rejects the
    /// node.
    pub fn register(&self, node: CommandNode) -> FrameworkResult<BTreeSet<ScopeTarget>> {
        Ok(self.write_registry()?.register(node)?)
    }

    /// Removes a root command from one scope.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::Registry`] when nothing is registered under
    /// the key.
    pub fn unregister(&self, scope: ScopeTarget, name: &str) -> FrameworkResult<()> {
        self.write_registry()?.unregister(scope, name)?;
        Ok(())
    }

    /// Registers every command of a module, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::ModuleAlreadyLoaded`] for a repeated name, or
    /// the first registry error after rolling back.
    pub fn load_module(&self, module: CommandModule) -> FrameworkResult<()> {
        let mut modules = self.lock_modules()?;
        let (name, defaults, commands) = module.into_parts();
        if modules.contains_key(&name) {
            return Err(FrameworkError::ModuleAlreadyLoaded(name));
        }

        let mut registry = self.write_registry()?;
        let mut entries = ModuleEntries::new();
        for command in commands {
            let command_name = command.name().clone();
            match registry.register_with_defaults(command, &defaults) {
                Ok(targets) => entries.extend(
                    targets
                        .into_iter()
                        .map(|target| (target, command_name.clone())),
                ),
                Err(err) => {
                    for (target, registered) in &entries {
                        if let Err(skipped) = registry.unregister(*target, registered.as_str()) {
                            debug!(
                                module = %name,
                                command = %registered,
                                scope = %target,
                                error = %skipped,
                                "rollback skipped command"
                            );
                        }
                    }
                    return Err(err.into());
                }
            }
        }
        drop(registry);

        info!(module = %name, entries = entries.len(), "loaded command module");
        modules.insert(name, entries);
        Ok(())
    }

    /// Removes every command a module registered.
    ///
    /// Remote registrations disappear on the next synchronization.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::ModuleNotLoaded`] for an unknown name.
    pub fn unload_module(&self, name: &str) -> FrameworkResult<usize> {
        let mut modules = self.lock_modules()?;
        let entries = modules
            .remove(name)
            .ok_or_else(|| FrameworkError::ModuleNotLoaded(name.to_owned()))?;
        let mut registry = self.write_registry()?;
        let mut removed = 0;
        for (target, command) in &entries {
            match registry.unregister(*target, command.as_str()) {
                Ok(_) => removed += 1,
                Err(skipped) => debug!(
                    module = %name,
                    command = %command,
                    scope = %target,
                    error = %skipped,
                    "module command was already unregistered"
                ),
            }
        }
        info!(module = %name, removed, "unloaded command module");
        Ok(removed)
    }

    /// Returns the names of loaded modules.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::Poisoned`] when the module table is poisoned.
    pub fn loaded_modules(&self) -> FrameworkResult<Vec<String>> {
        Ok(self.lock_modules()?.keys().cloned().collect())
    }

    /// Returns the serialized commands of one scope.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::Poisoned`] when the registry is poisoned.
    pub fn definitions(&self, scope: ScopeTarget) -> FrameworkResult<Vec<CommandDefinition>> {
        Ok(self.read_registry()?.definitions(scope))
    }

    /// Converges the platform's registrations with the registry.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::Sync`] when a platform call fails.
    pub async fn synchronize(&self) -> FrameworkResult<SyncReport> {
        let desired = self.read_registry()?.snapshot();
        Ok(self.synchronizer.synchronize(&desired).await?)
    }

    /// Startup hook to call once the platform client reports ready.
    ///
    /// # Errors
    ///
    /// See [`Self::synchronize`].
    pub async fn on_ready(&self) -> FrameworkResult<SyncReport> {
        info!("platform ready, synchronizing commands");
        self.synchronize().await
    }

    /// Processes one interaction on the current task.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub async fn dispatch(&self, interaction: Interaction) -> DispatchResult<DispatchOutcome> {
        self.dispatcher.dispatch(interaction).await
    }

    /// Processes one interaction on its own task.
    ///
    /// Slow handlers never delay unrelated interactions. Failures are
    /// reported by the dispatcher; the handle exposes the outcome for callers
    /// that want it.
    pub fn handle_interaction(
        &self,
        interaction: Interaction,
    ) -> JoinHandle<DispatchResult<DispatchOutcome>> {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            let result = dispatcher.dispatch(interaction).await;
            if let Err(DispatchError::RegistryPoisoned) = &result {
                error!("command registry lock poisoned; interaction dropped");
            }
            result
        })
    }

    fn build_dispatcher(&self) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.platform),
            Arc::clone(&self.reporter),
            Arc::clone(&self.clock),
            self.config.response_timeout(),
        ))
    }

    fn read_registry(&self) -> FrameworkResult<RwLockReadGuard<'_, CommandRegistry>> {
        self.registry
            .read()
            .map_err(|_| FrameworkError::Poisoned("registry"))
    }

    fn write_registry(&self) -> FrameworkResult<RwLockWriteGuard<'_, CommandRegistry>> {
        self.registry
            .write()
            .map_err(|_| FrameworkError::Poisoned("registry"))
    }

    fn lock_modules(&self) -> FrameworkResult<MutexGuard<'_, BTreeMap<String, ModuleEntries>>> {
        self.modules
            .lock()
            .map_err(|_| FrameworkError::Poisoned("module table"))
    }
}

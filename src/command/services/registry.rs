//! In-process registry of declared command trees.

use super::node::{CommandKind, CommandNode};
use crate::command::domain::{CommandDefinition, CommandName, ScopeId, ScopeTarget};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while registering or removing commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The (scope, name) key is taken.
    #[error("command `{name}` already exists in {scope}")]
    AlreadyExists {
        /// Scope holding the existing command.
        scope: ScopeTarget,
        /// Command name.
        name: String,
    },

    /// The name would be visible both globally and in a specific scope.
    #[error("command `{name}` requested in {requested} collides with {existing}")]
    ScopeConflict {
        /// Command name.
        name: String,
        /// Scope already holding the name.
        existing: ScopeTarget,
        /// Scope the registration asked for.
        requested: ScopeTarget,
    },

    /// An invocable node has no handler.
    #[error("command `{0}` has no handler bound")]
    UnboundHandler(String),

    /// A group has no subcommands.
    #[error("group `{0}` has no subcommands")]
    EmptyGroup(String),

    /// A subcommand was registered without its group.
    #[error("subcommand `{0}` cannot be registered at the top level")]
    NotARoot(String),

    /// Nothing is registered under the (scope, name) key.
    #[error("command `{name}` is not registered in {scope}")]
    NotRegistered {
        /// Requested scope.
        scope: ScopeTarget,
        /// Requested name.
        name: String,
    },
}

/// Result type for registry mutations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while resolving an inbound command path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No command of that name is visible in the scope or globally.
    #[error("unknown command `{name}`")]
    UnknownCommand {
        /// Requested command name.
        name: String,
        /// Scope the event arrived in.
        scope: Option<ScopeId>,
    },

    /// The group has no subcommand with that path.
    #[error("group `{group}` has no subcommand `{path}`")]
    UnknownSubcommand {
        /// Group name.
        group: String,
        /// Requested subcommand path.
        path: String,
    },

    /// The event named a group without a subcommand.
    #[error("group `{0}` is not invocable without a subcommand")]
    NotInvocable(String),

    /// The event named a subcommand of a command that has none.
    #[error("command `{command}` has no subcommands, got `{path}`")]
    UnexpectedSubcommand {
        /// Command name.
        command: String,
        /// Supplied subcommand path.
        path: String,
    },
}

/// Outcome of resolving a command path.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    /// Registry partition the root was found in.
    pub scope: ScopeTarget,
    /// Top-level node.
    pub root: Arc<CommandNode>,
    /// Invocable node the path leads to.
    pub leaf: Arc<CommandNode>,
}

/// Registry of root command nodes keyed by (scope, name).
///
/// Registration is the commit point of a command tree: nodes are immutable
/// once inserted. A root node is shared between every scope it targets.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    default_scopes: BTreeSet<ScopeId>,
    commands: BTreeMap<ScopeTarget, BTreeMap<CommandName, Arc<CommandNode>>>,
}

impl CommandRegistry {
    /// Creates an empty registry whose inheriting commands go global.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with default scopes for inheriting commands.
    #[must_use]
    pub fn with_default_scopes(scopes: impl IntoIterator<Item = ScopeId>) -> Self {
        Self {
            default_scopes: scopes.into_iter().collect(),
            commands: BTreeMap::new(),
        }
    }

    /// Returns the scopes applied to inheriting commands.
    #[must_use]
    pub const fn default_scopes(&self) -> &BTreeSet<ScopeId> {
        &self.default_scopes
    }

    /// Registers a root node under every scope it targets.
    ///
    /// Either every target accepts the node or the registry is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the tree is incomplete or a key is
    /// taken.
    pub fn register(&mut self, node: CommandNode) -> RegistryResult<BTreeSet<ScopeTarget>> {
        self.register_with_defaults(node, &BTreeSet::new())
    }

    /// Registers a root node, preferring `defaults` over the registry's own
    /// default scopes for inheriting nodes.
    ///
    /// # Errors
    ///
    /// See [`Self::register`].
    pub fn register_with_defaults(
        &mut self,
        node: CommandNode,
        defaults: &BTreeSet<ScopeId>,
    ) -> RegistryResult<BTreeSet<ScopeTarget>> {
        check_complete(&node)?;
        let effective = if defaults.is_empty() {
            &self.default_scopes
        } else {
            defaults
        };
        let targets = node.scope().targets(effective);
        for target in &targets {
            self.check_available(*target, node.name())?;
        }

        let shared = Arc::new(node);
        for target in &targets {
            self.commands
                .entry(*target)
                .or_default()
                .insert(shared.name().clone(), Arc::clone(&shared));
        }
        Ok(targets)
    }

    /// Removes a root node from one scope.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] when the key is absent.
    pub fn unregister(&mut self, scope: ScopeTarget, name: &str) -> RegistryResult<Arc<CommandNode>> {
        let not_registered = || RegistryError::NotRegistered {
            scope,
            name: name.to_owned(),
        };
        let commands = self.commands.get_mut(&scope).ok_or_else(not_registered)?;
        let removed = commands.remove(name).ok_or_else(not_registered)?;
        if commands.is_empty() {
            self.commands.remove(&scope);
        }
        Ok(removed)
    }

    /// Returns the root node registered under a key.
    #[must_use]
    pub fn get(&self, scope: ScopeTarget, name: &str) -> Option<&Arc<CommandNode>> {
        self.commands.get(&scope)?.get(name)
    }

    /// Resolves an inbound command path to its invocable node.
    ///
    /// The event's own scope is searched first, then the global set.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the path names no invocable node.
    pub fn resolve(
        &self,
        scope: Option<ScopeId>,
        name: &str,
        path: &[String],
    ) -> Result<ResolvedCommand, ResolveError> {
        let (target, root) = scope
            .map(ScopeTarget::Scope)
            .into_iter()
            .chain(std::iter::once(ScopeTarget::Global))
            .find_map(|target| self.get(target, name).map(|root| (target, root)))
            .ok_or_else(|| ResolveError::UnknownCommand {
                name: name.to_owned(),
                scope,
            })?;

        let leaf = match (root.kind(), path) {
            (CommandKind::Group, []) => return Err(ResolveError::NotInvocable(name.to_owned())),
            (CommandKind::Group, [subcommand]) => root
                .child(subcommand)
                .ok_or_else(|| ResolveError::UnknownSubcommand {
                    group: name.to_owned(),
                    path: subcommand.clone(),
                })?,
            (CommandKind::Group, _) => {
                return Err(ResolveError::UnknownSubcommand {
                    group: name.to_owned(),
                    path: path.join(" "),
                });
            }
            (_, []) => root,
            (_, _) => {
                return Err(ResolveError::UnexpectedSubcommand {
                    command: name.to_owned(),
                    path: path.join(" "),
                });
            }
        };

        Ok(ResolvedCommand {
            scope: target,
            root: Arc::clone(root),
            leaf: Arc::clone(leaf),
        })
    }

    /// Returns every scope holding at least one command.
    #[must_use]
    pub fn scopes(&self) -> BTreeSet<ScopeTarget> {
        self.commands.keys().copied().collect()
    }

    /// Serializes the commands of one scope in name order.
    #[must_use]
    pub fn definitions(&self, scope: ScopeTarget) -> Vec<CommandDefinition> {
        self.commands
            .get(&scope)
            .map(|commands| commands.values().map(|node| node.to_definition()).collect())
            .unwrap_or_default()
    }

    /// Serializes the desired remote state of every scope.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<ScopeTarget, Vec<CommandDefinition>> {
        self.commands
            .keys()
            .map(|scope| (*scope, self.definitions(*scope)))
            .collect()
    }

    /// Returns the number of (scope, name) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.values().map(BTreeMap::len).sum()
    }

    /// Returns whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn check_available(&self, target: ScopeTarget, name: &CommandName) -> RegistryResult<()> {
        if self.get(target, name.as_str()).is_some() {
            return Err(RegistryError::AlreadyExists {
                scope: target,
                name: name.to_string(),
            });
        }
        let conflicting = self.commands.iter().find(|(existing, commands)| {
            existing.is_global() != target.is_global() && commands.contains_key(name.as_str())
        });
        match conflicting {
            Some((existing, _)) => Err(RegistryError::ScopeConflict {
                name: name.to_string(),
                existing: *existing,
                requested: target,
            }),
            None => Ok(()),
        }
    }
}

fn check_complete(node: &CommandNode) -> RegistryResult<()> {
    match node.kind() {
        CommandKind::Subcommand => Err(RegistryError::NotARoot(node.name().to_string())),
        CommandKind::Group if node.children().is_empty() => {
            Err(RegistryError::EmptyGroup(node.name().to_string()))
        }
        CommandKind::Group => node
            .children()
            .iter()
            .find(|child| child.handler().is_none())
            .map_or(Ok(()), |child| {
                Err(RegistryError::UnboundHandler(format!(
                    "{} {}",
                    node.name(),
                    child.name()
                )))
            }),
        CommandKind::Command if node.handler().is_none() => {
            Err(RegistryError::UnboundHandler(node.name().to_string()))
        }
        CommandKind::Command => Ok(()),
    }
}

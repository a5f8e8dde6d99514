//! Named bundles of commands loaded and unloaded together.

use super::framework::FrameworkError;
use super::node::CommandNode;
use crate::command::domain::ScopeId;
use std::collections::BTreeSet;

/// A named set of root commands sharing default scopes.
#[derive(Debug, Clone)]
pub struct CommandModule {
    name: String,
    default_scopes: BTreeSet<ScopeId>,
    commands: Vec<CommandNode>,
}

impl CommandModule {
    /// Creates an empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_scopes: BTreeSet::new(),
            commands: Vec::new(),
        }
    }

    /// Sets the scopes applied to commands that inherit their scope.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: impl IntoIterator<Item = ScopeId>) -> Self {
        self.default_scopes = scopes.into_iter().collect();
        self
    }

    /// Adds a root command.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::DuplicateModuleCommand`] when the module
    /// already holds a command of that name.
    pub fn with_command(mut self, command: CommandNode) -> Result<Self, FrameworkError> {
        if self
            .commands
            .iter()
            .any(|existing| existing.name() == command.name())
        {
            return Err(FrameworkError::DuplicateModuleCommand {
                module: self.name,
                command: command.name().to_string(),
            });
        }
        self.commands.push(command);
        Ok(self)
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the module's default scopes.
    #[must_use]
    pub const fn default_scopes(&self) -> &BTreeSet<ScopeId> {
        &self.default_scopes
    }

    /// Returns the module's commands.
    #[must_use]
    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    #[must_use]
    pub(crate) fn into_parts(self) -> (String, BTreeSet<ScopeId>, Vec<CommandNode>) {
        (self.name, self.default_scopes, self.commands)
    }
}

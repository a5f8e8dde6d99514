//! Command tree nodes: invocable commands, groups, and subcommands.

use crate::command::domain::{
    CommandDefinition, CommandDomainError, CommandName, CommandScope, DefinitionOption,
    DefinitionOptionKind, OptionSchema, validate_description,
};
use crate::command::ports::{AutocompleteHandler, CommandHandler};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Maximum number of options or subcommands per node.
const MAX_ENTRIES: usize = 25;

/// Structural role of a node in the command tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Top-level invocable command with options.
    Command,
    /// Top-level container of subcommands; not invocable itself.
    Group,
    /// Invocable command nested one level below a group.
    Subcommand,
}

impl CommandKind {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Group => "group",
            Self::Subcommand => "subcommand",
        }
    }

    /// Returns whether nodes of this kind run a handler.
    #[must_use]
    pub const fn is_invocable(self) -> bool {
        matches!(self, Self::Command | Self::Subcommand)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One node of a command tree.
///
/// Nodes are assembled incrementally and become immutable once handed to the
/// registry. A group owns its subcommands exclusively; subcommands cannot nest
/// further.
///
/// # Examples
///
/// ```
/// use dawn::command::domain::{OptionSchema, OptionType};
/// use dawn::command::services::CommandNode;
/// use dawn::command::ports::handler_fn;
///
/// let kick = CommandNode::subcommand("kick", "Remove a member")
///     .and_then(|node| node.with_option(OptionSchema::required("member", "Who", OptionType::User)?))
///     .and_then(|node| node.with_handler(handler_fn(|_context, _arguments| async { Ok(()) })))
///     .expect("valid subcommand");
/// let admin = CommandNode::group("admin", "Administration")
///     .and_then(|group| group.with_child(kick))
///     .expect("valid group");
///
/// assert!(admin.child("kick").is_some());
/// ```
#[derive(Clone)]
pub struct CommandNode {
    name: CommandName,
    description: String,
    kind: CommandKind,
    scope: CommandScope,
    options: Vec<OptionSchema>,
    children: Vec<Arc<CommandNode>>,
    handler: Option<Arc<dyn CommandHandler>>,
    autocompletes: BTreeMap<CommandName, Arc<dyn AutocompleteHandler>>,
}

impl CommandNode {
    /// Creates a top-level invocable command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError`] when the name or description is invalid.
    pub fn command(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CommandDomainError> {
        Self::new(CommandKind::Command, name, description)
    }

    /// Creates a top-level group.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError`] when the name or description is invalid.
    pub fn group(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CommandDomainError> {
        Self::new(CommandKind::Group, name, description)
    }

    /// Creates a subcommand to be attached to a group.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError`] when the name or description is invalid.
    pub fn subcommand(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CommandDomainError> {
        Self::new(CommandKind::Subcommand, name, description)
    }

    fn new(
        kind: CommandKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CommandDomainError> {
        let validated = CommandName::new(name)?;
        Ok(Self {
            description: validate_description(&validated, description)?,
            name: validated,
            kind,
            scope: CommandScope::Inherit,
            options: Vec::new(),
            children: Vec::new(),
            handler: None,
            autocompletes: BTreeMap::new(),
        })
    }

    /// Returns the node name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the node description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Returns the declared scope.
    #[must_use]
    pub const fn scope(&self) -> &CommandScope {
        &self.scope
    }

    /// Returns the option schemas in declaration order.
    #[must_use]
    pub fn options(&self) -> &[OptionSchema] {
        &self.options
    }

    /// Returns the option schema with the given name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionSchema> {
        self.options
            .iter()
            .find(|option| option.name().as_str() == name)
    }

    /// Returns the subcommands in declaration order.
    #[must_use]
    pub fn children(&self) -> &[Arc<Self>] {
        &self.children
    }

    /// Returns the subcommand with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Arc<Self>> {
        self.children
            .iter()
            .find(|child| child.name.as_str() == name)
    }

    /// Returns the bound handler.
    #[must_use]
    pub fn handler(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.handler.as_ref()
    }

    /// Returns the autocomplete handler bound to an option.
    #[must_use]
    pub fn autocomplete_handler(&self, option: &str) -> Option<&Arc<dyn AutocompleteHandler>> {
        self.autocompletes
            .iter()
            .find(|(name, _)| name.as_str() == option)
            .map(|(_, handler)| handler)
    }

    /// Sets the visibility scope of a top-level node.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError::StructuralMismatch`] for subcommands,
    /// whose scope is always their group's.
    pub fn set_scope(&mut self, scope: CommandScope) -> Result<(), CommandDomainError> {
        if self.kind == CommandKind::Subcommand {
            return Err(self.mismatch("set a scope"));
        }
        self.scope = scope;
        Ok(())
    }

    /// Builder form of [`Self::set_scope`].
    ///
    /// # Errors
    ///
    /// See [`Self::set_scope`].
    pub fn with_scope(mut self, scope: CommandScope) -> Result<Self, CommandDomainError> {
        self.set_scope(scope)?;
        Ok(self)
    }

    /// Appends an option to an invocable node.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError::StructuralMismatch`] on groups,
    /// [`CommandDomainError::DuplicateOption`] on a name collision,
    /// [`CommandDomainError::RequiredAfterOptional`] when a required option
    /// follows an optional one, or [`CommandDomainError::TooManyEntries`] past
    /// 25 options.
    pub fn add_option(&mut self, option: OptionSchema) -> Result<(), CommandDomainError> {
        if !self.kind.is_invocable() {
            return Err(self.mismatch("add options"));
        }
        if self.option(option.name().as_str()).is_some() {
            return Err(CommandDomainError::DuplicateOption {
                command: self.name.to_string(),
                option: option.name().to_string(),
            });
        }
        if option.is_required() && self.options.iter().any(|existing| !existing.is_required()) {
            return Err(CommandDomainError::RequiredAfterOptional {
                command: self.name.to_string(),
                option: option.name().to_string(),
            });
        }
        if self.options.len() >= MAX_ENTRIES {
            return Err(CommandDomainError::TooManyEntries(self.name.to_string()));
        }
        self.options.push(option);
        Ok(())
    }

    /// Builder form of [`Self::add_option`].
    ///
    /// # Errors
    ///
    /// See [`Self::add_option`].
    pub fn with_option(mut self, option: OptionSchema) -> Result<Self, CommandDomainError> {
        self.add_option(option)?;
        Ok(self)
    }

    /// Attaches a subcommand to a group.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError::StructuralMismatch`] when `self` is not a
    /// group or `child` is not a subcommand,
    /// [`CommandDomainError::DuplicateChild`] on a name collision, or
    /// [`CommandDomainError::TooManyEntries`] past 25 subcommands.
    pub fn add_child(&mut self, child: Self) -> Result<(), CommandDomainError> {
        if self.kind != CommandKind::Group {
            return Err(self.mismatch("add subcommands"));
        }
        if child.kind != CommandKind::Subcommand {
            return Err(child.mismatch("nest under a group"));
        }
        if self.child(child.name.as_str()).is_some() {
            return Err(CommandDomainError::DuplicateChild {
                group: self.name.to_string(),
                child: child.name.to_string(),
            });
        }
        if self.children.len() >= MAX_ENTRIES {
            return Err(CommandDomainError::TooManyEntries(self.name.to_string()));
        }
        self.children.push(Arc::new(child));
        Ok(())
    }

    /// Builder form of [`Self::add_child`].
    ///
    /// # Errors
    ///
    /// See [`Self::add_child`].
    pub fn with_child(mut self, child: Self) -> Result<Self, CommandDomainError> {
        self.add_child(child)?;
        Ok(self)
    }

    /// Binds the handler invoked for this node.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError::StructuralMismatch`] on groups or
    /// [`CommandDomainError::HandlerAlreadyBound`] when a handler exists.
    pub fn bind(&mut self, handler: impl CommandHandler + 'static) -> Result<(), CommandDomainError> {
        if !self.kind.is_invocable() {
            return Err(self.mismatch("bind a handler"));
        }
        if self.handler.is_some() {
            return Err(CommandDomainError::HandlerAlreadyBound(self.name.to_string()));
        }
        self.handler = Some(Arc::new(handler));
        Ok(())
    }

    /// Builder form of [`Self::bind`].
    ///
    /// # Errors
    ///
    /// See [`Self::bind`].
    pub fn with_handler(
        mut self,
        handler: impl CommandHandler + 'static,
    ) -> Result<Self, CommandDomainError> {
        self.bind(handler)?;
        Ok(self)
    }

    /// Binds the suggestion provider of an autocomplete option.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError::AutocompleteNotEnabled`] when the option
    /// is unknown or does not enable autocomplete, or
    /// [`CommandDomainError::AutocompleteAlreadyBound`] on double binding.
    pub fn bind_autocomplete(
        &mut self,
        option: &str,
        handler: impl AutocompleteHandler + 'static,
    ) -> Result<(), CommandDomainError> {
        let option_name = self
            .option(option)
            .filter(|schema| schema.is_autocomplete())
            .map(|schema| schema.name().clone())
            .ok_or_else(|| CommandDomainError::AutocompleteNotEnabled {
                command: self.name.to_string(),
                option: option.to_owned(),
            })?;
        if self.autocompletes.contains_key(&option_name) {
            return Err(CommandDomainError::AutocompleteAlreadyBound {
                command: self.name.to_string(),
                option: option_name.to_string(),
            });
        }
        self.autocompletes.insert(option_name, Arc::new(handler));
        Ok(())
    }

    /// Builder form of [`Self::bind_autocomplete`].
    ///
    /// # Errors
    ///
    /// See [`Self::bind_autocomplete`].
    pub fn with_autocomplete(
        mut self,
        option: &str,
        handler: impl AutocompleteHandler + 'static,
    ) -> Result<Self, CommandDomainError> {
        self.bind_autocomplete(option, handler)?;
        Ok(self)
    }

    /// Serializes the node into the platform description format.
    #[must_use]
    pub fn to_definition(&self) -> CommandDefinition {
        CommandDefinition {
            name: self.name.to_string(),
            description: self.description.clone(),
            options: self.definition_options(),
        }
    }

    fn definition_options(&self) -> Vec<DefinitionOption> {
        if self.kind == CommandKind::Group {
            return self
                .children
                .iter()
                .map(|child| DefinitionOption {
                    kind: DefinitionOptionKind::Subcommand,
                    name: child.name.to_string(),
                    description: child.description.clone(),
                    required: false,
                    choices: Vec::new(),
                    options: child.definition_options(),
                    channel_types: Vec::new(),
                    autocomplete: false,
                })
                .collect();
        }
        self.options.iter().map(option_definition).collect()
    }

    fn mismatch(&self, operation: &str) -> CommandDomainError {
        CommandDomainError::StructuralMismatch {
            node: self.name.to_string(),
            kind: self.kind.to_string(),
            operation: operation.to_owned(),
        }
    }
}

fn option_definition(option: &OptionSchema) -> DefinitionOption {
    DefinitionOption {
        kind: DefinitionOptionKind::Value(option.value_type()),
        name: option.name().to_string(),
        description: option.description().to_owned(),
        required: option.is_required(),
        choices: option.choices().to_vec(),
        options: Vec::new(),
        channel_types: option.channel_types().to_vec(),
        autocomplete: option.is_autocomplete(),
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandNode")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("scope", &self.scope)
            .field("options", &self.options)
            .field("children", &self.children)
            .field("handler_bound", &self.handler.is_some())
            .field(
                "autocompletes",
                &self.autocompletes.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

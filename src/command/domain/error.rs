//! Error types for command declaration and wire parsing.

use thiserror::Error;

/// Errors raised while declaring command trees.
///
/// These are programmer errors: they surface at startup and are never
/// corrected silently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandDomainError {
    /// A command or option name is empty after trimming.
    #[error("name must not be empty")]
    EmptyName,

    /// A name contains characters outside `[a-z0-9_-]`.
    #[error(
        "name '{0}' contains invalid characters (only lowercase alphanumeric, '-' and '_' allowed)"
    )]
    InvalidName(String),

    /// A name exceeds the 32-character platform limit.
    #[error("name exceeds 32 character limit: {0}")]
    NameTooLong(String),

    /// A description is empty after trimming.
    #[error("description for '{0}' must not be empty")]
    EmptyDescription(String),

    /// A description exceeds the 100-character platform limit.
    #[error("description for '{0}' exceeds 100 character limit")]
    DescriptionTooLong(String),

    /// The operation does not apply to this kind of node.
    #[error("cannot {operation} on {kind} '{node}'")]
    StructuralMismatch {
        /// Node the operation targeted.
        node: String,
        /// Node kind in canonical string form.
        kind: String,
        /// Attempted operation.
        operation: String,
    },

    /// A child with the same name already exists under the group.
    #[error("group '{group}' already has a subcommand named '{child}'")]
    DuplicateChild {
        /// Group name.
        group: String,
        /// Duplicate child name.
        child: String,
    },

    /// An option with the same name already exists on the command.
    #[error("command '{command}' already declares option '{option}'")]
    DuplicateOption {
        /// Command name.
        command: String,
        /// Duplicate option name.
        option: String,
    },

    /// A required option was declared after an optional one.
    #[error("required option '{option}' of '{command}' must precede optional options")]
    RequiredAfterOptional {
        /// Command name.
        command: String,
        /// Offending option name.
        option: String,
    },

    /// The node already holds the maximum of 25 options or children.
    #[error("'{0}' exceeds the limit of 25 options or subcommands")]
    TooManyEntries(String),

    /// A handler is already bound to the node.
    #[error("a handler is already bound to '{0}'")]
    HandlerAlreadyBound(String),

    /// An autocomplete handler is already bound to the option.
    #[error("an autocomplete handler is already bound to option '{option}' of '{command}'")]
    AutocompleteAlreadyBound {
        /// Command name.
        command: String,
        /// Option name.
        option: String,
    },

    /// The option does not exist or does not enable autocomplete.
    #[error("option '{option}' of '{command}' does not accept autocomplete")]
    AutocompleteNotEnabled {
        /// Command name.
        command: String,
        /// Option name.
        option: String,
    },

    /// The option schema violates a platform rule.
    #[error("invalid option '{option}': {reason}")]
    InvalidOption {
        /// Option name.
        option: String,
        /// Validation reason.
        reason: String,
    },
}

/// Error returned when a snowflake identifier cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid snowflake identifier: {0}")]
pub struct ParseSnowflakeError(pub String);

/// Error returned when a wire option type code is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown option type code: {0}")]
pub struct ParseOptionTypeError(pub u8);

/// Errors returned while converting a wire interaction payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InteractionPayloadError {
    /// The payload type is neither a command nor an autocomplete request.
    #[error("unsupported interaction type: {0}")]
    UnsupportedType(u8),

    /// The payload carries no command data.
    #[error("interaction {0} carries no command data")]
    MissingData(String),

    /// A resolved-data key is not a valid snowflake.
    #[error(transparent)]
    InvalidResolvedKey(#[from] ParseSnowflakeError),
}

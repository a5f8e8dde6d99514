//! Platform description format for registered commands.
//!
//! These types mirror the JSON the platform accepts on upsert and reports on
//! fetch. Equality of two definitions is the synchronization diff criterion:
//! name, description, and the full option signature.

use super::{ChannelKind, CommandId, OptionChoice, OptionType, ParseOptionTypeError};
use serde::{Deserialize, Serialize};

/// Option type code as used in wire definitions and payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DefinitionOptionKind {
    /// Nested invocable subcommand.
    Subcommand,
    /// Nested group of subcommands.
    SubcommandGroup,
    /// Typed value parameter.
    Value(OptionType),
}

impl TryFrom<u8> for DefinitionOptionKind {
    type Error = ParseOptionTypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Subcommand),
            2 => Ok(Self::SubcommandGroup),
            other => OptionType::try_from(other).map(Self::Value),
        }
    }
}

impl From<DefinitionOptionKind> for u8 {
    fn from(kind: DefinitionOptionKind) -> Self {
        match kind {
            DefinitionOptionKind::Subcommand => 1,
            DefinitionOptionKind::SubcommandGroup => 2,
            DefinitionOptionKind::Value(option_type) => option_type.code(),
        }
    }
}

/// One option entry of a wire definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionOption {
    /// Option kind code.
    #[serde(rename = "type")]
    pub kind: DefinitionOptionKind,
    /// Option or subcommand name.
    pub name: String,
    /// Option or subcommand description.
    pub description: String,
    /// Whether the option must be supplied.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Declared choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    /// Nested options of a subcommand.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DefinitionOption>,
    /// Channel kinds accepted by a channel option.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<ChannelKind>,
    /// Whether the option requests autocomplete suggestions.
    #[serde(default, skip_serializing_if = "is_false")]
    pub autocomplete: bool,
}

/// Desired state of one top-level command in the platform's format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Command name.
    pub name: String,
    /// Command description.
    pub description: String,
    /// Options or subcommands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DefinitionOption>,
}

/// A command as currently registered with the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredCommand {
    /// Platform-assigned identifier.
    pub id: CommandId,
    /// Registered definition.
    #[serde(flatten)]
    pub definition: CommandDefinition,
}

impl RegisteredCommand {
    /// Creates a registered command record.
    #[must_use]
    pub const fn new(id: CommandId, definition: CommandDefinition) -> Self {
        Self { id, definition }
    }

    /// Returns the registered command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "serde skip_serializing_if passes fields by reference"
)]
const fn is_false(value: &bool) -> bool {
    !*value
}

//! Native values decoded from interaction options.

use super::{CommandName, OptionType, Snowflake};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of platform entity an option can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A user or scope member.
    User,
    /// A role.
    Role,
    /// A channel.
    Channel,
    /// An uploaded attachment.
    Attachment,
    /// A user or a role.
    Mentionable,
}

impl EntityKind {
    /// Returns whether an entity of kind `actual` satisfies this kind.
    #[must_use]
    pub const fn admits(self, actual: Self) -> bool {
        match self {
            Self::Mentionable => matches!(actual, Self::User | Self::Role | Self::Mentionable),
            Self::User => matches!(actual, Self::User),
            Self::Role => matches!(actual, Self::Role),
            Self::Channel => matches!(actual, Self::Channel),
            Self::Attachment => matches!(actual, Self::Attachment),
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Channel => "channel",
            Self::Attachment => "attachment",
            Self::Mentionable => "mentionable",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A platform entity resolved from an option reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity identifier.
    pub id: Snowflake,
    /// Entity kind.
    pub kind: EntityKind,
    /// Display name, user name, or file name when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw attributes as reported by the platform.
    #[serde(default)]
    pub attributes: Value,
}

impl Entity {
    /// Creates an entity without attributes.
    #[must_use]
    pub fn new(id: impl Into<Snowflake>, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: Some(name.into()),
            attributes: Value::Null,
        }
    }

    /// Attaches raw platform attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Native value of one decoded option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    /// Text value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Number value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Resolved user.
    User(Entity),
    /// Resolved channel.
    Channel(Entity),
    /// Resolved role.
    Role(Entity),
    /// Resolved user or role.
    Mentionable(Entity),
    /// Resolved attachment.
    Attachment(Entity),
}

impl OptionValue {
    /// Returns the option type this value belongs to.
    #[must_use]
    pub const fn option_type(&self) -> OptionType {
        match self {
            Self::String(_) => OptionType::String,
            Self::Integer(_) => OptionType::Integer,
            Self::Number(_) => OptionType::Number,
            Self::Boolean(_) => OptionType::Boolean,
            Self::User(_) => OptionType::User,
            Self::Channel(_) => OptionType::Channel,
            Self::Role(_) => OptionType::Role,
            Self::Mentionable(_) => OptionType::Mentionable,
            Self::Attachment(_) => OptionType::Attachment,
        }
    }

    /// Returns the text value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the number value, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the resolved entity, if this is an entity reference.
    #[must_use]
    pub const fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::User(entity)
            | Self::Channel(entity)
            | Self::Role(entity)
            | Self::Mentionable(entity)
            | Self::Attachment(entity) => Some(entity),
            _ => None,
        }
    }
}

/// Conversion strategy for one option type.
#[derive(Debug, Clone, Copy)]
pub enum Decoder {
    /// Converts the raw wire value directly.
    Primitive(fn(&Value) -> Option<OptionValue>),
    /// Parses an identifier and resolves the referenced entity.
    Entity(EntityKind),
}

impl OptionType {
    /// Returns the decoder registered for this option type.
    #[must_use]
    pub fn decoder(self) -> Decoder {
        match self {
            Self::String => Decoder::Primitive(decode_string),
            Self::Integer => Decoder::Primitive(decode_integer),
            Self::Number => Decoder::Primitive(decode_number),
            Self::Boolean => Decoder::Primitive(decode_boolean),
            Self::User => Decoder::Entity(EntityKind::User),
            Self::Channel => Decoder::Entity(EntityKind::Channel),
            Self::Role => Decoder::Entity(EntityKind::Role),
            Self::Mentionable => Decoder::Entity(EntityKind::Mentionable),
            Self::Attachment => Decoder::Entity(EntityKind::Attachment),
        }
    }

    /// Wraps a resolved entity into the value variant of this type.
    ///
    /// Returns `None` for primitive option types.
    #[must_use]
    pub fn wrap_entity(self, entity: Entity) -> Option<OptionValue> {
        match self {
            Self::User => Some(OptionValue::User(entity)),
            Self::Channel => Some(OptionValue::Channel(entity)),
            Self::Role => Some(OptionValue::Role(entity)),
            Self::Mentionable => Some(OptionValue::Mentionable(entity)),
            Self::Attachment => Some(OptionValue::Attachment(entity)),
            Self::String | Self::Integer | Self::Number | Self::Boolean => None,
        }
    }
}

fn decode_string(raw: &Value) -> Option<OptionValue> {
    raw.as_str().map(|text| OptionValue::String(text.to_owned()))
}

fn decode_integer(raw: &Value) -> Option<OptionValue> {
    raw.as_i64().map(OptionValue::Integer)
}

fn decode_number(raw: &Value) -> Option<OptionValue> {
    raw.as_f64().map(OptionValue::Number)
}

fn decode_boolean(raw: &Value) -> Option<OptionValue> {
    raw.as_bool().map(OptionValue::Boolean)
}

/// Decoded option values of one invocation, in declaration order.
///
/// Optional options that were omitted and declare no default are present with
/// a `None` value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArguments {
    values: Vec<(CommandName, Option<OptionValue>)>,
}

impl CommandArguments {
    /// Creates an empty argument list.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends the value of the next declared option.
    pub fn push(&mut self, name: CommandName, value: Option<OptionValue>) {
        self.values.push((name, value));
    }

    /// Returns the value of an option, if supplied or defaulted.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values
            .iter()
            .find(|(option, _)| option.as_str() == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Returns whether the leaf declares an option with this name.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.values.iter().any(|(option, _)| option.as_str() == name)
    }

    /// Returns a string option.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    /// Returns an integer option.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(OptionValue::as_integer)
    }

    /// Returns a number option.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OptionValue::as_number)
    }

    /// Returns a boolean option.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(OptionValue::as_bool)
    }

    /// Returns an entity option.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(OptionValue::as_entity)
    }

    /// Iterates over option names and values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&CommandName, Option<&OptionValue>)> {
        self.values
            .iter()
            .map(|(name, value)| (name, value.as_ref()))
    }

    /// Returns the number of declared options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the leaf declares no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

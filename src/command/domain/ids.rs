//! Snowflake-backed identifier newtypes.
//!
//! The platform identifies scopes, registered commands, interactions, and
//! entities with 64-bit snowflakes. The newtypes keep those identifiers from
//! being mixed up.

use super::ParseSnowflakeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 64-bit platform identifier.
///
/// Snowflakes travel as decimal strings on the wire; numeric input is
/// accepted as well.
///
/// # Examples
///
/// ```
/// use dawn::command::domain::Snowflake;
///
/// let id: Snowflake = serde_json::from_str("\"80351110224678912\"").expect("valid id");
/// assert_eq!(id.get(), 80_351_110_224_678_912);
/// assert_eq!(serde_json::to_string(&id).expect("serializable"), "\"80351110224678912\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SnowflakeRepr", into = "String")]
pub struct Snowflake(u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum SnowflakeRepr {
    Text(String),
    Numeric(u64),
}

impl Snowflake {
    /// Creates a snowflake from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for Snowflake {
    type Err = ParseSnowflakeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseSnowflakeError(value.to_owned()))
    }
}

impl TryFrom<SnowflakeRepr> for Snowflake {
    type Error = ParseSnowflakeError;

    fn try_from(repr: SnowflakeRepr) -> Result<Self, Self::Error> {
        match repr {
            SnowflakeRepr::Text(text) => text.parse(),
            SnowflakeRepr::Numeric(value) => Ok(Self(value)),
        }
    }
}

impl From<Snowflake> for String {
    fn from(value: Snowflake) -> Self {
        value.0.to_string()
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of a target scope such as a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(Snowflake);

impl ScopeId {
    /// Creates a scope identifier from a numeric snowflake.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(Snowflake::new(value))
    }

    /// Returns the wrapped snowflake.
    #[must_use]
    pub const fn into_inner(self) -> Snowflake {
        self.0
    }
}

impl From<Snowflake> for ScopeId {
    fn from(value: Snowflake) -> Self {
        Self(value)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier the platform assigns to a registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(Snowflake);

impl CommandId {
    /// Creates a command identifier from a numeric snowflake.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(Snowflake::new(value))
    }

    /// Returns the wrapped snowflake.
    #[must_use]
    pub const fn into_inner(self) -> Snowflake {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of one inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(Snowflake);

impl InteractionId {
    /// Creates an interaction identifier from a numeric snowflake.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(Snowflake::new(value))
    }

    /// Returns the wrapped snowflake.
    #[must_use]
    pub const fn into_inner(self) -> Snowflake {
        self.0
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

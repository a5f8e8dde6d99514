//! Validated names and descriptions for commands and options.

use super::CommandDomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Maximum length of a command or option name.
const MAX_NAME_LENGTH: usize = 32;

/// Maximum length of a command or option description.
const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Validated command, subcommand, or option name.
///
/// The input is trimmed and lowercased. Only characters in `[a-z0-9_-]` are
/// accepted.
///
/// # Examples
///
/// ```
/// use dawn::command::domain::CommandName;
///
/// let name = CommandName::new(" Ping ").expect("valid name");
/// assert_eq!(name.as_str(), "ping");
/// assert!(CommandName::new("two words").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    /// Creates a validated name.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError::EmptyName`] when the value is empty after
    /// trimming, [`CommandDomainError::NameTooLong`] when it exceeds 32
    /// characters, or [`CommandDomainError::InvalidName`] when it contains
    /// characters outside `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, CommandDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(CommandDomainError::EmptyName);
        }

        if normalized.chars().count() > MAX_NAME_LENGTH {
            return Err(CommandDomainError::NameTooLong(raw));
        }

        let is_valid = normalized.chars().all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '-'
        });
        if !is_valid {
            return Err(CommandDomainError::InvalidName(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for CommandName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Validates a description for the named command or option.
pub(crate) fn validate_description(
    owner: &CommandName,
    description: impl Into<String>,
) -> Result<String, CommandDomainError> {
    let trimmed = description.into().trim().to_owned();
    if trimmed.is_empty() {
        return Err(CommandDomainError::EmptyDescription(owner.to_string()));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CommandDomainError::DescriptionTooLong(owner.to_string()));
    }
    Ok(trimmed)
}

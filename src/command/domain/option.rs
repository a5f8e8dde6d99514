//! Option schemas describing one typed command parameter.

use super::{CommandDomainError, CommandName, OptionValue, ParseOptionTypeError};
use super::name::validate_description;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description used when a declaration omits one.
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Maximum number of choices per option.
const MAX_CHOICES: usize = 25;

/// Value type of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Free-form text.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Boolean flag.
    Boolean,
    /// Reference to a user.
    User,
    /// Reference to a channel.
    Channel,
    /// Reference to a role.
    Role,
    /// Reference to a user or a role.
    Mentionable,
    /// Double-precision number.
    Number,
    /// Reference to an uploaded attachment.
    Attachment,
}

impl OptionType {
    /// Returns the platform wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::String => 3,
            Self::Integer => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Mentionable => 9,
            Self::Number => 10,
            Self::Attachment => 11,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
            Self::Mentionable => "mentionable",
            Self::Number => "number",
            Self::Attachment => "attachment",
        }
    }

    /// Returns whether options of this type may declare choices or
    /// autocomplete.
    #[must_use]
    pub const fn supports_choices(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }
}

impl TryFrom<u8> for OptionType {
    type Error = ParseOptionTypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            3 => Ok(Self::String),
            4 => Ok(Self::Integer),
            5 => Ok(Self::Boolean),
            6 => Ok(Self::User),
            7 => Ok(Self::Channel),
            8 => Ok(Self::Role),
            9 => Ok(Self::Mentionable),
            10 => Ok(Self::Number),
            11 => Ok(Self::Attachment),
            _ => Err(ParseOptionTypeError(code)),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Channel kinds a channel option may be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChannelKind {
    /// Text channel inside a scope.
    Text,
    /// Direct message.
    DirectMessage,
    /// Voice channel.
    Voice,
    /// Group direct message.
    GroupDirectMessage,
    /// Channel category.
    Category,
    /// Announcement channel.
    Announcement,
    /// Thread inside an announcement channel.
    AnnouncementThread,
    /// Public thread.
    PublicThread,
    /// Private thread.
    PrivateThread,
    /// Stage voice channel.
    Stage,
    /// Forum channel.
    Forum,
}

impl TryFrom<u8> for ChannelKind {
    type Error = ParseOptionTypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Text),
            1 => Ok(Self::DirectMessage),
            2 => Ok(Self::Voice),
            3 => Ok(Self::GroupDirectMessage),
            4 => Ok(Self::Category),
            5 => Ok(Self::Announcement),
            10 => Ok(Self::AnnouncementThread),
            11 => Ok(Self::PublicThread),
            12 => Ok(Self::PrivateThread),
            13 => Ok(Self::Stage),
            15 => Ok(Self::Forum),
            _ => Err(ParseOptionTypeError(code)),
        }
    }
}

impl From<ChannelKind> for u8 {
    fn from(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Text => 0,
            ChannelKind::DirectMessage => 1,
            ChannelKind::Voice => 2,
            ChannelKind::GroupDirectMessage => 3,
            ChannelKind::Category => 4,
            ChannelKind::Announcement => 5,
            ChannelKind::AnnouncementThread => 10,
            ChannelKind::PublicThread => 11,
            ChannelKind::PrivateThread => 12,
            ChannelKind::Stage => 13,
            ChannelKind::Forum => 15,
        }
    }
}

/// Literal value of a declared choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    /// Integer literal.
    Integer(i64),
    /// Number literal.
    Number(f64),
    /// Text literal.
    String(String),
}

impl ChoiceValue {
    /// Returns whether this literal has the native type of `value_type`.
    #[must_use]
    pub const fn fits(&self, value_type: OptionType) -> bool {
        matches!(
            (self, value_type),
            (Self::String(_), OptionType::String)
                | (Self::Integer(_), OptionType::Integer)
                | (Self::Number(_), OptionType::Number)
        )
    }

    /// Returns whether a decoded value equals this literal.
    #[must_use]
    #[expect(
        clippy::float_cmp,
        reason = "choices are exact literals echoed back by the platform"
    )]
    #[must_use]
    pub fn matches(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (Self::String(expected), OptionValue::String(actual)) => expected == actual,
            (Self::Integer(expected), OptionValue::Integer(actual)) => expected == actual,
            (Self::Number(expected), OptionValue::Number(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Named choice offered for an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Label shown to users.
    pub name: String,
    /// Value sent back when the choice is picked.
    pub value: ChoiceValue,
}

impl OptionChoice {
    /// Creates a choice.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Immutable schema of one command option.
///
/// # Examples
///
/// ```
/// use dawn::command::domain::{OptionSchema, OptionType, OptionValue};
///
/// let schema = OptionSchema::builder("count", OptionType::Integer)
///     .description("How many")
///     .required(false)
///     .default_value(OptionValue::Integer(1))
///     .build()
///     .expect("valid schema");
/// assert_eq!(schema.default_value(), Some(&OptionValue::Integer(1)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSchema {
    name: CommandName,
    description: String,
    value_type: OptionType,
    required: bool,
    choices: Vec<OptionChoice>,
    default: Option<OptionValue>,
    autocomplete: bool,
    channel_types: Vec<ChannelKind>,
}

impl OptionSchema {
    /// Starts building a required option with the default description.
    #[must_use]
    pub fn builder(name: impl Into<String>, value_type: OptionType) -> OptionSchemaBuilder {
        OptionSchemaBuilder {
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            value_type,
            required: true,
            choices: Vec::new(),
            default: None,
            autocomplete: false,
            channel_types: Vec::new(),
        }
    }

    /// Creates a required option.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError`] when the name or description is invalid.
    pub fn required(
        name: impl Into<String>,
        description: impl Into<String>,
        value_type: OptionType,
    ) -> Result<Self, CommandDomainError> {
        Self::builder(name, value_type)
            .description(description)
            .build()
    }

    /// Creates an optional option without a default.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError`] when the name or description is invalid.
    pub fn optional(
        name: impl Into<String>,
        description: impl Into<String>,
        value_type: OptionType,
    ) -> Result<Self, CommandDomainError> {
        Self::builder(name, value_type)
            .description(description)
            .required(false)
            .build()
    }

    /// Returns the option name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the option description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the option value type.
    #[must_use]
    pub const fn value_type(&self) -> OptionType {
        self.value_type
    }

    /// Returns whether the option must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the declared choices.
    #[must_use]
    pub fn choices(&self) -> &[OptionChoice] {
        &self.choices
    }

    /// Returns the value used when the option is omitted.
    #[must_use]
    pub const fn default_value(&self) -> Option<&OptionValue> {
        self.default.as_ref()
    }

    /// Returns whether the option requests autocomplete suggestions.
    #[must_use]
    pub const fn is_autocomplete(&self) -> bool {
        self.autocomplete
    }

    /// Returns the channel kinds a channel option accepts.
    #[must_use]
    pub fn channel_types(&self) -> &[ChannelKind] {
        &self.channel_types
    }

    /// Returns whether a decoded value satisfies the declared choices.
    #[must_use]
    pub fn accepts(&self, value: &OptionValue) -> bool {
        self.choices.is_empty() || self.choices.iter().any(|choice| choice.value.matches(value))
    }
}

/// Incremental builder for [`OptionSchema`].
#[derive(Debug, Clone)]
pub struct OptionSchemaBuilder {
    name: String,
    description: String,
    value_type: OptionType,
    required: bool,
    choices: Vec<OptionChoice>,
    default: Option<OptionValue>,
    autocomplete: bool,
    channel_types: Vec<ChannelKind>,
}

impl OptionSchemaBuilder {
    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets whether the option must be supplied.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Adds one choice.
    #[must_use]
    pub fn choice(mut self, name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        self.choices.push(OptionChoice::new(name, value));
        self
    }

    /// Adds several choices.
    #[must_use]
    pub fn choices(mut self, choices: impl IntoIterator<Item = OptionChoice>) -> Self {
        self.choices.extend(choices);
        self
    }

    /// Sets the value used when an optional option is omitted.
    #[must_use]
    pub fn default_value(mut self, value: OptionValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Enables or disables autocomplete suggestions.
    #[must_use]
    pub const fn autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = autocomplete;
        self
    }

    /// Restricts a channel option to the given kinds.
    #[must_use]
    pub fn channel_types(mut self, kinds: impl IntoIterator<Item = ChannelKind>) -> Self {
        self.channel_types.extend(kinds);
        self
    }

    /// Validates the declaration and produces the schema.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDomainError`] when the name or description is invalid,
    /// or [`CommandDomainError::InvalidOption`] when choices, autocomplete,
    /// channel constraints, or the default value do not fit the option type.
    pub fn build(self) -> Result<OptionSchema, CommandDomainError> {
        let name = CommandName::new(self.name)?;
        let description = validate_description(&name, self.description)?;
        let invalid = |reason: &str| CommandDomainError::InvalidOption {
            option: name.to_string(),
            reason: reason.to_owned(),
        };

        let choices: Vec<_> = self
            .choices
            .into_iter()
            .map(|choice| normalize_choice(choice, self.value_type))
            .collect();

        if !choices.is_empty() {
            if !self.value_type.supports_choices() {
                return Err(invalid(
                    "choices are only allowed on string, integer and number options",
                ));
            }
            if choices.len() > MAX_CHOICES {
                return Err(invalid("at most 25 choices are allowed"));
            }
            if let Some(choice) = choices
                .iter()
                .find(|choice| !choice.value.fits(self.value_type))
            {
                return Err(invalid(&format!(
                    "choice '{}' does not match option type {}",
                    choice.name, self.value_type
                )));
            }
        }

        if self.autocomplete {
            if !self.value_type.supports_choices() {
                return Err(invalid(
                    "autocomplete is only allowed on string, integer and number options",
                ));
            }
            if !choices.is_empty() {
                return Err(invalid("autocomplete cannot be combined with choices"));
            }
        }

        if !self.channel_types.is_empty() && self.value_type != OptionType::Channel {
            return Err(invalid("channel types are only allowed on channel options"));
        }

        if let Some(default) = &self.default {
            if self.required {
                return Err(invalid("required options cannot declare a default"));
            }
            if default.option_type() != self.value_type {
                return Err(invalid(&format!(
                    "default value of type {} does not match option type {}",
                    default.option_type(),
                    self.value_type
                )));
            }
            if !choices.is_empty() && !choices.iter().any(|choice| choice.value.matches(default))
            {
                return Err(invalid("default value is not one of the declared choices"));
            }
        }

        let mut channel_types = self.channel_types;
        channel_types.sort_unstable();
        channel_types.dedup();

        Ok(OptionSchema {
            name,
            description,
            value_type: self.value_type,
            required: self.required,
            choices,
            default: self.default,
            autocomplete: self.autocomplete,
            channel_types,
        })
    }
}

/// Widens integer literals declared on number options.
#[expect(
    clippy::cast_precision_loss,
    reason = "integer choice literals on number options are small by construction"
)]
fn normalize_choice(choice: OptionChoice, value_type: OptionType) -> OptionChoice {
    match (choice.value, value_type) {
        (ChoiceValue::Integer(value), OptionType::Number) => OptionChoice {
            name: choice.name,
            value: ChoiceValue::Number(value as f64),
        },
        (value, _) => OptionChoice {
            name: choice.name,
            value,
        },
    }
}

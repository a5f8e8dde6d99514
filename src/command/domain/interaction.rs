//! Inbound interaction events.
//!
//! [`InteractionPayload`] mirrors the platform's nested wire shape;
//! [`Interaction`] is the flattened form the dispatcher works with.

use super::{
    DefinitionOptionKind, Entity, EntityKind, InteractionId, InteractionPayloadError, ScopeId,
    Snowflake,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Platform type code of a command invocation.
const APPLICATION_COMMAND: u8 = 2;

/// Platform type code of an autocomplete request.
const APPLICATION_COMMAND_AUTOCOMPLETE: u8 = 4;

/// Kind of inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A user invoked a command.
    Command,
    /// A user is typing into an autocomplete option.
    Autocomplete,
}

/// Token authorizing responses to one interaction.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionToken(String);

impl InteractionToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InteractionToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("InteractionToken(..)")
    }
}

/// One option as supplied by the user, still in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOption {
    /// Option name.
    pub name: String,
    /// Raw wire value.
    pub value: Value,
    /// Whether the user is currently typing into this option.
    #[serde(default)]
    pub focused: bool,
}

impl RawOption {
    /// Creates a raw option.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            focused: false,
        }
    }

    /// Marks the option as focused.
    #[must_use]
    pub const fn focused(mut self) -> Self {
        self.focused = true;
        self
    }
}

/// A decoded inbound interaction event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction identifier.
    pub id: InteractionId,
    /// Interaction kind.
    pub kind: InteractionKind,
    /// Response token.
    pub token: InteractionToken,
    /// Scope the interaction arrived in, or `None` outside any scope.
    pub scope: Option<ScopeId>,
    /// Channel the interaction was invoked in, when known.
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    /// Invoking user, when known.
    pub user_id: Option<Snowflake>,
    /// Top-level command name.
    pub command_name: String,
    /// Subcommand path below the top-level command.
    pub subcommand_path: Vec<String>,
    /// Supplied options of the invoked leaf.
    pub options: Vec<RawOption>,
    /// Entities the platform resolved alongside the event.
    pub resolved: BTreeMap<Snowflake, Entity>,
}

impl Interaction {
    /// Creates a command interaction without options.
    #[must_use]
    pub fn command(
        id: InteractionId,
        token: impl Into<String>,
        command_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind: InteractionKind::Command,
            token: InteractionToken::new(token),
            scope: None,
            channel_id: None,
            user_id: None,
            command_name: command_name.into(),
            subcommand_path: Vec::new(),
            options: Vec::new(),
            resolved: BTreeMap::new(),
        }
    }

    /// Creates an autocomplete interaction without options.
    #[must_use]
    pub fn autocomplete(
        id: InteractionId,
        token: impl Into<String>,
        command_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: InteractionKind::Autocomplete,
            ..Self::command(id, token, command_name)
        }
    }

    /// Sets the scope the interaction arrived in.
    #[must_use]
    pub const fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets the channel the interaction was invoked in.
    #[must_use]
    pub const fn in_channel(mut self, channel_id: Snowflake) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    /// Sets the invoking user.
    #[must_use]
    pub const fn by_user(mut self, user_id: Snowflake) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Appends a subcommand path segment.
    #[must_use]
    pub fn with_subcommand(mut self, name: impl Into<String>) -> Self {
        self.subcommand_path.push(name.into());
        self
    }

    /// Appends a supplied option.
    #[must_use]
    pub fn with_option(mut self, option: RawOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds an entity resolved by the platform.
    #[must_use]
    pub fn with_resolved(mut self, entity: Entity) -> Self {
        self.resolved.insert(entity.id, entity);
        self
    }

    /// Returns the supplied option with the given name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&RawOption> {
        self.options.iter().find(|option| option.name == name)
    }

    /// Returns the focused option of an autocomplete request.
    #[must_use]
    pub fn focused_option(&self) -> Option<&RawOption> {
        self.options.iter().find(|option| option.focused)
    }

    /// Returns the full command path, e.g. `admin kick`.
    #[must_use]
    pub fn command_path(&self) -> String {
        std::iter::once(self.command_name.as_str())
            .chain(self.subcommand_path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Interaction as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionPayload {
    /// Interaction identifier.
    pub id: InteractionId,
    /// Platform type code.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Response token.
    pub token: String,
    /// Scope the interaction arrived in.
    #[serde(default)]
    pub guild_id: Option<ScopeId>,
    /// Channel the interaction was invoked in.
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    /// Invoking user outside a scope.
    #[serde(default)]
    pub user: Option<PayloadUser>,
    /// Invoking member inside a scope.
    #[serde(default)]
    pub member: Option<PayloadMember>,
    /// Command data.
    #[serde(default)]
    pub data: Option<InteractionData>,
}

/// Minimal user object carried by a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadUser {
    /// User identifier.
    pub id: Snowflake,
}

/// Minimal member object carried by a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMember {
    /// Member's user object.
    pub user: PayloadUser,
}

/// Command data of an interaction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionData {
    /// Top-level command name.
    pub name: String,
    /// Nested option tree.
    #[serde(default)]
    pub options: Vec<PayloadOption>,
    /// Entities referenced by options.
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
}

/// One node of a payload's option tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadOption {
    /// Option or subcommand name.
    pub name: String,
    /// Option kind code.
    #[serde(rename = "type")]
    pub kind: DefinitionOptionKind,
    /// Raw value of a value option.
    #[serde(default)]
    pub value: Option<Value>,
    /// Nested options of a subcommand or group.
    #[serde(default)]
    pub options: Vec<PayloadOption>,
    /// Whether the user is typing into this option.
    #[serde(default)]
    pub focused: bool,
}

/// Entities resolved by the platform, keyed by snowflake string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedData {
    /// Referenced users.
    #[serde(default)]
    pub users: BTreeMap<String, Value>,
    /// Referenced roles.
    #[serde(default)]
    pub roles: BTreeMap<String, Value>,
    /// Referenced channels.
    #[serde(default)]
    pub channels: BTreeMap<String, Value>,
    /// Referenced attachments.
    #[serde(default)]
    pub attachments: BTreeMap<String, Value>,
}

impl TryFrom<InteractionPayload> for Interaction {
    type Error = InteractionPayloadError;

    fn try_from(payload: InteractionPayload) -> Result<Self, Self::Error> {
        let kind = match payload.kind {
            APPLICATION_COMMAND => InteractionKind::Command,
            APPLICATION_COMMAND_AUTOCOMPLETE => InteractionKind::Autocomplete,
            other => return Err(InteractionPayloadError::UnsupportedType(other)),
        };
        let data = payload
            .data
            .ok_or_else(|| InteractionPayloadError::MissingData(payload.id.to_string()))?;
        let user_id = payload
            .member
            .map(|member| member.user.id)
            .or_else(|| payload.user.map(|user| user.id));

        let (subcommand_path, leaf_options) = flatten_options(data.options);
        let options = leaf_options
            .into_iter()
            .filter_map(|option| {
                option.value.map(|value| RawOption {
                    name: option.name,
                    value,
                    focused: option.focused,
                })
            })
            .collect();

        Ok(Self {
            id: payload.id,
            kind,
            token: InteractionToken::new(payload.token),
            scope: payload.guild_id,
            channel_id: payload.channel_id,
            user_id,
            command_name: data.name,
            subcommand_path,
            options,
            resolved: collect_resolved(data.resolved.unwrap_or_default())?,
        })
    }
}

/// Walks subcommand and group wrappers down to the leaf's value options.
fn flatten_options(mut options: Vec<PayloadOption>) -> (Vec<String>, Vec<PayloadOption>) {
    let mut path = Vec::new();
    loop {
        let is_wrapper = matches!(
            options.as_slice(),
            [only] if matches!(
                only.kind,
                DefinitionOptionKind::Subcommand | DefinitionOptionKind::SubcommandGroup
            )
        );
        if !is_wrapper {
            return (path, options);
        }
        match options.pop() {
            Some(wrapper) => {
                path.push(wrapper.name);
                options = wrapper.options;
            }
            None => return (path, options),
        }
    }
}

fn collect_resolved(
    resolved: ResolvedData,
) -> Result<BTreeMap<Snowflake, Entity>, InteractionPayloadError> {
    let sources = [
        (EntityKind::User, resolved.users, "username"),
        (EntityKind::Role, resolved.roles, "name"),
        (EntityKind::Channel, resolved.channels, "name"),
        (EntityKind::Attachment, resolved.attachments, "filename"),
    ];

    let mut entities = BTreeMap::new();
    for (kind, entries, name_field) in sources {
        for (key, attributes) in entries {
            let id: Snowflake = key.parse()?;
            let name = attributes
                .get(name_field)
                .and_then(Value::as_str)
                .map(str::to_owned);
            entities.insert(
                id,
                Entity {
                    id,
                    kind,
                    name,
                    attributes,
                },
            );
        }
    }
    Ok(entities)
}

//! Conversion of raw interaction options into native argument values.

use super::node::CommandNode;
use crate::command::domain::{
    CommandArguments, Decoder, EntityKind, Interaction, OptionSchema, OptionType, OptionValue,
    Snowflake,
};
use crate::command::ports::{PlatformClient, PlatformError};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding the options of one interaction.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// A required option was not supplied.
    #[error("required option `{0}` is missing")]
    MissingRequired(String),

    /// The payload carries an option the command does not declare.
    #[error("option `{0}` is not declared by the command")]
    UnknownOption(String),

    /// The raw value does not convert into the declared type.
    #[error("option `{option}` expects a {expected} value, got {raw}")]
    InvalidValue {
        /// Option name.
        option: String,
        /// Declared option type.
        expected: OptionType,
        /// Raw wire value.
        raw: Value,
    },

    /// The decoded value is not one of the declared choices.
    #[error("option `{0}` is not one of the declared choices")]
    InvalidChoice(String),

    /// The referenced entity does not exist.
    #[error("option `{option}` references unknown {kind} {id}")]
    EntityNotFound {
        /// Option name.
        option: String,
        /// Expected entity kind.
        kind: EntityKind,
        /// Referenced identifier.
        id: Snowflake,
    },

    /// Entity lookup through the platform failed.
    #[error("option `{option}`: entity lookup failed: {source}")]
    Lookup {
        /// Option name.
        option: String,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
    },
}

/// Decodes the options of an interaction against an invocable node.
///
/// Values are produced in declaration order. Omitted optional options take
/// their declared default, or stay empty without one.
///
/// # Errors
///
/// Returns [`DecodeError`] when an option is missing, undeclared, of the
/// wrong type, outside its choices, or references an unknown entity.
pub async fn decode_arguments(
    platform: &dyn PlatformClient,
    leaf: &CommandNode,
    interaction: &Interaction,
) -> Result<CommandArguments, DecodeError> {
    if let Some(unknown) = interaction
        .options
        .iter()
        .find(|raw| leaf.option(&raw.name).is_none())
    {
        return Err(DecodeError::UnknownOption(unknown.name.clone()));
    }

    let mut arguments = CommandArguments::new();
    for schema in leaf.options() {
        let value = match interaction.option(schema.name().as_str()) {
            Some(raw) => Some(decode_value(platform, interaction, schema, &raw.value).await?),
            None if schema.is_required() => {
                return Err(DecodeError::MissingRequired(schema.name().to_string()));
            }
            None => schema.default_value().cloned(),
        };
        arguments.push(schema.name().clone(), value);
    }
    Ok(arguments)
}

async fn decode_value(
    platform: &dyn PlatformClient,
    interaction: &Interaction,
    schema: &OptionSchema,
    raw: &Value,
) -> Result<OptionValue, DecodeError> {
    let invalid = || DecodeError::InvalidValue {
        option: schema.name().to_string(),
        expected: schema.value_type(),
        raw: raw.clone(),
    };
    let value = match schema.value_type().decoder() {
        Decoder::Primitive(convert) => convert(raw).ok_or_else(invalid)?,
        Decoder::Entity(kind) => {
            let id: Snowflake = serde_json::from_value(raw.clone()).map_err(|_| invalid())?;
            let entity = match interaction
                .resolved
                .get(&id)
                .filter(|entity| kind.admits(entity.kind))
            {
                Some(entity) => entity.clone(),
                None => platform
                    .resolve_entity(interaction.scope, kind, id)
                    .await
                    .map_err(|source| DecodeError::Lookup {
                        option: schema.name().to_string(),
                        source,
                    })?
                    .filter(|entity| kind.admits(entity.kind))
                    .ok_or_else(|| DecodeError::EntityNotFound {
                        option: schema.name().to_string(),
                        kind,
                        id,
                    })?,
            };
            schema.value_type().wrap_entity(entity).ok_or_else(invalid)?
        }
    };
    if !schema.accepts(&value) {
        return Err(DecodeError::InvalidChoice(schema.name().to_string()));
    }
    Ok(value)
}

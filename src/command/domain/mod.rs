//! Domain model for command trees and interactions.
//!
//! Names, scopes, option schemas, decoded values, wire definitions, and
//! inbound interactions live here. This module depends on nothing else in the
//! crate; handlers and response delivery sit in [`super::ports`].

mod definition;
mod error;
mod ids;
mod interaction;
mod name;
mod option;
mod response;
mod scope;
mod value;

pub use definition::{
    CommandDefinition, DefinitionOption, DefinitionOptionKind, RegisteredCommand,
};
pub use error::{
    CommandDomainError, InteractionPayloadError, ParseOptionTypeError, ParseSnowflakeError,
};
pub use ids::{CommandId, InteractionId, ScopeId, Snowflake};
pub use interaction::{
    Interaction, InteractionData, InteractionKind, InteractionPayload, InteractionToken,
    PayloadMember, PayloadOption, PayloadUser, RawOption, ResolvedData,
};
pub use name::CommandName;
pub(crate) use name::validate_description;
pub use option::{
    ChannelKind, ChoiceValue, DEFAULT_DESCRIPTION, OptionChoice, OptionSchema,
    OptionSchemaBuilder, OptionType,
};
pub use response::{InitialResponse, ResponsePayload, ResponseState};
pub use scope::{CommandScope, ScopeTarget};
pub use value::{CommandArguments, Decoder, Entity, EntityKind, OptionValue};

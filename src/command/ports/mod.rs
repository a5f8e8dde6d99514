//! Port contracts for the external platform client, application handlers,
//! and the per-interaction response handle they receive.

mod context;
mod handler;
mod platform;
mod reporter;

pub use context::{ContextError, ContextResult, InteractionContext};
pub use handler::{
    AutocompleteFn, AutocompleteHandler, AutocompleteRequest, AutocompleteResult,
    CommandHandler, HandlerError, HandlerFn, HandlerResult, autocomplete_fn, handler_fn,
};
pub use platform::{PlatformClient, PlatformError, PlatformResult};
pub use reporter::{DispatchFailure, DispatchReporter, DispatchStage};

//! Application services: registration, synchronization, and dispatch.

mod decode;
mod dispatcher;
mod framework;
mod module;
mod node;
mod registry;
mod synchronizer;

pub use decode::{DecodeError, decode_arguments};
pub use dispatcher::{DispatchError, DispatchOutcome, DispatchResult, Dispatcher};
pub use framework::{CommandFramework, FrameworkError, FrameworkResult};
pub use module::CommandModule;
pub use node::{CommandKind, CommandNode};
pub use registry::{
    CommandRegistry, RegistryError, RegistryResult, ResolveError, ResolvedCommand,
};
pub use synchronizer::{
    CommandSynchronizer, ScopeSync, SyncConflict, SyncError, SyncOperation, SyncReport,
    SyncResult,
};

//! Adapter implementations of the command ports.

mod memory;
mod reporter;

pub use memory::{InMemoryPlatform, PlatformCall, PlatformOperation};
pub use reporter::TracingDispatchReporter;

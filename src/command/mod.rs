//! Slash-command declaration, synchronization, and interaction dispatch.
//!
//! Host applications declare command trees, register them into a
//! [`services::CommandRegistry`], converge the remote platform with a
//! [`services::CommandSynchronizer`], and route inbound interactions through a
//! [`services::Dispatcher`]. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

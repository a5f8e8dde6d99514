//! Dawn: slash-command registration and interaction dispatch.
//!
//! This crate sits on top of an external chat-platform client. Applications
//! declare typed command trees, synchronize them with the platform's
//! registered commands, and have inbound interactions routed to handlers with
//! arguments already decoded into native values.
//!
//! # Architecture
//!
//! Dawn follows hexagonal architecture principles:
//!
//! - **Domain**: Command trees, option schemas, and interaction values
//! - **Ports**: The platform client, handler, and reporter contracts
//! - **Adapters**: An in-memory platform and a `tracing` reporter
//!
//! # Modules
//!
//! - [`command`]: Declaration, registry, synchronization, and dispatch
//! - [`config`]: Framework configuration

pub mod command;
pub mod config;

#[cfg(test)]
mod config_tests;

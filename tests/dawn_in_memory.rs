//! In-memory integration tests for the command framework.
//!
//! Tests are organized into modules by functionality:
//! - `dispatch_tests`: End-to-end interaction handling and concurrency
//! - `synchronization_tests`: Startup and on-demand remote convergence
//! - `module_tests`: Loading and unloading command modules

mod dawn_in_memory {
    pub mod helpers;

    mod dispatch_tests;
    mod module_tests;
    mod synchronization_tests;
}

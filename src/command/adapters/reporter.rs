//! Dispatch reporter writing failures to `tracing`.

use crate::command::ports::{DispatchFailure, DispatchReporter};
use tracing::error;

/// Reports every failed dispatch as an `error` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatchReporter;

impl TracingDispatchReporter {
    /// Creates the reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DispatchReporter for TracingDispatchReporter {
    fn report(&self, failure: &DispatchFailure) {
        error!(
            interaction_id = %failure.interaction_id,
            command = %failure.command,
            scope = ?failure.scope,
            stage = %failure.stage,
            occurred_at = %failure.occurred_at,
            "{}",
            failure.reason
        );
    }
}

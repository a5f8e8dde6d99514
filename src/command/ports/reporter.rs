//! Error-reporting port for failed dispatches.

use crate::command::domain::{InteractionId, ScopeId};
use chrono::{DateTime, Utc};
use std::fmt;

/// Dispatch phase in which an interaction was rejected or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchStage {
    /// Raw options could not be converted into native values.
    Decoding,
    /// The handler returned an error.
    Invoking,
    /// Autocomplete suggestions could not be produced or delivered.
    Autocompleting,
}

impl DispatchStage {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decoding => "decoding",
            Self::Invoking => "invoking",
            Self::Autocompleting => "autocompleting",
        }
    }
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Record of one interaction whose processing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    /// Interaction identifier.
    pub interaction_id: InteractionId,
    /// Full command path, e.g. `admin kick`.
    pub command: String,
    /// Scope the interaction arrived in.
    pub scope: Option<ScopeId>,
    /// Phase that failed.
    pub stage: DispatchStage,
    /// Human-readable failure reason.
    pub reason: String,
    /// When the failure was observed.
    pub occurred_at: DateTime<Utc>,
}

/// Receives failed dispatches; never propagates them into the event loop.
pub trait DispatchReporter: Send + Sync {
    /// Records one failure.
    fn report(&self, failure: &DispatchFailure);
}

//! Visibility scopes for registered commands.

use super::ScopeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Scope a root command declares for itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandScope {
    /// Use the owning module's default scopes, then the framework defaults,
    /// then global.
    #[default]
    Inherit,
    /// Available everywhere the application is installed.
    Global,
    /// Available only inside the listed scopes.
    Scoped(BTreeSet<ScopeId>),
}

impl CommandScope {
    /// Creates a scope restricted to the given targets.
    ///
    /// An empty iterator yields [`CommandScope::Inherit`].
    #[must_use]
    pub fn scoped(scopes: impl IntoIterator<Item = ScopeId>) -> Self {
        let scopes: BTreeSet<_> = scopes.into_iter().collect();
        if scopes.is_empty() {
            Self::Inherit
        } else {
            Self::Scoped(scopes)
        }
    }

    /// Returns whether this scope defers to defaults.
    #[must_use]
    pub const fn is_inherit(&self) -> bool {
        matches!(self, Self::Inherit)
    }

    /// Resolves the concrete registry targets for this scope.
    ///
    /// `defaults` apply only when the scope is [`CommandScope::Inherit`]; an
    /// empty default set means global.
    #[must_use]
    pub fn targets(&self, defaults: &BTreeSet<ScopeId>) -> BTreeSet<ScopeTarget> {
        match self {
            Self::Global => BTreeSet::from([ScopeTarget::Global]),
            Self::Scoped(scopes) => scopes.iter().copied().map(ScopeTarget::Scope).collect(),
            Self::Inherit if defaults.is_empty() => BTreeSet::from([ScopeTarget::Global]),
            Self::Inherit => defaults.iter().copied().map(ScopeTarget::Scope).collect(),
        }
    }
}

/// Concrete registry partition a command lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeTarget {
    /// The global command set.
    Global,
    /// The command set of one scope.
    Scope(ScopeId),
}

impl ScopeTarget {
    /// Returns the scope identifier, or `None` for the global set.
    #[must_use]
    pub const fn scope_id(self) -> Option<ScopeId> {
        match self {
            Self::Global => None,
            Self::Scope(scope_id) => Some(scope_id),
        }
    }

    /// Returns whether this is the global set.
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::Global)
    }
}

impl From<Option<ScopeId>> for ScopeTarget {
    fn from(value: Option<ScopeId>) -> Self {
        value.map_or(Self::Global, Self::Scope)
    }
}

impl fmt::Display for ScopeTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => formatter.write_str("global"),
            Self::Scope(scope_id) => write!(formatter, "scope:{scope_id}"),
        }
    }
}

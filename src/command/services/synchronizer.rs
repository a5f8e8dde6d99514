//! Reconciliation of declared commands with the platform's registrations.

use crate::command::domain::{CommandDefinition, RegisteredCommand, ScopeTarget};
use crate::command::ports::{PlatformClient, PlatformError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Remote call issued during synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    /// Listing registered commands.
    Fetch,
    /// Bulk create-or-replace.
    Upsert,
    /// Deleting a stale command.
    Delete,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Fetch => "fetch",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
        })
    }
}

/// Errors aborting a synchronization run.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// A platform call failed; scopes after this one were not touched.
    #[error("{operation} in {scope} failed: {source}")]
    Platform {
        /// Scope being synchronized.
        scope: ScopeTarget,
        /// Failed call.
        operation: SyncOperation,
        /// Underlying failure.
        #[source]
        source: PlatformError,
    },
}

/// Result type for synchronization.
pub type SyncResult<T> = Result<T, SyncError>;

/// Changes applied to one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSync {
    /// Synchronized scope.
    pub scope: ScopeTarget,
    /// Commands absent remotely that were created.
    pub created: Vec<String>,
    /// Commands whose remote definition differed.
    pub updated: Vec<String>,
    /// Remote-only commands that were deleted.
    pub deleted: Vec<String>,
    /// Commands already up to date.
    pub unchanged: Vec<String>,
}

impl ScopeSync {
    const fn empty(scope: ScopeTarget) -> Self {
        Self {
            scope,
            created: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
            unchanged: Vec::new(),
        }
    }

    /// Returns whether any remote change was made.
    #[must_use]
    pub fn changed(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }
}

/// A name registered remotely both globally and in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConflict {
    /// Command name.
    pub name: String,
    /// Scope holding the scoped copy.
    pub scope: ScopeTarget,
}

/// Summary of one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Per-scope changes in scope order.
    pub scopes: Vec<ScopeSync>,
    /// Remote global/scoped name collisions found before applying changes.
    pub conflicts: Vec<SyncConflict>,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
}

impl SyncReport {
    /// Returns the changes applied to a scope.
    #[must_use]
    pub fn scope(&self, scope: ScopeTarget) -> Option<&ScopeSync> {
        self.scopes.iter().find(|entry| entry.scope == scope)
    }

    /// Returns whether the run changed nothing remotely.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.scopes.iter().any(ScopeSync::changed)
    }
}

/// Converges remote registrations towards a desired per-scope state.
///
/// Runs are serialized. Every scope synchronized once stays on the list, so
/// removing its last command deletes the remote copy on the next run.
pub struct CommandSynchronizer {
    platform: Arc<dyn PlatformClient>,
    clock: Arc<dyn Clock + Send + Sync>,
    prune_remote: bool,
    known_scopes: Mutex<BTreeSet<ScopeTarget>>,
}

impl CommandSynchronizer {
    /// Creates a synchronizer.
    #[must_use]
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        clock: Arc<dyn Clock + Send + Sync>,
        prune_remote: bool,
    ) -> Self {
        Self {
            platform,
            clock,
            prune_remote,
            known_scopes: Mutex::new(BTreeSet::new()),
        }
    }

    /// Synchronizes every desired scope plus every scope seen before.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Platform`] on the first failed remote call. Scopes
    /// finished before the failure keep their changes.
    pub async fn synchronize(
        &self,
        desired: &BTreeMap<ScopeTarget, Vec<CommandDefinition>>,
    ) -> SyncResult<SyncReport> {
        let mut known_scopes = self.known_scopes.lock().await;
        let targets: BTreeSet<ScopeTarget> = desired
            .keys()
            .chain(known_scopes.iter())
            .copied()
            .chain(std::iter::once(ScopeTarget::Global))
            .collect();

        let mut remote = BTreeMap::new();
        for target in &targets {
            let registered = self
                .platform
                .fetch_commands(*target)
                .await
                .map_err(|source| SyncError::Platform {
                    scope: *target,
                    operation: SyncOperation::Fetch,
                    source,
                })?;
            remote.insert(*target, registered);
        }
        let conflicts = find_conflicts(&remote);

        let mut scopes = Vec::with_capacity(targets.len());
        for (target, registered) in &remote {
            let wanted = desired.get(target).map_or(&[][..], Vec::as_slice);
            let applied = self.apply(*target, wanted, registered).await?;
            if wanted.is_empty() && (self.prune_remote || registered.is_empty()) {
                known_scopes.remove(target);
            } else {
                known_scopes.insert(*target);
            }
            scopes.push(applied);
        }

        let report = SyncReport {
            scopes,
            conflicts,
            completed_at: self.clock.utc(),
        };
        info!(
            scopes = report.scopes.len(),
            changed = report.scopes.iter().filter(|scope| scope.changed()).count(),
            conflicts = report.conflicts.len(),
            "synchronized commands"
        );
        Ok(report)
    }

    async fn apply(
        &self,
        scope: ScopeTarget,
        desired: &[CommandDefinition],
        registered: &[RegisteredCommand],
    ) -> SyncResult<ScopeSync> {
        let remote: BTreeMap<&str, &RegisteredCommand> = registered
            .iter()
            .map(|command| (command.name(), command))
            .collect();
        let mut summary = ScopeSync::empty(scope);
        let mut upserts = Vec::new();
        for definition in desired {
            match remote.get(definition.name.as_str()) {
                None => summary.created.push(definition.name.clone()),
                Some(existing) if existing.definition == *definition => {
                    summary.unchanged.push(definition.name.clone());
                    continue;
                }
                Some(_) => summary.updated.push(definition.name.clone()),
            }
            upserts.push(definition.clone());
        }

        if !upserts.is_empty() {
            self.platform
                .upsert_commands(scope, &upserts)
                .await
                .map_err(|source| SyncError::Platform {
                    scope,
                    operation: SyncOperation::Upsert,
                    source,
                })?;
        }

        if self.prune_remote {
            let wanted: BTreeSet<&str> = desired
                .iter()
                .map(|definition| definition.name.as_str())
                .collect();
            for stale in registered
                .iter()
                .filter(|command| !wanted.contains(command.name()))
            {
                self.platform
                    .delete_command(scope, stale.id)
                    .await
                    .map_err(|source| SyncError::Platform {
                        scope,
                        operation: SyncOperation::Delete,
                        source,
                    })?;
                summary.deleted.push(stale.name().to_owned());
            }
        }
        Ok(summary)
    }
}

fn find_conflicts(remote: &BTreeMap<ScopeTarget, Vec<RegisteredCommand>>) -> Vec<SyncConflict> {
    let global: BTreeSet<&str> = remote
        .get(&ScopeTarget::Global)
        .map(|commands| commands.iter().map(RegisteredCommand::name).collect())
        .unwrap_or_default();
    let conflicts: Vec<SyncConflict> = remote
        .iter()
        .filter(|(scope, _)| !scope.is_global())
        .flat_map(|(scope, commands)| {
            commands
                .iter()
                .filter(|command| global.contains(command.name()))
                .map(|command| SyncConflict {
                    name: command.name().to_owned(),
                    scope: *scope,
                })
        })
        .collect();
    for conflict in &conflicts {
        warn!(
            command = %conflict.name,
            scope = %conflict.scope,
            "command registered both globally and in a scope"
        );
    }
    conflicts
}

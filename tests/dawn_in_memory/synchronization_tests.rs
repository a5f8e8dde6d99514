//! Startup and on-demand synchronization through the framework.

use super::helpers::{GUILD, Harness, admin_group, echo_command, harness, harness_with, ping_command};
use dawn::command::{
    adapters::PlatformOperation,
    domain::ScopeTarget,
    ports::PlatformError,
    services::{FrameworkError, SyncError},
};
use dawn::config::FrameworkConfig;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn on_ready_registers_global_and_scoped_commands(harness: Harness) {
    harness.framework.register(ping_command()).expect("registration");
    harness.framework.register(echo_command()).expect("registration");
    harness.framework.register(admin_group()).expect("registration");

    let report = harness.framework.on_ready().await.expect("sync should succeed");

    let global_names: Vec<String> = harness
        .platform
        .commands(ScopeTarget::Global)
        .expect("commands")
        .iter()
        .map(|command| command.name().to_owned())
        .collect();
    assert_eq!(global_names, ["echo", "ping"]);
    assert_eq!(
        harness
            .platform
            .commands(ScopeTarget::Scope(GUILD))
            .expect("commands")
            .len(),
        1
    );
    assert!(report.conflicts.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_sync_is_idempotent(harness: Harness) {
    harness.framework.register(ping_command()).expect("registration");
    harness.framework.synchronize().await.expect("first sync");

    let report = harness.framework.synchronize().await.expect("second sync");

    assert!(report.is_noop());
    assert_eq!(
        harness
            .platform
            .calls_of(PlatformOperation::UpsertCommands)
            .expect("calls")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unregistered_commands_disappear_remotely(harness: Harness) {
    harness.framework.register(ping_command()).expect("registration");
    harness.framework.register(echo_command()).expect("registration");
    harness.framework.synchronize().await.expect("first sync");

    harness
        .framework
        .unregister(ScopeTarget::Global, "echo")
        .expect("unregistration");
    harness.framework.synchronize().await.expect("second sync");

    let remaining: Vec<String> = harness
        .platform
        .commands(ScopeTarget::Global)
        .expect("commands")
        .iter()
        .map(|command| command.name().to_owned())
        .collect();
    assert_eq!(remaining, ["ping"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_default_scopes_apply_to_inheriting_commands() {
    let harness = harness_with(FrameworkConfig::default().with_default_scopes([GUILD]));
    harness.framework.register(ping_command()).expect("registration");

    harness.framework.synchronize().await.expect("sync");

    assert!(
        harness
            .platform
            .commands(ScopeTarget::Global)
            .expect("commands")
            .is_empty()
    );
    assert_eq!(
        harness
            .platform
            .commands(ScopeTarget::Scope(GUILD))
            .expect("commands")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remote_failures_surface_to_the_caller(harness: Harness) {
    harness.framework.register(ping_command()).expect("registration");
    harness
        .platform
        .fail_on(
            PlatformOperation::FetchCommands,
            PlatformError::Rejected("unauthorized".to_owned()),
        )
        .expect("failure injected");

    let result = harness.framework.synchronize().await;

    assert!(matches!(
        result,
        Err(FrameworkError::Sync(SyncError::Platform { .. }))
    ));
    assert!(
        harness
            .platform
            .calls_of(PlatformOperation::UpsertCommands)
            .expect("calls")
            .is_empty()
    );
}

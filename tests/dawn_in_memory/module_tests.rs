//! Loading and unloading command modules.

use super::helpers::{Harness, echo_command, harness, ping_command};
use dawn::command::{
    adapters::InMemoryPlatform,
    domain::{CommandScope, ScopeId, ScopeTarget},
    services::{CommandModule, FrameworkError, RegistryError},
};
use rstest::rstest;

fn utilities() -> CommandModule {
    CommandModule::new("utilities")
        .with_command(ping_command())
        .and_then(|module| module.with_command(echo_command()))
        .expect("valid module")
}

fn global_names(platform: &InMemoryPlatform) -> Vec<String> {
    platform
        .commands(ScopeTarget::Global)
        .expect("commands")
        .iter()
        .map(|command| command.name().to_owned())
        .collect()
}

#[rstest]
fn modules_reject_duplicate_commands() {
    let result = CommandModule::new("utilities")
        .with_command(ping_command())
        .and_then(|module| module.with_command(ping_command()));

    assert!(matches!(
        result,
        Err(FrameworkError::DuplicateModuleCommand { command, .. }) if command == "ping"
    ));
}

#[rstest]
fn loading_a_module_twice_fails(harness: Harness) {
    harness.framework.load_module(utilities()).expect("first load");

    let result = harness.framework.load_module(utilities());

    assert!(matches!(
        result,
        Err(FrameworkError::ModuleAlreadyLoaded(name)) if name == "utilities"
    ));
}

#[rstest]
fn failed_loads_roll_back(harness: Harness) {
    harness.framework.register(echo_command()).expect("registration");

    let result = harness.framework.load_module(utilities());

    assert!(matches!(
        result,
        Err(FrameworkError::Registry(RegistryError::AlreadyExists { .. }))
    ));
    let definitions = harness
        .framework
        .definitions(ScopeTarget::Global)
        .expect("definitions");
    assert_eq!(definitions.len(), 1);
    assert!(harness.framework.loaded_modules().expect("modules").is_empty());
}

#[rstest]
fn module_default_scopes_apply_to_inheriting_commands(harness: Harness) {
    let guild = ScopeId::new(9);
    let pinned = ping_command()
        .with_scope(CommandScope::Global)
        .expect("root scope");
    let module = CommandModule::new("mixed")
        .with_default_scopes([guild])
        .with_command(pinned)
        .and_then(|module| module.with_command(echo_command()))
        .expect("valid module");

    harness.framework.load_module(module).expect("load");

    let scoped = harness
        .framework
        .definitions(ScopeTarget::Scope(guild))
        .expect("definitions");
    let global = harness
        .framework
        .definitions(ScopeTarget::Global)
        .expect("definitions");
    assert_eq!(
        scoped.iter().map(|definition| definition.name.as_str()).collect::<Vec<_>>(),
        ["echo"]
    );
    assert_eq!(
        global.iter().map(|definition| definition.name.as_str()).collect::<Vec<_>>(),
        ["ping"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unloading_removes_remote_commands_on_next_sync(harness: Harness) {
    harness.framework.load_module(utilities()).expect("load");
    harness.framework.synchronize().await.expect("first sync");
    assert_eq!(global_names(&harness.platform), ["echo", "ping"]);

    let removed = harness
        .framework
        .unload_module("utilities")
        .expect("unload");
    harness.framework.synchronize().await.expect("second sync");

    assert_eq!(removed, 2);
    assert!(global_names(&harness.platform).is_empty());
}

#[rstest]
fn unloading_an_unknown_module_fails(harness: Harness) {
    assert!(matches!(
        harness.framework.unload_module("missing"),
        Err(FrameworkError::ModuleNotLoaded(name)) if name == "missing"
    ));
}

#[rstest]
fn unloading_skips_commands_already_unregistered(harness: Harness) {
    harness.framework.load_module(utilities()).expect("load");
    harness
        .framework
        .unregister(ScopeTarget::Global, "echo")
        .expect("direct unregistration");

    let removed = harness
        .framework
        .unload_module("utilities")
        .expect("unload still succeeds");

    assert_eq!(removed, 1);
    assert!(
        harness
            .framework
            .definitions(ScopeTarget::Global)
            .expect("definitions")
            .is_empty()
    );
    assert!(harness.framework.loaded_modules().expect("modules").is_empty());
}

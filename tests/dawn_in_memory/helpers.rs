//! Shared fixtures for command framework integration tests.

use dawn::command::{
    adapters::InMemoryPlatform,
    domain::{CommandScope, OptionSchema, OptionType, ScopeId},
    ports::{DispatchFailure, DispatchReporter, handler_fn},
    services::{CommandFramework, CommandNode},
};
use dawn::config::FrameworkConfig;
use rstest::fixture;
use std::sync::{Arc, Mutex};

/// Scope used by scoped commands in these tests.
pub const GUILD: ScopeId = ScopeId::new(4242);

/// Reporter that keeps every failure in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    failures: Mutex<Vec<DispatchFailure>>,
}

impl RecordingReporter {
    /// Returns the recorded failures.
    pub fn failures(&self) -> Vec<DispatchFailure> {
        self.failures.lock().expect("reporter lock").clone()
    }
}

impl DispatchReporter for RecordingReporter {
    fn report(&self, failure: &DispatchFailure) {
        self.failures
            .lock()
            .expect("reporter lock")
            .push(failure.clone());
    }
}

/// Framework wired to an in-memory platform and a recording reporter.
pub struct Harness {
    pub platform: InMemoryPlatform,
    pub reporter: Arc<RecordingReporter>,
    pub framework: CommandFramework,
}

/// Builds a harness with the given configuration.
pub fn harness_with(config: FrameworkConfig) -> Harness {
    let platform = InMemoryPlatform::new();
    let reporter = Arc::new(RecordingReporter::default());
    let framework = CommandFramework::new(Arc::new(platform.clone()), config)
        .with_reporter(reporter.clone());
    Harness {
        platform,
        reporter,
        framework,
    }
}

/// Provides a harness with default configuration.
#[fixture]
pub fn harness() -> Harness {
    harness_with(FrameworkConfig::default())
}

/// `/ping` answering "Pong!".
pub fn ping_command() -> CommandNode {
    CommandNode::command("ping", "Health check")
        .and_then(|node| {
            node.with_handler(handler_fn(|context, _arguments| async move {
                context.create_response("Pong!").await?;
                Ok(())
            }))
        })
        .expect("valid ping command")
}

/// `/echo text:string` answering with its input.
pub fn echo_command() -> CommandNode {
    CommandNode::command("echo", "Repeat text")
        .and_then(|node| {
            node.with_option(OptionSchema::required("text", "Text to repeat", OptionType::String)?)
        })
        .and_then(|node| {
            node.with_handler(handler_fn(|context, arguments| async move {
                let text = arguments.string("text").unwrap_or_default().to_owned();
                context.create_response(text).await?;
                Ok(())
            }))
        })
        .expect("valid echo command")
}

/// `/admin kick member:user` scoped to [`GUILD`].
pub fn admin_group() -> CommandNode {
    let kick = CommandNode::subcommand("kick", "Remove a member")
        .and_then(|node| node.with_option(OptionSchema::required("member", "Who", OptionType::User)?))
        .and_then(|node| {
            node.with_handler(handler_fn(|context, arguments| async move {
                let name = arguments
                    .entity("member")
                    .and_then(|member| member.name.clone())
                    .unwrap_or_default();
                context.create_response(format!("Kicked {name}")).await?;
                Ok(())
            }))
        })
        .expect("valid kick subcommand");
    CommandNode::group("admin", "Administration")
        .and_then(|group| group.with_child(kick))
        .and_then(|group| group.with_scope(CommandScope::scoped([GUILD])))
        .expect("valid admin group")
}

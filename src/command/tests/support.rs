//! Shared builders for command unit tests.

use crate::command::{
    domain::{Interaction, InteractionId, OptionSchema, OptionType},
    ports::{CommandHandler, DispatchFailure, DispatchReporter, handler_fn},
    services::CommandNode,
};
use std::sync::Mutex;

pub(super) fn noop_handler() -> impl CommandHandler + 'static {
    handler_fn(|_context, _arguments| async { Ok(()) })
}

pub(super) fn leaf(name: &str) -> CommandNode {
    CommandNode::command(name, "Test command")
        .and_then(|node| node.with_handler(noop_handler()))
        .expect("valid leaf command")
}

pub(super) fn group(name: &str, children: &[&str]) -> CommandNode {
    children
        .iter()
        .try_fold(
            CommandNode::group(name, "Test group").expect("valid group"),
            |group, child| {
                let subcommand = CommandNode::subcommand(*child, "Test subcommand")?
                    .with_handler(noop_handler())?;
                group.with_child(subcommand)
            },
        )
        .expect("valid group tree")
}

/// `echo text:string [times:integer = 1] [loud:boolean]`
pub(super) fn echo_node() -> CommandNode {
    CommandNode::command("echo", "Repeat text")
        .and_then(|node| node.with_option(OptionSchema::required("text", "Text", OptionType::String)?))
        .and_then(|node| {
            node.with_option(
                OptionSchema::builder("times", OptionType::Integer)
                    .required(false)
                    .default_value(crate::command::domain::OptionValue::Integer(1))
                    .build()?,
            )
        })
        .and_then(|node| {
            node.with_option(OptionSchema::optional("loud", "Shout", OptionType::Boolean)?)
        })
        .and_then(|node| node.with_handler(noop_handler()))
        .expect("valid echo command")
}

pub(super) fn command_event(name: &str) -> Interaction {
    Interaction::command(InteractionId::new(1), "token-1", name)
}

#[derive(Debug, Default)]
pub(super) struct RecordingReporter {
    failures: Mutex<Vec<DispatchFailure>>,
}

impl RecordingReporter {
    pub(super) fn failures(&self) -> Vec<DispatchFailure> {
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

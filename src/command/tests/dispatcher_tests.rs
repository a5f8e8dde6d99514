//! Tests for resolving, decoding, and invoking interactions.

use super::support::{RecordingReporter, command_event, leaf};
use crate::command::{
    adapters::{InMemoryPlatform, PlatformCall, PlatformOperation},
    domain::{
        Interaction, InteractionId, OptionChoice, OptionSchema, OptionType, RawOption,
        ResponseState,
    },
    ports::{DispatchStage, HandlerError, autocomplete_fn, handler_fn},
    services::{
        CommandNode, CommandRegistry, DispatchError, DispatchOutcome, Dispatcher, ResolveError,
    },
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

struct Harness {
    platform: InMemoryPlatform,
    reporter: Arc<RecordingReporter>,
    registry: Arc<RwLock<CommandRegistry>>,
    dispatcher: Dispatcher,
}

impl Harness {
    fn register(&self, node: CommandNode) {
        self.registry
            .write()
            .expect("registry lock")
            .register(node)
            .expect("registration");
    }
}

#[fixture]
fn harness() -> Harness {
    let platform = InMemoryPlatform::new();
    let reporter = Arc::new(RecordingReporter::default());
    let registry = Arc::new(RwLock::new(CommandRegistry::new()));
    let dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        Arc::new(platform.clone()),
        reporter.clone(),
        Arc::new(DefaultClock),
        Duration::from_secs(5),
    );
    Harness {
        platform,
        reporter,
        registry,
        dispatcher,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ping_responds_with_pong(harness: Harness) {
    let ping = CommandNode::command("ping", "Health check")
        .and_then(|node| {
            node.with_handler(handler_fn(|context, _arguments| async move {
                context.create_response("Pong!").await?;
                Ok(())
            }))
        })
        .expect("valid command");
    harness.register(ping);

    let outcome = harness
        .dispatcher
        .dispatch(command_event("ping"))
        .await
        .expect("dispatched");

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            state: ResponseState::Responded
        }
    );
    assert_eq!(
        harness
            .platform
            .calls_of(PlatformOperation::CreateResponse)
            .expect("calls"),
        [PlatformCall::CreateResponse {
            token: "token-1".to_owned(),
            response: crate::command::domain::InitialResponse::Message("Pong!".into()),
        }]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handlers_receive_native_values(harness: Harness) {
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let echo = CommandNode::command("echo", "Echo")
        .and_then(|node| node.with_option(OptionSchema::required("text", "Text", OptionType::String)?))
        .and_then(|node| {
            node.with_handler(handler_fn(move |_context, arguments| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().expect("sink lock") = arguments.string("text").map(str::to_owned);
                    Ok(())
                }
            }))
        })
        .expect("valid command");
    harness.register(echo);

    harness
        .dispatcher
        .dispatch(command_event("echo").with_option(RawOption::new("text", "hi")))
        .await
        .expect("dispatched");

    assert_eq!(
        seen.lock().expect("sink lock").as_deref(),
        Some("hi")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_commands_are_dropped_silently(harness: Harness) {
    let result = harness.dispatcher.dispatch(command_event("nope")).await;

    assert!(matches!(
        result,
        Err(DispatchError::Unresolved(ResolveError::UnknownCommand { .. }))
    ));
    assert!(harness.reporter.failures().is_empty());
    assert!(harness.platform.calls().expect("calls").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn decode_failures_are_reported_without_invoking(harness: Harness) {
    let invoked = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&invoked);
    let strict = CommandNode::command("strict", "Strict")
        .and_then(|node| node.with_option(OptionSchema::required("text", "Text", OptionType::String)?))
        .and_then(|node| {
            node.with_handler(handler_fn(move |_context, _arguments| {
                let flag = Arc::clone(&flag);
                async move {
                    *flag.lock().expect("flag lock") = true;
                    Ok(())
                }
            }))
        })
        .expect("valid command");
    harness.register(strict);

    let result = harness.dispatcher.dispatch(command_event("strict")).await;

    assert!(matches!(result, Err(DispatchError::Decode { .. })));
    assert!(!*invoked.lock().expect("flag lock"));
    let failures = harness.reporter.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures.first().map(|failure| failure.stage),
        Some(DispatchStage::Decoding)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handler_failures_are_reported(harness: Harness) {
    let broken = CommandNode::command("broken", "Always fails")
        .and_then(|node| {
            node.with_handler(handler_fn(|_context, _arguments| async {
                Err(HandlerError::failed("database unavailable"))
            }))
        })
        .expect("valid command");
    harness.register(broken);

    let result = harness.dispatcher.dispatch(command_event("broken")).await;

    assert!(matches!(result, Err(DispatchError::Handler { .. })));
    let failures = harness.reporter.failures();
    let failure = failures.first().expect("reported failure");
    assert_eq!(failure.stage, DispatchStage::Invoking);
    assert_eq!(failure.command, "broken");
    assert!(failure.reason.contains("database unavailable"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn panicking_handlers_are_contained_and_reported(harness: Harness) {
    let boom = CommandNode::command("boom", "Always panics")
        .and_then(|node| {
            node.with_handler(handler_fn(|_context, _arguments| async {
                panic!("handler bug")
            }))
        })
        .expect("valid command");
    harness.register(boom);
    harness.register(leaf("after"));

    let result = harness.dispatcher.dispatch(command_event("boom")).await;

    assert!(matches!(
        &result,
        Err(DispatchError::HandlerPanicked { command, message })
            if command == "boom" && message == "handler bug"
    ));
    let failures = harness.reporter.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures.first().map(|failure| failure.stage),
        Some(DispatchStage::Invoking)
    );
    assert!(
        harness
            .dispatcher
            .dispatch(command_event("after"))
            .await
            .is_ok(),
        "later interactions still dispatch"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn panicking_autocomplete_handlers_are_reported(harness: Harness) {
    let query = OptionSchema::builder("query", OptionType::String)
        .autocomplete(true)
        .build()
        .expect("valid schema");
    let search = CommandNode::command("search", "Search")
        .and_then(|node| node.with_option(query))
        .and_then(|node| node.with_handler(handler_fn(|_context, _arguments| async { Ok(()) })))
        .and_then(|node| {
            node.with_autocomplete(
                "query",
                autocomplete_fn(|_request| async { panic!("suggestion bug") }),
            )
        })
        .expect("valid command");
    harness.register(search);

    let result = harness.dispatcher.dispatch(autocomplete_event(true)).await;

    assert!(matches!(
        &result,
        Err(DispatchError::Autocomplete { source, .. }) if source.to_string().contains("suggestion bug")
    ));
    assert_eq!(
        harness
            .reporter
            .failures()
            .first()
            .map(|failure| failure.stage),
        Some(DispatchStage::Autocompleting)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn silent_handlers_leave_the_interaction_unanswered(harness: Harness) {
    harness.register(leaf("quiet"));

    let outcome = harness
        .dispatcher
        .dispatch(command_event("quiet"))
        .await
        .expect("dispatched");

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            state: ResponseState::NotResponded
        }
    );
}

fn search_node() -> CommandNode {
    let query = OptionSchema::builder("query", OptionType::String)
        .autocomplete(true)
        .build()
        .expect("valid schema");
    CommandNode::command("search", "Search")
        .and_then(|node| node.with_option(query))
        .and_then(|node| {
            node.with_handler(handler_fn(|_context, _arguments| async { Ok(()) }))
        })
        .and_then(|node| {
            node.with_autocomplete(
                "query",
                autocomplete_fn(|request| async move {
                    let prefix = request.text().to_owned();
                    Ok((0..30)
                        .map(|index| {
                            let label = format!("{prefix}{index}");
                            OptionChoice::new(label.clone(), label)
                        })
                        .collect())
                }),
            )
        })
        .expect("valid command")
}

fn autocomplete_event(focused: bool) -> Interaction {
    let raw = RawOption::new("query", "ru");
    let option = if focused { raw.focused() } else { raw };
    Interaction::autocomplete(InteractionId::new(2), "token-2", "search").with_option(option)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn autocomplete_suggestions_are_truncated_to_25(harness: Harness) {
    harness.register(search_node());

    let outcome = harness
        .dispatcher
        .dispatch(autocomplete_event(true))
        .await
        .expect("dispatched");

    assert_eq!(outcome, DispatchOutcome::Suggested { count: 25 });
    let calls = harness
        .platform
        .calls_of(PlatformOperation::CreateAutocompleteResponse)
        .expect("calls");
    let Some(PlatformCall::CreateAutocompleteResponse { choices, .. }) = calls.first() else {
        panic!("expected autocomplete response, got {calls:?}");
    };
    assert_eq!(choices.first().map(|choice| choice.name.as_str()), Some("ru0"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn autocomplete_without_focus_is_reported(harness: Harness) {
    harness.register(search_node());

    let result = harness.dispatcher.dispatch(autocomplete_event(false)).await;

    assert!(matches!(result, Err(DispatchError::NoFocusedOption(_))));
    assert_eq!(
        harness
            .reporter
            .failures()
            .first()
            .map(|failure| failure.stage),
        Some(DispatchStage::Autocompleting)
    );
}

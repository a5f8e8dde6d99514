//! End-to-end dispatch through the framework.

use super::helpers::{GUILD, Harness, admin_group, echo_command, harness, ping_command};
use dawn::command::{
    adapters::{PlatformCall, PlatformOperation},
    domain::{
        Entity, EntityKind, InitialResponse, Interaction, InteractionId, InteractionPayload,
        RawOption, ResponsePayload, ResponseState,
    },
    ports::{DispatchStage, handler_fn},
    services::{CommandNode, DispatchError, DispatchOutcome},
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn sent_messages(harness: &Harness) -> Vec<InitialResponse> {
    harness
        .platform
        .calls_of(PlatformOperation::CreateResponse)
        .expect("calls")
        .into_iter()
        .filter_map(|call| match call {
            PlatformCall::CreateResponse { response, .. } => Some(response),
            _ => None,
        })
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ping_is_answered_exactly_once(harness: Harness) {
    harness
        .framework
        .register(ping_command())
        .expect("registration should succeed");

    let outcome = harness
        .framework
        .handle_interaction(Interaction::command(InteractionId::new(1), "t1", "ping"))
        .await
        .expect("task should not panic")
        .expect("dispatch should succeed");

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            state: ResponseState::Responded
        }
    );
    assert_eq!(
        sent_messages(&harness),
        [InitialResponse::Message(ResponsePayload::content("Pong!"))]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn echo_receives_the_decoded_string(harness: Harness) {
    harness
        .framework
        .register(echo_command())
        .expect("registration should succeed");
    let event = Interaction::command(InteractionId::new(2), "t2", "echo")
        .with_option(RawOption::new("text", "hi"));

    harness
        .framework
        .dispatch(event)
        .await
        .expect("dispatch should succeed");

    assert_eq!(
        sent_messages(&harness),
        [InitialResponse::Message(ResponsePayload::content("hi"))]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wire_payloads_route_to_subcommands(harness: Harness) {
    harness
        .framework
        .register(admin_group())
        .expect("registration should succeed");
    let payload: InteractionPayload = serde_json::from_value(json!({
        "id": "3",
        "type": 2,
        "token": "t3",
        "guild_id": GUILD.to_string(),
        "member": {"user": {"id": "1"}},
        "data": {
            "name": "admin",
            "options": [{
                "name": "kick",
                "type": 1,
                "options": [{"name": "member", "type": 6, "value": "77"}]
            }],
            "resolved": {"users": {"77": {"id": "77", "username": "mallory"}}}
        }
    }))
    .expect("payload should parse");
    let event = Interaction::try_from(payload).expect("payload should convert");

    harness
        .framework
        .dispatch(event)
        .await
        .expect("dispatch should succeed");

    assert_eq!(
        sent_messages(&harness),
        [InitialResponse::Message(ResponsePayload::content(
            "Kicked mallory"
        ))]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scoped_commands_are_invisible_elsewhere(harness: Harness) {
    harness
        .framework
        .register(admin_group())
        .expect("registration should succeed");
    let event = Interaction::command(InteractionId::new(4), "t4", "admin")
        .with_subcommand("kick")
        .with_option(RawOption::new("member", "77"))
        .with_resolved(Entity::new(77_u64, EntityKind::User, "mallory"));

    let result = harness.framework.dispatch(event).await;

    assert!(matches!(result, Err(DispatchError::Unresolved(_))));
    assert!(sent_messages(&harness).is_empty());
    assert!(harness.reporter.failures().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_required_option_is_reported(harness: Harness) {
    harness
        .framework
        .register(echo_command())
        .expect("registration should succeed");

    let result = harness
        .framework
        .handle_interaction(Interaction::command(InteractionId::new(5), "t5", "echo"))
        .await
        .expect("task should not panic");

    assert!(matches!(result, Err(DispatchError::Decode { .. })));
    let failures = harness.reporter.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures.first().map(|failure| (failure.stage, failure.interaction_id)),
        Some((DispatchStage::Decoding, InteractionId::new(5)))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_handlers_do_not_block_other_interactions(harness: Harness) {
    let gate = Arc::new(Notify::new());
    let waiting = Arc::clone(&gate);
    let slow = CommandNode::command("slow", "Waits for a signal")
        .and_then(|node| {
            node.with_handler(handler_fn(move |context, _arguments| {
                let waiting = Arc::clone(&waiting);
                async move {
                    waiting.notified().await;
                    context.create_response("slow done").await?;
                    Ok(())
                }
            }))
        })
        .expect("valid command");
    let releasing = Arc::clone(&gate);
    let fast = CommandNode::command("fast", "Releases the slow handler")
        .and_then(|node| {
            node.with_handler(handler_fn(move |context, _arguments| {
                let releasing = Arc::clone(&releasing);
                async move {
                    context.create_response("fast done").await?;
                    releasing.notify_one();
                    Ok(())
                }
            }))
        })
        .expect("valid command");
    harness.framework.register(slow).expect("registration");
    harness.framework.register(fast).expect("registration");

    let slow_task = harness
        .framework
        .handle_interaction(Interaction::command(InteractionId::new(6), "t6", "slow"));
    let fast_task = harness
        .framework
        .handle_interaction(Interaction::command(InteractionId::new(7), "t7", "fast"));

    let (slow_result, fast_result) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(slow_task, fast_task)
    })
    .await
    .expect("handlers should not deadlock");

    assert!(matches!(slow_result, Ok(Ok(_))));
    assert!(matches!(fast_result, Ok(Ok(_))));
    assert_eq!(sent_messages(&harness).len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn panicking_handlers_are_reported_through_spawned_dispatch(harness: Harness) {
    let boom = CommandNode::command("boom", "Always panics")
        .and_then(|node| {
            node.with_handler(handler_fn(|_context, _arguments| async {
                panic!("handler bug")
            }))
        })
        .expect("valid command");
    harness.framework.register(boom).expect("registration");

    let result = harness
        .framework
        .handle_interaction(Interaction::command(InteractionId::new(9), "t9", "boom"))
        .await
        .expect("dispatch task should not panic");

    assert!(matches!(result, Err(DispatchError::HandlerPanicked { .. })));
    let failures = harness.reporter.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures.first().map(|failure| failure.stage),
        Some(DispatchStage::Invoking)
    );
}

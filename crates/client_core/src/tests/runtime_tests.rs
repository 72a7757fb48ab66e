use super::*;
use crate::config::InteractionSettings;
use session_store::SessionStore;
use shared::{
    domain::{MessageId, MessageKind, Participant, ReasonTag},
    error::ErrorCode,
};

fn assistant(id: &str) -> Message {
    Message {
        id: MessageId::from(id),
        sender: Participant::AiAssistant,
        text: "Try a short evening walk.".into(),
        timestamp: 1_700_000_000_000,
        kind: MessageKind::Ai,
        reply_to: None,
        reactions: Vec::new(),
        has_feedback_slot: true,
    }
}

fn spawn_empty() -> SessionHandle {
    SessionHandle::spawn(ChatSession::new(
        InteractionSettings::default(),
        SessionStore::new(),
    ))
}

async fn next_matching(
    events: &mut broadcast::Receiver<ViewEvent>,
    wanted: impl Fn(&ViewEvent) -> bool,
) -> ViewEvent {
    loop {
        let event = events.recv().await.expect("event stream open");
        if wanted(&event) {
            return event;
        }
    }
}

fn assert_timer_fired_at(started: Instant, expected_ms: u64) {
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(expected_ms), "fired early: {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(expected_ms + 1), "fired late: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn saved_hint_runs_on_wall_clock() {
    let handle = spawn_empty();
    let mut events = handle.subscribe();
    let id = MessageId::from("m1");

    handle.append(assistant("m1")).await.expect("append");
    handle
        .submit(Intent::TapDislike {
            message_id: id.clone(),
        })
        .await
        .expect("dislike");
    handle
        .submit(Intent::ToggleReason {
            message_id: id.clone(),
            reason: ReasonTag::TooLong,
        })
        .await
        .expect("reason");

    let started = Instant::now();
    let shown = next_matching(&mut events, |event| {
        matches!(event, ViewEvent::SavedHintShown { .. })
    })
    .await;
    assert_eq!(shown, ViewEvent::SavedHintShown { message_id: id.clone() });
    assert_timer_fired_at(started, 500);

    let hidden = next_matching(&mut events, |event| {
        matches!(event, ViewEvent::SavedHintHidden { .. })
    })
    .await;
    assert_eq!(hidden, ViewEvent::SavedHintHidden { message_id: id.clone() });
    assert_timer_fired_at(started, 1_400);

    let view = handle.snapshot().await.expect("snapshot");
    let feedback = view
        .message(&id)
        .and_then(|message| message.feedback.clone())
        .expect("feedback view");
    assert_eq!(feedback.liked, Some(false));
    assert!(feedback.expanded);
    assert!(!feedback.saved_hint_visible);

    let session = handle.shutdown().await.expect("shutdown");
    assert!(session.now_ms() >= 1_400);
}

#[tokio::test(start_paused = true)]
async fn rejected_intents_are_broadcast() {
    let handle = spawn_empty();
    let mut events = handle.subscribe();

    handle
        .submit(Intent::SubmitRating { value: 3 })
        .await
        .expect("submit");

    match events.recv().await.expect("event") {
        ViewEvent::Rejected(report) => assert_eq!(report.code, ErrorCode::InvalidState),
        other => panic!("unexpected event {other:?}"),
    }
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn snapshot_catches_up_to_elapsed_time() {
    let handle = spawn_empty();
    let id = MessageId::from("m1");
    handle.append(assistant("m1")).await.expect("append");
    handle
        .submit(Intent::TapLike {
            message_id: id.clone(),
        })
        .await
        .expect("like");

    time::sleep(Duration::from_millis(700)).await;
    let view = handle.snapshot().await.expect("snapshot");
    let feedback = view
        .message(&id)
        .and_then(|message| message.feedback.clone())
        .expect("feedback view");
    assert!(feedback.saved_hint_visible);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn commands_fail_after_shutdown() {
    let handle = spawn_empty();
    let commands = handle.commands.clone();
    handle.shutdown().await.expect("shutdown");

    assert!(commands
        .send(RuntimeCommand::Intent(Intent::CancelReply))
        .await
        .is_err());
}

//! Opening conversation and JSON seed import.

use serde::{Deserialize, Serialize};
use shared::domain::{FeedbackEntry, Message, MessageId, MessageKind, Participant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackEntry>,
}

impl From<Message> for SeedMessage {
    fn from(message: Message) -> Self {
        Self {
            message,
            feedback: None,
        }
    }
}

pub fn parse_seed(raw: &str) -> Result<Vec<SeedMessage>, serde_json::Error> {
    serde_json::from_str(raw)
}

fn seeded(
    id: &str,
    sender: Participant,
    kind: MessageKind,
    timestamp: i64,
    text: &str,
) -> Message {
    Message {
        id: MessageId::from(id),
        sender,
        text: text.to_string(),
        timestamp,
        kind,
        reply_to: None,
        reactions: Vec::new(),
        has_feedback_slot: false,
    }
}

/// The conversation a fresh session opens with.
pub fn consultation_opening() -> Vec<SeedMessage> {
    let started = seeded(
        "1",
        Participant::System,
        MessageKind::Event,
        1_734_681_480_000,
        "Your consultation with the expert has started.",
    );
    let question = seeded(
        "2",
        Participant::User,
        MessageKind::Text,
        1_734_681_600_000,
        "Hi. Work has been overwhelming lately and I keep second-guessing my next step. Where should I start?",
    );
    let mut assistant_answer = seeded(
        "3",
        Participant::AiAssistant,
        MessageKind::Ai,
        1_734_681_660_000,
        "I'm looking at what you shared. Periods of heavy workload often come right before a change in role; it helps to list what drains you and what still energises you.",
    );
    assistant_answer.has_feedback_slot = true;
    let expert_reply = seeded(
        "4",
        Participant::HumanExpert,
        MessageKind::Human,
        1_734_681_720_000,
        "Agreed. Most of the pressure you describe comes from one project, which is why the whole week feels heavy.",
    );
    let mut follow_up = seeded(
        "5",
        Participant::User,
        MessageKind::Text,
        1_734_681_780_000,
        "Is there anything concrete I can do about it? I find it hard to focus.",
    );
    follow_up.reply_to = Some(MessageId::from("4"));
    let suggestion = seeded(
        "6",
        Participant::AiAssistant,
        MessageKind::Ai,
        1_734_681_840_000,
        "Try blocking two focused hours every morning before opening messages. Would you like a template for the week?",
    );

    vec![
        started.into(),
        question.into(),
        SeedMessage {
            message: assistant_answer,
            feedback: Some(FeedbackEntry {
                liked: Some(true),
                ..FeedbackEntry::default()
            }),
        },
        expert_reply.into(),
        follow_up.into(),
        suggestion.into(),
    ]
}

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Message, MessageId, Rating, ReasonSet, ReasonTag, SessionStatus},
    error::ErrorReport,
};

/// User intents emitted by the input layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    Send {
        text: String,
    },
    CancelReply,
    /// One drag sample; `dx`/`dy` are the displacement from the press origin.
    Swipe {
        message_id: MessageId,
        dx: f32,
        #[serde(default)]
        dy: f32,
    },
    Release {
        message_id: MessageId,
        final_dx: f32,
    },
    LongPress {
        message_id: MessageId,
    },
    PickEmoji {
        message_id: MessageId,
        emoji: String,
    },
    DismissPicker,
    TapLike {
        message_id: MessageId,
    },
    TapDislike {
        message_id: MessageId,
    },
    ToggleReason {
        message_id: MessageId,
        reason: ReasonTag,
    },
    ToggleReasonChips {
        message_id: MessageId,
    },
    UnmountMessage {
        message_id: MessageId,
    },
    EndSessionRequest,
    SelectStars {
        stars: u8,
    },
    SubmitRating {
        value: i64,
    },
    DismissRatingPrompt,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Send { .. } => "send",
            Intent::CancelReply => "cancel_reply",
            Intent::Swipe { .. } => "swipe",
            Intent::Release { .. } => "release",
            Intent::LongPress { .. } => "long_press",
            Intent::PickEmoji { .. } => "pick_emoji",
            Intent::DismissPicker => "dismiss_picker",
            Intent::TapLike { .. } => "tap_like",
            Intent::TapDislike { .. } => "tap_dislike",
            Intent::ToggleReason { .. } => "toggle_reason",
            Intent::ToggleReasonChips { .. } => "toggle_reason_chips",
            Intent::UnmountMessage { .. } => "unmount_message",
            Intent::EndSessionRequest => "end_session_request",
            Intent::SelectStars { .. } => "select_stars",
            Intent::SubmitRating { .. } => "submit_rating",
            Intent::DismissRatingPrompt => "dismiss_rating_prompt",
        }
    }
}

/// Discrete state changes published to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ViewEvent {
    MessageAppended {
        message_id: MessageId,
    },
    ReplyTargetChanged {
        #[serde(default)]
        target: Option<MessageId>,
    },
    ReactionPickerOpened {
        message_id: MessageId,
    },
    ReactionPickerClosed,
    ReactionAdded {
        message_id: MessageId,
        emoji: String,
    },
    FeedbackChanged {
        message_id: MessageId,
        feedback: FeedbackView,
    },
    SavedHintShown {
        message_id: MessageId,
    },
    SavedHintHidden {
        message_id: MessageId,
    },
    SessionEnded,
    RatingPromptChanged {
        prompt: RatingPromptView,
    },
    RatingCaptured {
        stars: u8,
    },
    Rejected(ErrorReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: usize,
}

impl ReactionCount {
    /// Single reactions render as a bare emoji pill.
    pub fn shows_badge(&self) -> bool {
        self.count > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackView {
    pub liked: Option<bool>,
    pub selected_reasons: ReasonSet,
    pub expanded: bool,
    pub saved_hint_visible: bool,
    /// Reveal progress of the reason chip row, 0.0 hidden to 1.0 shown.
    pub chip_row_progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipePhase {
    #[default]
    Idle,
    Dragging,
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwipeView {
    pub phase: SwipePhase,
    pub offset: f32,
    pub reveal_opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub message: Message,
    /// Text of the message this one replies to; absent when the reference dangles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_preview: Option<String>,
    pub reactions: Vec<ReactionCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackView>,
    pub swipe: SwipeView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPreview {
    pub message_id: MessageId,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatingPromptView {
    pub visible: bool,
    #[serde(default)]
    pub draft_stars: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatView {
    pub messages: Vec<MessageView>,
    #[serde(default)]
    pub composer_reply: Option<ReplyPreview>,
    #[serde(default)]
    pub picker_open_for: Option<MessageId>,
    pub reaction_palette: Vec<String>,
    pub status: SessionStatus,
    #[serde(default)]
    pub rating: Option<Rating>,
    pub rating_prompt: RatingPromptView,
}

impl ChatView {
    pub fn message(&self, message_id: &MessageId) -> Option<&MessageView> {
        self.messages
            .iter()
            .find(|view| &view.message.id == message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_use_adjacent_type_tags() {
        let intent = Intent::ToggleReason {
            message_id: MessageId::from("m1"),
            reason: ReasonTag::TooLong,
        };
        let json = serde_json::to_value(&intent).expect("serialize");
        assert_eq!(json["type"], "toggle_reason");
        assert_eq!(json["payload"]["reason"], "Too Long");

        let parsed: Intent =
            serde_json::from_str(r#"{"type":"swipe","payload":{"message_id":"m2","dx":42.0}}"#)
                .expect("parse swipe");
        assert_eq!(
            parsed,
            Intent::Swipe {
                message_id: MessageId::from("m2"),
                dx: 42.0,
                dy: 0.0,
            }
        );
    }

    #[test]
    fn badge_only_for_repeated_reactions() {
        let single = ReactionCount {
            emoji: "🙏".into(),
            count: 1,
        };
        let double = ReactionCount {
            emoji: "🔥".into(),
            count: 2,
        };
        assert!(!single.shows_badge());
        assert!(double.shows_badge());
    }
}

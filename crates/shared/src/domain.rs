use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChatError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Participant {
    User,
    HumanExpert,
    AiAssistant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Event,
    Ai,
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Participant,
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<String>,
    #[serde(default)]
    pub has_feedback_slot: bool,
}

impl Message {
    /// A message typed by the local user, stamped with the current wall clock.
    pub fn from_user(text: impl Into<String>, reply_to: Option<MessageId>) -> Self {
        Self {
            id: MessageId::random(),
            sender: Participant::User,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            kind: MessageKind::Text,
            reply_to,
            reactions: Vec::new(),
            has_feedback_slot: false,
        }
    }
}

/// Closed vocabulary of reasons a user can attach to a dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonTag {
    #[serde(rename = "Inaccurate")]
    Inaccurate,
    #[serde(rename = "Too Vague")]
    TooVague,
    #[serde(rename = "Too Long")]
    TooLong,
}

impl ReasonTag {
    pub const ALL: [ReasonTag; 3] = [ReasonTag::Inaccurate, ReasonTag::TooVague, ReasonTag::TooLong];

    pub fn label(self) -> &'static str {
        match self {
            ReasonTag::Inaccurate => "Inaccurate",
            ReasonTag::TooVague => "Too Vague",
            ReasonTag::TooLong => "Too Long",
        }
    }
}

impl fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReasonTag {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReasonTag::ALL
            .into_iter()
            .find(|tag| tag.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChatError::UnknownReason(s.to_string()))
    }
}

/// Insertion-ordered set of reason tags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonSet(Vec<ReasonTag>);

impl ReasonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: ReasonTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn insert(&mut self, tag: ReasonTag) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn remove(&mut self, tag: ReasonTag) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| *existing != tag);
        before != self.0.len()
    }

    /// Returns a copy with `tag` flipped: removed if present, appended otherwise.
    pub fn toggled(&self, tag: ReasonTag) -> Self {
        let mut next = self.clone();
        if !next.remove(tag) {
            next.insert(tag);
        }
        next
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[ReasonTag] {
        &self.0
    }
}

impl FromIterator<ReasonTag> for ReasonSet {
    fn from_iter<I: IntoIterator<Item = ReasonTag>>(iter: I) -> Self {
        let mut set = ReasonSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// `None` is the unset state; an absent entry means the same thing.
    #[serde(default)]
    pub liked: Option<bool>,
    #[serde(default)]
    pub dislike_reasons: ReasonSet,
}

impl FeedbackEntry {
    pub fn is_liked(&self) -> bool {
        self.liked == Some(true)
    }

    pub fn is_disliked(&self) -> bool {
        self.liked == Some(false)
    }
}

/// Star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, ChatError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ChatError::RatingOutOfRange(i64::from(stars)))
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ChatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl TryFrom<i64> for Rating {
    type Error = ChatError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ChatError::RatingOutOfRange(value))
            .and_then(Rating::new)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_set_keeps_first_insertion_order_without_duplicates() {
        let set: ReasonSet = [ReasonTag::TooLong, ReasonTag::Inaccurate, ReasonTag::TooLong]
            .into_iter()
            .collect();
        assert_eq!(set.as_slice(), &[ReasonTag::TooLong, ReasonTag::Inaccurate]);
    }

    #[test]
    fn toggling_a_present_tag_removes_it() {
        let set: ReasonSet = [ReasonTag::TooVague].into_iter().collect();
        assert!(set.toggled(ReasonTag::TooVague).is_empty());
        assert_eq!(
            set.toggled(ReasonTag::TooLong).as_slice(),
            &[ReasonTag::TooVague, ReasonTag::TooLong]
        );
    }

    #[test]
    fn reason_tags_use_display_labels_on_the_wire() {
        let json = serde_json::to_string(&ReasonTag::TooVague).expect("serialize");
        assert_eq!(json, "\"Too Vague\"");
        assert_eq!("too long".parse::<ReasonTag>().expect("parse"), ReasonTag::TooLong);
        assert!("Rude".parse::<ReasonTag>().is_err());
    }

    #[test]
    fn rating_rejects_values_outside_one_to_five() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::try_from(-3_i64).is_err());
        assert_eq!(Rating::new(5).expect("five").stars(), 5);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}

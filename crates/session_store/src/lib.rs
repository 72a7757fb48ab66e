//! In-memory owner of one consultation session: message log, reactions,
//! feedback, reply target, lifecycle status and rating.

use std::collections::HashMap;

use shared::{
    domain::{FeedbackEntry, Message, MessageId, Rating, ReasonSet, SessionStatus},
    error::ChatError,
    protocol::ReactionCount,
};
use tracing::{debug, info, warn};

pub mod seed;

pub use seed::SeedMessage;

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    messages: Vec<Message>,
    positions: HashMap<MessageId, usize>,
    feedback: HashMap<MessageId, FeedbackEntry>,
    reply_target: Option<MessageId>,
    status: SessionStatus,
    rating: Option<Rating>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from seed records, replaying each through the regular transitions.
    pub fn from_seed(seed: impl IntoIterator<Item = SeedMessage>) -> Result<Self, ChatError> {
        let mut store = Self::new();
        for SeedMessage { message, feedback } in seed {
            let message_id = message.id.clone();
            store.append_message(message)?;
            let Some(entry) = feedback else {
                continue;
            };
            match entry.liked {
                Some(true) => {
                    store.set_like_state(&message_id, true);
                }
                Some(false) => {
                    store.set_dislike_reasons(&message_id, entry.dislike_reasons);
                }
                None if !entry.dislike_reasons.is_empty() => {
                    store.set_dislike_reasons(&message_id, entry.dislike_reasons);
                }
                None => {}
            }
        }
        Ok(store)
    }

    pub fn append_message(&mut self, message: Message) -> Result<(), ChatError> {
        if self.positions.contains_key(&message.id) {
            warn!(message_id = %message.id, "rejected message with duplicate id");
            return Err(ChatError::DuplicateMessageId(message.id));
        }
        self.positions
            .insert(message.id.clone(), self.messages.len());
        self.messages.push(message);
        Ok(())
    }

    /// Sets or clears the reply target. The id is not checked against the log.
    pub fn set_reply_target(&mut self, target: Option<MessageId>) {
        self.reply_target = target;
    }

    pub fn add_reaction(&mut self, message_id: &MessageId, emoji: impl Into<String>) -> bool {
        let Some(position) = self.positions.get(message_id).copied() else {
            debug!(%message_id, "dropping reaction for unknown message");
            return false;
        };
        self.messages[position].reactions.push(emoji.into());
        true
    }

    pub fn set_like_state(&mut self, message_id: &MessageId, liked: bool) -> bool {
        let Some(entry) = self.feedback_entry_mut(message_id) else {
            return false;
        };
        entry.liked = Some(liked);
        if liked {
            entry.dislike_reasons = ReasonSet::new();
        }
        true
    }

    pub fn set_dislike_reasons(&mut self, message_id: &MessageId, reasons: ReasonSet) -> bool {
        let Some(entry) = self.feedback_entry_mut(message_id) else {
            return false;
        };
        entry.liked = Some(false);
        entry.dislike_reasons = reasons;
        true
    }

    pub fn clear_feedback(&mut self, message_id: &MessageId) -> bool {
        self.feedback.remove(message_id).is_some()
    }

    /// Returns `true` only on the first call.
    pub fn end_session(&mut self) -> bool {
        if self.status == SessionStatus::Ended {
            return false;
        }
        self.status = SessionStatus::Ended;
        info!(messages = self.messages.len(), "session ended");
        true
    }

    pub fn set_rating(&mut self, stars: i64) -> Result<Rating, ChatError> {
        let rating = Rating::try_from(stars)?;
        if self.status != SessionStatus::Ended {
            return Err(ChatError::SessionStillActive);
        }
        if let Some(previous) = self.rating {
            debug!(previous = previous.stars(), "overwriting session rating");
        }
        self.rating = Some(rating);
        Ok(rating)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, message_id: &MessageId) -> Option<&Message> {
        self.positions
            .get(message_id)
            .map(|position| &self.messages[*position])
    }

    pub fn contains(&self, message_id: &MessageId) -> bool {
        self.positions.contains_key(message_id)
    }

    pub fn reactions(&self, message_id: &MessageId) -> &[String] {
        self.message(message_id)
            .map(|message| message.reactions.as_slice())
            .unwrap_or_default()
    }

    /// Groups reactions by emoji in first-seen order.
    pub fn reaction_counts(&self, message_id: &MessageId) -> Vec<ReactionCount> {
        let mut counts: Vec<ReactionCount> = Vec::new();
        for emoji in self.reactions(message_id) {
            match counts.iter_mut().find(|count| &count.emoji == emoji) {
                Some(count) => count.count += 1,
                None => counts.push(ReactionCount {
                    emoji: emoji.clone(),
                    count: 1,
                }),
            }
        }
        counts
    }

    pub fn feedback(&self, message_id: &MessageId) -> Option<&FeedbackEntry> {
        self.feedback.get(message_id)
    }

    pub fn accepts_feedback(&self, message_id: &MessageId) -> bool {
        self.message(message_id)
            .is_some_and(|message| message.has_feedback_slot)
    }

    pub fn reply_target(&self) -> Option<&MessageId> {
        self.reply_target.as_ref()
    }

    /// Text of the referenced message, or `None` when the id dangles.
    pub fn resolve_preview(&self, message_id: &MessageId) -> Option<&str> {
        self.message(message_id).map(|message| message.text.as_str())
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    fn feedback_entry_mut(&mut self, message_id: &MessageId) -> Option<&mut FeedbackEntry> {
        if !self.accepts_feedback(message_id) {
            debug!(%message_id, "ignoring feedback for message without a feedback slot");
            return None;
        }
        Some(self.feedback.entry(message_id.clone()).or_default())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

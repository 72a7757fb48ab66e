//! Like/dislike/reason toggles, chip-row expansion and the debounced
//! "saved" hint for feedback-enabled messages.

use shared::{
    domain::{FeedbackEntry, MessageId, ReasonSet, ReasonTag},
    protocol::FeedbackView,
};

use crate::{config::InteractionSettings, timers::TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAction {
    TapLike,
    TapDislike,
    ToggleReason(ReasonTag),
}

/// The store transition a feedback action resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEdit {
    SetLike(bool),
    SetReasons(ReasonSet),
    Clear,
}

/// Like and dislike are tri-state toggles: repeating the active choice clears it.
pub fn plan_edit(action: FeedbackAction, entry: Option<&FeedbackEntry>) -> FeedbackEdit {
    let liked = entry.and_then(|entry| entry.liked);
    match action {
        FeedbackAction::TapLike if liked == Some(true) => FeedbackEdit::Clear,
        FeedbackAction::TapLike => FeedbackEdit::SetLike(true),
        FeedbackAction::TapDislike if liked == Some(false) => FeedbackEdit::Clear,
        FeedbackAction::TapDislike => FeedbackEdit::SetLike(false),
        FeedbackAction::ToggleReason(tag) => {
            let current = entry
                .filter(|entry| !entry.is_liked())
                .map(|entry| entry.dislike_reasons.clone())
                .unwrap_or_default();
            FeedbackEdit::SetReasons(current.toggled(tag))
        }
    }
}

/// Expansion for a freshly mounted view.
pub fn initial_expanded(entry: Option<&FeedbackEntry>) -> bool {
    entry.is_some_and(|entry| !entry.is_liked() && !entry.dislike_reasons.is_empty())
}

/// Expansion after `action` produced `entry`. Outside the forced cases the
/// previous value is kept, including a manual collapse while disliked.
pub fn next_expanded(
    action: Option<FeedbackAction>,
    entry: Option<&FeedbackEntry>,
    previous: bool,
) -> bool {
    let Some(entry) = entry else {
        return previous;
    };
    if entry.is_liked() {
        return false;
    }
    if !entry.dislike_reasons.is_empty() {
        return true;
    }
    if action == Some(FeedbackAction::TapDislike) && entry.is_disliked() {
        return true;
    }
    previous
}

/// Whether a manual expand/collapse is allowed for the current entry.
pub fn expansion_is_free(entry: Option<&FeedbackEntry>) -> bool {
    entry.map_or(true, |entry| {
        !entry.is_liked() && entry.dislike_reasons.is_empty()
    })
}

/// View-local state that never enters the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackLocal {
    pub expanded: bool,
    pub saved_hint_visible: bool,
}

impl FeedbackLocal {
    pub fn mounted(entry: Option<&FeedbackEntry>) -> Self {
        Self {
            expanded: initial_expanded(entry),
            saved_hint_visible: false,
        }
    }
}

pub fn derive_view(
    entry: Option<&FeedbackEntry>,
    local: FeedbackLocal,
    chip_row_progress: f32,
) -> FeedbackView {
    FeedbackView {
        liked: entry.and_then(|entry| entry.liked),
        selected_reasons: entry
            .map(|entry| entry.dislike_reasons.clone())
            .unwrap_or_default(),
        expanded: local.expanded,
        saved_hint_visible: local.saved_hint_visible,
        chip_row_progress,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HintPhase {
    Idle,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HintTimer {
    message_id: MessageId,
    phase: HintPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintTransition {
    Show(MessageId),
    Hide(MessageId),
}

/// Idle-debounce and hide-delay timers for the saved hint.
///
/// Each message has at most one pending timer; [`SavedHintTimers::cancel`] is
/// the only way one is dropped early, used both on restart and on teardown.
#[derive(Debug, Clone, Default)]
pub struct SavedHintTimers {
    queue: TimerQueue<HintTimer>,
}

impl SavedHintTimers {
    pub fn restart(&mut self, message_id: &MessageId, now_ms: u64, settings: &InteractionSettings) {
        self.cancel(message_id);
        self.queue.schedule(
            HintTimer {
                message_id: message_id.clone(),
                phase: HintPhase::Idle,
            },
            now_ms.saturating_add(settings.saved_hint_idle_ms),
        );
    }

    pub fn cancel(&mut self, message_id: &MessageId) -> bool {
        let mut cancelled = false;
        for phase in [HintPhase::Idle, HintPhase::Visible] {
            cancelled |= self.queue.cancel(&HintTimer {
                message_id: message_id.clone(),
                phase,
            });
        }
        cancelled
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.next_deadline()
    }

    /// Fires the earliest timer due at or before `now_ms`. Showing the hint
    /// schedules its hide relative to the show deadline.
    pub fn fire_next(
        &mut self,
        now_ms: u64,
        settings: &InteractionSettings,
    ) -> Option<HintTransition> {
        let (deadline, timer) = self.queue.pop_due(now_ms)?;
        match timer.phase {
            HintPhase::Idle => {
                self.queue.schedule(
                    HintTimer {
                        message_id: timer.message_id.clone(),
                        phase: HintPhase::Visible,
                    },
                    deadline.saturating_add(settings.saved_hint_visible_ms),
                );
                Some(HintTransition::Show(timer.message_id))
            }
            HintPhase::Visible => Some(HintTransition::Hide(timer.message_id)),
        }
    }
}

#[cfg(test)]
#[path = "tests/feedback_tests.rs"]
mod tests;

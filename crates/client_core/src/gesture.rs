//! Swipe-to-reply and long-press geometry. Nothing here touches the session
//! store: surfaces turn pointer samples into [`GestureIntent`]s for the engine.

use shared::{
    domain::MessageId,
    protocol::{SwipePhase, SwipeView},
};
use tracing::debug;

use crate::{
    animation::{AnimationRegistry, AnimationTag},
    config::InteractionSettings,
};

pub const REACTION_PALETTE: [&str; 5] = ["🙏", "✨", "🌙", "🔥", "❤️"];

const SETTLE_REST_EPSILON: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureIntent {
    CommitReply,
}

/// Opacity of the reply affordance revealed behind a bubble dragged by `offset`.
pub fn reveal_opacity(offset: f32) -> f32 {
    if offset <= 0.0 {
        0.0
    } else if offset <= 30.0 {
        offset / 30.0 * 0.6
    } else if offset < 80.0 {
        0.6 + (offset - 30.0) / 50.0 * 0.4
    } else {
        1.0
    }
}

/// Rightward-only offset, capped at the configured maximum. Never panics on
/// unvalidated settings: a NaN or negative cap pins the offset to zero.
fn clamp_offset(dx: f32, settings: &InteractionSettings) -> f32 {
    dx.max(0.0).min(settings.max_swipe_offset.max(0.0))
}

#[derive(Debug, Clone, Default)]
pub struct SwipeGesture {
    phase: SwipePhase,
    offset: f32,
}

impl SwipeGesture {
    pub fn phase(&self) -> SwipePhase {
        self.phase
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Feeds one drag sample measured from the press origin. A settling bubble
    /// cannot be grabbed until it is back at rest.
    pub fn drag(
        &mut self,
        dx: f32,
        dy: f32,
        settings: &InteractionSettings,
        animations: &mut AnimationRegistry,
    ) {
        match self.phase {
            SwipePhase::Dragging => {}
            SwipePhase::Settling => {
                debug!(dx, "drag ignored while bubble settles");
                return;
            }
            SwipePhase::Idle => {
                let horizontal = dx.abs();
                if horizontal <= settings.drag_activation_px || horizontal <= dy.abs() {
                    debug!(dx, dy, "drag below activation gate or vertical-dominant");
                    return;
                }
                self.phase = SwipePhase::Dragging;
            }
        }
        self.offset = clamp_offset(dx, settings);
        animations
            .ensure(AnimationTag::SwipeOffset, self.offset)
            .jump_to(self.offset);
    }

    /// Ends a drag. Only a surface that is actually dragging can commit, so a
    /// repeated release never commits twice.
    pub fn release(
        &mut self,
        final_dx: f32,
        settings: &InteractionSettings,
        animations: &mut AnimationRegistry,
    ) -> Option<GestureIntent> {
        if self.phase != SwipePhase::Dragging {
            return None;
        }
        self.offset = clamp_offset(final_dx, settings);
        let committed = self.offset >= settings.reply_commit_offset;

        let handle = animations.ensure(AnimationTag::SwipeOffset, self.offset);
        handle.jump_to(self.offset);
        handle.animate_to(0.0, settings.settle_time_constant_ms, SETTLE_REST_EPSILON);
        self.phase = SwipePhase::Settling;
        self.sync(animations);

        committed.then_some(GestureIntent::CommitReply)
    }

    /// Pulls the settling offset from the animation registry; returns to idle at rest.
    pub fn sync(&mut self, animations: &AnimationRegistry) {
        if self.phase != SwipePhase::Settling {
            return;
        }
        match animations.get(AnimationTag::SwipeOffset) {
            Some(handle) if !handle.is_at_rest() => self.offset = handle.value(),
            _ => {
                self.offset = 0.0;
                self.phase = SwipePhase::Idle;
            }
        }
    }

    pub fn accepts_long_press(&self) -> bool {
        self.phase == SwipePhase::Idle
    }

    pub fn view(&self) -> SwipeView {
        SwipeView {
            phase: self.phase,
            offset: self.offset,
            reveal_opacity: reveal_opacity(self.offset),
        }
    }
}

/// The emoji overlay opened by a long press. Only one message at a time.
#[derive(Debug, Clone, Default)]
pub struct ReactionPicker {
    open_for: Option<MessageId>,
}

impl ReactionPicker {
    pub fn open(&mut self, message_id: MessageId) {
        self.open_for = Some(message_id);
    }

    pub fn close(&mut self) -> bool {
        self.open_for.take().is_some()
    }

    pub fn open_for(&self) -> Option<&MessageId> {
        self.open_for.as_ref()
    }

    pub fn is_open_for(&self, message_id: &MessageId) -> bool {
        self.open_for.as_ref() == Some(message_id)
    }

    pub fn palette() -> Vec<String> {
        REACTION_PALETTE.iter().map(|emoji| emoji.to_string()).collect()
    }
}

#[cfg(test)]
#[path = "tests/gesture_tests.rs"]
mod tests;

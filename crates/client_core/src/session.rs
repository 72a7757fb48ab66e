//! The interaction engine: applies intents to the session store, owns the
//! per-message surfaces and drives timers and animations on a logical clock.

use std::collections::HashMap;

use session_store::{seed, SessionStore};
use shared::{
    domain::{Message, MessageId, SessionStatus},
    error::ChatError,
    protocol::{ChatView, FeedbackView, Intent, MessageView, ReplyPreview, SwipeView, ViewEvent},
};
use tracing::debug;

use crate::{
    animation::{AnimationRegistry, AnimationTag},
    config::InteractionSettings,
    feedback::{
        derive_view, expansion_is_free, next_expanded, plan_edit, FeedbackAction, FeedbackEdit,
        FeedbackLocal, HintTransition, SavedHintTimers,
    },
    gesture::{GestureIntent, ReactionPicker, SwipeGesture},
    lifecycle::LifecycleController,
};

/// Frame interval used while any surface is animating.
pub const FRAME_INTERVAL_MS: u64 = 16;

const CHIP_ROW_REST_EPSILON: f32 = 0.001;

/// View-scoped state for one rendered message.
#[derive(Debug, Default)]
struct MessageSurface {
    gesture: SwipeGesture,
    animations: AnimationRegistry,
    feedback: Option<FeedbackLocal>,
}

impl MessageSurface {
    fn tick(&mut self, dt_ms: f32) {
        self.animations.step_all(dt_ms);
        self.gesture.sync(&self.animations);
    }

    fn feedback_local(&mut self, store: &SessionStore, message_id: &MessageId) -> FeedbackLocal {
        if let Some(local) = self.feedback {
            return local;
        }
        let local = FeedbackLocal::mounted(store.feedback(message_id));
        self.animations
            .ensure(AnimationTag::ChipRow, chip_target(local.expanded))
            .jump_to(chip_target(local.expanded));
        self.feedback = Some(local);
        local
    }

    fn set_expanded(&mut self, expanded: bool, settings: &InteractionSettings) {
        if let Some(local) = self.feedback.as_mut() {
            local.expanded = expanded;
        }
        self.animations
            .ensure(AnimationTag::ChipRow, chip_target(!expanded))
            .animate_to(
                chip_target(expanded),
                settings.chip_row_time_constant_ms,
                CHIP_ROW_REST_EPSILON,
            );
    }

    fn set_hint_visible(&mut self, visible: bool) -> bool {
        match self.feedback.as_mut() {
            Some(local) if local.saved_hint_visible != visible => {
                local.saved_hint_visible = visible;
                true
            }
            _ => false,
        }
    }
}

fn chip_target(expanded: bool) -> f32 {
    if expanded {
        1.0
    } else {
        0.0
    }
}

pub struct ChatSession {
    settings: InteractionSettings,
    store: SessionStore,
    surfaces: HashMap<MessageId, MessageSurface>,
    picker: ReactionPicker,
    hints: SavedHintTimers,
    lifecycle: LifecycleController,
    now_ms: u64,
}

impl ChatSession {
    pub fn new(settings: InteractionSettings, store: SessionStore) -> Self {
        Self {
            settings,
            store,
            surfaces: HashMap::new(),
            picker: ReactionPicker::default(),
            hints: SavedHintTimers::default(),
            lifecycle: LifecycleController::default(),
            now_ms: 0,
        }
    }

    /// A session opened with the default consultation seed.
    pub fn with_opening(settings: InteractionSettings) -> Result<Self, ChatError> {
        let store = SessionStore::from_seed(seed::consultation_opening())?;
        Ok(Self::new(settings, store))
    }

    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Appends a message produced outside the composer (assistant, expert, system).
    pub fn append_message(&mut self, message: Message) -> Result<Vec<ViewEvent>, ChatError> {
        let message_id = message.id.clone();
        self.store.append_message(message)?;
        Ok(vec![ViewEvent::MessageAppended { message_id }])
    }

    pub fn apply(&mut self, intent: Intent) -> Result<Vec<ViewEvent>, ChatError> {
        debug!(intent = intent.name(), now_ms = self.now_ms, "applying intent");
        match intent {
            Intent::Send { text } => self.send(&text),
            Intent::CancelReply => Ok(self.set_reply_target(None)),
            Intent::Swipe { message_id, dx, dy } => {
                if let Some(surface) = surface_entry(&self.store, &mut self.surfaces, &message_id) {
                    surface
                        .gesture
                        .drag(dx, dy, &self.settings, &mut surface.animations);
                }
                Ok(Vec::new())
            }
            Intent::Release {
                message_id,
                final_dx,
            } => {
                let outcome = match surface_entry(&self.store, &mut self.surfaces, &message_id) {
                    Some(surface) => {
                        surface
                            .gesture
                            .release(final_dx, &self.settings, &mut surface.animations)
                    }
                    None => None,
                };
                Ok(match outcome {
                    Some(GestureIntent::CommitReply) => self.set_reply_target(Some(message_id)),
                    None => Vec::new(),
                })
            }
            Intent::LongPress { message_id } => Ok(self.long_press(message_id)),
            Intent::PickEmoji { message_id, emoji } => Ok(self.pick_emoji(&message_id, emoji)),
            Intent::DismissPicker => Ok(if self.picker.close() {
                vec![ViewEvent::ReactionPickerClosed]
            } else {
                Vec::new()
            }),
            Intent::TapLike { message_id } => {
                Ok(self.feedback_action(&message_id, FeedbackAction::TapLike))
            }
            Intent::TapDislike { message_id } => {
                Ok(self.feedback_action(&message_id, FeedbackAction::TapDislike))
            }
            Intent::ToggleReason { message_id, reason } => {
                Ok(self.feedback_action(&message_id, FeedbackAction::ToggleReason(reason)))
            }
            Intent::ToggleReasonChips { message_id } => Ok(self.toggle_reason_chips(&message_id)),
            Intent::UnmountMessage { message_id } => Ok(self.unmount(&message_id)),
            Intent::EndSessionRequest => Ok(self.lifecycle.request_end(&mut self.store)),
            Intent::SelectStars { stars } => self.lifecycle.select_stars(stars),
            Intent::SubmitRating { value } => self.lifecycle.submit(&mut self.store, value),
            Intent::DismissRatingPrompt => Ok(self.lifecycle.dismiss()),
        }
    }

    /// Moves the logical clock forward, firing due timers in order and stepping
    /// animations in between.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<ViewEvent> {
        self.advance_to(self.now_ms.saturating_add(elapsed_ms))
    }

    pub fn advance_to(&mut self, target_ms: u64) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        if target_ms <= self.now_ms {
            return events;
        }
        while let Some(deadline) = self.hints.next_deadline().filter(|d| *d <= target_ms) {
            self.step_surfaces(deadline);
            while let Some(transition) = self.hints.fire_next(self.now_ms, &self.settings) {
                events.extend(self.apply_hint_transition(transition));
            }
        }
        self.step_surfaces(target_ms);
        events
    }

    /// Next logical time the engine needs to run without new input.
    pub fn next_wakeup(&self) -> Option<u64> {
        let frame = self
            .surfaces
            .values()
            .any(|surface| surface.animations.is_animating())
            .then(|| self.now_ms.saturating_add(FRAME_INTERVAL_MS));
        match (frame, self.hints.next_deadline()) {
            (Some(frame), Some(timer)) => Some(frame.min(timer)),
            (frame, timer) => frame.or(timer),
        }
    }

    pub fn feedback_view(&self, message_id: &MessageId) -> Option<FeedbackView> {
        if !self.store.accepts_feedback(message_id) {
            return None;
        }
        let entry = self.store.feedback(message_id);
        let surface = self.surfaces.get(message_id);
        let local = surface
            .and_then(|surface| surface.feedback)
            .unwrap_or_else(|| FeedbackLocal::mounted(entry));
        let progress = surface
            .map(|surface| {
                surface
                    .animations
                    .value_or(AnimationTag::ChipRow, chip_target(local.expanded))
            })
            .unwrap_or_else(|| chip_target(local.expanded));
        Some(derive_view(entry, local, progress))
    }

    pub fn swipe_view(&self, message_id: &MessageId) -> SwipeView {
        self.surfaces
            .get(message_id)
            .map(|surface| surface.gesture.view())
            .unwrap_or_default()
    }

    pub fn view(&self) -> ChatView {
        let messages = self
            .store
            .messages()
            .iter()
            .map(|message| MessageView {
                message: message.clone(),
                reply_preview: message
                    .reply_to
                    .as_ref()
                    .and_then(|target| self.store.resolve_preview(target))
                    .map(str::to_string),
                reactions: self.store.reaction_counts(&message.id),
                feedback: self.feedback_view(&message.id),
                swipe: self.swipe_view(&message.id),
            })
            .collect();

        ChatView {
            messages,
            composer_reply: self.store.reply_target().map(|target| ReplyPreview {
                message_id: target.clone(),
                text: self.store.resolve_preview(target).map(str::to_string),
            }),
            picker_open_for: self.picker.open_for().cloned(),
            reaction_palette: ReactionPicker::palette(),
            status: self.store.status(),
            rating: self.store.rating(),
            rating_prompt: self.lifecycle.prompt(),
        }
    }

    fn send(&mut self, text: &str) -> Result<Vec<ViewEvent>, ChatError> {
        if self.store.status() == SessionStatus::Ended {
            return Err(ChatError::SessionEnded);
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let reply_to = self.store.reply_target().cloned();
        let had_target = reply_to.is_some();
        let mut events = self.append_message(Message::from_user(text, reply_to))?;
        if had_target {
            events.extend(self.set_reply_target(None));
        }
        Ok(events)
    }

    fn set_reply_target(&mut self, target: Option<MessageId>) -> Vec<ViewEvent> {
        if self.store.reply_target() == target.as_ref() {
            return Vec::new();
        }
        self.store.set_reply_target(target.clone());
        vec![ViewEvent::ReplyTargetChanged { target }]
    }

    fn long_press(&mut self, message_id: MessageId) -> Vec<ViewEvent> {
        let accepts = surface_entry(&self.store, &mut self.surfaces, &message_id)
            .is_some_and(|surface| surface.gesture.accepts_long_press());
        if !accepts {
            debug!(%message_id, "long press ignored");
            return Vec::new();
        }
        self.picker.open(message_id.clone());
        vec![ViewEvent::ReactionPickerOpened { message_id }]
    }

    fn pick_emoji(&mut self, message_id: &MessageId, emoji: String) -> Vec<ViewEvent> {
        if !self.picker.is_open_for(message_id) {
            debug!(%message_id, "emoji picked without an open picker");
            return Vec::new();
        }
        self.picker.close();
        let mut events = Vec::with_capacity(2);
        if self.store.add_reaction(message_id, emoji.clone()) {
            events.push(ViewEvent::ReactionAdded {
                message_id: message_id.clone(),
                emoji,
            });
        }
        events.push(ViewEvent::ReactionPickerClosed);
        events
    }

    fn feedback_action(&mut self, message_id: &MessageId, action: FeedbackAction) -> Vec<ViewEvent> {
        if !self.store.accepts_feedback(message_id) {
            debug!(%message_id, ?action, "feedback ignored for message without a feedback slot");
            return Vec::new();
        }
        let Some(surface) = surface_entry(&self.store, &mut self.surfaces, message_id) else {
            return Vec::new();
        };
        let previous = surface.feedback_local(&self.store, message_id);

        match plan_edit(action, self.store.feedback(message_id)) {
            FeedbackEdit::SetLike(liked) => {
                self.store.set_like_state(message_id, liked);
            }
            FeedbackEdit::SetReasons(reasons) => {
                self.store.set_dislike_reasons(message_id, reasons);
            }
            FeedbackEdit::Clear => {
                self.store.clear_feedback(message_id);
            }
        }

        let mut events = Vec::new();
        let expanded = next_expanded(
            Some(action),
            self.store.feedback(message_id),
            previous.expanded,
        );
        if expanded != previous.expanded {
            surface.set_expanded(expanded, &self.settings);
        }
        if surface.set_hint_visible(false) {
            events.push(ViewEvent::SavedHintHidden {
                message_id: message_id.clone(),
            });
        }
        self.hints.restart(message_id, self.now_ms, &self.settings);

        if let Some(feedback) = self.feedback_view(message_id) {
            events.push(ViewEvent::FeedbackChanged {
                message_id: message_id.clone(),
                feedback,
            });
        }
        events
    }

    fn toggle_reason_chips(&mut self, message_id: &MessageId) -> Vec<ViewEvent> {
        if !self.store.accepts_feedback(message_id)
            || !expansion_is_free(self.store.feedback(message_id))
        {
            return Vec::new();
        }
        let Some(surface) = surface_entry(&self.store, &mut self.surfaces, message_id) else {
            return Vec::new();
        };
        let local = surface.feedback_local(&self.store, message_id);
        surface.set_expanded(!local.expanded, &self.settings);

        self.feedback_view(message_id)
            .map(|feedback| ViewEvent::FeedbackChanged {
                message_id: message_id.clone(),
                feedback,
            })
            .into_iter()
            .collect()
    }

    /// Drops the message's surface together with its animations and any
    /// pending saved-hint timers.
    fn unmount(&mut self, message_id: &MessageId) -> Vec<ViewEvent> {
        self.hints.cancel(message_id);
        self.surfaces.remove(message_id);
        if self.picker.is_open_for(message_id) {
            self.picker.close();
            return vec![ViewEvent::ReactionPickerClosed];
        }
        Vec::new()
    }

    fn apply_hint_transition(&mut self, transition: HintTransition) -> Vec<ViewEvent> {
        let (message_id, visible) = match transition {
            HintTransition::Show(message_id) => (message_id, true),
            HintTransition::Hide(message_id) => (message_id, false),
        };
        let changed = self
            .surfaces
            .get_mut(&message_id)
            .is_some_and(|surface| surface.set_hint_visible(visible));
        if !changed {
            return Vec::new();
        }
        if visible {
            vec![ViewEvent::SavedHintShown { message_id }]
        } else {
            vec![ViewEvent::SavedHintHidden { message_id }]
        }
    }

    fn step_surfaces(&mut self, to_ms: u64) {
        let dt = to_ms.saturating_sub(self.now_ms);
        if dt > 0 {
            for surface in self.surfaces.values_mut() {
                surface.tick(dt as f32);
            }
        }
        self.now_ms = self.now_ms.max(to_ms);
    }
}

/// Surfaces exist only for messages in the log; they are created on first use.
fn surface_entry<'a>(
    store: &SessionStore,
    surfaces: &'a mut HashMap<MessageId, MessageSurface>,
    message_id: &MessageId,
) -> Option<&'a mut MessageSurface> {
    if !store.contains(message_id) {
        debug!(%message_id, "no surface for unknown message");
        return None;
    }
    Some(surfaces.entry(message_id.clone()).or_default())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

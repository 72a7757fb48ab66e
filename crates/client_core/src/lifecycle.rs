//! End-of-session transition and the rating prompt.

use session_store::SessionStore;
use shared::{
    domain::Rating,
    error::ChatError,
    protocol::{RatingPromptView, ViewEvent},
};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct LifecycleController {
    prompt: RatingPromptView,
}

impl LifecycleController {
    pub fn prompt(&self) -> RatingPromptView {
        self.prompt
    }

    /// Ends the session and opens the rating prompt. Repeated requests change nothing.
    pub fn request_end(&mut self, store: &mut SessionStore) -> Vec<ViewEvent> {
        if !store.end_session() {
            return Vec::new();
        }
        self.prompt = RatingPromptView {
            visible: true,
            draft_stars: store.rating().map(Rating::stars),
        };
        vec![
            ViewEvent::SessionEnded,
            ViewEvent::RatingPromptChanged {
                prompt: self.prompt,
            },
        ]
    }

    /// Records a star selection in the prompt without storing it.
    pub fn select_stars(&mut self, stars: u8) -> Result<Vec<ViewEvent>, ChatError> {
        let rating = Rating::new(stars)?;
        self.prompt.draft_stars = Some(rating.stars());
        Ok(vec![ViewEvent::RatingPromptChanged {
            prompt: self.prompt,
        }])
    }

    pub fn submit(
        &mut self,
        store: &mut SessionStore,
        value: i64,
    ) -> Result<Vec<ViewEvent>, ChatError> {
        let rating = store.set_rating(value)?;
        self.prompt.draft_stars = Some(rating.stars());
        info!(stars = rating.stars(), "rating captured");
        Ok(vec![ViewEvent::RatingCaptured {
            stars: rating.stars(),
        }])
    }

    /// Hides the prompt; the session stays ended and any stored rating is kept.
    pub fn dismiss(&mut self) -> Vec<ViewEvent> {
        if !self.prompt.visible {
            return Vec::new();
        }
        self.prompt.visible = false;
        vec![ViewEvent::RatingPromptChanged {
            prompt: self.prompt,
        }]
    }
}

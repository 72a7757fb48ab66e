//! Client-side interaction engine for a consultation chat: swipe-to-reply,
//! reactions, per-message feedback with a debounced saved hint, and the
//! end-of-session rating flow.

pub mod animation;
pub mod config;
pub mod feedback;
pub mod gesture;
pub mod lifecycle;
pub mod runtime;
pub mod session;
pub mod timers;

pub use config::{load_settings, InteractionSettings};
pub use runtime::SessionHandle;
pub use session::ChatSession;

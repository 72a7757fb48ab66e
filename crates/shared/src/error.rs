use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    InvalidState,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message id {0} already exists in the session log")]
    DuplicateMessageId(MessageId),
    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(i64),
    #[error("unknown dislike reason {0:?}")]
    UnknownReason(String),
    #[error("rating can only be captured after the session has ended")]
    SessionStillActive,
    #[error("session has ended; new messages are not accepted")]
    SessionEnded,
}

impl ChatError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::DuplicateMessageId(_)
            | ChatError::RatingOutOfRange(_)
            | ChatError::UnknownReason(_) => ErrorCode::InvalidArgument,
            ChatError::SessionStillActive | ChatError::SessionEnded => ErrorCode::InvalidState,
        }
    }
}

/// Serializable form of a rejected intent, published to view subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ChatError> for ErrorReport {
    fn from(value: ChatError) -> Self {
        Self::new(value.code(), value.to_string())
    }
}

impl From<&ChatError> for ErrorReport {
    fn from(value: &ChatError) -> Self {
        Self::new(value.code(), value.to_string())
    }
}

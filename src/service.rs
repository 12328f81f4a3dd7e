use async_trait::async_trait;

use crate::models::{ConfessionRecord, NewConfession, ReactionKind};

pub const GENERIC_SUBMISSION_ERROR: &str = "Failed to post. Please try again.";

/// Error returned by a [`ConfessionService`]. The message, when present, is
/// meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.user_message())]
pub struct SubmissionError {
    pub message: Option<String>,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn without_message() -> Self {
        Self { message: None }
    }

    pub fn user_message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(GENERIC_SUBMISSION_ERROR)
    }
}

/// Accepts new confessions on behalf of the composer.
#[async_trait]
pub trait ConfessionService: Send + Sync {
    async fn submit(&self, request: NewConfession) -> Result<ConfessionRecord, SubmissionError>;
}

/// Supplies the records and the category tabs the feed renders.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn confessions(&self) -> Vec<ConfessionRecord>;

    fn categories(&self) -> Vec<String>;
}

/// Receives reactions. Fire-and-forget: nothing is returned to the feed.
#[async_trait]
pub trait ReactionSink: Send + Sync {
    async fn react(&self, confession_id: &str, kind: ReactionKind);
}

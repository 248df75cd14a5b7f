//! Error types surfaced by the gamification core.
use thiserror::Error;

/// Boxed storage backend error.
pub type StorageFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum QuestError {
    /// The challenge was already finished today; nothing was changed.
    #[error("challenge `{id}` is already completed")]
    AlreadyCompleted { id: String },

    /// Today's set cannot be regenerated without discarding progress.
    #[error("cannot refresh today's challenges: {completed} already completed")]
    AlreadyCompletedToday { completed: usize },

    #[error("challenge `{id}` is not part of today's set")]
    UnknownChallenge { id: String },

    #[error("failed to write `{key}` to storage")]
    StorageWrite {
        key: String,
        #[source]
        source: StorageFailure,
    },

    #[error("failed to encode `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid gamification data: {0}")]
    Config(#[from] serde_json::Error),
}

impl QuestError {
    /// True for rejections the user caused (as opposed to storage faults).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AlreadyCompleted { .. }
                | Self::AlreadyCompletedToday { .. }
                | Self::UnknownChallenge { .. }
        )
    }
}

//! Non-fatal faults raised while rendering.
//!
//! None of these abort the hosting view. Each one maps to a safe visual
//! fallback and a log record at the level that matches its severity.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayFault {
    /// A tutorial step names a selector that matches nothing on screen.
    #[error("tutorial target not found: {selector}")]
    AnchorNotFound { selector: String },

    /// A `<think>` region was opened but never closed in finished content.
    #[error("unterminated reasoning tag in message {message_id}")]
    MalformedStreamTag { message_id: String },

    /// Writing to the system clipboard failed.
    #[error("failed to copy: {reason}")]
    ClipboardWriteFailure { reason: String },

    /// The current step index does not point at a step.
    #[error("tutorial step {index} missing (have {len} steps)")]
    StepDataMissing { index: usize, len: usize },
}

impl DisplayFault {
    /// Emits the fault to the log at its severity.
    pub fn report(&self) {
        match self {
            DisplayFault::AnchorNotFound { .. } => tracing::warn!("{self}"),
            DisplayFault::MalformedStreamTag { .. } => tracing::debug!("{self}"),
            DisplayFault::ClipboardWriteFailure { .. } | DisplayFault::StepDataMissing { .. } => {
                tracing::error!("{self}");
            }
        }
    }

    /// Returns true if the fault should be shown to the user, not just logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, DisplayFault::ClipboardWriteFailure { .. })
    }
}

//! Copy-to-clipboard with a user-facing notice.

use thiserror::Error;

use crate::error::DisplayFault;

/// Failure reported by a clipboard backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ClipboardError(pub String);

/// Somewhere text can be copied to.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Short message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Copies `text` and returns the notice to show.
///
/// Empty text is a no-op and produces no notice.
pub fn copy_message<S: ClipboardSink + ?Sized>(sink: &mut S, text: &str) -> Option<Notice> {
    if text.is_empty() {
        return None;
    }

    match sink.write_text(text) {
        Ok(()) => Some(Notice::info("Copied to clipboard!")),
        Err(err) => {
            let fault = DisplayFault::ClipboardWriteFailure { reason: err.0 };
            fault.report();
            fault
                .is_user_visible()
                .then(|| Notice::error(capitalize(&fault.to_string())))
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryClipboard {
        contents: Option<String>,
        fail_with: Option<String>,
    }

    impl ClipboardSink for MemoryClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if let Some(reason) = &self.fail_with {
                return Err(ClipboardError(reason.clone()));
            }
            self.contents = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_copy_success() {
        let mut sink = MemoryClipboard::default();
        let notice = copy_message(&mut sink, "hello");

        assert_eq!(notice, Some(Notice::info("Copied to clipboard!")));
        assert_eq!(sink.contents.as_deref(), Some("hello"));
    }

    #[test]
    fn test_copy_failure_is_reported_not_raised() {
        let mut sink = MemoryClipboard {
            fail_with: Some("permission denied".to_string()),
            ..MemoryClipboard::default()
        };
        let notice = copy_message(&mut sink, "hello");

        assert_eq!(notice, Some(Notice::error("Failed to copy: permission denied")));
        assert_eq!(sink.contents, None);
    }

    #[test]
    fn test_copy_empty_is_noop() {
        let mut sink = MemoryClipboard::default();
        assert_eq!(copy_message(&mut sink, ""), None);
        assert_eq!(sink.contents, None);
    }
}

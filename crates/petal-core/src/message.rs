//! Chat message data and the view model derived from it.
//!
//! Messages are stored raw: assistant content may still carry `<think>`
//! regions and attachments may be referenced by inline data or by URL.
//! [`MessageView`] is recomputed from a message on every render.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::DisplayFault;
use crate::reasoning::{merge_reasoning, parse};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
    System,
}

/// A file or image attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachment {
    pub name: Option<String>,
    pub mime_type: Option<String>,
    /// Explicit image flag. When absent the mime type decides.
    pub is_image: Option<bool>,
    /// Base64 payload without the `data:` prefix.
    pub data: Option<String>,
    pub preview: Option<String>,
    pub src: Option<String>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.is_image.unwrap_or_else(|| {
            self.mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("image/"))
        })
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Attachment")
    }

    /// Resolves the URL to display or download: preview, then src, then a
    /// `data:` URL built from the inline payload.
    pub fn url(&self) -> Option<String> {
        if let Some(preview) = &self.preview {
            return Some(preview.clone());
        }
        if let Some(src) = &self.src {
            return Some(src.clone());
        }
        self.data.as_ref().map(|data| {
            let mime = self
                .mime_type
                .as_deref()
                .unwrap_or("application/octet-stream");
            format!("data:{mime};base64,{data}")
        })
    }

    /// Size of the payload in bytes, when it is available inline.
    pub fn decoded_len(&self) -> Option<usize> {
        let decode = |payload: &str| STANDARD.decode(payload.trim()).ok().map(|b| b.len());
        match &self.data {
            Some(data) => decode(data),
            None => self.url().as_deref().and_then(data_url_payload).and_then(decode),
        }
    }
}

/// Returns the base64 payload of a `data:...;base64,` URL.
fn data_url_payload(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    Some(payload)
}

/// Returns the mime type of a `data:` URL.
fn data_url_mime(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    Some(&rest[..end]).filter(|mime| !mime.is_empty())
}

/// Single-image field used by messages saved before attachments existed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyImage {
    pub name: Option<String>,
    pub src: Option<String>,
    pub mime_type: Option<String>,
}

impl LegacyImage {
    fn to_attachment(&self) -> Option<Attachment> {
        let src = self.src.clone()?;
        let mime_type = self
            .mime_type
            .clone()
            .or_else(|| data_url_mime(&src).map(str::to_owned))
            .unwrap_or_else(|| "image/png".to_string());

        Some(Attachment {
            name: self.name.clone(),
            mime_type: Some(mime_type),
            is_image: Some(true),
            preview: Some(src),
            ..Attachment::default()
        })
    }
}

/// One entry of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Reasoning delivered out of band, separate from inline think tags.
    pub reasoning: Option<String>,
    pub is_streaming: bool,
    pub is_error: bool,
    pub attachments: Vec<Attachment>,
    pub image: Option<LegacyImage>,
    pub image_url: Option<String>,
    pub image_prompt: Option<String>,
    pub image_model: Option<String>,
    pub video_url: Option<String>,
    pub video_prompt: Option<String>,
    pub video_model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// An image or video produced for a message, with what made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMedia {
    pub kind: MediaKind,
    pub url: String,
    pub prompt: Option<String>,
    pub model: Option<String>,
}

impl GeneratedMedia {
    /// Remote media still has to be fetched; `data:` URLs are already here.
    pub fn is_loading(&self) -> bool {
        !self.url.starts_with("data:")
    }
}

impl ChatMessage {
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
            ..Self::default()
        }
    }

    /// Attachments to draw, falling back to the legacy image field.
    pub fn attachments_to_render(&self) -> Vec<Attachment> {
        if !self.attachments.is_empty() {
            return self.attachments.clone();
        }
        self.image
            .as_ref()
            .and_then(LegacyImage::to_attachment)
            .into_iter()
            .collect()
    }

    /// Generated image first, then video. Entries without a URL are skipped.
    pub fn generated_media(&self) -> Vec<GeneratedMedia> {
        let image = self.image_url.as_ref().map(|url| GeneratedMedia {
            kind: MediaKind::Image,
            url: url.clone(),
            prompt: self.image_prompt.clone(),
            model: self.image_model.clone(),
        });
        let video = self.video_url.as_ref().map(|url| GeneratedMedia {
            kind: MediaKind::Video,
            url: url.clone(),
            prompt: self.video_prompt.clone(),
            model: self.video_model.clone(),
        });
        image.into_iter().chain(video).collect()
    }

    /// A finished assistant reply that can be copied.
    pub fn is_finished_reply(&self) -> bool {
        self.role == Role::Assistant && !self.is_streaming && !self.is_error
    }

    /// The fault for a finished assistant message whose think region never closed.
    pub fn malformed_tag(&self) -> Option<DisplayFault> {
        let finished = self.role == Role::Assistant && !self.is_streaming;
        (finished && parse(&self.content, false).unterminated).then(|| {
            DisplayFault::MalformedStreamTag {
                message_id: self.id.clone(),
            }
        })
    }

    /// Text placed on the clipboard by the copy action.
    pub fn copy_text(&self) -> String {
        let view = MessageView::from_message(self);
        if view.display_content.is_empty() {
            self.content.clone()
        } else {
            view.display_content
        }
    }
}

/// Everything a view needs to draw one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageView {
    /// Content with think regions removed (assistant) or raw content (others).
    pub display_content: String,
    pub display_reasoning: String,
    /// A think region is still open while streaming.
    pub is_thinking: bool,
    pub has_reasoning: bool,
    pub attachments: Vec<Attachment>,
}

impl MessageView {
    pub fn from_message(message: &ChatMessage) -> Self {
        let attachments = message.attachments_to_render();

        if message.role != Role::Assistant {
            return Self {
                display_content: message.content.clone(),
                attachments,
                ..Self::default()
            };
        }

        let parsed = parse(&message.content, message.is_streaming);
        let display_reasoning = merge_reasoning(
            message.reasoning.as_deref(),
            &parsed,
            message.is_streaming,
        );

        Self {
            is_thinking: message.is_streaming && parsed.is_thinking(),
            has_reasoning: !display_reasoning.is_empty(),
            display_content: parsed.visible_text,
            display_reasoning,
            attachments,
        }
    }
}

/// An ordered conversation loaded from a JSON array of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    pub messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Loads a transcript from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript from {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse transcript from {}", path.display()))
    }

    /// Parses a transcript and logs every message whose think region never closed.
    pub fn from_json(json: &str) -> Result<Self> {
        let transcript: Self = serde_json::from_str(json)?;
        for fault in transcript.messages.iter().filter_map(ChatMessage::malformed_tag) {
            fault.report();
        }
        Ok(transcript)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_attachment_url_resolution_order() {
        let mut attachment = Attachment {
            mime_type: Some("image/jpeg".to_string()),
            data: Some("AAAA".to_string()),
            ..Attachment::default()
        };
        assert_eq!(
            attachment.url().as_deref(),
            Some("data:image/jpeg;base64,AAAA")
        );

        attachment.src = Some("https://example.com/a.jpg".to_string());
        assert_eq!(attachment.url().as_deref(), Some("https://example.com/a.jpg"));

        attachment.preview = Some("blob:preview".to_string());
        assert_eq!(attachment.url().as_deref(), Some("blob:preview"));
    }

    #[test]
    fn test_attachment_without_mime_uses_octet_stream() {
        let attachment = Attachment {
            data: Some("AAAA".to_string()),
            ..Attachment::default()
        };
        assert_eq!(
            attachment.url().as_deref(),
            Some("data:application/octet-stream;base64,AAAA")
        );
        assert!(!attachment.is_image());
        assert_eq!(Attachment::default().url(), None);
    }

    #[test]
    fn test_is_image_prefers_explicit_flag() {
        let mut attachment = Attachment {
            mime_type: Some("image/png".to_string()),
            ..Attachment::default()
        };
        assert!(attachment.is_image());
        attachment.is_image = Some(false);
        assert!(!attachment.is_image());
    }

    #[test]
    fn test_decoded_len() {
        let inline = Attachment {
            data: Some("aGVsbG8=".to_string()),
            ..Attachment::default()
        };
        assert_eq!(inline.decoded_len(), Some(5));

        let by_url = Attachment {
            preview: Some("data:text/plain;base64,aGk=".to_string()),
            ..Attachment::default()
        };
        assert_eq!(by_url.decoded_len(), Some(2));

        let remote = Attachment {
            src: Some("https://example.com/a.bin".to_string()),
            ..Attachment::default()
        };
        assert_eq!(remote.decoded_len(), None);
    }

    #[test]
    fn test_legacy_image_becomes_attachment() {
        let message = ChatMessage {
            image: Some(LegacyImage {
                name: Some("cat.webp".to_string()),
                src: Some("data:image/webp;base64,AAAA".to_string()),
                mime_type: None,
            }),
            ..ChatMessage::user("1", "look")
        };

        let attachments = message.attachments_to_render();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].mime_type.as_deref(), Some("image/webp"));
        assert!(attachments[0].is_image());
        assert_eq!(
            attachments[0].url().as_deref(),
            Some("data:image/webp;base64,AAAA")
        );
    }

    #[test]
    fn test_legacy_image_defaults_to_png_and_yields_to_attachments() {
        let mut message = ChatMessage {
            image: Some(LegacyImage {
                src: Some("https://example.com/cat".to_string()),
                ..LegacyImage::default()
            }),
            ..ChatMessage::user("1", "look")
        };
        assert_eq!(
            message.attachments_to_render()[0].mime_type.as_deref(),
            Some("image/png")
        );

        message.attachments = vec![Attachment::default()];
        assert_eq!(message.attachments_to_render(), vec![Attachment::default()]);
    }

    #[test]
    fn test_view_of_streaming_assistant() {
        let message = ChatMessage {
            is_streaming: true,
            ..ChatMessage::assistant("a", "Hello <think>planning")
        };
        let view = MessageView::from_message(&message);

        assert_eq!(view.display_content, "Hello ");
        assert_eq!(view.display_reasoning, "planning");
        assert!(view.is_thinking);
        assert!(view.has_reasoning);
    }

    #[test]
    fn test_view_merges_persisted_reasoning() {
        let message = ChatMessage {
            reasoning: Some("  step one ".to_string()),
            ..ChatMessage::assistant("a", "<think>step one</think>Answer<think>step two</think>")
        };
        let view = MessageView::from_message(&message);

        assert_eq!(view.display_content, "Answer");
        assert_eq!(view.display_reasoning, "step one\n\nstep two");
        assert!(!view.is_thinking);
    }

    #[test]
    fn test_view_of_unterminated_final_message_hides_region() {
        let message = ChatMessage::assistant("a", "Done <think>never closed");
        let view = MessageView::from_message(&message);

        assert_eq!(view.display_content, "Done ");
        assert!(!view.has_reasoning);
    }

    #[test]
    fn test_user_content_is_shown_verbatim() {
        let message = ChatMessage::user("u", "what is <think>?");
        let view = MessageView::from_message(&message);
        assert_eq!(view.display_content, "what is <think>?");
        assert!(!view.has_reasoning);
    }

    #[test]
    fn test_copy_text_falls_back_to_raw_content() {
        assert_eq!(
            ChatMessage::assistant("a", "<think>x</think>Hi").copy_text(),
            "Hi"
        );
        assert_eq!(
            ChatMessage::assistant("a", "<think>only</think>").copy_text(),
            "<think>only</think>"
        );
    }

    #[test]
    fn test_transcript_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.json");
        fs::write(
            &path,
            r#"[
                {"id": "1", "role": "user", "content": "hi"},
                {"id": "2", "role": "assistant", "content": "hello", "isStreaming": false,
                 "attachments": [{"name": "a.png", "mimeType": "image/png", "data": "AAAA"}]}
            ]"#,
        )
        .unwrap();

        let transcript = Transcript::load(&path).unwrap();
        assert_eq!(transcript.messages.len(), 2);
        assert_eq!(transcript.messages[0].role, Role::User);
        assert!(transcript.messages[1].is_finished_reply());
        assert!(transcript.messages[1].attachments[0].is_image());
    }

    #[test]
    fn test_malformed_tag_only_for_finished_assistant() {
        let finished = ChatMessage::assistant("a1", "Done <think>never closed");
        assert_eq!(
            finished.malformed_tag(),
            Some(DisplayFault::MalformedStreamTag {
                message_id: "a1".into()
            })
        );

        let streaming = ChatMessage {
            is_streaming: true,
            ..finished.clone()
        };
        assert_eq!(streaming.malformed_tag(), None);
        assert_eq!(ChatMessage::user("u1", "<think>").malformed_tag(), None);
        assert_eq!(ChatMessage::assistant("a2", "<think>x</think>ok").malformed_tag(), None);
    }

    #[test]
    fn test_generated_media_fields() {
        let message: ChatMessage = serde_json::from_str(
            r#"{"id": "a1", "role": "assistant", "content": "Here you go",
                "imageUrl": "https://example.com/garden.jpg", "imagePrompt": "a garden",
                "imageModel": "flux", "videoUrl": "data:video/mp4;base64,AAAA",
                "videoPrompt": "an eagle"}"#,
        )
        .unwrap();

        let media = message.generated_media();
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].kind, MediaKind::Image);
        assert_eq!(media[0].prompt.as_deref(), Some("a garden"));
        assert_eq!(media[0].model.as_deref(), Some("flux"));
        assert!(media[0].is_loading());
        assert_eq!(media[1].kind, MediaKind::Video);
        assert_eq!(media[1].model, None);
        assert!(!media[1].is_loading());

        let prompt_only = ChatMessage {
            image_prompt: Some("lost".into()),
            ..ChatMessage::assistant("a2", "")
        };
        assert!(prompt_only.generated_media().is_empty());
    }

    #[test]
    fn test_transcript_load_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = Transcript::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse transcript"));

        let missing = Transcript::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(format!("{missing:#}").contains("Failed to read transcript"));
    }
}

//! Export command handler.
//!
//! Renders every message the way the chat view shows it: visible content
//! through the formatter, merged reasoning folded into a `<details>` block,
//! attachments as images or download links, and generated media as figures.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use petal_core::markdown::{escape_html, format_message, format_streaming_message};
use petal_core::message::{
    Attachment, ChatMessage, GeneratedMedia, MediaKind, MessageView, Role, Transcript,
};

pub fn run(path: &Path) -> Result<()> {
    let transcript = Transcript::load(path)?;
    print!("{}", render_transcript(&transcript));
    Ok(())
}

pub fn render_transcript(transcript: &Transcript) -> String {
    let mut html = String::from("<div class=\"transcript\">\n");
    for message in &transcript.messages {
        html.push_str(&render_message(message));
    }
    html.push_str("</div>\n");
    html
}

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

fn render_message(message: &ChatMessage) -> String {
    let view = MessageView::from_message(message);
    let mut html = String::new();

    let _ = writeln!(
        html,
        "<article class=\"message {}\" data-id=\"{}\">",
        role_class(message.role),
        escape_html(&message.id)
    );

    if !view.attachments.is_empty() {
        html.push_str("<div class=\"attachments\">");
        for attachment in &view.attachments {
            html.push_str(&render_attachment(attachment));
        }
        html.push_str("</div>\n");
    }

    for media in message.generated_media() {
        html.push_str(&render_media(&media));
    }

    if view.has_reasoning {
        let open = if view.is_thinking { " open" } else { "" };
        let _ = writeln!(
            html,
            "<details class=\"reasoning\"{open}><summary>Thought process</summary>{}</details>",
            format_streaming_message(&view.display_reasoning)
        );
    }

    let body = if message.is_error {
        format!("<p>{}</p>", escape_html(&view.display_content))
    } else if message.role != Role::Assistant {
        user_text(&view.display_content)
    } else if message.is_streaming {
        format_streaming_message(&view.display_content)
    } else {
        format_message(&view.display_content).html
    };
    let class = if message.is_error { "content error" } else { "content" };
    let _ = writeln!(html, "<div class=\"{class}\">{body}</div>");

    html.push_str("</article>\n");
    html
}

/// User text is shown as typed, line breaks included.
fn user_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("<p>{}</p>", escape_html(text).replace('\n', "<br>"))
}

fn render_attachment(attachment: &Attachment) -> String {
    let name = escape_html(attachment.display_name());
    let Some(url) = attachment.url() else {
        return format!("<span class=\"attachment\">{name}</span>");
    };
    let url = escape_html(&url);

    if attachment.is_image() {
        format!("<img class=\"attachment\" src=\"{url}\" alt=\"{name}\">")
    } else {
        format!("<a class=\"attachment\" href=\"{url}\" download=\"{name}\">{name}</a>")
    }
}

fn render_media(media: &GeneratedMedia) -> String {
    let url = escape_html(&media.url);
    let (class, element) = match media.kind {
        MediaKind::Image => {
            let alt = escape_html(media.prompt.as_deref().unwrap_or("Generated image"));
            ("image", format!("<img src=\"{url}\" alt=\"{alt}\" loading=\"lazy\">"))
        }
        MediaKind::Video => (
            "video",
            format!("<video src=\"{url}\" controls loop muted playsinline></video>"),
        ),
    };
    let loading = if media.is_loading() { " loading" } else { "" };

    let mut html = format!("<figure class=\"generated-{class}{loading}\">{element}");
    if media.prompt.is_some() || media.model.is_some() {
        html.push_str("<figcaption>");
        if let Some(prompt) = &media.prompt {
            let _ = write!(html, "<strong>Prompt:</strong> {}", escape_html(prompt));
        }
        if let Some(model) = &media.model {
            if media.prompt.is_some() {
                html.push_str("<br>");
            }
            let _ = write!(html, "<strong>Model:</strong> {}", escape_html(model));
        }
        html.push_str("</figcaption>");
    }
    html.push_str("</figure>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_folds_into_details() {
        let html = render_message(&ChatMessage::assistant(
            "a1",
            "<think>check units</think>The answer is **42**.",
        ));

        assert!(html.contains("<details class=\"reasoning\"><summary>Thought process</summary>"));
        assert!(html.contains("check units"));
        assert!(html.contains("<strong>42</strong>"));
        assert!(!html.contains("&lt;think&gt;"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render_message(&ChatMessage::user("u1", "a <b> tag\nnext"));
        assert!(html.contains("<p>a &lt;b&gt; tag<br>next</p>"));
        assert!(html.contains("class=\"message user\""));
    }

    #[test]
    fn test_error_message_is_marked() {
        let message = ChatMessage {
            is_error: true,
            ..ChatMessage::assistant("a1", "Rate limited")
        };
        let html = render_message(&message);
        assert!(html.contains("<div class=\"content error\"><p>Rate limited</p></div>"));
    }

    #[test]
    fn test_attachments_render_as_image_or_link() {
        let image = Attachment {
            name: Some("cat.png".into()),
            mime_type: Some("image/png".into()),
            src: Some("https://example.com/cat.png".into()),
            ..Attachment::default()
        };
        let file = Attachment {
            name: Some("notes.txt".into()),
            mime_type: Some("text/plain".into()),
            data: Some("aGk=".into()),
            ..Attachment::default()
        };

        assert_eq!(
            render_attachment(&image),
            "<img class=\"attachment\" src=\"https://example.com/cat.png\" alt=\"cat.png\">"
        );
        assert_eq!(
            render_attachment(&file),
            "<a class=\"attachment\" href=\"data:text/plain;base64,aGk=\" download=\"notes.txt\">notes.txt</a>"
        );
    }

    #[test]
    fn test_generated_media_render_as_figures() {
        let message = ChatMessage {
            image_url: Some("https://example.com/a.jpg".into()),
            image_prompt: Some("cats & dogs".into()),
            video_url: Some("data:video/mp4;base64,AAAA".into()),
            video_model: Some("veo".into()),
            ..ChatMessage::assistant("a1", "Done.")
        };
        let html = render_message(&message);

        assert!(html.contains(
            "<figure class=\"generated-image loading\"><img src=\"https://example.com/a.jpg\" alt=\"cats &amp; dogs\" loading=\"lazy\">\
             <figcaption><strong>Prompt:</strong> cats &amp; dogs</figcaption></figure>"
        ));
        assert!(html.contains(
            "<figure class=\"generated-video\"><video src=\"data:video/mp4;base64,AAAA\" controls loop muted playsinline></video>\
             <figcaption><strong>Model:</strong> veo</figcaption></figure>"
        ));
    }

    #[test]
    fn test_transcript_wraps_messages() {
        let transcript = Transcript {
            messages: vec![ChatMessage::user("u1", "hi"), ChatMessage::assistant("a1", "hello")],
        };
        let html = render_transcript(&transcript);
        assert!(html.starts_with("<div class=\"transcript\">"));
        assert_eq!(html.matches("<article").count(), 2);
    }
}

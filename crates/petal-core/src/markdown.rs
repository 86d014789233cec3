//! Markdown to sanitized HTML.
//!
//! Raw HTML in the source is escaped and rendered as text. Fenced code keeps
//! its `language-*` class so an external highlighter can pick it up, and
//! math is emitted with its `$`/`$$` delimiters intact for an external
//! renderer.
//!
//! Final messages may embed chart payloads as `__CHART__{json}__CHART__`.
//! Those are cut out of the text and handed back separately.

use pulldown_cmark::{CowStr, Event, Options, Parser, html};
use serde_json::Value;

const CHART_MARKER: &str = "__CHART__";

/// Rendered HTML plus the chart payloads found in the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedMessage {
    pub html: String,
    pub charts: Vec<Value>,
}

/// Formats a finished message.
pub fn format_message(content: &str) -> FormattedMessage {
    if content.is_empty() {
        return FormattedMessage::default();
    }

    let (text, charts) = extract_charts(&normalize(content));
    let mut html = render_html(&text, final_options());

    if !charts.is_empty() {
        let json = Value::Array(charts.clone()).to_string().replace('\'', "&apos;");
        html.push_str(&format!("<div data-charts='{json}'></div>"));
    }

    FormattedMessage { html, charts }
}

/// Formats a message that is still arriving.
///
/// Chart payloads are dropped until the message is final.
pub fn format_streaming_message(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let (text, _) = extract_charts(&normalize(content));
    render_html(&text, streaming_options())
}

/// Cleans up whitespace before rendering.
///
/// Trims the text, collapses three or more consecutive newlines into one
/// blank line, and squeezes runs of spaces between words. Leading
/// indentation, trailing hard-break spaces, spaces next to backticks and
/// fenced code are left alone.
pub fn normalize(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_fence = false;
    let mut blank_run = 0;

    for (i, line) in content.trim().split('\n').enumerate() {
        let marker = line.trim_start();
        let is_fence = marker.starts_with("```") || marker.starts_with("~~~");

        if !in_fence && line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }

        if i > 0 {
            out.push('\n');
        }
        if in_fence || is_fence {
            out.push_str(line);
        } else {
            out.push_str(&collapse_inner_spaces(line));
        }

        if is_fence {
            in_fence = !in_fence;
        }
    }

    out
}

fn collapse_inner_spaces(line: &str) -> String {
    let body = line.trim_start_matches(' ');
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..line.len() - body.len()]);

    let mut chars = body.chars().peekable();
    let mut prev = None;
    while let Some(c) = chars.next() {
        if c != ' ' {
            out.push(c);
            prev = Some(c);
            continue;
        }

        let mut run = 1;
        while chars.next_if_eq(&' ').is_some() {
            run += 1;
        }
        let next = chars.peek().copied();
        let squeeze = run >= 2 && prev.is_some_and(|p| p != '`') && next.is_some_and(|n| n != '`');
        if squeeze {
            out.push(' ');
        } else {
            out.extend(std::iter::repeat_n(' ', run));
        }
        prev = Some(' ');
    }

    out
}

/// Cuts `__CHART__{json}__CHART__` payloads out of `text`.
///
/// Payloads must sit on one line. Invalid JSON is logged and dropped.
pub fn extract_charts(text: &str) -> (String, Vec<Value>) {
    let mut out = String::with_capacity(text.len());
    let mut charts = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(CHART_MARKER) {
        let after = &rest[start + CHART_MARKER.len()..];
        let Some(end) = after.find(CHART_MARKER) else {
            break;
        };
        let payload = &after[..end];

        if payload.contains('\n') {
            out.push_str(&rest[..start + CHART_MARKER.len()]);
            rest = after;
            continue;
        }

        out.push_str(&rest[..start]);
        match serde_json::from_str(payload) {
            Ok(chart) => charts.push(chart),
            Err(err) => tracing::warn!("Failed to parse chart data: {err}"),
        }
        rest = &after[end + CHART_MARKER.len()..];
    }

    out.push_str(rest);
    (out, charts)
}

fn final_options() -> Options {
    streaming_options() | Options::ENABLE_SMART_PUNCTUATION
}

fn streaming_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
}

fn render_html(text: &str, options: Options) -> String {
    let events = Parser::new_ext(text, options).map(|event| match event {
        // Raw HTML is shown, never interpreted.
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::InlineMath(math) => Event::Text(CowStr::from(format!("${math}$"))),
        Event::DisplayMath(math) => Event::Text(CowStr::from(format!("$${math}$$"))),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// Escapes text for inclusion in HTML, quotes included.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_collapses_blank_lines() {
        assert_eq!(normalize("\n\na\n\n\n\nb\n\n"), "a\n\nb");
    }

    #[test]
    fn test_normalize_squeezes_inner_spaces() {
        assert_eq!(normalize("one   two  three"), "one two three");
        assert_eq!(normalize("`a`   b"), "`a`   b");
        assert_eq!(normalize("hard  \nbreak"), "hard  \nbreak");
        assert_eq!(normalize("x\n    indented  code"), "x\n    indented code");
    }

    #[test]
    fn test_normalize_leaves_fences_alone() {
        let src = "```rust\nlet  x  =  1;\n\n\n\nfn f() {}\n```\nafter   text";
        assert_eq!(
            normalize(src),
            "```rust\nlet  x  =  1;\n\n\n\nfn f() {}\n```\nafter text"
        );
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let out = format_message("Hi <script>alert(1)</script> there");
        assert!(!out.html.contains("<script>"));
        assert!(out.html.contains("&lt;script&gt;"));

        let block = format_streaming_message("<div onclick=\"x\">block</div>");
        assert!(!block.contains("<div"));
    }

    #[test]
    fn test_code_block_keeps_language_class() {
        let out = format_message("```python\nprint('x')\n```");
        assert!(out.html.contains(r#"<code class="language-python">"#));
    }

    #[test]
    fn test_math_delimiters_survive() {
        let out = format_message("Area is $a_1 * b_1$ and\n\n$$x^2$$");
        assert!(out.html.contains("$a_1 * b_1$"));
        assert!(out.html.contains("$$x^2$$"));
        assert!(!out.html.contains("<em>"));
    }

    #[test]
    fn test_charts_are_extracted() {
        let out = format_message(r#"Sales: __CHART__{"type":"bar","v":[1,2]}__CHART__ done"#);
        assert_eq!(out.charts, vec![json!({"type": "bar", "v": [1, 2]})]);
        assert!(!out.html.contains("__CHART__"));
        assert!(out.html.contains(r#"<div data-charts='[{"type":"bar","v":[1,2]}]'></div>"#));
    }

    #[test]
    fn test_chart_quotes_are_escaped_in_attribute() {
        let out = format_message(r#"__CHART__{"title":"it's"}__CHART__"#);
        assert!(out.html.contains("it&apos;s"));
    }

    #[test]
    fn test_invalid_chart_is_dropped() {
        let out = format_message("a __CHART__{oops__CHART__ b");
        assert!(out.charts.is_empty());
        assert!(!out.html.contains("data-charts"));
        assert!(!out.html.contains("oops"));
    }

    #[test]
    fn test_multiline_chart_markers_are_not_payloads() {
        let (text, charts) = extract_charts("__CHART__\n__CHART__{\"a\":1}__CHART__");
        assert_eq!(text, "__CHART__\n");
        assert_eq!(charts, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_streaming_never_emits_chart_div() {
        let html = format_streaming_message(r#"x __CHART__{"a":1}__CHART__"#);
        assert!(!html.contains("data-charts"));
        assert!(!html.contains("__CHART__"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_message(""), FormattedMessage::default());
        assert_eq!(format_streaming_message(""), "");
    }

    #[test]
    fn test_unclosed_fence_while_streaming_renders_code() {
        let html = format_streaming_message("Here:\n```rust\nfn main() {");
        assert!(html.contains("<pre><code class=\"language-rust\">"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}

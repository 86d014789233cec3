//! Markdown rendering into styled terminal lines.
//!
//! Text is cleaned with the same normalization the HTML formatter uses,
//! parsed with pulldown-cmark and wrapped at the given width. Raw HTML is
//! shown as text and math keeps its delimiters.

use std::mem;

use petal_core::markdown::{extract_charts, normalize};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Renders a message body.
///
/// Charts are listed after the text for final messages and dropped while
/// the message is still streaming.
pub fn render_message(content: &str, width: usize, streaming: bool) -> Vec<Line<'static>> {
    let (text, charts) = extract_charts(&normalize(content));
    let mut lines = render_markdown(&text, width);
    while lines.last().is_some_and(|line| line.width() == 0) {
        lines.pop();
    }

    if !streaming {
        for chart in &charts {
            lines.push(Line::from(Span::styled(
                format!("▦ {}", chart_label(chart)),
                Style::default().fg(Color::Cyan),
            )));
        }
    }
    lines
}

/// Parses markdown and wraps it at `width`.
pub fn render_markdown(text: &str, width: usize) -> Vec<Line<'static>> {
    if text.is_empty() {
        return Vec::new();
    }

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH;
    let mut renderer = MarkdownRenderer::new(width);
    for event in Parser::new_ext(text, options) {
        renderer.process_event(event);
    }
    renderer.finish()
}

/// Wraps plain text without markdown parsing, with `prefix` on every line.
pub fn wrap_plain(text: &str, width: usize, prefix: &str, style: Style) -> Vec<Line<'static>> {
    let mut wrapper = Wrapper::new(width, prefix.to_string(), prefix.to_string());
    wrapper.push_text(text, style);
    wrapper.finish()
}

/// Short description of a chart payload.
fn chart_label(chart: &Value) -> String {
    let kind = chart.get("type").and_then(Value::as_str).unwrap_or("data");
    match chart.get("title").and_then(Value::as_str) {
        Some(title) => format!("{kind} chart: {title}"),
        None => format!("{kind} chart"),
    }
}

fn base_style() -> Style {
    Style::default()
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Greedy word wrapper with hanging prefixes.
struct Wrapper {
    width: usize,
    rest_prefix: String,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    used: usize,
    has_content: bool,
}

impl Wrapper {
    fn new(width: usize, first_prefix: String, rest_prefix: String) -> Self {
        let used = first_prefix.width();
        Self {
            width: width.max(used + 1),
            rest_prefix,
            lines: Vec::new(),
            current: vec![Span::styled(first_prefix, dim_style())],
            used,
            has_content: false,
        }
    }

    fn trim_trailing(&mut self) {
        if self.has_content
            && let Some(last) = self.current.last_mut()
        {
            let len = last.content.trim_end().len();
            last.content.to_mut().truncate(len);
        }
    }

    fn break_line(&mut self) {
        self.trim_trailing();
        let spans = mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
        self.current.push(Span::styled(self.rest_prefix.clone(), dim_style()));
        self.used = self.rest_prefix.width();
        self.has_content = false;
    }

    fn append(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        self.used += text.width();
        match self.current.last_mut() {
            Some(last) if self.has_content && last.style == style => {
                last.content.to_mut().push_str(text);
            }
            _ => self.current.push(Span::styled(text.to_string(), style)),
        }
        self.has_content = true;
    }

    /// Adds prose, breaking at spaces and newlines.
    fn push_text(&mut self, text: &str, style: Style) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            for word in segment.split_inclusive(' ') {
                self.push_word(word, style);
            }
        }
    }

    fn push_word(&mut self, word: &str, style: Style) {
        if self.has_content && self.used + word.trim_end().width() > self.width {
            self.break_line();
        }
        let word = if self.has_content { word } else { word.trim_start() };
        if self.used + word.trim_end().width() <= self.width {
            self.append(word, style);
        } else {
            self.push_chars(word, style);
        }
    }

    /// Adds text verbatim, breaking wherever the line is full.
    fn push_chars(&mut self, text: &str, style: Style) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if ch_width > 0 && self.has_content && self.used + ch_width > self.width {
                self.break_line();
            }
            self.append(ch.encode_utf8(&mut buf), style);
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.trim_trailing();
        if self.has_content || self.lines.is_empty() {
            self.lines.push(Line::from(self.current));
        }
        self.lines
    }
}

struct MarkdownRenderer {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<(String, Style)>,
    style_stack: Vec<Style>,
    /// Collected text of the open code block.
    code_block: Option<String>,
    code_lang: Option<String>,
    /// `None` for bullets, `Some(n)` for the next ordered number.
    list_stack: Vec<Option<u64>>,
    item_prefix: Option<String>,
    quote_depth: usize,
    link_url: Option<String>,
}

impl MarkdownRenderer {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            style_stack: vec![base_style()],
            code_block: None,
            code_lang: None,
            list_stack: Vec::new(),
            item_prefix: None,
            quote_depth: 0,
            link_url: None,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, modify: impl FnOnce(Style) -> Style) {
        let style = modify(self.current_style());
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn add(&mut self, text: impl Into<String>, style: Style) {
        self.spans.push((text.into(), style));
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if let Some(code) = &mut self.code_block {
                    code.push_str(&text);
                } else {
                    self.add(text.to_string(), self.current_style());
                }
            }
            Event::Code(code) => self.add(code.to_string(), code_style()),
            // Shown, never interpreted.
            Event::Html(raw) | Event::InlineHtml(raw) => {
                if let Some(code) = &mut self.code_block {
                    code.push_str(&raw);
                } else {
                    self.add(raw.to_string(), self.current_style());
                }
            }
            Event::InlineMath(math) => self.add(format!("${math}$"), code_style()),
            Event::DisplayMath(math) => self.add(format!("$${math}$$"), code_style()),
            Event::FootnoteReference(name) => self.add(format!("[^{name}]"), dim_style()),
            Event::SoftBreak => self.add(" ", self.current_style()),
            Event::HardBreak => self.add("\n", self.current_style()),
            Event::Rule => {
                self.flush_paragraph();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(self.width.clamp(1, 40)),
                    dim_style(),
                )));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.add(marker, Style::default().fg(Color::Magenta));
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_paragraph();
                let color = match level {
                    HeadingLevel::H1 => Color::Magenta,
                    HeadingLevel::H2 => Color::LightMagenta,
                    _ => Color::White,
                };
                self.push_style(|s| s.fg(color).add_modifier(Modifier::BOLD));
            }
            Tag::CodeBlock(kind) => {
                self.flush_paragraph();
                self.code_lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_paragraph();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush_paragraph();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last() {
                    Some(Some(n)) => format!("{n}. "),
                    _ => "• ".to_string(),
                };
                self.item_prefix = Some(format!("{}{marker}", "  ".repeat(depth)));
            }
            Tag::BlockQuote(_) => {
                self.flush_paragraph();
                self.quote_depth += 1;
                self.push_style(|s| s.fg(Color::Gray).add_modifier(Modifier::ITALIC));
            }
            Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(|s| s.fg(Color::Blue).add_modifier(Modifier::UNDERLINED));
            }
            Tag::Image { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.add("[image: ", dim_style());
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_paragraph();
                if self.list_stack.is_empty() {
                    self.lines.push(Line::default());
                }
            }
            TagEnd::Heading(_) => {
                self.flush_paragraph();
                self.pop_style();
                self.lines.push(Line::default());
            }
            TagEnd::CodeBlock => {
                self.flush_code_block();
                self.lines.push(Line::default());
            }
            TagEnd::List(_) => {
                self.flush_paragraph();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.lines.push(Line::default());
                }
            }
            TagEnd::Item => {
                self.flush_paragraph();
                if let Some(Some(n)) = self.list_stack.last_mut() {
                    *n += 1;
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_paragraph();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.add(format!(" ({url})"), dim_style());
                }
            }
            TagEnd::Image => {
                self.add("]", dim_style());
                self.link_url = None;
            }
            TagEnd::TableCell => self.add(" │ ", dim_style()),
            TagEnd::TableHead | TagEnd::TableRow => self.flush_paragraph(),
            TagEnd::Table => self.lines.push(Line::default()),
            _ => {}
        }
    }

    fn prefixes(&mut self) -> (String, String) {
        let quote = "│ ".repeat(self.quote_depth);
        match self.item_prefix.take() {
            Some(item) => {
                let hang = " ".repeat(item.width());
                (format!("{quote}{item}"), format!("{quote}{hang}"))
            }
            None => {
                let indent = "  ".repeat(self.list_stack.len());
                (format!("{quote}{indent}"), format!("{quote}{indent}"))
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if self.spans.is_empty() {
            return;
        }

        let (first, rest) = self.prefixes();
        let mut wrapper = Wrapper::new(self.width, first, rest);
        for (text, style) in mem::take(&mut self.spans) {
            wrapper.push_text(&text, style);
        }
        self.lines.extend(wrapper.finish());
    }

    fn flush_code_block(&mut self) {
        let Some(code) = self.code_block.take() else {
            return;
        };

        if let Some(lang) = self.code_lang.take() {
            self.lines
                .push(Line::from(Span::styled(format!("  {lang}"), dim_style())));
        }
        for line in code.trim_end_matches('\n').split('\n') {
            let mut wrapper = Wrapper::new(self.width, "  ".to_string(), "  ".to_string());
            wrapper.push_chars(line, code_style());
            self.lines.extend(wrapper.finish());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        // An unterminated fence while streaming still shows its code.
        self.flush_code_block();
        self.flush_paragraph();
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_paragraph_wraps_at_width() {
        let lines = render_markdown("the quick brown fox jumps over", 10);
        assert_eq!(
            plain(&lines),
            vec!["the quick", "brown fox", "jumps over", ""]
        );
    }

    #[test]
    fn test_long_word_is_broken() {
        let lines = render_markdown("abcdefghijkl", 5);
        assert_eq!(plain(&lines)[..3], ["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_list_items_hang_under_marker() {
        let lines = render_markdown("- one two three\n- four", 9);
        assert_eq!(
            plain(&lines),
            vec!["• one two", "  three", "• four", ""]
        );
    }

    #[test]
    fn test_ordered_list_numbers() {
        let lines = render_markdown("3. a\n4. b", 20);
        assert_eq!(plain(&lines)[..2], ["3. a", "4. b"]);
    }

    #[test]
    fn test_code_block_keeps_indentation() {
        let lines = render_markdown("```rust\nfn main() {\n    run();\n}\n```", 40);
        assert_eq!(
            plain(&lines),
            vec!["  rust", "  fn main() {", "      run();", "  }", ""]
        );
        assert_eq!(lines[1].spans[1].style, code_style());
    }

    #[test]
    fn test_unterminated_fence_renders_code() {
        let lines = render_message("```\nlet x = 1;", 40, true);
        assert_eq!(plain(&lines), vec!["  let x = 1;"]);
    }

    #[test]
    fn test_raw_html_is_literal() {
        let lines = render_markdown("a <b>bold</b> tag", 40);
        assert_eq!(plain(&lines)[0], "a <b>bold</b> tag");
    }

    #[test]
    fn test_inline_styles() {
        let lines = render_markdown("**hi** `x`", 40);
        let spans = &lines[0].spans;
        assert!(spans.iter().any(|s| s.content == "hi" && s.style.add_modifier.contains(Modifier::BOLD)));
        assert!(spans.iter().any(|s| s.content == "x" && s.style == code_style()));
    }

    #[test]
    fn test_render_message_lists_charts_only_when_final() {
        let content = r#"Sales __CHART__{"type":"bar","title":"Q3"}__CHART__"#;

        let done = plain(&render_message(content, 40, false));
        assert_eq!(done, vec!["Sales", "▦ bar chart: Q3"]);

        let streaming = plain(&render_message(content, 40, true));
        assert_eq!(streaming, vec!["Sales"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(render_markdown("", 10).is_empty());
        assert!(render_message("   ", 10, false).is_empty());
    }

    #[test]
    fn test_wrap_plain_prefixes_every_line() {
        let lines = wrap_plain("one two three", 9, "│ ", dim_style());
        assert_eq!(plain(&lines), vec!["│ one two", "│ three"]);
    }
}

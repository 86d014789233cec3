//! Splits streamed assistant text into visible content and reasoning.
//!
//! Models emit reasoning inline as `<think>...</think>` regions. While a
//! response is streaming, the closing marker may not have arrived yet; such
//! an open region is reported as pending reasoning. Open regions are never
//! shown as visible content, streaming or not.
//!
//! Marker matching is ASCII case-insensitive and non-greedy: a region ends
//! at the first closing marker after its opening marker.

pub const OPEN_TAG: &str = "<think>";
pub const CLOSE_TAG: &str = "</think>";

/// One piece of a parsed message, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSegment {
    /// Text outside any reasoning region.
    PlainText(String),
    /// A closed reasoning region (trimmed, never empty).
    ReasoningBlock(String),
    /// A reasoning region whose closing marker has not arrived yet.
    PendingReasoning(String),
}

/// Result of [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    /// Text outside every reasoning region, concatenated in order.
    pub visible_text: String,
    /// Closed reasoning regions, trimmed, empty ones dropped.
    pub closed_blocks: Vec<String>,
    /// Trimmed text of the open region while streaming, empty otherwise.
    pub pending_reasoning: String,
    /// True if an opening marker had no closing marker.
    pub unterminated: bool,
}

impl ParsedContent {
    /// Returns true while the model is still inside an open reasoning region.
    pub fn is_thinking(&self) -> bool {
        !self.pending_reasoning.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region<'a> {
    Text(&'a str),
    Closed(&'a str),
    Open(&'a str),
}

fn scan(raw: &str) -> Vec<Region<'_>> {
    // ASCII lowercasing keeps byte offsets identical to `raw`.
    let lower = raw.to_ascii_lowercase();
    let mut regions = Vec::new();
    let mut pos = 0;

    while let Some(offset) = lower[pos..].find(OPEN_TAG) {
        let start = pos + offset;
        if start > pos {
            regions.push(Region::Text(&raw[pos..start]));
        }

        let inner = start + OPEN_TAG.len();
        if let Some(len) = lower[inner..].find(CLOSE_TAG) {
            regions.push(Region::Closed(&raw[inner..inner + len]));
            pos = inner + len + CLOSE_TAG.len();
        } else {
            regions.push(Region::Open(&raw[inner..]));
            pos = raw.len();
        }
    }

    if pos < raw.len() {
        regions.push(Region::Text(&raw[pos..]));
    }
    regions
}

/// Parses `raw` into visible text and reasoning.
pub fn parse(raw: &str, is_streaming: bool) -> ParsedContent {
    let mut parsed = ParsedContent::default();

    for segment in segments(raw, true) {
        match segment {
            StreamSegment::PlainText(text) => parsed.visible_text.push_str(&text),
            StreamSegment::ReasoningBlock(text) => parsed.closed_blocks.push(text),
            StreamSegment::PendingReasoning(text) => {
                parsed.unterminated = true;
                if is_streaming {
                    parsed.pending_reasoning = text.trim().to_string();
                }
            }
        }
    }

    parsed
}

/// Returns the segments of `raw` in source order.
///
/// Pending reasoning is returned untrimmed so a renderer can show it
/// exactly as streamed. Open regions produce nothing once the stream has
/// ended.
pub fn segments(raw: &str, is_streaming: bool) -> Vec<StreamSegment> {
    scan(raw)
        .into_iter()
        .filter_map(|region| match region {
            Region::Text(text) => Some(StreamSegment::PlainText(text.to_string())),
            Region::Closed(inner) => {
                let trimmed = inner.trim();
                (!trimmed.is_empty()).then(|| StreamSegment::ReasoningBlock(trimmed.to_string()))
            }
            Region::Open(inner) => {
                is_streaming.then(|| StreamSegment::PendingReasoning(inner.to_string()))
            }
        })
        .collect()
}

/// Combines persisted reasoning with freshly parsed reasoning for display.
///
/// Order: persisted reasoning, closed blocks, then pending reasoning (only
/// while streaming). Each piece is trimmed, empty pieces and exact
/// duplicates are dropped keeping the first occurrence, and the rest are
/// joined with a blank line.
pub fn merge_reasoning(persisted: Option<&str>, parsed: &ParsedContent, is_streaming: bool) -> String {
    let pending = is_streaming.then_some(parsed.pending_reasoning.as_str());
    let candidates = persisted
        .into_iter()
        .chain(parsed.closed_blocks.iter().map(String::as_str))
        .chain(pending);

    let mut merged: Vec<&str> = Vec::new();
    for segment in candidates.map(str::trim) {
        if !segment.is_empty() && !merged.contains(&segment) {
            merged.push(segment);
        }
    }
    merged.join("\n\n")
}

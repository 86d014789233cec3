//! Scripted replay of assistant responses.
//!
//! Messages loaded with `isStreaming: true` are treated as replies still
//! arriving: their content is held back and fed into the transcript a few
//! graphemes at a time, one message after another.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use petal_core::config::StreamConfig;
use petal_core::message::ChatMessage;
use petal_core::scheduler::Deadline;
use unicode_segmentation::UnicodeSegmentation;

/// Piece of a reply that arrived on this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    /// Index of the message in the transcript.
    pub index: usize,
    pub text: String,
    /// The reply is complete after this chunk.
    pub done: bool,
}

#[derive(Debug, Clone)]
struct Script {
    index: usize,
    graphemes: Vec<String>,
    emitted: usize,
}

#[derive(Debug, Clone)]
pub struct ScriptedStream {
    queue: VecDeque<Script>,
    chunk_chars: usize,
    interval: Duration,
    next: Deadline,
}

impl ScriptedStream {
    /// Takes the content of every streaming message as a script and empties it.
    pub fn from_messages(messages: &mut [ChatMessage], config: &StreamConfig, now: Instant) -> Self {
        let queue: VecDeque<Script> = messages
            .iter_mut()
            .enumerate()
            .filter(|(_, message)| message.is_streaming)
            .map(|(index, message)| {
                let content = std::mem::take(&mut message.content);
                Script {
                    index,
                    graphemes: content.graphemes(true).map(str::to_owned).collect(),
                    emitted: 0,
                }
            })
            .collect();

        let mut next = Deadline::new();
        if !queue.is_empty() {
            next.arm(now, config.chunk_interval());
        }

        Self {
            queue,
            chunk_chars: config.chunk_chars.max(1),
            interval: config.chunk_interval(),
            next,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Index of the message currently being streamed.
    pub fn current_index(&self) -> Option<usize> {
        self.queue.front().map(|script| script.index)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next.due()
    }

    /// Emits the next chunk if one is due.
    pub fn poll(&mut self, now: Instant) -> Option<StreamChunk> {
        if !self.next.fire_if_due(now) {
            return None;
        }

        let script = self.queue.front_mut()?;
        let end = (script.emitted + self.chunk_chars).min(script.graphemes.len());
        let text = script.graphemes[script.emitted..end].concat();
        script.emitted = end;

        let index = script.index;
        let done = end == script.graphemes.len();
        if done {
            self.queue.pop_front();
            tracing::debug!(index, "scripted reply finished");
        }
        if self.is_active() {
            self.next.arm(now, self.interval);
        }

        Some(StreamChunk { index, text, done })
    }
}

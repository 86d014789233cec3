//! Typewriter reveal engine.
//!
//! Shows a growing prefix of a target text that may itself keep growing
//! while a response streams in. Each tick advances by a step that depends
//! on how far behind the display is, so long bursts fast-forward and the
//! tail is revealed a few characters at a time.
//!
//! Lengths are counted in extended grapheme clusters: the displayed prefix
//! never ends in the middle of a character or an emoji sequence.

use std::time::{Duration, Instant};

use unicode_segmentation::UnicodeSegmentation;

use crate::scheduler::Deadline;

/// Default delay between reveal ticks.
pub const DEFAULT_BASE_SPEED: Duration = Duration::from_millis(10);

/// Snapshot of what one message view is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealState {
    pub target_text: String,
    /// Number of grapheme clusters of `target_text` currently shown.
    pub shown_prefix_len: usize,
    pub is_revealing: bool,
}

/// What changed as a result of one engine call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealUpdate {
    /// The displayed prefix changed.
    pub changed: bool,
    /// The display caught up with the target. Reported once per catch-up.
    pub completed: bool,
}

/// Returns how many grapheme clusters to reveal for the remaining distance.
pub fn step_size(distance: usize) -> usize {
    match distance {
        d if d > 100 => 10,
        d if d > 50 => 5,
        d if d > 20 => 3,
        d if d > 10 => 2,
        _ => 1,
    }
}

/// Returns the delay before the next tick for the remaining distance.
pub fn tick_delay(distance: usize, base_speed: Duration) -> Duration {
    if distance > 20 {
        (base_speed / 2).max(Duration::from_millis(1))
    } else {
        base_speed
    }
}

fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Drives the displayed prefix of one message toward its target text.
#[derive(Debug, Clone)]
pub struct RevealEngine {
    state: RevealState,
    base_speed: Duration,
    tick: Deadline,
    /// Completion already reported for the current catch-up.
    completed: bool,
    mounted: bool,
}

impl Default for RevealEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_SPEED)
    }
}

impl RevealEngine {
    pub fn new(base_speed: Duration) -> Self {
        Self {
            state: RevealState::default(),
            base_speed,
            tick: Deadline::new(),
            completed: false,
            mounted: true,
        }
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn is_typing(&self) -> bool {
        self.state.is_revealing
    }

    /// When the host should call [`poll`](Self::poll) next, if at all.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tick.due()
    }

    /// Returns the currently displayed prefix of the target.
    pub fn displayed(&self) -> &str {
        let target = &self.state.target_text;
        let end = target
            .grapheme_indices(true)
            .nth(self.state.shown_prefix_len)
            .map_or(target.len(), |(offset, _)| offset);
        &target[..end]
    }

    /// Updates the target text and streaming flag.
    ///
    /// A running reveal loop is not restarted: its next tick reads the new
    /// target. When the stream has ended the display snaps to the full text.
    pub fn set_target(&mut self, text: impl Into<String>, is_streaming: bool, now: Instant) -> RevealUpdate {
        if !self.mounted {
            return RevealUpdate::default();
        }

        let text = text.into();
        let target_changed = text != self.state.target_text;
        self.state.target_text = text;
        let target_len = grapheme_len(&self.state.target_text);
        let previous = self.state.shown_prefix_len;

        if !is_streaming {
            self.tick.cancel();
            self.state.shown_prefix_len = target_len;
            self.state.is_revealing = false;
            self.completed = true;
            return RevealUpdate {
                changed: target_changed || previous != target_len,
                completed: false,
            };
        }

        self.state.shown_prefix_len = previous.min(target_len);
        let mut update = RevealUpdate {
            changed: previous != self.state.shown_prefix_len,
            completed: false,
        };

        if self.state.shown_prefix_len == target_len {
            self.tick.cancel();
            self.state.is_revealing = false;
            update.completed = self.report_completion();
        } else {
            self.state.is_revealing = true;
            self.completed = false;
            if !self.tick.is_armed() {
                self.tick.arm(now, self.base_speed);
            }
        }
        update
    }

    /// Runs the pending tick if it is due.
    pub fn poll(&mut self, now: Instant) -> RevealUpdate {
        if !self.mounted || !self.tick.fire_if_due(now) {
            return RevealUpdate::default();
        }

        let target_len = grapheme_len(&self.state.target_text);
        let shown = self.state.shown_prefix_len.min(target_len);
        let distance = target_len - shown;

        if distance == 0 {
            self.state.shown_prefix_len = shown;
            self.state.is_revealing = false;
            return RevealUpdate {
                changed: false,
                completed: self.report_completion(),
            };
        }

        self.state.shown_prefix_len = shown + step_size(distance).min(distance);
        let mut update = RevealUpdate {
            changed: true,
            completed: false,
        };

        if self.state.shown_prefix_len == target_len {
            self.state.is_revealing = false;
            update.completed = self.report_completion();
        } else {
            self.tick.arm(now, tick_delay(distance, self.base_speed));
        }
        update
    }

    /// Stops the engine for good. Later calls are ignored.
    pub fn teardown(&mut self) {
        self.mounted = false;
        self.tick.cancel();
        self.state.is_revealing = false;
    }

    fn report_completion(&mut self) -> bool {
        !std::mem::replace(&mut self.completed, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Polls at every deadline until the engine goes idle.
    /// Returns the shown length after each tick and the number of completions.
    fn drain(engine: &mut RevealEngine) -> (Vec<usize>, usize) {
        let mut lengths = Vec::new();
        let mut completions = 0;
        while let Some(due) = engine.next_deadline() {
            let update = engine.poll(due);
            lengths.push(engine.state().shown_prefix_len);
            if update.completed {
                completions += 1;
            }
        }
        (lengths, completions)
    }

    #[test]
    fn test_step_size_table() {
        assert_eq!(step_size(101), 10);
        assert_eq!(step_size(100), 5);
        assert_eq!(step_size(51), 5);
        assert_eq!(step_size(50), 3);
        assert_eq!(step_size(21), 3);
        assert_eq!(step_size(20), 2);
        assert_eq!(step_size(11), 2);
        assert_eq!(step_size(10), 1);
        assert_eq!(step_size(1), 1);
    }

    #[test]
    fn test_tick_delay() {
        assert_eq!(tick_delay(21, ms(10)), ms(5));
        assert_eq!(tick_delay(20, ms(10)), ms(10));
        assert_eq!(tick_delay(500, ms(1)), ms(1));
        assert_eq!(tick_delay(500, Duration::ZERO), ms(1));
    }

    #[test]
    fn test_not_streaming_snaps() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::default();
        let update = engine.set_target("hello world", false, t0);

        assert!(update.changed);
        assert!(!update.completed);
        assert_eq!(engine.displayed(), "hello world");
        assert!(!engine.is_typing());
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_first_tick_after_base_speed() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(10));
        engine.set_target("abc", true, t0);

        assert!(engine.is_typing());
        assert_eq!(engine.next_deadline(), Some(t0 + ms(10)));
        assert!(!engine.poll(t0 + ms(9)).changed);
        assert!(engine.poll(t0 + ms(10)).changed);
        assert_eq!(engine.displayed(), "a");
    }

    #[test]
    fn test_reveals_fully_and_completes_once() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(10));
        let text = "x".repeat(150);
        engine.set_target(text.clone(), true, t0);

        let (lengths, completions) = drain(&mut engine);
        assert_eq!(completions, 1);
        assert_eq!(engine.displayed(), text);
        assert!(!engine.is_typing());
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lengths[0], 10);

        // Same target again: already caught up, no second completion.
        let update = engine.set_target(text, true, t0 + ms(1000));
        assert!(!update.completed);
    }

    #[test]
    fn test_growing_target_is_monotonic_and_completes_per_catch_up() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(10));
        let full = "The quick brown fox jumps over the lazy dog. ".repeat(4);
        let mut shown = Vec::new();
        let mut completions = 0;

        let mut now = t0;
        for end in (20..=full.len()).step_by(20) {
            engine.set_target(&full[..end], true, now);
            // A couple of ticks per delivered chunk, not enough to catch up.
            for _ in 0..2 {
                if let Some(due) = engine.next_deadline() {
                    now = due;
                    if engine.poll(now).completed {
                        completions += 1;
                    }
                    shown.push(engine.state().shown_prefix_len);
                }
            }
        }
        engine.set_target(full.clone(), true, now);
        let (rest, done) = drain(&mut engine);
        shown.extend(rest);
        completions += done;

        assert!(shown.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(engine.displayed(), full);
        assert!(completions >= 1);

        // Stream ends: snaps, stays at full length.
        engine.set_target(full.clone(), false, now);
        assert_eq!(engine.state().shown_prefix_len, grapheme_len(&full));
    }

    #[test]
    fn test_completion_rearms_after_growth() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(1));
        engine.set_target("ab", true, t0);
        let (_, first) = drain(&mut engine);
        engine.set_target("abcd", true, t0 + ms(50));
        let (_, second) = drain(&mut engine);

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(engine.displayed(), "abcd");
    }

    #[test]
    fn test_already_equal_completes_immediately() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::default();
        engine.set_target("done", false, t0);

        let update = engine.set_target("done", true, t0);
        assert!(!update.completed);

        let mut engine = RevealEngine::default();
        let update = engine.set_target("", true, t0);
        assert!(update.completed);
        assert!(!engine.is_typing());
    }

    #[test]
    fn test_shrinking_target_is_clamped() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(1));
        engine.set_target("a".repeat(40), true, t0);
        for _ in 0..5 {
            let due = engine.next_deadline().unwrap();
            engine.poll(due);
        }
        assert!(engine.state().shown_prefix_len > 5);

        engine.set_target("aaaaa", true, t0 + ms(100));
        assert_eq!(engine.displayed(), "aaaaa");
        assert!(engine.state().shown_prefix_len <= 5);
    }

    #[test]
    fn test_latest_target_read_on_tick() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(10));
        engine.set_target("ab", true, t0);
        // Target grows before the first tick fires; the tick sees it.
        engine.set_target("a".repeat(200), true, t0 + ms(5));
        assert_eq!(engine.next_deadline(), Some(t0 + ms(10)));

        engine.poll(t0 + ms(10));
        assert_eq!(engine.state().shown_prefix_len, 10);
        assert_eq!(engine.next_deadline(), Some(t0 + ms(15)));
    }

    #[test]
    fn test_never_splits_graphemes() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(1));
        let text = "👩‍👩‍👧 é🌸";
        engine.set_target(text, true, t0);
        while let Some(due) = engine.next_deadline() {
            engine.poll(due);
            assert!(text.starts_with(engine.displayed()));
        }
        assert_eq!(engine.displayed(), text);
    }

    #[test]
    fn test_teardown_ignores_later_input() {
        let t0 = Instant::now();
        let mut engine = RevealEngine::new(ms(1));
        engine.set_target("abcdef", true, t0);
        engine.teardown();

        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.poll(t0 + ms(100)), RevealUpdate::default());
        assert_eq!(engine.set_target("xyz", false, t0), RevealUpdate::default());
        assert_eq!(engine.displayed(), "");
    }
}

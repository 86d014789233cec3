//! Step index state machine for one tutorial session.

/// Navigation request from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    Next,
    Prev,
    JumpTo(usize),
    Close,
}

/// Result of applying a [`StepCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerOutcome {
    Moved { from: usize, to: usize },
    Closed,
    Ignored,
}

/// Tracks the current step over a fixed-length sequence.
#[derive(Debug, Clone, Default)]
pub struct StepSequencer {
    len: usize,
    current: usize,
    previous: usize,
    closed: bool,
}

impl StepSequencer {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn previous(&self) -> usize {
        self.previous
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.len
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Starts a fresh session at the first step.
    pub fn reset(&mut self) {
        self.current = 0;
        self.previous = 0;
        self.closed = false;
    }

    /// Applies `command`. Navigation is rejected while `busy` (a transition
    /// is in flight); closing is always honored.
    pub fn apply(&mut self, command: StepCommand, busy: bool) -> SequencerOutcome {
        if self.closed {
            return SequencerOutcome::Ignored;
        }

        match command {
            StepCommand::Close => self.close(),
            _ if busy => SequencerOutcome::Ignored,
            StepCommand::Next if self.is_last() => self.close(),
            StepCommand::Next => self.move_to(self.current + 1),
            StepCommand::Prev if self.current == 0 => SequencerOutcome::Ignored,
            StepCommand::Prev => self.move_to(self.current - 1),
            StepCommand::JumpTo(index) if index >= self.len || index == self.current => {
                SequencerOutcome::Ignored
            }
            StepCommand::JumpTo(index) => self.move_to(index),
        }
    }

    fn move_to(&mut self, to: usize) -> SequencerOutcome {
        let from = self.current;
        self.previous = from;
        self.current = to;
        SequencerOutcome::Moved { from, to }
    }

    fn close(&mut self) -> SequencerOutcome {
        self.closed = true;
        SequencerOutcome::Closed
    }
}

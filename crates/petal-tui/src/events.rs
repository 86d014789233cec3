//! Events consumed by the reducer.

use crossterm::event::Event;
use petal_core::clipboard::Notice;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Start of a loop iteration, carrying the current terminal size.
    /// Layout is refreshed here, before anything is painted.
    Frame { width: u16, height: u16 },
    /// Timer cadence. Advances streams, reveal and tutorial timers.
    Tick,
    Terminal(Event),
    /// Result of an effect that should be shown to the user.
    Notice(Notice),
}

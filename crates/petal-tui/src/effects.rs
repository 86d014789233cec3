//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer only mutates state and returns effects; anything touching
//! the outside world (clipboard, terminal) happens in the runtime.

use petal_core::tutorial::TutorialEffect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,

    /// Copy text to the system clipboard and report the outcome.
    CopyToClipboard { text: String },

    /// Window-level effect requested by the tutorial engine.
    Tutorial(TutorialEffect),
}

/// Wraps tutorial effects for the runtime.
pub fn from_tutorial(effects: Vec<TutorialEffect>) -> Vec<UiEffect> {
    effects.into_iter().map(UiEffect::Tutorial).collect()
}

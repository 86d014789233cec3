//! Guided onboarding overlay.
//!
//! - [`steps`] - step content and the stock tour
//! - [`sequencer`] - which step is current
//! - [`placement`] - where the tooltip and highlight go
//! - [`engine`] - phases, timers and input for one session

pub mod engine;
pub mod placement;
pub mod sequencer;
pub mod steps;

pub use engine::{
    KeyResponse, LayoutProbe, TransitionPhase, TutorialEffect, TutorialEngine, TutorialKey,
    TutorialSession,
};
pub use sequencer::{SequencerOutcome, StepCommand, StepSequencer};
pub use steps::{PreferredSide, Shortcut, TutorialStep, default_steps};

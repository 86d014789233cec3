//! UI-independent engines for the petal chat front-end.
//!
//! Everything in this crate is pure state plus explicit timer slots. A host
//! (the terminal UI in `petal-tui`, or any other view layer) feeds it input,
//! calls `poll`/`on_frame` on its own cadence and renders the resulting
//! snapshots.
//!
//! - [`reasoning`] - splits streamed text into visible content and `<think>` blocks
//! - [`reveal`] - typewriter engine revealing a growing prefix of the target text
//! - [`tutorial`] - onboarding overlay: steps, sequencer, placement, engine
//! - [`message`] - chat message view model and attachments
//! - [`markdown`] - markdown to sanitized HTML for final and streaming content

pub mod clipboard;
pub mod config;
pub mod error;
pub mod geometry;
pub mod markdown;
pub mod message;
pub mod reasoning;
pub mod reveal;
pub mod scheduler;
pub mod tutorial;

pub use config::Config;
pub use error::DisplayFault;
pub use geometry::{ArrowDirection, Placement, Rect, Viewport};

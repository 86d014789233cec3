//! Full-screen terminal host for petal chat transcripts.

pub mod clipboard;
pub mod effects;
pub mod events;
pub mod layout;
pub mod markdown;
pub mod render;
pub mod runtime;
pub mod state;
pub mod stream;
pub mod terminal;
pub mod tutorial_view;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::time::Instant;

use anyhow::{Context, Result};
use petal_core::config::Config;
use petal_core::message::Transcript;
pub use runtime::TuiRuntime;

use crate::state::AppState;

/// Transcript shown when no file is given.
pub fn demo_transcript() -> Result<Transcript> {
    Transcript::from_json(include_str!("../assets/demo_transcript.json"))
        .context("Failed to parse built-in demo transcript")
}

/// Runs the interactive chat view until the user quits.
pub fn run_chat(config: Config, transcript: Transcript, show_tutorial: bool) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Chat mode requires a terminal.\n\
             Use `petal export --transcript FILE` to render a transcript without one."
        );
    }

    tracing::info!(messages = transcript.messages.len(), "starting chat view");
    let state = AppState::new(config, transcript, Instant::now());
    let mut runtime = TuiRuntime::new(state)?;
    runtime.run(show_tutorial)
}

//! Chat command handler.

use std::path::Path;

use anyhow::Result;
use petal_core::config::Config;
use petal_core::message::Transcript;

pub fn run(config: Config, transcript: Option<&Path>, no_tutorial: bool) -> Result<()> {
    let transcript = match transcript {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading transcript");
            Transcript::load(path)?
        }
        None => petal_tui::demo_transcript()?,
    };
    let show_tutorial = config.tutorial.show_on_start && !no_tutorial;
    petal_tui::run_chat(config, transcript, show_tutorial)
}

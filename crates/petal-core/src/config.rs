//! Configuration management for petal.
//!
//! Loads configuration from `${PETAL_HOME}/config.toml` with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::tutorial::{TutorialStep, default_steps};

/// Typewriter reveal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub base_speed_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self { base_speed_ms: 10 }
    }
}

impl TypewriterConfig {
    pub fn base_speed(&self) -> Duration {
        Duration::from_millis(self.base_speed_ms)
    }
}

/// Tutorial overlay geometry and timing.
///
/// The top-level geometry is in viewport units (CSS pixels for a web host).
/// Terminal hosts read `[tutorial.terminal]` instead, see [`Self::for_terminal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialConfig {
    /// Open the tour when the chat starts.
    pub show_on_start: bool,
    /// Tooltip width for anchored steps.
    pub tooltip_width: f64,
    /// Tooltip width for centered steps.
    pub tooltip_center_width: f64,
    /// Height estimate used to decide whether the tooltip fits above/below.
    pub tooltip_height: f64,
    pub viewport_margin: f64,
    pub highlight_padding: f64,
    /// Distance between the anchor and the tooltip.
    pub gap: f64,
    /// Viewports at or below this width use the full-width tooltip.
    pub mobile_breakpoint: f64,
    pub content_fade_ms: u64,
    pub transition_ms: u64,
    pub debounce_ms: u64,
    pub terminal: TerminalGeometry,
    /// Replaces the stock tour when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<TutorialStep>,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            show_on_start: true,
            tooltip_width: 400.0,
            tooltip_center_width: 480.0,
            tooltip_height: 320.0,
            viewport_margin: 20.0,
            highlight_padding: 12.0,
            gap: 20.0,
            mobile_breakpoint: 768.0,
            content_fade_ms: 200,
            transition_ms: 400,
            debounce_ms: 100,
            terminal: TerminalGeometry::default(),
            steps: Vec::new(),
        }
    }
}

/// Tour geometry in character cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalGeometry {
    pub tooltip_width: f64,
    pub tooltip_center_width: f64,
    pub tooltip_height: f64,
    pub viewport_margin: f64,
    pub highlight_padding: f64,
    pub gap: f64,
    pub mobile_breakpoint: f64,
}

impl Default for TerminalGeometry {
    fn default() -> Self {
        Self {
            tooltip_width: 46.0,
            tooltip_center_width: 56.0,
            tooltip_height: 12.0,
            viewport_margin: 2.0,
            highlight_padding: 1.0,
            gap: 1.0,
            mobile_breakpoint: 60.0,
        }
    }
}

impl TutorialConfig {
    /// The same layout rules with the `[tutorial.terminal]` geometry.
    /// Timing and steps carry over unchanged.
    #[must_use]
    pub fn for_terminal(&self) -> Self {
        let cells = &self.terminal;
        Self {
            tooltip_width: cells.tooltip_width,
            tooltip_center_width: cells.tooltip_center_width,
            tooltip_height: cells.tooltip_height,
            viewport_margin: cells.viewport_margin,
            highlight_padding: cells.highlight_padding,
            gap: cells.gap,
            mobile_breakpoint: cells.mobile_breakpoint,
            ..self.clone()
        }
    }

    /// Configured steps, or the stock tour when none are set.
    pub fn tour_steps(&self) -> Vec<TutorialStep> {
        if self.steps.is_empty() {
            default_steps()
        } else {
            self.steps.clone()
        }
    }

    pub fn content_fade(&self) -> Duration {
        Duration::from_millis(self.content_fade_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Replay speed of scripted responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub chunk_chars: usize,
    pub chunk_interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 6,
            chunk_interval_ms: 30,
        }
    }
}

impl StreamConfig {
    pub fn chunk_interval(&self) -> Duration {
        Duration::from_millis(self.chunk_interval_ms)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub typewriter: TypewriterConfig,
    pub tutorial: TutorialConfig,
    pub stream: StreamConfig,
}

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default template to `path`.
    ///
    /// Fails if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

pub mod paths {
    //! Path resolution for petal configuration and data directories.
    //!
    //! PETAL_HOME resolution order:
    //! 1. PETAL_HOME environment variable (if set)
    //! 2. ~/.config/petal (default)
    //! 3. ./.petal when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the petal home directory.
    pub fn petal_home() -> PathBuf {
        if let Ok(home) = std::env::var("PETAL_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".petal"),
            |h| h.join(".config").join("petal"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        petal_home().join("config.toml")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        petal_home().join("logs")
    }
}

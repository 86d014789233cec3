use serde::{Deserialize, Serialize};

/// Where the tooltip would like to sit relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredSide {
    Top,
    Bottom,
    #[default]
    Center,
}

/// A key combination shown on a step, e.g. `Ctrl` + `K`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub keys: Vec<String>,
    pub action: String,
}

impl Shortcut {
    pub fn new(keys: &[&str], action: &str) -> Self {
        Self {
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            action: action.to_string(),
        }
    }
}

/// One page of the onboarding tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialStep {
    pub title: String,
    pub body: String,
    /// Selector of the on-screen element to highlight. `None` centers the tooltip.
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub side: PreferredSide,
    pub icon: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub shortcuts: Vec<Shortcut>,
}

impl TutorialStep {
    pub fn new(title: &str, body: &str, icon: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            anchor: None,
            side: PreferredSide::Center,
            icon: icon.to_string(),
            example: None,
            shortcuts: Vec::new(),
        }
    }

    #[must_use]
    pub fn anchored(mut self, selector: &str, side: PreferredSide) -> Self {
        self.anchor = Some(selector.to_string());
        self.side = side;
        self
    }

    #[must_use]
    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }

    #[must_use]
    pub fn with_shortcuts(mut self, shortcuts: Vec<Shortcut>) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    pub fn is_centered(&self) -> bool {
        self.anchor.is_none()
    }
}

/// Selectors the stock steps point at. Hosts register their regions under these.
pub mod anchors {
    pub const MODEL_CHIP: &str = ".model-chip";
    pub const ATTACH_BUTTON: &str = ".attach-menu-wrapper .input-icon-btn";
    pub const MESSAGE_INPUT: &str = "#messageInput";
}

/// The stock onboarding tour.
pub fn default_steps() -> Vec<TutorialStep> {
    vec![
        TutorialStep::new(
            "Welcome to Pollinations",
            "Your all-in-one AI creative studio. Chat with language models, generate images, \
             create videos and write code in one place. Let's take a quick tour to get you started!",
            "🌸",
        ),
        TutorialStep::new(
            "Choose Your AI Model",
            "Switch between AI models here. Each model has its own strengths: some excel at \
             creative writing, others at coding or analysis. Experiment to find the right fit.",
            "🧠",
        )
        .anchored(anchors::MODEL_CHIP, PreferredSide::Bottom),
        TutorialStep::new(
            "Attach Files & More",
            "The plus button opens your toolkit. Upload images for analysis, attach documents \
             for context, or open the code canvas. Files become part of the conversation.",
            "➕",
        )
        .anchored(anchors::ATTACH_BUTTON, PreferredSide::Top),
        TutorialStep::new(
            "Generate AI Images",
            "Type /imagine followed by a description and watch it come to life. \
             The more descriptive, the better the result.",
            "🎨",
        )
        .anchored(anchors::MESSAGE_INPUT, PreferredSide::Top)
        .with_example("/imagine a serene Japanese garden at sunset with cherry blossoms"),
        TutorialStep::new(
            "Create AI Videos",
            "Use /video with a descriptive prompt to generate a short clip. \
             Great for visualizing concepts or just having fun.",
            "🎬",
        )
        .anchored(anchors::MESSAGE_INPUT, PreferredSide::Top)
        .with_example("/video a majestic eagle soaring through clouds"),
        TutorialStep::new(
            "Keyboard Shortcuts",
            "These shortcuts save time once you know them. You're all set. Have fun exploring!",
            "⚡",
        )
        .with_shortcuts(vec![
            Shortcut::new(&["Ctrl", "K"], "Focus chat input"),
            Shortcut::new(&["Ctrl", "N"], "Start new chat"),
            Shortcut::new(&["Ctrl", "B"], "Toggle sidebar"),
            Shortcut::new(&["Ctrl", "/"], "Show all shortcuts"),
        ]),
    ]
}

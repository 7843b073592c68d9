//! AI platforms a generated prompt can be handed off to.

use serde::{Deserialize, Serialize};

/// An external AI chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Display name (e.g., "ChatGPT").
    pub name: String,

    /// Page opened after the prompt is copied.
    pub url: String,
}

impl Platform {
    /// Create a platform entry.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// The built-in platform table.
    pub fn defaults() -> Vec<Platform> {
        vec![
            Platform::new("ChatGPT", "https://chat.openai.com/"),
            Platform::new("Claude", "https://claude.ai/new"),
            Platform::new("Gemini", "https://gemini.google.com/"),
            Platform::new("DeepSeek", "https://chat.deepseek.com/"),
        ]
    }

    /// Find a platform by name, ignoring case.
    pub fn find<'a>(platforms: &'a [Platform], name: &str) -> Option<&'a Platform> {
        let name = name.trim();
        platforms.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

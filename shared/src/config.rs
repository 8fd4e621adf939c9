use serde::{Deserialize, Serialize};
use std::time::Duration;

// ===== CONFIG TYPES =====

/// Client runtime configuration.
///
/// Every field has a default so that pages can embed a partial TOML document
/// (or none at all).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Delay before a `reload` command reloads the page, giving the server
    /// time to finish processing.
    pub reload_delay_ms: u64,
    pub loading_text: String,
    pub overlay_id: String,
    pub overlay_class: String,
    pub hidden_class: String,
    pub csrf_field: String,
    /// Panic on precondition violations instead of reporting them.
    pub fail_fast: bool,
    pub highlight: HighlightConfig,
    pub endpoints: EndpointConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reload_delay_ms: 500,
            loading_text: "Loading ...".to_string(),
            overlay_id: "COVER".to_string(),
            overlay_class: "loading_cover".to_string(),
            hidden_class: "invisible".to_string(),
            csrf_field: "csrfmiddlewaretoken".to_string(),
            fail_fast: false,
            highlight: HighlightConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

/// Glyph style written to a named plot model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GlyphStyle {
    pub line_width: f64,
    pub line_color: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HighlightConfig {
    pub highlighted: GlyphStyle,
    pub normal: GlyphStyle,
    pub active_background: String,
    pub active_foreground: String,
    pub idle_background: String,
    pub idle_foreground: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            highlighted: GlyphStyle {
                line_width: 8.0,
                line_color: "red".to_string(),
            },
            normal: GlyphStyle {
                line_width: 2.0,
                line_color: "blue".to_string(),
            },
            active_background: "red".to_string(),
            active_foreground: "white".to_string(),
            idle_background: "#c6e8ff".to_string(),
            idle_foreground: "black".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    pub search_dataset: String,
    pub share_link: String,
    /// Prefix of apply-model links, completed with `<model>/<dataset>/`.
    pub apply_model: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            search_dataset: "/manager/ajax/search-dataset/".to_string(),
            share_link: "/manager/ajax/get-shareable/".to_string(),
            apply_model: "/manager/apply-model/an/".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid client configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

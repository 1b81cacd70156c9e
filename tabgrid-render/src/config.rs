use serde::{Deserialize, Serialize};

/// Display settings for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// BCP 47 style locale (`en-US`, `ru_RU`, `de`).
    pub locale: String,
    /// Shown for empty cells.
    pub placeholder: String,
    /// Tooltip for true booleans.
    pub yes_label: String,
    /// Tooltip for false booleans.
    pub no_label: String,
    /// Prefix for relative file paths. `None` leaves them untouched.
    pub media_base: Option<String>,
    /// Prefix of the thumbnail resizer (`<resizer>w40-h40/<path>`).
    pub resizer_base: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            placeholder: "\u{2014}".to_string(),
            yes_label: "Yes".to_string(),
            no_label: "No".to_string(),
            media_base: None,
            resizer_base: String::new(),
        }
    }
}

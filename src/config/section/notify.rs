//! `[notify]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [notify]
//! desktop = true      # Pop a desktop notification on build errors
//! title = "Styles"
//! sound = "Frog"      # macOS sound name; ignored elsewhere
//! timeout = 15        # Seconds the notification stays visible
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub desktop: bool,
    pub title: String,
    pub sound: Option<String>,
    pub timeout: u32,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            desktop: true,
            title: "Styles".into(),
            sound: Some("Frog".into()),
            timeout: 15,
        }
    }
}

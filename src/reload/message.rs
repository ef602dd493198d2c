//! Hot Reload Message Protocol
//!
//! JSON messages sent over the live-reload WebSocket.
//!
//! # Message Types
//!
//! - `connected`: handshake greeting with the server version
//! - `css`: swap one stylesheet in place (no page reload)
//! - `reload`: full page reload
//! - `error`: show the build error overlay
//! - `clear_error`: hide the overlay after a successful build

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet update
    Css {
        /// File name of the stylesheet, matched against `<link href>`
        target: String,
        /// Cache-busting version appended to the new href
        version: String,
    },

    /// Connection established
    Connected { version: String },

    /// Build error (display overlay, no reload)
    Error {
        /// Source file, relative to the project root
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
        error: String,
    },

    /// Clear error overlay (build succeeded after error)
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(target: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Css {
            target: target.into(),
            version: version.into(),
        }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(path: impl Into<String>, line: Option<u32>, error: impl Into<String>) -> Self {
        Self::Error {
            path: path.into(),
            line,
            error: error.into(),
        }
    }

    pub fn clear_error() -> Self {
        Self::ClearError
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

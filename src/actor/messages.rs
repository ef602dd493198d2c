//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor --Rebuild--> BuildActor --Css/Reload--> WsActor
//!                          |                        ^
//!                          +--(Reporter)--Error-----+
//! ```

use std::net::TcpStream;

use crate::reload::category::ChangeBatch;

// =============================================================================
// BuildActor Messages
// =============================================================================

/// Messages to Build Actor
#[derive(Debug)]
pub enum BuildMsg {
    /// Rebuild every entry for one debounced batch of changes
    Rebuild(ChangeBatch),
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Swap one stylesheet in connected pages
    Css { target: String, version: String },
    /// Reload page
    Reload { reason: String },
    /// Build error (display overlay, no reload)
    Error {
        path: String,
        line: Option<u32>,
        error: String,
    },
    /// Clear error overlay (build succeeded after error)
    ClearError,
    /// Add client
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}

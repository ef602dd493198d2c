//! Live reload
//!
//! Browser-facing side of the watch task.
//!
//! # Modules
//!
//! - `category` - Changed-file categories and the reaction each one triggers
//! - `message` - JSON messages pushed to browsers (css, reload, error)
//! - `server` - WebSocket listener handing clients to the WsActor

pub mod category;
pub mod message;
pub mod server;

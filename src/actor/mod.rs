//! Actor System for the watch task
//!
//! Message-passing concurrency on one current-thread runtime:
//!
//! ```text
//! FsActor --> BuildActor --> WsActor
//! (watch)     (pipeline)     (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing and classification
//! - `build` - Runs the pipeline per change batch
//! - `ws` - WebSocket clients and the browser error overlay
//! - `session` - Wires proxy, initial build and actors together

pub mod build;
pub mod fs;
pub mod messages;
pub mod session;
pub mod ws;

pub use session::Session;

//! WebSocket Actor
//!
//! Owns every connected browser and pushes reload messages to all of them.
//!
//! ```text
//! BuildActor --[Css/Reload]--> WsActor --[broadcast]--> Clients
//! Reporter  --[Error/Clear]-->    |
//!                                 +-- replays the current error to new clients
//! ```

mod client_io;
mod delivery;
mod notifier;

pub use notifier::BrowserNotifier;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared with the reader thread)
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    /// Error overlay currently shown, sent to clients that connect later
    pending_error: Option<HotReloadMessage>,
    stopped: Arc<AtomicBool>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        let stopped = Arc::clone(&self.stopped);
        std::thread::spawn(move || Self::client_reader_loop(clients, stopped));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Css { target, version } => {
                    crate::debug!("ws"; "css {} ({})", target, version);
                    self.broadcast(&HotReloadMessage::css(target, version));
                }
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload_with_reason(reason));
                }
                WsMsg::Error { path, line, error } => {
                    let msg = HotReloadMessage::error(path, line, error);
                    self.broadcast(&msg);
                    self.pending_error = Some(msg);
                }
                WsMsg::ClearError => {
                    self.pending_error = None;
                    self.broadcast(&HotReloadMessage::clear_error());
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => break,
            }
        }

        crate::debug!("ws"; "shutting down");
        self.stopped.store(true, Ordering::SeqCst);
        for mut client in self.clients.lock().drain(..) {
            let _ = client.close(None);
            let _ = client.flush();
        }
    }
}

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::WsActor;
use crate::reload::message::HotReloadMessage;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Handshake, greet, and register a new client.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, non-blocking for polled reads after
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::debug!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = ws.send(Message::Text(HotReloadMessage::connected().to_json().into())) {
            crate::debug!("ws"; "failed to send connected message: {}", e);
            return;
        }
        if let Some(error) = &self.pending_error
            && let Err(e) = ws.send(Message::Text(error.to_json().into()))
        {
            crate::debug!("ws"; "failed to send pending error: {}", e);
            return;
        }
        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Drain incoming frames and drop closed clients until the actor stops.
    ///
    /// Browsers never send anything meaningful; reading is needed to answer
    /// pings and notice closed tabs.
    pub(super) fn client_reader_loop(
        clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
        stopped: Arc<AtomicBool>,
    ) {
        while !stopped.load(Ordering::SeqCst) {
            std::thread::sleep(POLL_INTERVAL);

            let mut clients = clients.lock();
            let before = clients.len();
            clients.retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
            if clients.len() != before {
                crate::debug!("ws"; "client disconnected (total: {})", clients.len());
            }
        }
    }
}

use tungstenite::protocol::Message;

use super::WsActor;
use crate::reload::message::HotReloadMessage;

impl WsActor {
    /// Send a message to every connected client, dropping dead ones.
    pub(super) fn broadcast(&self, msg: &HotReloadMessage) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let frame = Message::Text(msg.to_json().into());
        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            // Queued in the socket buffer, flushed on the next write
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", clients.len());
    }
}

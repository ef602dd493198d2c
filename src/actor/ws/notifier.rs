//! Browser error overlay as a notification sink.

use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;
use crate::notify::{Notification, Notifier};

/// Forwards build errors to the WsActor.
///
/// Called from build code that may be on a blocking thread, so it never
/// awaits: when the channel is full the overlay update is dropped.
pub struct BrowserNotifier {
    ws_tx: mpsc::Sender<WsMsg>,
}

impl BrowserNotifier {
    pub fn new(ws_tx: mpsc::Sender<WsMsg>) -> Self {
        Self { ws_tx }
    }

    fn send(&self, msg: WsMsg) {
        if let Err(e) = self.ws_tx.try_send(msg) {
            crate::debug!("ws"; "overlay update dropped: {}", e);
        }
    }
}

impl Notifier for BrowserNotifier {
    fn notify(&self, n: &Notification) {
        let mut error = n.message.clone();
        if let Some(asset) = &n.asset {
            error.push_str(&format!("\nasset: {asset}"));
        }
        self.send(WsMsg::Error {
            path: n.file.display().to_string(),
            line: n.line,
            error,
        });
    }

    fn clear(&self) {
        self.send(WsMsg::ClearError);
    }
}

//! WebSocket Server for Live Reload
//!
//! Accepts browser connections and hands the raw streams to the WsActor,
//! which performs the handshake and owns every client from then on.

use std::net::{IpAddr, SocketAddr, TcpListener};

use anyhow::Result;

use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
pub const MAX_PORT_RETRIES: u16 = 10;

/// Start the WebSocket listener on `interface`, at `base_port` or the next
/// free port.
///
/// Returns the bound address. The acceptor thread exits once the actor's
/// channel is closed.
pub fn start_ws_server_with_channel(
    interface: IpAddr,
    base_port: u16,
    ws_tx: tokio::sync::mpsc::Sender<WsMsg>,
) -> Result<SocketAddr> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    if actual_port != base_port {
        crate::log!("reload"; "port {} in use, using {}", base_port, actual_port);
    }
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);

                    // Set blocking for the handshake
                    let _ = stream.set_nonblocking(false);

                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        crate::debug!("reload"; "actor gone, acceptor stopping");
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if ws_tx.is_closed() {
                        break;
                    }
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    Ok(SocketAddr::new(interface, actual_port))
}

/// Try binding to port, retry with incremented port if in use
pub fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind {}:{} after {} attempts: {}",
        interface,
        base_port,
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpStream};

    #[test]
    fn test_busy_port_moves_to_next() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (held, port) = try_bind_port(localhost, 0, 1).unwrap();
        let (_next, next_port) = try_bind_port(localhost, port, MAX_PORT_RETRIES).unwrap();
        assert_ne!(port, next_port);
        drop(held);
    }

    #[test]
    fn test_listens_on_configured_interface() {
        let (ws_tx, mut ws_rx) = tokio::sync::mpsc::channel(4);
        let addr = start_ws_server_with_channel(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0, ws_tx).unwrap();
        assert!(addr.ip().is_unspecified());

        let _stream = TcpStream::connect((Ipv4Addr::LOCALHOST, addr.port())).unwrap();
        assert!(matches!(ws_rx.blocking_recv(), Some(WsMsg::AddClient(_))));
    }
}

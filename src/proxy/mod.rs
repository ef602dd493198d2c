//! Reverse proxy in front of the developer's web server.
//!
//! ```text
//! browser ──> ProxyServer ──> upstream (php, apache, ...)
//!                │
//!                ├── /__sheen/hotreload.js   served from memory
//!                └── text/html responses     URLs rewritten, client injected
//! ```

mod forward;
mod response;
mod rewrite;

use rewrite::Upstream;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tiny_http::{Request, Server};

use crate::config::ServeConfig;
use crate::embed::serve::HOTRELOAD_PATH;
use crate::reload::server::MAX_PORT_RETRIES;
use crate::{debug, log};

const REQUEST_THREADS: usize = 4;

/// Bound proxy, not yet serving.
pub struct ProxyServer {
    server: Arc<Server>,
    addr: SocketAddr,
    upstream: Upstream,
    client: Client,
}

impl ProxyServer {
    /// Bind `[serve] interface:port`, or the next free port.
    pub fn bind(serve: &ServeConfig) -> Result<Self> {
        let upstream = Upstream::new(&serve.upstream()?)?;
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to create proxy client")?;

        let (server, addr) = bind_with_retry(serve.interface, serve.port)?;

        Ok(Self {
            server: Arc::new(server),
            addr,
            upstream,
            client,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle for unblocking the request loop on shutdown.
    pub fn server(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Serve requests on a background thread until the server is unblocked.
    pub fn spawn(self, ws_port: u16) -> JoinHandle<()> {
        thread::spawn(move || {
            let pool = match rayon::ThreadPoolBuilder::new()
                .num_threads(REQUEST_THREADS)
                .build()
            {
                Ok(pool) => pool,
                Err(e) => {
                    log!("proxy"; "failed to create request pool: {e}");
                    return;
                }
            };
            let ctx = Arc::new(RequestContext {
                upstream: self.upstream,
                client: self.client,
                addr: self.addr,
                ws_port,
            });

            for request in self.server.incoming_requests() {
                let ctx = Arc::clone(&ctx);
                pool.spawn(move || {
                    if let Err(e) = handle_request(request, &ctx) {
                        debug!("proxy"; "request error: {e:#}");
                    }
                });
            }
            debug!("proxy"; "stopped");
        })
    }
}

/// Bind to the interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let addr = SocketAddr::new(interface, base_port.saturating_add(offset));
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("proxy"; "port {} in use, using {} instead", base_port, addr.port());
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow::anyhow!(
        "Failed to bind proxy after {} attempts (from port {}): {}",
        MAX_PORT_RETRIES,
        base_port,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

struct RequestContext {
    upstream: Upstream,
    client: Client,
    addr: SocketAddr,
    ws_port: u16,
}

impl RequestContext {
    /// Origin the browser used to reach us, from its `Host` header.
    fn origin(&self, request: &Request) -> String {
        let host = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Host"))
            .map(|h| h.value.as_str().to_string())
            .unwrap_or_else(|| self.addr.to_string());
        format!("http://{host}")
    }
}

fn handle_request(mut request: Request, ctx: &RequestContext) -> Result<()> {
    let path = request.url().split('?').next().unwrap_or_default();
    if path == HOTRELOAD_PATH {
        return response::respond_hotreload_js(request, ctx.ws_port);
    }

    let target = ctx.upstream.target(request.url());
    let origin = ctx.origin(&request);
    debug!("proxy"; "{} {}", request.method(), target);

    match forward::forward(&ctx.client, &mut request, &target) {
        Ok(forwarded) => response::respond_forwarded(request, forwarded, &ctx.upstream, &origin),
        Err(e) => {
            log!("proxy"; "{target}: {e:#}");
            response::respond_bad_gateway(request, &target, &format!("{e:#}"))
        }
    }
}

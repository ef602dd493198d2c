//! `[serve]` section configuration.
//!
//! The watch task browses the site through a local reverse proxy so the
//! live-reload client can be injected into every HTML page.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! proxy = "http://localhost/cv2/public"   # Upstream site
//! interface = "127.0.0.1"                 # Proxy and live-reload bind address
//! port = 8000                             # Proxy port
//! ws_port = 35729                         # Live-reload WebSocket port
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

const PROXY: FieldPath = FieldPath::new("serve.proxy");
const PORT: FieldPath = FieldPath::new("serve.ws_port");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Upstream origin (and optional base path) to forward requests to.
    pub proxy: String,

    /// Network interface the proxy and live-reload listeners bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    pub port: u16,

    pub ws_port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            proxy: "http://localhost/".into(),
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8000,
            ws_port: 35729,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        match url::Url::parse(&self.proxy) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => diag.error(
                PROXY,
                format!("unsupported scheme `{}`", url.scheme()),
            ),
            Err(e) => diag.error_with_hint(
                PROXY,
                format!("`{}` is not a URL: {e}", self.proxy),
                "include the scheme, e.g. \"http://localhost/site\"",
            ),
        }
        if self.ws_port == self.port {
            diag.error(PORT, "live-reload port must differ from the proxy port");
        }
    }

    /// Parsed upstream URL. Call after `validate`.
    pub fn upstream(&self) -> anyhow::Result<url::Url> {
        Ok(url::Url::parse(&self.proxy)?)
    }
}

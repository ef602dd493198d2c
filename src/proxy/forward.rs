//! Forwarding one request upstream.

use std::io::Read;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tiny_http::Request;

/// Headers that describe a single connection and never cross the proxy.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Request headers the proxy sets itself.
const REQUEST_OWNED: &[&str] = &["host", "content-length", "accept-encoding"];

/// Response headers recomputed for the (possibly rewritten) body.
const RESPONSE_OWNED: &[&str] = &["content-length"];

fn is_dropped(name: &str, owned: &[&str]) -> bool {
    HOP_BY_HOP.iter().chain(owned).any(|h| name.eq_ignore_ascii_case(h))
}

/// Upstream response, fully read.
#[derive(Debug)]
pub struct Forwarded {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Forwarded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Send `request` to `target` and read the whole response.
///
/// Redirects are passed through to the browser, not followed. Bodies are
/// requested uncompressed so HTML can be rewritten.
pub fn forward(client: &Client, request: &mut Request, target: &str) -> Result<Forwarded> {
    let method = reqwest::Method::from_bytes(request.method().as_str().as_bytes())
        .context("unsupported method")?;

    let mut upstream = client.request(method, target);
    for header in request.headers() {
        let name = header.field.as_str().as_str();
        if is_dropped(name, REQUEST_OWNED) {
            continue;
        }
        upstream = upstream.header(name, header.value.as_str());
    }
    upstream = upstream.header("Accept-Encoding", "identity");

    let mut body = Vec::new();
    request
        .as_reader()
        .read_to_end(&mut body)
        .context("failed to read request body")?;
    if !body.is_empty() {
        upstream = upstream.body(body);
    }

    let response = upstream.send()?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter(|(name, _)| !is_dropped(name.as_str(), RESPONSE_OWNED))
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = response.bytes()?.to_vec();

    Ok(Forwarded {
        status,
        headers,
        body,
    })
}

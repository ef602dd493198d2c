//! HTTP responses written back to the browser.

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response};

use super::forward::Forwarded;
use super::rewrite::{Upstream, inject_script};
use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars, script_tag};
use crate::utils::mime::{self, types};

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| anyhow!("invalid header {name}: {value}"))
}

/// Serve the live-reload client.
pub fn respond_hotreload_js(request: Request, ws_port: u16) -> Result<()> {
    let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port });
    let response = Response::from_string(js)
        .with_header(header("Content-Type", types::JAVASCRIPT)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

/// Relay an upstream response.
///
/// Uncompressed HTML gets its upstream URLs rewritten and the live-reload
/// client injected; everything else passes through untouched apart from
/// `Location`.
pub fn respond_forwarded(
    request: Request,
    forwarded: Forwarded,
    upstream: &Upstream,
    proxy_origin: &str,
) -> Result<()> {
    let rewrite_body = forwarded.header("Content-Type").is_some_and(mime::is_html)
        && forwarded.header("Content-Encoding").is_none();

    let body = if rewrite_body {
        let html = String::from_utf8_lossy(&forwarded.body);
        let html = upstream.rewrite(&html, proxy_origin);
        inject_script(&html, &script_tag()).into_bytes()
    } else {
        forwarded.body
    };

    let mut response = Response::from_data(body).with_status_code(forwarded.status);
    for (name, value) in &forwarded.headers {
        let value = if name.eq_ignore_ascii_case("location") {
            upstream.rewrite(value, proxy_origin)
        } else {
            value.clone()
        };
        match header(name, &value) {
            Ok(h) => response.add_header(h),
            Err(e) => crate::debug!("proxy"; "dropping {e}"),
        }
    }
    request.respond(response)?;
    Ok(())
}

/// Upstream unreachable. The page still carries the live-reload client so it
/// recovers on the next reload.
pub fn respond_bad_gateway(request: Request, target: &str, error: &str) -> Result<()> {
    let html = bad_gateway_page(target, error);
    let response = Response::from_string(html)
        .with_status_code(502)
        .with_header(header("Content-Type", types::HTML)?);
    request.respond(response)?;
    Ok(())
}

fn bad_gateway_page(target: &str, error: &str) -> String {
    let page = format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>502 Bad Gateway</title></head>\
         <body><h1>502 Bad Gateway</h1><p>Could not reach <code>{}</code></p><pre>{}</pre></body></html>",
        escape(target),
        escape(error),
    );
    inject_script(&page, &script_tag())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_gateway_page_carries_client() {
        let page = bad_gateway_page("http://localhost/", "connection refused <os error 111>");
        assert!(page.contains("http://localhost/"));
        assert!(page.contains("&lt;os error 111&gt;"));
        assert!(page.contains(&format!("{}</body>", script_tag())));
    }
}

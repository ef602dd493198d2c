//! Mapping between proxy URLs and upstream URLs.
//!
//! The upstream may live under a base path (`http://localhost/cv2/public`).
//! Proxy paths are mapped below that base, and absolute upstream URLs in
//! HTML and `Location` headers are mapped back to the proxy origin so the
//! browser never leaves the proxy.

use anyhow::{Result, bail};
use regex::{Captures, Regex};
use url::Url;

#[derive(Debug)]
pub struct Upstream {
    url: Url,
    /// Base path without trailing slash, `""` for the root.
    base: String,
    /// Absolute or protocol-relative upstream base URL, followed by a
    /// boundary character captured as `end`.
    pattern: Regex,
}

impl Upstream {
    pub fn new(url: &Url) -> Result<Self> {
        let Some(host) = url.host_str() else {
            bail!("proxy target `{url}` has no host");
        };
        let base = url.path().trim_end_matches('/').to_string();
        let port = match url.port() {
            Some(port) => format!(":{port}"),
            None => url
                .port_or_known_default()
                .map(|p| format!("(?::{p})?"))
                .unwrap_or_default(),
        };
        let pattern = Regex::new(&format!(
            r"(?i)(?P<scheme>https?:)?//{}{}{}(?P<end>[^\w.:-]|$)",
            regex::escape(host),
            port,
            regex::escape(&base),
        ))?;
        Ok(Self {
            url: url.clone(),
            base,
            pattern,
        })
    }

    /// Upstream URL for a proxy request target (`/path?query`).
    ///
    /// Paths already below the base are kept as they are, so root-relative
    /// links written for the upstream keep working.
    pub fn target(&self, request_url: &str) -> String {
        let (path, query) = match request_url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (request_url, None),
        };
        let path = if path.starts_with('/') { path } else { "/" };

        let below_base = self.base.is_empty()
            || path == self.base
            || path
                .strip_prefix(&self.base)
                .is_some_and(|rest| rest.starts_with('/'));
        let full = if below_base {
            path.to_string()
        } else {
            format!("{}{}", self.base, path)
        };

        let mut url = self.url.clone();
        url.set_path(&full);
        url.set_query(query);
        url.to_string()
    }

    /// Replace absolute upstream URLs in `text` with `proxy_origin`
    /// (`http://host:port`).
    pub fn rewrite(&self, text: &str, proxy_origin: &str) -> String {
        let authority = proxy_origin
            .split_once("//")
            .map_or(proxy_origin, |(_, rest)| rest);
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let end = caps.name("end").map_or("", |m| m.as_str());
                if caps.name("scheme").is_some() {
                    format!("{proxy_origin}{end}")
                } else {
                    format!("//{authority}{end}")
                }
            })
            .into_owned()
    }
}

/// Insert `tag` before the last `</body>`, or append it when there is none.
pub fn inject_script(html: &str, tag: &str) -> String {
    // ASCII lowercasing keeps byte offsets.
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..idx]);
            out.push_str(tag);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://127.0.0.1:8000";

    fn upstream(url: &str) -> Upstream {
        Upstream::new(&Url::parse(url).unwrap()).unwrap()
    }

    #[test]
    fn test_target_at_root() {
        let up = upstream("http://localhost/");
        assert_eq!(up.target("/index.php?a=1"), "http://localhost/index.php?a=1");
        assert_eq!(up.target("/"), "http://localhost/");
    }

    #[test]
    fn test_target_below_base() {
        let up = upstream("http://localhost/cv2/public");
        assert_eq!(up.target("/"), "http://localhost/cv2/public/");
        assert_eq!(up.target("/css/main.css"), "http://localhost/cv2/public/css/main.css");
        assert_eq!(
            up.target("/cv2/public/css/main.css?v=2"),
            "http://localhost/cv2/public/css/main.css?v=2"
        );
        assert_eq!(up.target("/cv2/publications"), "http://localhost/cv2/public/cv2/publications");
    }

    #[test]
    fn test_rewrite_html_urls() {
        let up = upstream("http://localhost/cv2/public");
        let html = concat!(
            r#"<a href="http://localhost/cv2/public/about.php">"#,
            r#"<img src="//localhost/cv2/public/img/a.png">"#,
            r#"<link href="https://LOCALHOST/cv2/public/css/main.css">"#,
            r#"<a href="http://localhost/other">"#,
            r#"<a href="http://localhost.example.com/cv2/public/">"#,
        );
        assert_eq!(
            up.rewrite(html, ORIGIN),
            concat!(
                r#"<a href="http://127.0.0.1:8000/about.php">"#,
                r#"<img src="//127.0.0.1:8000/img/a.png">"#,
                r#"<link href="http://127.0.0.1:8000/css/main.css">"#,
                r#"<a href="http://localhost/other">"#,
                r#"<a href="http://localhost.example.com/cv2/public/">"#,
            )
        );
    }

    #[test]
    fn test_rewrite_explicit_ports() {
        let up = upstream("http://localhost/");
        assert_eq!(up.rewrite("http://localhost:80/x", ORIGIN), "http://127.0.0.1:8000/x");
        assert_eq!(up.rewrite("http://localhost:8080/x", ORIGIN), "http://localhost:8080/x");

        let up = upstream("http://localhost:8080");
        assert_eq!(up.rewrite("http://localhost:8080/x", ORIGIN), "http://127.0.0.1:8000/x");
        assert_eq!(up.rewrite("http://localhost/x", ORIGIN), "http://localhost/x");
    }

    #[test]
    fn test_rewrite_location() {
        let up = upstream("http://localhost/cv2/public");
        assert_eq!(
            up.rewrite("http://localhost/cv2/public/login.php", ORIGIN),
            "http://127.0.0.1:8000/login.php"
        );
        assert_eq!(up.rewrite("http://localhost/cv2/public", ORIGIN), ORIGIN);
        assert_eq!(up.rewrite("/cv2/public/login.php", ORIGIN), "/cv2/public/login.php");
    }

    #[test]
    fn test_inject_before_body_close() {
        let tag = "<script></script>";
        assert_eq!(
            inject_script("<html><BODY>x</BODY></html>", tag),
            "<html><BODY>x<script></script></BODY></html>"
        );
        assert_eq!(inject_script("<p>fragment</p>", tag), "<p>fragment</p><script></script>");
    }
}

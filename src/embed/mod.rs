//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Live-reload client served by the proxy
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{HOTRELOAD_JS, HotreloadVars};
//!
//! let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Path the proxy answers with the live-reload client.
    pub const HOTRELOAD_PATH: &str = "/__sheen/hotreload.js";

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__SHEEN_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live-reload client (minified by build.rs, overlay CSS inlined).
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/hotreload.min.js")));

    /// Script tag injected into proxied HTML.
    pub fn script_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_PATH}" async></script>"#)
    }
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_hotreload_port_injected() {
        let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35730 });
        assert!(js.contains("35730"));
        assert!(!js.contains("__SHEEN_WS_PORT__"));
        assert!(!js.contains("__SHEEN_ERROR_OVERLAY_CSS__"));
    }

    #[test]
    fn test_script_tag() {
        assert_eq!(
            script_tag(),
            r#"<script src="/__sheen/hotreload.js" async></script>"#
        );
    }
}

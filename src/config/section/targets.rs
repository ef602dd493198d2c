//! `[targets]` section configuration.
//!
//! Minimum browser versions used by the compatibility and vendor-prefix
//! passes. Versions are `"major"` or `"major.minor"`; omitted browsers are not
//! targeted.
//!
//! # Example
//!
//! ```toml
//! [targets]
//! chrome = "100"
//! safari = "14.1"
//! ios_saf = "14"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TargetsConfig {
    pub android: Option<String>,
    pub chrome: Option<String>,
    pub edge: Option<String>,
    pub firefox: Option<String>,
    pub ie: Option<String>,
    pub ios_saf: Option<String>,
    pub opera: Option<String>,
    pub safari: Option<String>,
    pub samsung: Option<String>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            android: None,
            chrome: Some("100".into()),
            edge: Some("100".into()),
            firefox: Some("100".into()),
            ie: None,
            ios_saf: Some("14".into()),
            opera: None,
            safari: Some("14".into()),
            samsung: None,
        }
    }
}

impl TargetsConfig {
    fn entries(&self) -> [(&'static str, &Option<String>); 9] {
        [
            ("targets.android", &self.android),
            ("targets.chrome", &self.chrome),
            ("targets.edge", &self.edge),
            ("targets.firefox", &self.firefox),
            ("targets.ie", &self.ie),
            ("targets.ios_saf", &self.ios_saf),
            ("targets.opera", &self.opera),
            ("targets.safari", &self.safari),
            ("targets.samsung", &self.samsung),
        ]
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, value) in self.entries() {
            if let Some(v) = value
                && parse_version(v).is_none()
            {
                diag.error_with_hint(
                    FieldPath::new(field),
                    format!("`{v}` is not a browser version"),
                    "use \"major\" or \"major.minor\", e.g. \"14.1\"",
                );
            }
        }
    }

    /// Convert to lightningcss browser targets. Invalid versions are skipped
    /// (validation reports them before any build runs).
    pub fn browsers(&self) -> Option<Browsers> {
        let v = |value: &Option<String>| value.as_deref().and_then(parse_version);
        let browsers = Browsers {
            android: v(&self.android),
            chrome: v(&self.chrome),
            edge: v(&self.edge),
            firefox: v(&self.firefox),
            ie: v(&self.ie),
            ios_saf: v(&self.ios_saf),
            opera: v(&self.opera),
            safari: v(&self.safari),
            samsung: v(&self.samsung),
        };
        (browsers != Browsers::default()).then_some(browsers)
    }
}

/// Encode `"major[.minor[.patch]]"` the way lightningcss expects:
/// `major << 16 | minor << 8 | patch`.
fn parse_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    if parts.next().is_some() || major > 0xff_ff || minor > 0xff || patch > 0xff {
        return None;
    }
    Some(major << 16 | minor << 8 | patch)
}

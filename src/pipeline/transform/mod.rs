//! Pipeline stages in execution order.
//!
//! ```text
//! sourcemap-init → compile → import → assets → calc → preset-env → nesting
//!   → [utilities] → prefix → [minify] → size → sourcemap-write
//! ```
//!
//! `utilities` runs only when enabled in config, `minify` only in production.

mod assets;
mod compile;
mod import;
mod lower;
mod minify;
mod size;
mod sourcemap;
mod utilities;

pub use assets::Assets;
pub use compile::Compile;
pub use import::Import;
pub use lower::{Calc, Nesting, Prefix, PresetEnv};
pub use minify::Minify;
pub use size::Size;
pub use sourcemap::{SourceMapInit, SourceMapWrite};
pub use utilities::Utilities;

use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use super::Stage;
use crate::config::SiteConfig;
use crate::core::BuildMode;

/// Build the ordered stage list for `mode`.
pub fn stages(config: &SiteConfig, mode: BuildMode) -> Vec<Arc<dyn Stage>> {
    let browsers = config.targets.browsers();

    let mut stages: Vec<Arc<dyn Stage>> = vec![
        Arc::new(SourceMapInit::new(config.styles.source_map)),
        Arc::new(Compile::new(&config.styles)),
        Arc::new(Import::new(&config.styles)),
        Arc::new(Assets::new(config)),
        Arc::new(Calc),
        Arc::new(PresetEnv::new(browsers)),
        Arc::new(Nesting),
    ];
    if config.utilities.enable {
        stages.push(Arc::new(Utilities::new(config)));
    }
    stages.push(Arc::new(Prefix::new(browsers)));
    if mode.is_production() {
        stages.push(Arc::new(Minify::new(browsers)));
    }
    stages.push(Arc::new(Size));
    stages.push(Arc::new(SourceMapWrite));
    stages
}

/// 1-based line of byte offset `pos` in `text`.
pub(super) fn line_at(text: &str, pos: usize) -> u32 {
    let end = pos.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() as u32 + 1
}

/// Byte ranges of comments and string literals in a stylesheet.
///
/// Rules and function calls found inside these ranges are plain text and
/// must not be evaluated.
pub(super) struct Inert(Vec<Range<usize>>);

impl Inert {
    pub(super) fn scan(css: &str) -> Self {
        let bytes = css.as_bytes();
        let mut spans = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = css[i + 2..].find("*/").map_or(bytes.len(), |p| i + p + 4);
                    spans.push(i..end);
                    i = end;
                }
                quote @ (b'"' | b'\'') => {
                    let mut j = i + 1;
                    while j < bytes.len() && bytes[j] != quote && bytes[j] != b'\n' {
                        j += if bytes[j] == b'\\' { 2 } else { 1 };
                    }
                    let end = (j + 1).min(bytes.len());
                    spans.push(i..end);
                    i = end;
                }
                _ => i += 1,
            }
        }
        Self(spans)
    }

    pub(super) fn contains(&self, pos: usize) -> bool {
        self.0
            .binary_search_by(|span| {
                if span.end <= pos {
                    Ordering::Less
                } else if span.start > pos {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .is_ok()
    }
}

//! The per-entry value that flows through the stage chain.

use std::path::{Path, PathBuf};

use super::BuildError;
use super::sourcemap::SourceTrack;

/// One entry stylesheet in flight.
///
/// Stages mutate `css` in place; the source-map track is composed alongside
/// by every stage that re-prints the stylesheet.
#[derive(Debug)]
pub struct Unit {
    /// Absolute path of the entry stylesheet.
    pub entry: PathBuf,
    /// Absolute path of the stylesheet this entry is written to.
    pub output: PathBuf,
    pub css: String,
    /// Files the stylesheet was built from, entry first: partials, inlined
    /// imports and assets referenced through the asset helpers.
    pub sources: Vec<PathBuf>,
    pub map: Option<SourceTrack>,
    /// Serialized source map, attached by the final stage.
    pub source_map: Option<String>,
}

impl Unit {
    pub fn new(entry: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            output: output.into(),
            css: String::new(),
            sources: Vec::new(),
            map: None,
            source_map: None,
        }
    }

    /// File name of the output stylesheet, e.g. `main.css`.
    pub fn output_name(&self) -> String {
        file_name(&self.output)
    }

    /// Directory the output stylesheet lives in.
    pub fn output_dir(&self) -> &Path {
        self.output.parent().unwrap_or(Path::new("."))
    }

    /// Replace the stylesheet text after a stage that cannot report mappings.
    ///
    /// Mappings composed so far no longer line up with the new text, so the
    /// track restarts from it.
    pub fn replace_text(&mut self, css: String) {
        self.css = css;
        if let Some(track) = &mut self.map {
            track.restart();
        }
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One step of the stylesheet pipeline.
///
/// Stages are stateless after construction and are shared between builds.
pub trait Stage: Send + Sync {
    /// Stable name used in logs and tool errors.
    fn name(&self) -> &'static str;

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError>;
}

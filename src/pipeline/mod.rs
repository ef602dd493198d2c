//! Stylesheet build pipeline.
//!
//! # Module Structure
//!
//! ```text
//! pipeline/
//! ├── transform/     # One module per stage (compile, import, assets, ...)
//! ├── lightning.rs   # Shared lightningcss parse/transform/print pass
//! ├── sourcemap.rs   # Map composition across passes
//! ├── output.rs      # Writing CSS and maps
//! ├── unit.rs        # Unit and the Stage trait
//! └── error.rs       # BuildError
//! ```
//!
//! The stage list is fixed when the pipeline is constructed from the build
//! mode. Each entry stylesheet runs through every stage in order; the first
//! failing stage ends that entry's run without output, other entries still
//! build.

mod error;
mod lightning;
mod output;
mod sourcemap;
mod transform;
mod unit;

#[cfg(test)]
mod tests;

pub use error::BuildError;
#[cfg(test)]
pub use lightning::minify_css;
pub use unit::{Stage, Unit};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::debug;
use crate::notify::Reporter;
use crate::utils::path::normalize_path;

/// Output of one entry's run, before it is written.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub entry: PathBuf,
    pub output: PathBuf,
    /// Stylesheet text without the `sourceMappingURL` comment.
    pub css: String,
    pub source_map: Option<String>,
    /// Files the entry was built from, entry first.
    pub sources: Vec<PathBuf>,
}

impl PipelineResult {
    /// File name of the written stylesheet, e.g. `main.css`.
    pub fn output_name(&self) -> String {
        unit::file_name(&self.output)
    }

    /// Whether `path` is one of the files this stylesheet was built from.
    pub fn is_built_from(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        self.sources.iter().any(|source| normalize_path(source) == path)
    }
}

impl From<Unit> for PipelineResult {
    fn from(unit: Unit) -> Self {
        Self {
            entry: unit.entry,
            output: unit.output,
            css: unit.css,
            source_map: unit.source_map,
            sources: unit.sources,
        }
    }
}

/// Outcome of building every entry once.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub written: Vec<PipelineResult>,
    pub failed: Vec<BuildError>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// File names of the written stylesheets.
    pub fn output_names(&self) -> Vec<String> {
        self.written.iter().map(PipelineResult::output_name).collect()
    }

    fn record(&mut self, outcome: Result<PipelineResult, BuildError>, reporter: &Reporter) {
        match outcome {
            Ok(result) => self.written.push(result),
            Err(err) => {
                reporter.error(&err);
                self.failed.push(err);
            }
        }
    }
}

pub struct Pipeline {
    config: Arc<SiteConfig>,
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new(config: Arc<SiteConfig>, mode: BuildMode) -> Self {
        let stages = transform::stages(&config, mode);
        debug!("pipeline"; "{} stages: {}", mode.label(),
            stages.iter().map(|s| s.name()).collect::<Vec<_>>().join(" → "));
        Self { config, stages }
    }

    #[cfg(test)]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    fn unit(&self, entry: &Path) -> Unit {
        Unit::new(entry, self.config.styles.output_for(entry))
    }

    /// Run every stage on `entry`, on the calling thread.
    pub fn run(&self, entry: &Path) -> Result<PipelineResult, BuildError> {
        let mut unit = self.unit(entry);
        for stage in &self.stages {
            debug!("pipeline"; "{} {}", stage.name(), unit.output_name());
            stage.run(&mut unit)?;
        }
        Ok(unit.into())
    }

    /// Run every stage on `entry`, each as its own blocking task awaited in
    /// order.
    pub async fn run_async(&self, entry: &Path) -> Result<PipelineResult, BuildError> {
        let mut unit = self.unit(entry);
        for stage in &self.stages {
            let stage = Arc::clone(stage);
            let name = stage.name();
            debug!("pipeline"; "{} {}", name, unit.output_name());

            let (returned, outcome) = tokio::task::spawn_blocking(move || {
                let outcome = stage.run(&mut unit);
                (unit, outcome)
            })
            .await
            .map_err(|e| BuildError::tool(name, entry, None, format!("stage task failed: {e}")))?;

            unit = returned;
            outcome?;
        }
        Ok(unit.into())
    }

    fn write(&self, result: PipelineResult) -> Result<PipelineResult, BuildError> {
        output::write(&result, self.config.styles.source_map)?;
        Ok(result)
    }

    /// Build and write every entry, entries in parallel.
    ///
    /// Each failure is reported once through `reporter`; a fully successful
    /// build tells the reporter it recovered.
    pub fn build(&self, reporter: &Reporter) -> BuildReport {
        let outcomes: Vec<_> = self
            .config
            .styles
            .entries
            .par_iter()
            .map(|entry| self.run(entry).and_then(|r| self.write(r)))
            .collect();

        let mut report = BuildReport::default();
        for outcome in outcomes {
            report.record(outcome, reporter);
        }
        if report.is_success() {
            reporter.recovered();
        }
        report
    }

    /// Async counterpart of [`Pipeline::build`], entries one after another.
    pub async fn build_async(&self, reporter: &Reporter) -> BuildReport {
        let mut report = BuildReport::default();
        for entry in &self.config.styles.entries {
            let outcome = match self.run_async(entry).await {
                Ok(result) => self.write(result),
                Err(e) => Err(e),
            };
            report.record(outcome, reporter);
        }
        if report.is_success() {
            reporter.recovered();
        }
        report
    }
}

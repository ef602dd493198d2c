//! Stages that open and close source-map tracking around the chain.

use crate::config::SourceMapMode;
use crate::pipeline::sourcemap::SourceTrack;
use crate::pipeline::{BuildError, Stage, Unit};

pub struct SourceMapInit {
    mode: SourceMapMode,
}

impl SourceMapInit {
    pub fn new(mode: SourceMapMode) -> Self {
        Self { mode }
    }
}

impl Stage for SourceMapInit {
    fn name(&self) -> &'static str {
        "sourcemap-init"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        if self.mode != SourceMapMode::None {
            unit.map = Some(SourceTrack::new(&unit.entry, unit.output_dir()));
        }
        Ok(())
    }
}

pub struct SourceMapWrite;

impl Stage for SourceMapWrite {
    fn name(&self) -> &'static str {
        "sourcemap-write"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        let Some(track) = unit.map.as_mut() else {
            return Ok(());
        };
        unit.source_map = track
            .finish()
            .map_err(|e| BuildError::tool(self.name(), &unit.entry, None, e))?;
        Ok(())
    }
}

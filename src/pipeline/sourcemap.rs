//! Source-map tracking across the lightningcss passes.
//!
//! Every pass that re-prints the stylesheet produces a map from its output
//! back to its input. Chaining them with `SourceMap::extends` yields one map
//! from the final output to the first tracked text: the compiled stylesheet
//! with imports and assets resolved. That text is embedded as the source
//! content, listed under the entry's path.
//!
//! The pre-processor does not report positions, so mappings stop at the
//! compiled stylesheet rather than reaching into SCSS partials.

use std::path::Path;

use parcel_sourcemap::SourceMap;

pub struct SourceTrack {
    /// Directory the map file is written to; sources are relative to it.
    project_root: String,
    /// Absolute path of the entry stylesheet.
    source: String,
    composed: Option<SourceMap>,
    origin: Option<String>,
}

impl std::fmt::Debug for SourceTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTrack")
            .field("source", &self.source)
            .field("tracking", &self.composed.is_some())
            .finish()
    }
}

impl SourceTrack {
    pub fn new(entry: &Path, output_dir: &Path) -> Self {
        Self {
            project_root: output_dir.to_string_lossy().into_owned(),
            source: entry.to_string_lossy().into_owned(),
            composed: None,
            origin: None,
        }
    }

    /// Fresh map for one pass over `input`.
    pub fn pass_map(&self, input: &str) -> Result<SourceMap, String> {
        let mut map = SourceMap::new(&self.project_root);
        let index = map.add_source(&self.source);
        map.set_source_content(index as usize, input)
            .map_err(|e| format!("{e:?}"))?;
        Ok(map)
    }

    /// Chain the map of a pass that read `input`.
    pub fn record(&mut self, input: &str, mut map: SourceMap) -> Result<(), String> {
        match self.composed.take() {
            Some(mut previous) => {
                map.extends(&mut previous).map_err(|e| format!("{e:?}"))?;
                self.composed = Some(map);
            }
            None => {
                self.origin = Some(input.to_string());
                self.composed = Some(map);
            }
        }
        Ok(())
    }

    /// Forget composed mappings; the next pass starts a new chain.
    pub fn restart(&mut self) {
        self.composed = None;
        self.origin = None;
    }

    /// Whether any pass has been recorded since the last restart.
    #[cfg(test)]
    pub fn is_tracking(&self) -> bool {
        self.composed.is_some()
    }

    /// Serialize the composed map to JSON.
    pub fn finish(&mut self) -> Result<Option<String>, String> {
        let Some(map) = self.composed.as_mut() else {
            return Ok(None);
        };
        if let Some(origin) = &self.origin {
            map.set_source_content(0, origin)
                .map_err(|e| format!("{e:?}"))?;
        }
        map.to_json(None).map(Some).map_err(|e| format!("{e:?}"))
    }
}

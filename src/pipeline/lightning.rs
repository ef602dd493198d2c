//! Shared lightningcss pass used by the calc, compat, nesting, prefix and
//! minify stages.
//!
//! A pass parses the current stylesheet, optionally runs the transform
//! (`StyleSheet::minify`, where lightningcss applies target lowering and
//! prefixing), prints it back and chains the printed source map.

use std::fmt::Display;
use std::path::Path;

use lightningcss::error::Error as CssError;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Features, Targets};

use super::{BuildError, Unit};

/// Options for a single lightningcss pass.
#[derive(Clone, Copy)]
pub struct Pass {
    pub stage: &'static str,
    pub targets: Targets,
    /// Run the transform step before printing.
    pub transform: bool,
    /// Print without whitespace.
    pub minify: bool,
}

impl Pass {
    /// Parse and re-print only; calc expressions are folded while parsing.
    pub fn print_only(stage: &'static str) -> Self {
        Self {
            stage,
            targets: Targets::default(),
            transform: false,
            minify: false,
        }
    }

    /// Lower syntax for `browsers`, leaving the features in `exclude` alone.
    pub fn lower(stage: &'static str, browsers: Option<Browsers>, exclude: Features) -> Self {
        Self {
            stage,
            targets: Targets {
                browsers,
                include: Features::empty(),
                exclude,
            },
            transform: true,
            minify: false,
        }
    }

    /// Force the features in `include` regardless of browser support.
    pub fn force(stage: &'static str, include: Features) -> Self {
        Self {
            stage,
            targets: Targets {
                browsers: None,
                include,
                exclude: Features::empty(),
            },
            transform: false,
            minify: false,
        }
    }

    pub fn minified(mut self) -> Self {
        self.minify = true;
        self
    }

    /// Run the pass on `unit`, replacing its stylesheet text.
    pub fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        let (code, map) = {
            let filename = unit.entry.to_string_lossy().into_owned();
            let mut sheet = StyleSheet::parse(
                &unit.css,
                ParserOptions {
                    filename,
                    ..ParserOptions::default()
                },
            )
            .map_err(|e| css_error(self.stage, &unit.entry, e))?;

            if self.transform {
                sheet
                    .minify(MinifyOptions {
                        targets: self.targets,
                        ..MinifyOptions::default()
                    })
                    .map_err(|e| css_error(self.stage, &unit.entry, e))?;
            }

            let mut map = match &unit.map {
                Some(track) => Some(
                    track
                        .pass_map(&unit.css)
                        .map_err(|e| BuildError::tool(self.stage, &unit.entry, None, e))?,
                ),
                None => None,
            };

            let printed = sheet
                .to_css(PrinterOptions {
                    minify: self.minify,
                    source_map: map.as_mut(),
                    targets: self.targets,
                    ..PrinterOptions::default()
                })
                .map_err(|e| css_error(self.stage, &unit.entry, e))?;
            (printed.code, map)
        };

        if let (Some(track), Some(map)) = (unit.map.as_mut(), map) {
            track
                .record(&unit.css, map)
                .map_err(|e| BuildError::tool(self.stage, &unit.entry, None, e))?;
        }
        unit.css = code;
        Ok(())
    }
}

/// Convert a lightningcss error into a tool error with a 1-based line.
fn css_error<T: Display>(stage: &'static str, file: &Path, err: CssError<T>) -> BuildError {
    let line = err.loc.as_ref().map(|loc| loc.line + 1);
    BuildError::tool(stage, file, line, err.kind.to_string())
}

/// Minify a standalone stylesheet with the same settings as the minify stage.
#[cfg(test)]
pub fn minify_css(css: &str, browsers: Option<Browsers>) -> Result<String, String> {
    let mut sheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;
    let targets = Targets {
        browsers,
        ..Targets::default()
    };
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;
    sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map(|out| out.code)
        .map_err(|e| e.to_string())
}

//! Utility-class generation through an external command.
//!
//! The current stylesheet is written to a scratch input file, the configured
//! command turns it into a scratch output file, and that output replaces the
//! stylesheet. The generator reports no mappings, so source-map tracking
//! restarts from its output.

use std::path::PathBuf;

use crate::config::SiteConfig;
use crate::config::section::{INPUT_VAR, OUTPUT_VAR};
use crate::pipeline::{BuildError, Stage, Unit};
use crate::utils::exec::{Cmd, EMPTY_FILTER, SILENT_FILTER};

pub struct Utilities {
    root: PathBuf,
    command: Vec<String>,
    args: Vec<String>,
    quiet: bool,
}

impl Utilities {
    pub fn new(config: &SiteConfig) -> Self {
        let utilities = &config.utilities;
        Self {
            root: config.root.clone(),
            command: utilities.command.clone(),
            args: utilities.args.clone(),
            quiet: utilities.quiet,
        }
    }

    fn generate(&self, css: &str) -> anyhow::Result<String> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("input.css");
        let output = scratch.path().join("output.css");
        std::fs::write(&input, css)?;

        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();
        let args = self
            .args
            .iter()
            .map(|a| a.replace(INPUT_VAR, &input_str).replace(OUTPUT_VAR, &output_str));

        Cmd::from_slice(&self.command)
            .args(args)
            .cwd(&self.root)
            .filter(if self.quiet { &SILENT_FILTER } else { &EMPTY_FILTER })
            .run()?;

        Ok(std::fs::read_to_string(&output)?)
    }
}

impl Stage for Utilities {
    fn name(&self) -> &'static str {
        "utilities"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        let css = self
            .generate(&unit.css)
            .map_err(|e| BuildError::tool(self.name(), &unit.entry, None, format!("{e:#}")))?;
        unit.replace_text(css);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::test_config_at;

    fn utilities(root: &std::path::Path, script: &str) -> Utilities {
        let mut config = test_config_at(root, "");
        config.utilities.command = vec!["sh".into()];
        config.utilities.args = vec![
            "-c".into(),
            script.into(),
            "sh".into(),
            INPUT_VAR.into(),
            OUTPUT_VAR.into(),
        ];
        Utilities::new(&config)
    }

    #[test]
    fn test_output_replaces_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let stage = utilities(dir.path(), "cat \"$1\" > \"$2\"; echo '.u{x:y}' >> \"$2\"");

        let mut unit = Unit::new(dir.path().join("main.scss"), dir.path().join("main.css"));
        unit.css = ".a{color:red}\n".into();
        stage.run(&mut unit).unwrap();
        assert_eq!(unit.css, ".a{color:red}\n.u{x:y}\n");
    }

    #[test]
    fn test_failing_command_is_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let stage = utilities(dir.path(), "echo broken >&2; exit 3");

        let mut unit = Unit::new(dir.path().join("main.scss"), dir.path().join("main.css"));
        let err = stage.run(&mut unit).unwrap_err();
        assert_eq!(err.kind(), "utilities");
        assert!(err.message().contains("broken"), "{}", err.message());
    }
}

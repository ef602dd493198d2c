//! One-shot build task.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, bail};

use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::log;
use crate::notify::{ConsoleStyle, Reporter};
use crate::pipeline::Pipeline;
use crate::utils::plural_count;

/// Build every entry once.
///
/// All entries are attempted; the task fails afterwards when any of them
/// failed, so the process exits non-zero.
pub fn build(config: Arc<SiteConfig>, mode: BuildMode) -> Result<()> {
    let start = Instant::now();
    log!("build"; "{} build, {}", mode.label(), plural_count(config.styles.entries.len(), "stylesheet"));

    let reporter = Reporter::standard(&config, ConsoleStyle::Log);
    let pipeline = Pipeline::new(config, mode);
    let report = pipeline.build(&reporter);

    if !report.is_success() {
        bail!(
            "{} of {} failed",
            report.failed.len(),
            plural_count(report.failed.len() + report.written.len(), "stylesheet")
        );
    }
    log!("build"; "wrote {} in {:.0?}", report.output_names().join(", "), start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::test_config_at;
    use crate::utils::path::normalize_path;

    fn project(main: &str) -> (tempfile::TempDir, Arc<SiteConfig>) {
        let dir = tempfile::tempdir().unwrap();
        let root = normalize_path(dir.path());
        fs::create_dir_all(root.join("styles")).unwrap();
        fs::write(root.join("styles/main.scss"), main).unwrap();
        let mut extra = String::from("[notify]\ndesktop = false\n");
        extra.push_str("[styles]\nsource_map = \"none\"\n");
        (dir, Arc::new(test_config_at(&root, &extra)))
    }

    #[test]
    fn test_build_succeeds() {
        let (_dir, config) = project(".a { .b { color: red; } }\n");
        build(config.clone(), BuildMode::PRODUCTION).unwrap();
        let css = fs::read_to_string(config.root.join("public/css/main.css")).unwrap();
        assert_eq!(css, ".a .b{color:red}");
    }

    #[test]
    fn test_build_fails_on_broken_entry() {
        let (_dir, config) = project(".a { color: red\n b: c; }\n");
        let err = build(config, BuildMode::DEVELOPMENT).unwrap_err();
        assert_eq!(err.to_string(), "1 of 1 stylesheet failed");
    }
}

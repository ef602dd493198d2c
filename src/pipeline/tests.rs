//! End-to-end pipeline tests on temporary projects.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::*;
use crate::config::{SiteConfig, test_config_at};
use crate::notify::Recorder;
use crate::utils::{hash, path::normalize_path};

const MAIN: &str = r#"
$gap: 8px;

.card {
  padding: calc(#{$gap} * 2);
  background: resolve('logo.png');

  .title {
    user-select: none;
  }
}
"#;

struct Project {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Project {
    fn new(main: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = normalize_path(dir.path());
        fs::create_dir_all(root.join("styles")).unwrap();
        fs::create_dir_all(root.join("images")).unwrap();
        fs::write(root.join("styles/main.scss"), main).unwrap();
        write_logo(&root, 1);
        Self { _dir: dir, root }
    }

    fn config(&self, extra: &str) -> Arc<SiteConfig> {
        Arc::new(test_config_at(&self.root, extra))
    }

    fn output(&self) -> PathBuf {
        self.root.join("public/css/main.css")
    }
}

fn write_logo(root: &Path, shade: u8) {
    image::RgbImage::from_pixel(4, 2, image::Rgb([shade, shade, shade]))
        .save(root.join("images/logo.png"))
        .unwrap();
}

fn reporter(root: &Path) -> (Reporter, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    (Reporter::new(root, "Styles").with(recorder.clone()), recorder)
}

#[test]
fn test_build_writes_css_and_map() {
    let project = Project::new(MAIN);
    let pipeline = Pipeline::new(project.config(""), BuildMode::DEVELOPMENT);
    let (reporter, recorder) = reporter(&project.root);

    let report = pipeline.build(&reporter);
    assert!(report.is_success(), "{:?}", report.failed);
    assert_eq!(report.output_names(), ["main.css"]);
    assert!(recorder.seen.lock().is_empty());

    let css = fs::read_to_string(project.output()).unwrap();
    assert!(css.contains(".card .title"), "{css}");
    assert!(css.contains("padding: 16px"), "{css}");
    assert!(css.contains("../../images/logo.png?"), "{css}");
    assert!(css.ends_with("/*# sourceMappingURL=main.css.map */\n"));

    let map = fs::read_to_string(output::map_path(&project.output())).unwrap();
    assert!(map.contains("main.scss"), "{map}");
}

#[test]
fn test_unchanged_inputs_build_identically() {
    let project = Project::new(MAIN);
    let pipeline = Pipeline::new(project.config(""), BuildMode::DEVELOPMENT);
    let (reporter, _) = reporter(&project.root);

    pipeline.build(&reporter);
    let first = fs::read(project.output()).unwrap();
    let first_map = fs::read(output::map_path(&project.output())).unwrap();
    pipeline.build(&reporter);
    assert_eq!(first, fs::read(project.output()).unwrap());
    assert_eq!(first_map, fs::read(output::map_path(&project.output())).unwrap());
}

#[test]
fn test_resolve_token_tracks_image_content() {
    let project = Project::new(MAIN);
    let pipeline = Pipeline::new(project.config("[styles]\nsource_map = \"none\""), BuildMode::DEVELOPMENT);
    let entry = project.root.join("styles/main.scss");

    let before = pipeline.run(&entry).unwrap();
    let token = hash::fingerprint_file(&project.root.join("images/logo.png")).unwrap();
    assert!(
        before.css.contains(&format!("../../images/logo.png?{token}")),
        "{}",
        before.css
    );

    write_logo(&project.root, 200);
    let after = pipeline.run(&entry).unwrap();
    let new_token = hash::fingerprint_file(&project.root.join("images/logo.png")).unwrap();
    assert_ne!(token, new_token);
    assert!(after.css.contains(&new_token), "{}", after.css);
}

#[test]
fn test_production_is_minified_development() {
    let project = Project::new(MAIN);
    let config = project.config("");
    let entry = project.root.join("styles/main.scss");

    let dev = Pipeline::new(config.clone(), BuildMode::DEVELOPMENT).run(&entry).unwrap();
    let prod = Pipeline::new(config.clone(), BuildMode::PRODUCTION).run(&entry).unwrap();

    assert_eq!(prod.css, minify_css(&dev.css, config.targets.browsers()).unwrap());
    assert!(prod.css.len() < dev.css.len());
    assert!(prod.source_map.is_some());
}

#[test]
fn test_syntax_error_reports_once_and_recovers() {
    let project = Project::new(".card {\n  color: red\n  padding: 1px;\n}\n");
    let pipeline = Pipeline::new(project.config(""), BuildMode::DEVELOPMENT);
    let (reporter, recorder) = reporter(&project.root);

    let report = pipeline.build(&reporter);
    assert_eq!(report.failed.len(), 1);
    assert!(report.written.is_empty());
    assert!(!project.output().exists());
    {
        let seen = recorder.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].file, Path::new("styles/main.scss"));
        assert_eq!(seen[0].line, Some(3));
        assert_eq!(seen[0].kind, "compile");
    }

    fs::write(project.root.join("styles/main.scss"), ".card { color: red; }\n").unwrap();
    let report = pipeline.build(&reporter);
    assert!(report.is_success());
    assert!(project.output().exists());
    assert_eq!(recorder.seen.lock().len(), 1);
    assert_eq!(recorder.cleared.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn test_failing_entry_does_not_block_others() {
    let project = Project::new(MAIN);
    fs::write(project.root.join("styles/broken.scss"), ".a { b: resolve('missing.png'); }").unwrap();
    let config = project.config("[styles]\nentries = [\"styles/main.scss\", \"styles/broken.scss\"]");
    let pipeline = Pipeline::new(config, BuildMode::DEVELOPMENT);
    let (reporter, recorder) = reporter(&project.root);

    let report = pipeline.build(&reporter);
    assert_eq!(report.output_names(), ["main.css"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].asset_ref(), Some("missing.png"));
    assert!(!project.root.join("public/css/broken.css").exists());
    assert_eq!(recorder.seen.lock().len(), 1);
}

#[tokio::test]
async fn test_async_run_matches_sync_run() {
    let project = Project::new(MAIN);
    let pipeline = Pipeline::new(project.config(""), BuildMode::PRODUCTION);
    let entry = project.root.join("styles/main.scss");

    let sync = pipeline.run(&entry).unwrap();
    let run_async = pipeline.run_async(&entry).await.unwrap();
    assert_eq!(sync.css, run_async.css);
    assert_eq!(sync.source_map, run_async.source_map);
}

#[test]
fn test_stage_names_follow_mode() {
    let project = Project::new(MAIN);
    let dev = Pipeline::new(project.config(""), BuildMode::DEVELOPMENT);
    let prod = Pipeline::new(project.config(""), BuildMode::PRODUCTION);
    assert!(!dev.stage_names().contains(&"minify"));
    assert!(prod.stage_names().contains(&"minify"));
    assert_eq!(prod.stage_names().len(), dev.stage_names().len() + 1);
}

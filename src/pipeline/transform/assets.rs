//! Asset helper functions evaluated inside the stylesheet.
//!
//! | Call                      | Result                                 |
//! |---------------------------|----------------------------------------|
//! | `resolve('logo.png')`     | `url('../../images/logo.png?1a2b3c4d')` |
//! | `inline('icon.svg')`      | `url('data:image/svg+xml;base64,...')` |
//! | `width('logo.png', 2)`    | `120px`                                |
//! | `height('logo.png')`      | `80px`                                 |
//! | `size('logo.png')`        | `240px 80px`                           |
//!
//! Paths are looked up in the asset load paths, then the project root. The
//! optional second argument of the dimension helpers is the pixel density.
//! Calls inside comments and strings are not evaluated.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::{Captures, Regex};

use super::{Inert, line_at};
use crate::config::SiteConfig;
use crate::pipeline::{BuildError, Stage, Unit};
use crate::utils::{hash, mime, path};

fn asset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(^|[^\w-])(resolve|inline|width|height|size)\(\s*(?:'([^']*)'|"([^"]*)"|([^'"),\s]+))\s*(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)"#,
        )
        .expect("valid asset regex")
    })
}

pub struct Assets {
    root: PathBuf,
    load_paths: Vec<PathBuf>,
    relative: bool,
    base_url: String,
    cache_buster: bool,
}

impl Assets {
    pub fn new(config: &SiteConfig) -> Self {
        let assets = &config.assets;
        Self {
            root: config.root.clone(),
            load_paths: assets.load_paths.clone(),
            relative: assets.relative,
            base_url: assets.base_url.clone(),
            cache_buster: assets.cache_buster,
        }
    }

    fn locate(&self, reference: &str) -> Option<PathBuf> {
        let reference = reference.trim_start_matches('/');
        self.load_paths
            .iter()
            .chain(std::iter::once(&self.root))
            .map(|dir| dir.join(reference))
            .find(|p| p.is_file())
            .map(|p| path::normalize_path(&p))
    }

    /// URL of `file` as seen from the output stylesheet.
    fn url_for(&self, file: &Path, output_dir: &Path) -> String {
        if self.relative {
            let from = path::normalize_path(output_dir);
            return path::relative_url(file, &from);
        }
        let rel = file.strip_prefix(&self.root).unwrap_or(file);
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/{}", path::to_url_path(rel))
    }

    /// Value of `call`, and the asset file it read.
    fn evaluate(&self, call: &Call<'_>, unit: &Unit) -> Result<(String, PathBuf), String> {
        let (reference, suffix) = split_suffix(call.reference);
        let file = self
            .locate(reference)
            .ok_or_else(|| "file not found in asset load paths".to_string())?;
        let value = self.render(call, &file, suffix, unit)?;
        Ok((value, file))
    }

    fn render(
        &self,
        call: &Call<'_>,
        file: &Path,
        suffix: &str,
        unit: &Unit,
    ) -> Result<String, String> {
        match call.function {
            "resolve" => {
                let (query, fragment) = split_fragment(suffix);
                let mut url = self.url_for(file, unit.output_dir());
                url.push_str(query);
                if self.cache_buster {
                    let token = hash::fingerprint_file(file).map_err(|e| e.to_string())?;
                    url.push(if query.is_empty() { '?' } else { '&' });
                    url.push_str(&token);
                }
                url.push_str(fragment);
                Ok(format!("url('{url}')"))
            }
            "inline" => {
                let bytes = std::fs::read(file).map_err(|e| e.to_string())?;
                let mime = mime::from_path(file);
                let mime = mime.split(';').next().unwrap_or(mime);
                Ok(format!("url('data:{mime};base64,{}')", STANDARD.encode(bytes)))
            }
            function => {
                let (w, h) = image::image_dimensions(file).map_err(|e| e.to_string())?;
                let density = call.density.unwrap_or(1.0);
                if density <= 0.0 {
                    return Err(format!("invalid density `{density}`"));
                }
                let w = px(w, density);
                let h = px(h, density);
                Ok(match function {
                    "width" => w,
                    "height" => h,
                    _ => format!("{w} {h}"),
                })
            }
        }
    }
}

struct Call<'a> {
    function: &'a str,
    reference: &'a str,
    density: Option<f64>,
}

impl<'a> Call<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let reference = (3..=5)
            .find_map(|i| caps.get(i))
            .map_or("", |m| m.as_str().trim());
        Self {
            function: caps.get(2).map_or("", |m| m.as_str()),
            reference,
            density: caps.get(6).and_then(|m| m.as_str().parse().ok()),
        }
    }
}

/// Split `logo.svg#icon` into `("logo.svg", "#icon")`.
fn split_suffix(reference: &str) -> (&str, &str) {
    match reference.find(['?', '#']) {
        Some(idx) => reference.split_at(idx),
        None => (reference, ""),
    }
}

fn split_fragment(suffix: &str) -> (&str, &str) {
    match suffix.find('#') {
        Some(idx) => suffix.split_at(idx),
        None => (suffix, ""),
    }
}

/// Pixel length with trailing zeros dropped: `120px`, `60.5px`.
fn px(pixels: u32, density: f64) -> String {
    let value = f64::from(pixels) / density;
    let mut s = format!("{value:.4}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    format!("{s}px")
}

impl Stage for Assets {
    fn name(&self) -> &'static str {
        "assets"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        let css = &unit.css;
        let mut out = String::with_capacity(css.len());
        let mut last = 0;
        let inert = Inert::scan(css);
        let mut used = Vec::new();

        for caps in asset_regex().captures_iter(css) {
            let call_start = caps.get(2).map_or(0, |m| m.start());
            if inert.contains(call_start) {
                continue;
            }
            let end = caps.get(0).map_or(call_start, |m| m.end());
            let call = Call::from_captures(&caps);

            let (value, file) = self.evaluate(&call, unit).map_err(|message| {
                BuildError::asset(
                    &unit.entry,
                    Some(line_at(css, call_start)),
                    call.reference,
                    message,
                )
            })?;

            out.push_str(&css[last..call_start]);
            out.push_str(&value);
            last = end;
            if !used.contains(&file) {
                used.push(file);
            }
        }

        if last == 0 {
            return Ok(());
        }
        out.push_str(&css[last..]);
        unit.css = out;
        for file in used {
            if !unit.sources.contains(&file) {
                unit.sources.push(file);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;

    /// Write a `w`x`h` PNG.
    fn write_png(path: &Path, w: u32, h: u32, shade: u8) {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([shade, 0, 0]));
        img.save(path).unwrap();
    }

    fn setup() -> (tempfile::TempDir, Assets, Unit) {
        let dir = tempfile::tempdir().unwrap();
        let root = path::normalize_path(dir.path());
        fs::create_dir_all(root.join("images/icons")).unwrap();
        fs::create_dir_all(root.join("public/css")).unwrap();
        write_png(&root.join("images/logo.png"), 240, 80, 10);

        let config = test_config_at(&root, "");
        let assets = Assets::new(&config);
        let unit = Unit::new(root.join("styles/main.scss"), root.join("public/css/main.css"));
        (dir, assets, unit)
    }

    fn apply(assets: &Assets, unit: &mut Unit, css: &str) -> Result<(), BuildError> {
        unit.css = css.to_string();
        assets.run(unit)
    }

    #[test]
    fn test_resolve_relative_with_token() {
        let (dir, assets, mut unit) = setup();
        apply(&assets, &mut unit, ".a { background: resolve('logo.png'); }").unwrap();

        let token = hash::fingerprint_file(&dir.path().join("images/logo.png")).unwrap();
        assert_eq!(
            unit.css,
            format!(".a {{ background: url('../../images/logo.png?{token}'); }}")
        );
    }

    #[test]
    fn test_token_follows_content() {
        let (dir, assets, mut unit) = setup();
        apply(&assets, &mut unit, "a{b:resolve(logo.png)}").unwrap();
        let before = unit.css.clone();

        write_png(&dir.path().join("images/logo.png"), 240, 80, 200);
        apply(&assets, &mut unit, "a{b:resolve(logo.png)}").unwrap();
        assert_ne!(before, unit.css);
        assert!(unit.css.starts_with("a{b:url('../../images/logo.png?"));
    }

    #[test]
    fn test_resolve_keeps_query_and_fragment() {
        let (dir, assets, mut unit) = setup();
        fs::write(dir.path().join("images/icons/set.svg"), "<svg/>").unwrap();
        apply(&assets, &mut unit, "a{b:resolve('icons/set.svg?v=2#home')}").unwrap();

        let token = hash::fingerprint(b"<svg/>");
        assert_eq!(
            unit.css,
            format!("a{{b:url('../../images/icons/set.svg?v=2&{token}#home')}}")
        );
    }

    #[test]
    fn test_resolve_absolute_base_url() {
        let (_dir, mut assets, mut unit) = setup();
        assets.relative = false;
        assets.cache_buster = false;
        assets.base_url = "/static/".into();
        apply(&assets, &mut unit, "a{b:resolve(\"logo.png\")}").unwrap();
        assert_eq!(unit.css, "a{b:url('/static/images/logo.png')}");
    }

    #[test]
    fn test_dimensions_with_density() {
        let (_dir, assets, mut unit) = setup();
        apply(
            &assets,
            &mut unit,
            "a{w:width('logo.png');h:height('logo.png', 2);s:size(logo.png, 3)}",
        )
        .unwrap();
        assert_eq!(unit.css, "a{w:240px;h:40px;s:80px 26.6667px}");
    }

    #[test]
    fn test_inline_data_uri() {
        let (dir, assets, mut unit) = setup();
        fs::write(dir.path().join("images/icons/dot.svg"), "<svg/>").unwrap();
        apply(&assets, &mut unit, "a{b:inline('icons/dot.svg')}").unwrap();
        assert_eq!(
            unit.css,
            format!("a{{b:url('data:image/svg+xml;base64,{}')}}", STANDARD.encode("<svg/>"))
        );
    }

    #[test]
    fn test_prefixed_names_are_not_calls() {
        let (_dir, assets, mut unit) = setup();
        let css = "a{max-width:calc(1px);b:my-resolve(x)}";
        apply(&assets, &mut unit, css).unwrap();
        assert_eq!(unit.css, css);
    }

    #[test]
    fn test_missing_asset_reports_line() {
        let (_dir, assets, mut unit) = setup();
        let err = apply(&assets, &mut unit, "a {}\n\nb { c: resolve('gone.png'); }").unwrap_err();
        assert_eq!(err.kind(), "asset");
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.asset_ref(), Some("gone.png"));
    }

    #[test]
    fn test_commented_call_not_evaluated() {
        let (_dir, assets, mut unit) = setup();
        let css = "/* .old { background: resolve('gone.png'); } */\n.a { content: \"width(x.png)\"; w: width(logo.png); }";
        apply(&assets, &mut unit, css).unwrap();
        assert_eq!(
            unit.css,
            "/* .old { background: resolve('gone.png'); } */\n.a { content: \"width(x.png)\"; w: 240px; }"
        );
    }

    #[test]
    fn test_referenced_assets_become_sources() {
        let (dir, assets, mut unit) = setup();
        apply(&assets, &mut unit, "a{b:resolve(logo.png);w:width(logo.png)}").unwrap();
        let logo = path::normalize_path(&dir.path().join("images/logo.png"));
        assert_eq!(unit.sources, [logo]);
    }
}

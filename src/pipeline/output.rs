//! Writing pipeline results to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{BuildError, PipelineResult};
use crate::config::SourceMapMode;

/// Path of the adjacent map file: `main.css` -> `main.css.map`.
pub fn map_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

/// Stylesheet text as written, with the trailing `sourceMappingURL` comment.
pub fn render(result: &PipelineResult, mode: SourceMapMode) -> String {
    let Some(map) = &result.source_map else {
        return result.css.clone();
    };
    let url = match mode {
        SourceMapMode::None => return result.css.clone(),
        SourceMapMode::File => map_path(&result.output)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        SourceMapMode::Inline => format!(
            "data:application/json;charset=utf-8;base64,{}",
            STANDARD.encode(map)
        ),
    };

    let mut css = result.css.clone();
    if !css.is_empty() && !css.ends_with('\n') {
        css.push('\n');
    }
    css.push_str(&format!("/*# sourceMappingURL={url} */\n"));
    css
}

/// Write the stylesheet and, in file mode, its map.
pub fn write(result: &PipelineResult, mode: SourceMapMode) -> Result<(), BuildError> {
    let io_err = |e: io::Error, path: &Path| {
        BuildError::tool("write", &result.entry, None, format!("{}: {e}", path.display()))
    };

    if let Some(dir) = result.output.parent() {
        fs::create_dir_all(dir).map_err(|e| io_err(e, dir))?;
    }
    fs::write(&result.output, render(result, mode)).map_err(|e| io_err(e, &result.output))?;

    let map_file = map_path(&result.output);
    match (&result.source_map, mode) {
        (Some(map), SourceMapMode::File) => {
            fs::write(&map_file, map).map_err(|e| io_err(e, &map_file))?;
        }
        _ => {
            // Stale map from an earlier run with a different mode.
            if map_file.exists() {
                fs::remove_file(&map_file).map_err(|e| io_err(e, &map_file))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(dir: &Path, map: Option<&str>) -> PipelineResult {
        PipelineResult {
            entry: dir.join("styles/main.scss"),
            output: dir.join("public/css/main.css"),
            css: ".a{color:red}".into(),
            source_map: map.map(str::to_string),
            sources: Vec::new(),
        }
    }

    #[test]
    fn test_map_path() {
        assert_eq!(
            map_path(Path::new("/out/main.css")),
            PathBuf::from("/out/main.css.map")
        );
    }

    #[test]
    fn test_file_mode_writes_map_and_comment() {
        let dir = tempfile::tempdir().unwrap();
        let res = result(dir.path(), Some("{\"version\":3}"));
        write(&res, SourceMapMode::File).unwrap();

        let css = fs::read_to_string(&res.output).unwrap();
        assert_eq!(css, ".a{color:red}\n/*# sourceMappingURL=main.css.map */\n");
        let map = fs::read_to_string(map_path(&res.output)).unwrap();
        assert_eq!(map, "{\"version\":3}");
    }

    #[test]
    fn test_inline_mode_embeds_base64() {
        let dir = tempfile::tempdir().unwrap();
        let res = result(dir.path(), Some("{}"));
        let css = render(&res, SourceMapMode::Inline);
        assert!(css.ends_with(&format!(
            "sourceMappingURL=data:application/json;charset=utf-8;base64,{} */\n",
            STANDARD.encode("{}")
        )));
    }

    #[test]
    fn test_none_mode_removes_stale_map() {
        let dir = tempfile::tempdir().unwrap();
        let res = result(dir.path(), Some("{}"));
        write(&res, SourceMapMode::File).unwrap();
        assert!(map_path(&res.output).exists());

        let res = result(dir.path(), None);
        write(&res, SourceMapMode::None).unwrap();
        assert!(!map_path(&res.output).exists());
        assert_eq!(fs::read_to_string(&res.output).unwrap(), ".a{color:red}");
    }
}

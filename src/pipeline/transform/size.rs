//! Per-file size report.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::log;
use crate::pipeline::{BuildError, Stage, Unit};

pub struct Size;

impl Stage for Size {
    fn name(&self) -> &'static str {
        "size"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        let gzip = gzip_len(unit.css.as_bytes())
            .map_err(|e| BuildError::tool(self.name(), &unit.entry, None, e.to_string()))?;
        log!(
            "size";
            "css: {} {} (gzipped {})",
            unit.output_name(),
            format_bytes(unit.css.len()),
            format_bytes(gzip)
        );
        Ok(())
    }
}

fn gzip_len(data: &[u8]) -> std::io::Result<usize> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?.len())
}

/// Human-readable byte count: `512 B`, `1.46 kB`, `2.1 MB`.
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["kB", "MB", "GB"];
    if bytes < 1000 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }
    let precision = if value < 10.0 { 2 } else if value < 100.0 { 1 } else { 0 };
    format!("{value:.precision$} {unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(1460), "1.46 kB");
        assert_eq!(format_bytes(24_300), "24.3 kB");
        assert_eq!(format_bytes(2_100_000), "2.10 MB");
    }

    #[test]
    fn test_gzip_shrinks_repetitive_css() {
        let css = ".a{color:red}".repeat(200);
        assert!(gzip_len(css.as_bytes()).unwrap() < css.len() / 10);
    }
}

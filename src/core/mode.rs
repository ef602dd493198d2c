//! Build mode selected once per process.

/// Production vs development, fixed at startup from `--production`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Whether the minification stage is part of the pipeline.
    pub minify: bool,
}

impl BuildMode {
    /// Production mode: minified output.
    pub const PRODUCTION: Self = Self { minify: true };

    /// Development mode: readable output.
    pub const DEVELOPMENT: Self = Self { minify: false };

    pub const fn from_flag(production: bool) -> Self {
        if production {
            Self::PRODUCTION
        } else {
            Self::DEVELOPMENT
        }
    }

    #[inline]
    pub const fn is_production(&self) -> bool {
        self.minify
    }

    pub const fn label(&self) -> &'static str {
        if self.minify { "production" } else { "development" }
    }
}

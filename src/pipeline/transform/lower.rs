//! lightningcss passes between asset rewriting and minification.

use lightningcss::targets::{Browsers, Features};

use crate::pipeline::lightning::Pass;
use crate::pipeline::{BuildError, Stage, Unit};

/// Fold `calc()` arithmetic. No browser targets: nothing else changes.
pub struct Calc;

impl Stage for Calc {
    fn name(&self) -> &'static str {
        "calc"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        Pass::print_only(self.name()).run(unit)
    }
}

/// Baseline compatibility transforms for the configured browsers.
///
/// Nesting and vendor prefixes have their own stages later in the chain.
pub struct PresetEnv {
    browsers: Option<Browsers>,
}

impl PresetEnv {
    pub fn new(browsers: Option<Browsers>) -> Self {
        Self { browsers }
    }
}

impl Stage for PresetEnv {
    fn name(&self) -> &'static str {
        "preset-env"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        Pass::lower(
            self.name(),
            self.browsers,
            Features::Nesting | Features::VendorPrefixes,
        )
        .run(unit)
    }
}

/// Flatten nested rules regardless of browser support.
pub struct Nesting;

impl Stage for Nesting {
    fn name(&self) -> &'static str {
        "nesting"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        Pass::force(self.name(), Features::Nesting).run(unit)
    }
}

pub struct Prefix {
    browsers: Option<Browsers>,
}

impl Prefix {
    pub fn new(browsers: Option<Browsers>) -> Self {
        Self { browsers }
    }
}

impl Stage for Prefix {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        Pass::lower(self.name(), self.browsers, Features::empty()).run(unit)
    }
}

//! Production minification.

use lightningcss::targets::{Browsers, Features};

use crate::log;
use crate::pipeline::lightning::Pass;
use crate::pipeline::{BuildError, Stage, Unit};

pub struct Minify {
    browsers: Option<Browsers>,
}

impl Minify {
    pub fn new(browsers: Option<Browsers>) -> Self {
        Self { browsers }
    }
}

impl Stage for Minify {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn run(&self, unit: &mut Unit) -> Result<(), BuildError> {
        let original = unit.css.len();
        Pass::lower(self.name(), self.browsers, Features::empty())
            .minified()
            .run(unit)?;
        log!("minify"; "{} {} => {}", unit.output_name(), original, unit.css.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_compacts_output() {
        let mut unit = Unit::new("/s/main.scss", "/s/out/main.css");
        unit.css = ".a {\n  color: #ff0000;\n}\n".into();
        Minify::new(None).run(&mut unit).unwrap();
        assert_eq!(unit.css, ".a{color:red}");
    }
}

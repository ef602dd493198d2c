//! Watch task: initial build, file watching, proxy and live reload.

use std::sync::Arc;

use anyhow::Result;

use crate::actor::Session;
use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::log;

pub fn watch(config: Arc<SiteConfig>, mode: BuildMode) -> Result<()> {
    log!("watch"; "{} mode", mode.label());
    Session::new(config, mode).run()
}

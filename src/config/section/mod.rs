//! Configuration section definitions.
//!
//! Each module corresponds to a section in `sheen.toml`:
//!
//! | Module      | TOML Section    | Purpose                                   |
//! |-------------|-----------------|-------------------------------------------|
//! | `styles`    | `[styles]`      | Entry stylesheets, output dir, source map |
//! | `assets`    | `[assets]`      | Asset lookup and cache-busting            |
//! | `targets`   | `[targets]`     | Browser versions for compat transforms    |
//! | `utilities` | `[utilities]`   | External utility-class generator          |
//! | `watch`     | `[watch]`       | Watched glob categories                   |
//! | `serve`     | `[serve]`       | Reverse proxy and live-reload ports       |
//! | `notify`    | `[notify]`      | Desktop error notifications               |

mod assets;
mod notify;
mod serve;
mod styles;
mod targets;
mod utilities;
mod watch;

pub use assets::AssetsConfig;
pub use notify::NotifyConfig;
pub use serve::ServeConfig;
pub use styles::{SourceMapMode, StylesConfig};
pub use targets::TargetsConfig;
pub use utilities::{INPUT_VAR, OUTPUT_VAR, UtilitiesConfig};
pub use watch::WatchConfig;

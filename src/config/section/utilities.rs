//! `[utilities]` section configuration.
//!
//! Utility-class generation runs an external command (the Tailwind CLI by
//! default) on the stylesheet between the nesting and prefix passes.
//!
//! # Example
//!
//! ```toml
//! [utilities]
//! enable = true
//! command = ["npx", "tailwindcss"]
//! # Default arguments, $SHEEN_INPUT / $SHEEN_OUTPUT are temp files:
//! # args = ["-i", "$SHEEN_INPUT", "-o", "$SHEEN_OUTPUT"]
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

const COMMAND: FieldPath = FieldPath::new("utilities.command");
const ARGS: FieldPath = FieldPath::new("utilities.args");

/// Placeholder replaced by the temp input file path.
pub const INPUT_VAR: &str = "$SHEEN_INPUT";
/// Placeholder replaced by the temp output file path.
pub const OUTPUT_VAR: &str = "$SHEEN_OUTPUT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilitiesConfig {
    pub enable: bool,
    /// Program and leading arguments, e.g. `["npx", "tailwindcss"]`.
    pub command: Vec<String>,
    pub args: Vec<String>,
    /// Suppress the generator's own stderr chatter on success.
    pub quiet: bool,
}

impl Default for UtilitiesConfig {
    fn default() -> Self {
        Self {
            enable: false,
            command: vec!["tailwindcss".into()],
            args: vec![
                "-i".into(),
                INPUT_VAR.into(),
                "-o".into(),
                OUTPUT_VAR.into(),
            ],
            quiet: true,
        }
    }
}

impl UtilitiesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enable {
            return;
        }

        let Some(cmd) = self.command.first() else {
            diag.error(COMMAND, "`utilities.enable` is true but the command is empty");
            return;
        };

        let is_package_runner = ["npx", "bunx", "pnpx", "yarn", "dlx"].contains(&cmd.as_str());
        if which::which(cmd).is_err() {
            if is_package_runner {
                if let Some(package) = self.command.get(1) {
                    diag.hint(
                        COMMAND,
                        format!("`{package}` via `{cmd}`, ensure the package is installed"),
                    );
                }
            } else {
                diag.error_with_hint(
                    COMMAND,
                    format!("`{cmd}` not found"),
                    "install the command or update utilities.command",
                );
            }
        }

        for var in [INPUT_VAR, OUTPUT_VAR] {
            if !self.args.iter().any(|a| a.contains(var)) {
                diag.error(ARGS, format!("arguments must reference `{var}`"));
            }
        }
    }
}

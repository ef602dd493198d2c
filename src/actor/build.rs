//! Build Actor
//!
//! Rebuilds every entry for each batch from the FsActor, one batch at a time,
//! and tells the WsActor how browsers should react.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{BuildMsg, WsMsg};
use crate::logger::status_success;
use crate::notify::Reporter;
use crate::pipeline::{BuildReport, Pipeline};
use crate::reload::category::{ChangeBatch, Reaction};
use crate::utils::hash;

pub struct BuildActor {
    rx: mpsc::Receiver<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    pipeline: Arc<Pipeline>,
    reporter: Arc<Reporter>,
}

impl BuildActor {
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        pipeline: Arc<Pipeline>,
        reporter: Arc<Reporter>,
    ) -> Self {
        Self {
            rx,
            ws_tx,
            pipeline,
            reporter,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                BuildMsg::Rebuild(batch) => {
                    self.rebuild(&batch).await;
                }
                BuildMsg::Shutdown => break,
            }
        }
        crate::debug!("build"; "shutting down");
    }

    /// Rebuild for one batch and push the reaction.
    ///
    /// Style pushes carry only written stylesheets built from a changed file.
    /// A content change reloads even when the build failed, the page itself
    /// changed.
    pub(super) async fn rebuild(&self, batch: &ChangeBatch) -> BuildReport {
        let Some(category) = batch.strongest() else {
            return BuildReport::default();
        };
        let changed = batch.describe(self.reporter.root());
        crate::log!("watch"; "{} ({})", changed, category.as_str());

        let report = self.pipeline.build_async(&self.reporter).await;
        if report.is_success() {
            status_success(&format!("rebuilt {}", report.output_names().join(", ")));
        }

        match category.reaction() {
            Reaction::Css => {
                let affected = report
                    .written
                    .iter()
                    .filter(|r| batch.changes.iter().any(|(path, _)| r.is_built_from(path)));
                for result in affected {
                    let msg = WsMsg::Css {
                        target: result.output_name(),
                        version: hash::fingerprint(&result.css),
                    };
                    if self.ws_tx.send(msg).await.is_err() {
                        break;
                    }
                }
            }
            Reaction::Reload => {
                let _ = self.ws_tx.send(WsMsg::Reload { reason: changed }).await;
            }
        }
        report
    }
}

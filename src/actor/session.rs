//! Watch Session - owns everything the watch task runs.
//!
//! Startup order:
//!
//! 1. bind the reverse proxy and the live-reload listener
//! 2. run the initial build (blocking, all entries)
//! 3. arm the watchers and start the actors
//!
//! Ctrl+C unblocks the proxy and shuts the actors down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver};
use tokio::sync::mpsc;

use super::build::BuildActor;
use super::fs::FsActor;
use super::messages::{BuildMsg, WsMsg};
use super::ws::{BrowserNotifier, WsActor};
use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::logger::status_success;
use crate::notify::{ConsoleStyle, Reporter};
use crate::pipeline::Pipeline;
use crate::proxy::ProxyServer;
use crate::reload::category::Classifier;
use crate::reload::server::start_ws_server_with_channel;
use crate::{debug, log};

const CHANNEL_BUFFER: usize = 32;

pub struct Session {
    config: Arc<SiteConfig>,
    mode: BuildMode,
}

impl Session {
    pub fn new(config: Arc<SiteConfig>, mode: BuildMode) -> Self {
        Self { config, mode }
    }

    /// Run until Ctrl+C.
    pub fn run(self) -> Result<()> {
        let config = self.config;
        let (build_tx, build_rx) = mpsc::channel::<BuildMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        // 1. listeners
        let proxy = ProxyServer::bind(&config.serve)?;
        let ws_port = start_ws_server_with_channel(
            config.serve.interface,
            config.serve.ws_port,
            ws_tx.clone(),
        )
        .context("live-reload server failed")?
        .port();
        debug!("reload"; "ws://{}:{}", config.serve.interface, ws_port);

        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
        let http = proxy.server();
        ctrlc::set_handler(move || {
            http.unblock();
            let _ = shutdown_tx.try_send(());
        })
        .context("failed to install Ctrl+C handler")?;

        log!("proxy"; "http://{} -> {}", proxy.addr(), config.serve.proxy);
        let proxy_handle = proxy.spawn(ws_port);

        // 2. initial build
        let pipeline = Arc::new(Pipeline::new(Arc::clone(&config), self.mode));
        let reporter = Arc::new(
            Reporter::standard(&config, ConsoleStyle::Status)
                .with(Arc::new(BrowserNotifier::new(ws_tx.clone()))),
        );
        let report = pipeline.build(&reporter);
        if report.is_success() {
            status_success(&format!("built {}", report.output_names().join(", ")));
        }

        // 3. watchers and actors
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start runtime")?;

        runtime.block_on(async {
            let fs = FsActor::new(&config, build_tx.clone()).context("watcher failed")?;
            for root in Classifier::watch_roots(&config) {
                debug!("watch"; "{}", config.root_relative(&root).display());
            }
            log!("watch"; "watching for changes, Ctrl+C to stop");

            let build = BuildActor::new(build_rx, ws_tx.clone(), pipeline, reporter);
            let ws = WsActor::new(ws_rx);
            run_actors(fs, build, ws, build_tx, ws_tx, shutdown_rx).await;
            anyhow::Ok(())
        })?;

        if proxy_handle.join().is_err() {
            debug!("proxy"; "request loop panicked");
        }
        debug!("actor"; "stopped");
        Ok(())
    }
}

/// Run all actors until the shutdown signal, then stop them in order.
async fn run_actors(
    fs: FsActor,
    build: BuildActor,
    ws: WsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Receiver<()>,
) {
    let fs_handle = tokio::spawn(fs.run());
    let build_handle = tokio::spawn(build.run());
    let ws_handle = tokio::spawn(ws.run());

    let _ = tokio::task::spawn_blocking(move || shutdown_rx.recv()).await;
    debug!("actor"; "shutdown signal received");

    // The build actor finishes its current batch first.
    let _ = build_tx.send(BuildMsg::Shutdown).await;
    let _ = build_handle.await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;
    fs_handle.abort();
}

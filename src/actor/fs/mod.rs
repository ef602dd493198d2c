//! FileSystem Actor
//!
//! Watches the `[watch]` roots and sends one classified batch per quiet
//! period to the BuildActor.
//!
//! ```text
//! Watcher → Debouncer (timing) → classify (categories) → BuildMsg::Rebuild
//! ```

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::config::SiteConfig;
use crate::reload::category::Classifier;

mod classifier;
mod debouncer;
mod types;
mod watch_roots;


use debouncer::Debouncer;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    build_tx: mpsc::Sender<BuildMsg>,
    debouncer: Debouncer,
    classifier: Classifier,
}

impl FsActor {
    /// Arm the watcher on every existing watch root.
    pub fn new(config: &SiteConfig, build_tx: mpsc::Sender<BuildMsg>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(Classifier::watch_roots(config));
        watch_roots.attach_existing(&mut watcher)?;
        crate::debug!("watch"; "{} roots attached", watch_roots.attached_count());

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new(),
            classifier: Classifier::new(config),
        })
    }

    /// Run the actor event loop until the BuildActor goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            build_tx,
            mut debouncer,
            classifier,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify delivers on its own thread; bridge into the runtime.
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                _ = build_tx.closed() => break,
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    if dispatch(&mut debouncer, &classifier, &build_tx).await.is_err() {
                        break;
                    }
                }
            }
        }
        crate::debug!("watch"; "watcher stopped");
    }
}

/// Send the ready batch, if any. `Err` when the BuildActor shut down.
async fn dispatch(
    debouncer: &mut Debouncer,
    classifier: &Classifier,
    build_tx: &mpsc::Sender<BuildMsg>,
) -> Result<(), ()> {
    let Some(raw) = debouncer.take_if_ready() else {
        return Ok(());
    };
    let Some(batch) = classifier::classify(raw, classifier) else {
        return Ok(());
    };
    build_tx
        .send(BuildMsg::Rebuild(batch))
        .await
        .map_err(|_| ())
}

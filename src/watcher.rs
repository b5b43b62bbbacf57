//! Hot reload of the DingTalk section of the configuration file.
//!
//! The watcher monitors the file's parent directory and, whenever the file is
//! created or modified, reloads and validates it before handing the new
//! configuration to the service. A file that fails to load or validate is
//! logged and the previous configuration stays active.

use crate::config::AppConfig;
use crate::notification::{ConfigCandidate, DingtalkService};
use anyhow::{Context, Result};
use notify::{event::EventKind, Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Watches a configuration file and feeds changes into a `DingtalkService`.
pub struct ConfigWatcher;

impl ConfigWatcher {
    /// Starts watching `path`.
    ///
    /// The watch is registered before this returns. `reload_notifier`, if
    /// given, receives a message after every successful reload.
    pub fn spawn(
        path: &Path,
        service: Arc<DingtalkService>,
        reload_notifier: Option<mpsc::Sender<()>>,
    ) -> Result<JoinHandle<()>> {
        let path = path
            .canonicalize()
            .with_context(|| format!("cannot watch config file {:?}", path))?;
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("config file {:?} has no parent directory", path))?
            .to_path_buf();

        let (tx, rx) = mpsc::channel(100);
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let Err(e) = tx.blocking_send(event) {
                        debug!("Config watcher channel closed: {}", e);
                    }
                }
                Err(e) => error!("Config watch error: {}", e),
            },
            Config::default(),
        )?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        info!("Watching for changes to config file: {:?}", path);

        Ok(tokio::spawn(Self::run(
            watcher,
            rx,
            path,
            service,
            reload_notifier,
        )))
    }

    async fn run(
        // Dropping the watcher stops the notifications.
        _watcher: RecommendedWatcher,
        mut rx: mpsc::Receiver<Event>,
        path: PathBuf,
        service: Arc<DingtalkService>,
        reload_notifier: Option<mpsc::Sender<()>>,
    ) {
        while let Some(event) = rx.recv().await {
            if !Self::should_reload(&event, &path) {
                continue;
            }
            info!("Config file change detected, reloading...");

            let config = match AppConfig::load_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to reload config, keeping the current one: {:#}", e);
                    continue;
                }
            };

            match service.update(vec![ConfigCandidate::Dingtalk(config.dingtalk)]) {
                Ok(()) => {
                    info!("Successfully reloaded DingTalk configuration");
                    if let Some(notifier) = &reload_notifier {
                        if notifier.send(()).await.is_err() {
                            warn!("Reload notifier channel closed");
                        }
                    }
                }
                Err(e) => error!("Failed to apply reloaded config: {}", e),
            }
        }
    }

    /// Determines if a file event should trigger a reload.
    fn should_reload(event: &Event, path: &Path) -> bool {
        matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            && event.paths.iter().any(|p| p == path)
    }
}

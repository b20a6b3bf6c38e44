//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors that
//! save through a temporary file and a rename replace the watched inode, and a
//! file-level watch would go silent after the first save.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::PortfolioConfig;

/// Handle for a running watcher. Dropping it stops reloads.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Watch `path` and send every successfully reloaded config on the returned channel.
    ///
    /// Reloads that fail to parse or validate are logged and skipped; the server
    /// keeps running on the last good configuration.
    pub fn spawn(
        path: &Path,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PortfolioConfig>), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        let target = path.to_path_buf();
        let file_name = target.file_name().map(|n| n.to_os_string());

        let reload_path = target.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !touches_config {
                        return;
                    }

                    match load_config(&reload_path) {
                        Ok(config) => {
                            tracing::info!(path = ?reload_path, "Configuration reloaded");
                            let _ = tx.send(config);
                        }
                        Err(e) => tracing::error!(
                            path = ?reload_path,
                            error = %e,
                            "Rejected configuration change, keeping current configuration"
                        ),
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?target, "Config watcher started");
        Ok((
            Self {
                _watcher: watcher,
                path: target,
            },
            rx,
        ))
    }

    /// The file being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

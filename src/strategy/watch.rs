//! Watch run strategy
//!
//! Processes the files already in the input directory, then keeps watching it
//! for new `*.csv` files until shut down.
//!
//! # Architecture
//!
//! ```text
//! notify watcher thread ──(create / rename-in events)──┐
//!                                                       ▼
//! startup scan ──────────────────────────────> worker loop (tokio)
//!                                                       │  one file at a time
//!                                                       ▼
//!                                          spawn_blocking(handle_file)
//! ```
//!
//! The watcher is subscribed before the startup scan so that files created
//! during the scan are not missed. Files delivered twice (by the scan and by an
//! event) are skipped by the processor's processed set.
//!
//! # Shutdown
//!
//! Ctrl-C or cancelling the token from [`WatchStrategy::shutdown_token`] stops
//! the loop once the file currently being processed is done.

use crate::core::{FileProcessor, Outcome};
use crate::strategy::{discover_existing, is_candidate, IngestStrategy, RunSummary};
use crate::types::{IngestError, Result};
use log::{debug, info, warn};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Maximum time to wait for a new file to stop growing
const STABILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for watch mode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchConfig {
    /// Interval between size checks on a newly created file
    pub settle: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(100),
        }
    }
}

impl WatchConfig {
    /// Create a WatchConfig with a custom settle interval in milliseconds
    pub fn new(settle_ms: u64) -> Self {
        if settle_ms == 0 {
            let default = Self::default();
            warn!(
                "Invalid settle interval ({}ms), using default ({}ms)",
                settle_ms,
                default.settle.as_millis()
            );
            return default;
        }

        Self {
            settle: Duration::from_millis(settle_ms),
        }
    }
}

/// Messages from the notify callback to the worker loop
#[derive(Debug)]
enum WatchEvent {
    Created(String),
    Failed(String),
}

/// Scan, then watch the input directory until shut down
#[derive(Debug, Clone)]
pub struct WatchStrategy {
    config: WatchConfig,
    shutdown: CancellationToken,
}

impl WatchStrategy {
    pub fn new(config: WatchConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the watch loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    async fn watch(&self, processor: FileProcessor) -> Result<RunSummary> {
        let input_dir = processor.directories().input.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for filename in created_candidates(&event) {
                        let _ = tx.send(WatchEvent::Created(filename));
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Failed(e.to_string()));
                }
            }
        })?;
        watcher.watch(&input_dir, RecursiveMode::NonRecursive)?;
        info!("Watching for CSV files in {}", input_dir.display());

        let mut summary = RunSummary::default();

        for filename in discover_existing(&input_dir)? {
            if self.shutdown.is_cancelled() {
                return Ok(summary);
            }
            let result = process_blocking(&processor, filename.clone()).await;
            summary.record(&filename, result);
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutting down watcher");
                    break;
                }
                event = rx.recv() => match event {
                    Some(WatchEvent::Created(filename)) => {
                        if processor.processed().contains(&filename) {
                            summary.record(&filename, Ok(Outcome::Skipped));
                            continue;
                        }
                        wait_for_stable(&input_dir.join(&filename), self.config.settle).await;
                        let result = process_blocking(&processor, filename.clone()).await;
                        summary.record(&filename, result);
                    }
                    Some(WatchEvent::Failed(message)) => return Err(IngestError::watcher(message)),
                    None => return Err(IngestError::watcher("event channel closed")),
                },
            }
        }

        Ok(summary)
    }
}

impl IngestStrategy for WatchStrategy {
    fn run(&self, processor: &FileProcessor) -> Result<RunSummary> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| IngestError::watcher(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received Ctrl-C");
                    shutdown.cancel();
                }
            });

            self.watch(processor.clone()).await
        })
    }
}

/// Filenames of candidate files that appeared in the watched directory
fn created_candidates(event: &Event) -> Vec<String> {
    let appeared = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    );
    if !appeared {
        return Vec::new();
    }

    event
        .paths
        .iter()
        .filter_map(|path| path.file_name()?.to_str())
        .filter(|name| is_candidate(name))
        .map(str::to_string)
        .collect()
}

async fn process_blocking(processor: &FileProcessor, filename: String) -> Result<Outcome> {
    let processor = processor.clone();
    tokio::task::spawn_blocking(move || processor.handle_file(&filename))
        .await
        .map_err(|e| IngestError::watcher(format!("File processing task failed: {}", e)))?
}

/// Wait until a file's size is unchanged between two checks
///
/// Returns early if the file disappears; the processor reports that case.
async fn wait_for_stable(path: &Path, settle: Duration) {
    let started = Instant::now();
    let mut last_size = None;

    loop {
        let size = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.len(),
            Err(_) => return,
        };
        if last_size == Some(size) {
            debug!("{} settled at {} bytes", path.display(), size);
            return;
        }
        if started.elapsed() > STABILITY_TIMEOUT {
            warn!("{} is still changing, processing anyway", path.display());
            return;
        }
        last_size = Some(size);
        tokio::time::sleep(settle).await;
    }
}

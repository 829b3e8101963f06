//! Batch Service - orchestration for API consumers
//!
//! Owns the runner, serializes batch runs and keeps the latest completed
//! result as a shared read-only snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::engine::AttributeSchema;
use crate::utils::image::ImageLocator;

use super::runner::{BatchRunner, CancellationFlag, RunOptions};
use super::types::{BatchProgress, BatchResult};

/// Batch classification service
pub struct BatchService {
    runner: BatchRunner,
    locators: Vec<ImageLocator>,
    latest: RwLock<Option<Arc<BatchResult>>>,
    // held for the duration of a run
    run_lock: Mutex<()>,
    // Some while a run is in progress
    active: RwLock<Option<CancellationFlag>>,
    progress: watch::Sender<BatchProgress>,
}

impl BatchService {
    /// Create a service processing `locators` on every run
    pub fn new(runner: BatchRunner, locators: Vec<ImageLocator>) -> Self {
        let (progress, _) = watch::channel(BatchProgress::default());
        Self {
            runner,
            locators,
            latest: RwLock::new(None),
            run_lock: Mutex::new(()),
            active: RwLock::new(None),
            progress,
        }
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        self.runner.classifier().schema()
    }

    pub fn image_count(&self) -> usize {
        self.locators.len()
    }

    /// Run a full batch. Concurrent callers wait for the running batch first.
    pub async fn run_batch(&self) -> Arc<BatchResult> {
        let _guard = self.run_lock.lock().await;

        let cancel = CancellationFlag::new();
        *self.active.write() = Some(cancel.clone());
        // cleared on completion, or if this future is dropped mid-run
        let _active = ActiveRun(&self.active);

        let options = RunOptions {
            cancel,
            progress: Some(self.progress.clone()),
        };
        let result = Arc::new(self.runner.run(&self.locators, options).await);

        // the previous snapshot is discarded, never merged
        *self.latest.write() = Some(result.clone());
        result
    }

    /// Request cancellation of the running batch; takes effect between images.
    /// Returns whether a batch was running.
    pub fn cancel(&self) -> bool {
        match self.active.read().as_ref() {
            Some(flag) => {
                info!("Cancellation requested");
                flag.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.read().is_some()
    }

    pub fn latest(&self) -> Option<Arc<BatchResult>> {
        self.latest.read().clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<BatchProgress> {
        self.progress.subscribe()
    }

    /// Last published progress snapshot
    pub fn progress(&self) -> BatchProgress {
        self.progress.borrow().clone()
    }
}

struct ActiveRun<'a>(&'a RwLock<Option<CancellationFlag>>);

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        *self.0.write() = None;
    }
}

//! Batch Runner
//!
//! Classifies a fixed sequence of images strictly one after another and
//! accumulates dominance statistics as each image completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use image::DynamicImage;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{resolve_dominant, AttributeClassifier, AttributeObservation, ImageSource};
use crate::error::PipelineError;
use crate::utils::image::ImageLocator;

use super::statistics::StatisticsAccumulator;
use super::types::{BatchProgress, BatchResult, ClassificationOutcome};

/// Default per-image time budget
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Cooperative cancellation, checked between images
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-run options
#[derive(Debug, Default)]
pub struct RunOptions {
    pub cancel: CancellationFlag,
    pub progress: Option<watch::Sender<BatchProgress>>,
}

/// Sequential batch runner
#[derive(Clone)]
pub struct BatchRunner {
    classifier: AttributeClassifier,
    source: Arc<dyn ImageSource>,
    image_timeout: Duration,
}

impl BatchRunner {
    pub fn new(classifier: AttributeClassifier, source: Arc<dyn ImageSource>) -> Self {
        Self {
            classifier,
            source,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, image_timeout: Duration) -> Self {
        self.image_timeout = image_timeout;
        self
    }

    pub fn classifier(&self) -> &AttributeClassifier {
        &self.classifier
    }

    /// Run the batch in locator order.
    ///
    /// Every requested image gets an outcome unless the run is cancelled, in
    /// which case the images processed so far are returned with their statistics.
    pub async fn run(&self, locators: &[ImageLocator], options: RunOptions) -> BatchResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = locators.len();
        let schema = self.classifier.schema().clone();

        info!("Starting batch {} with {} images", run_id, total);

        let mut outcomes = Vec::with_capacity(total);
        let mut statistics = StatisticsAccumulator::new();
        let mut cancelled = false;

        for (position, locator) in locators.iter().enumerate() {
            if options.cancel.is_cancelled() {
                info!("Batch {} cancelled before image {}/{}", run_id, position + 1, total);
                cancelled = true;
                break;
            }

            if let Some(progress) = &options.progress {
                progress.send_replace(BatchProgress {
                    current: position + 1,
                    total,
                    locator: locator.file_name.clone(),
                });
            }
            info!("Processing image {}/{}: {}", position + 1, total, locator);

            let outcome = match self.classify_with_timeout(locator).await {
                Ok(observations) => {
                    let selection = resolve_dominant(&observations, &schema);
                    debug!(
                        "Dominant for {}: {:?}",
                        locator,
                        selection.iter().map(|o| o.display_key()).collect::<Vec<_>>()
                    );
                    statistics.record(locator.id, &selection);
                    ClassificationOutcome::succeeded(locator, observations)
                }
                Err(e) => {
                    warn!("Image {} failed: {}", locator, e);
                    ClassificationOutcome::failed(locator, &e)
                }
            };
            outcomes.push(outcome);
        }

        let processed = outcomes.len();
        let result = BatchResult {
            run_id,
            started_at,
            finished_at: Utc::now(),
            total_requested: total,
            cancelled,
            outcomes,
            statistics: statistics.finalize(processed),
        };

        info!(
            "Batch {} finished: {} succeeded, {} failed, {} keys in {}ms",
            run_id,
            result.succeeded_count(),
            result.failed_count(),
            result.statistics.len(),
            (result.finished_at - result.started_at).num_milliseconds()
        );

        result
    }

    /// Classify one image under the per-image timeout.
    ///
    /// Decode and inference share one deadline. An inference call that
    /// overruns it is still awaited before returning, so no two images are
    /// ever inferred at once; its result is discarded.
    pub async fn classify_with_timeout(
        &self,
        locator: &ImageLocator,
    ) -> Result<Vec<AttributeObservation>, PipelineError> {
        let deadline = Instant::now() + self.image_timeout;

        let image = match tokio::time::timeout_at(deadline, self.source.load(locator)).await {
            Ok(loaded) => loaded?,
            Err(_) => return Err(self.timeout_error(locator)),
        };

        let mut handle = self.spawn_inference(image);
        match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(joined) => Self::join_result(joined),
            Err(_) => {
                warn!(
                    "Image {} exceeded {:?}, waiting for inference to finish",
                    locator, self.image_timeout
                );
                let _ = handle.await;
                Err(self.timeout_error(locator))
            }
        }
    }

    /// Decode then classify one image, without a time bound
    pub async fn classify(&self, locator: &ImageLocator) -> Result<Vec<AttributeObservation>, PipelineError> {
        let image = self.source.load(locator).await?;
        Self::join_result(self.spawn_inference(image).await)
    }

    fn spawn_inference(&self, image: DynamicImage) -> JoinHandle<Result<Vec<AttributeObservation>, PipelineError>> {
        let classifier = self.classifier.clone();
        tokio::task::spawn_blocking(move || classifier.classify(&image))
    }

    fn join_result(
        joined: Result<Result<Vec<AttributeObservation>, PipelineError>, JoinError>,
    ) -> Result<Vec<AttributeObservation>, PipelineError> {
        joined.map_err(|e| PipelineError::Inference(format!("inference task failed: {}", e)))?
    }

    fn timeout_error(&self, locator: &ImageLocator) -> PipelineError {
        PipelineError::Timeout {
            locator: locator.file_name.clone(),
            timeout_ms: self.image_timeout.as_millis() as u64,
        }
    }
}

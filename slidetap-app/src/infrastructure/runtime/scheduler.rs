// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The two-lane scheduler (spec §5: "a default lane and a high-priority
//! lane; high-priority jobs are drained first, never starving the default
//! lane outright since each lane has its own dedicated workers"). Each lane
//! is a bounded `mpsc` channel drained by a fixed pool of worker tasks, in
//! the spirit of the teacher's `GlobalResourceManager` two-level
//! governance, but expressed as queues-plus-workers rather than global
//! semaphores since each image's steps already run sequentially within one
//! worker task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex as SyncMutex};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::Instrument;

use slidetap_domain::error::CoreResult;
use slidetap_domain::pipeline::{CancellationToken, PipelineStep, QueuePriority, StepContext, StepOutcome};
use slidetap_domain::value_objects::BatchUid;

use crate::infrastructure::logging::image_span;
use crate::infrastructure::metrics::MetricsService;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler queue is closed")]
    QueueClosed,
}

/// One image's run through an ordered sequence of steps, plus a channel the
/// caller can await the outcome on. `Ok(None)` on the completion channel
/// means the job was cancelled at a step boundary before finishing (spec
/// §4.G: "records nothing"), distinct from `Err` (a step raised).
pub struct PipelineJob {
    pub context: StepContext,
    pub steps: Vec<Arc<dyn PipelineStep>>,
    pub completion: oneshot::Sender<CoreResult<Option<StepOutcome>>>,
}

struct Lane {
    tx: mpsc::Sender<PipelineJob>,
    depth: Arc<AtomicI64>,
}

/// Two priority lanes, each a bounded channel drained by a fixed worker
/// pool, plus a registry of per-batch cancellation tokens (spec §5
/// "Cancellation/timeout", §4.G "batch deletion cancels in-flight image
/// tasks at the next step boundary").
pub struct Scheduler {
    default_lane: Lane,
    high_lane: Lane,
    metrics: Arc<MetricsService>,
    batch_tokens: SyncMutex<HashMap<BatchUid, CancellationToken>>,
}

impl Scheduler {
    pub fn new(default_workers: usize, high_priority_workers: usize, metrics: Arc<MetricsService>) -> Self {
        let default_lane = spawn_lane("default", default_workers, metrics.clone());
        let high_lane = spawn_lane("high", high_priority_workers, metrics.clone());
        Self {
            default_lane,
            high_lane,
            metrics,
            batch_tokens: SyncMutex::new(HashMap::new()),
        }
    }

    /// Returns the cancellation token for `batch_uid`, creating one if this
    /// is the first job scheduled for that batch.
    pub fn token_for_batch(&self, batch_uid: &BatchUid) -> CancellationToken {
        let mut tokens = self.batch_tokens.lock().expect("batch token registry poisoned");
        tokens.entry(batch_uid.clone()).or_insert_with(CancellationToken::new).clone()
    }

    /// Cancels every in-flight (and not-yet-started) task for `batch_uid`.
    /// Jobs already enqueued observe the token at their next step boundary;
    /// the entry is removed so a later re-use of the same batch uid (after
    /// recreation) starts with a fresh, uncancelled token.
    pub fn cancel_batch(&self, batch_uid: &BatchUid) {
        let mut tokens = self.batch_tokens.lock().expect("batch token registry poisoned");
        if let Some(token) = tokens.remove(batch_uid) {
            token.cancel();
        }
    }

    /// Submits a job to the requested lane. Backpressures the caller if the
    /// lane's channel is full rather than growing it unboundedly.
    pub async fn enqueue(&self, job: PipelineJob, priority: QueuePriority) -> Result<(), SchedulerError> {
        let lane = match priority {
            QueuePriority::Default => &self.default_lane,
            QueuePriority::High => &self.high_lane,
        };
        lane.depth.fetch_add(1, Ordering::SeqCst);
        self.metrics.set_queue_depth(self.default_lane.depth.load(Ordering::SeqCst) + self.high_lane.depth.load(Ordering::SeqCst));
        lane.tx.send(job).await.map_err(|_| SchedulerError::QueueClosed)
    }
}

fn spawn_lane(name: &'static str, workers: usize, metrics: Arc<MetricsService>) -> Lane {
    let (tx, rx) = mpsc::channel::<PipelineJob>(1024);
    let rx = Arc::new(Mutex::new(rx));
    let depth = Arc::new(AtomicI64::new(0));
    for worker_id in 0..workers.max(1) {
        let rx = rx.clone();
        let metrics = metrics.clone();
        let depth = depth.clone();
        tokio::spawn(async move {
            loop {
                let job = {
                    let mut guard = rx.lock().await;
                    guard.recv().await
                };
                let Some(job) = job else {
                    break;
                };
                depth.fetch_sub(1, Ordering::SeqCst);
                tracing::debug!(lane = name, worker_id, "picked up job");
                run_job(job, &metrics).await;
            }
        });
    }
    Lane { tx, depth }
}

/// Drains one job: a cancelled token short-circuits before any step runs,
/// otherwise delegates to [`run_steps`] and records the outcome in metrics.
async fn run_job(job: PipelineJob, metrics: &Arc<MetricsService>) {
    let PipelineJob {
        mut context,
        steps,
        completion,
    } = job;
    if context.cancellation.is_cancelled() {
        let _ = completion.send(Ok(None));
        return;
    }
    let span = image_span(context.project.uid.as_uuid(), context.image.common.uid.as_uuid());
    let outcome = run_steps(&mut context, &steps, metrics).instrument(span).await;
    match &outcome {
        Ok(Some(_)) => metrics.record_image_succeeded(),
        Ok(None) => {}
        Err(_) => metrics.record_image_failed(),
    }
    let _ = completion.send(outcome);
}

/// Runs every step in declared order against one image, under a
/// cleanup-on-failure barrier (spec §4.G): the failing step's `cleanup` is
/// invoked before the error propagates, and steps that already committed
/// stay committed - there is no multi-step rollback, only resource release.
/// Checked at each step boundary (spec §5): a cancelled token makes this
/// return `Ok(None)` without running the remaining steps, releasing the
/// about-to-run step's scratch resources the same way a failure would.
async fn run_steps(
    context: &mut StepContext,
    steps: &[Arc<dyn PipelineStep>],
    metrics: &Arc<MetricsService>,
) -> CoreResult<Option<StepOutcome>> {
    let mut outcome = StepOutcome {
        new_path: context.path.clone(),
        image: context.image.clone(),
    };
    for step in steps {
        if context.cancellation.is_cancelled() {
            step.cleanup(context).await;
            return Ok(None);
        }
        let started = std::time::Instant::now();
        match step.run(context.clone()).await {
            Ok(step_outcome) => {
                metrics.record_step_duration(started.elapsed());
                context.path = step_outcome.new_path.clone();
                context.image = step_outcome.image.clone();
                outcome = step_outcome;
            }
            Err(err) => {
                metrics.record_step_failure(step.name());
                step.cleanup(context).await;
                return Err(err);
            }
        }
    }
    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use slidetap_domain::entities::Project;
    use slidetap_domain::item::{Image, ItemCommon};
    use slidetap_domain::schema::{DatasetSchema, ProjectSchema, RootSchema, SchemaRegistry};
    use slidetap_domain::value_objects::{BatchUid, DatasetUid, ItemSchemaUid, ItemUid, RootSchemaUid};
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;

    fn empty_registry() -> SchemaRegistry {
        SchemaRegistry::new(RootSchema {
            uid: RootSchemaUid::new(),
            project_schema: ProjectSchema {
                uid: RootSchemaUid::new(),
                attributes: BTreeMap::new(),
            },
            dataset_schema: DatasetSchema {
                uid: RootSchemaUid::new(),
                attributes: BTreeMap::new(),
            },
            samples: BTreeMap::new(),
            images: BTreeMap::new(),
            annotations: BTreeMap::new(),
            observations: BTreeMap::new(),
            sample_relations: Vec::new(),
            sample_image_relations: Vec::new(),
        })
    }

    struct CountingStep {
        name: &'static str,
        fail: bool,
        cleanups: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PipelineStep for CountingStep {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, ctx: StepContext) -> CoreResult<StepOutcome> {
            if self.fail {
                return Err(slidetap_domain::error::CoreError::processing_failure("boom"));
            }
            Ok(StepOutcome {
                new_path: ctx.path.clone(),
                image: ctx.image.clone(),
            })
        }

        async fn cleanup(&self, _ctx: &StepContext) {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn context() -> StepContext {
        StepContext {
            registry: Arc::new(empty_registry()),
            project: Project::new(
                "demo",
                RootSchemaUid::new(),
                RootSchemaUid::new(),
                DatasetUid::new(),
                BatchUid::new(),
                chrono::Utc::now(),
            ),
            image: Image::new(ItemCommon {
                uid: ItemUid::new(),
                identifier: "slide-1".to_string(),
                name: "slide-1".to_string(),
                pseudonym: None,
                selected: true,
                valid_attributes: None,
                valid_relations: None,
                locked: false,
                schema_uid: ItemSchemaUid::new(),
                dataset_uid: DatasetUid::new(),
                batch_uid: BatchUid::new(),
                attributes: BTreeMap::new(),
                private_attributes: BTreeMap::new(),
            }),
            path: std::path::PathBuf::from("/tmp/slide-1"),
            cancellation: slidetap_domain::pipeline::CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn enqueued_job_completes_through_all_steps() {
        let metrics = Arc::new(MetricsService::new().unwrap());
        let scheduler = Scheduler::new(1, 1, metrics);
        let cleanups = Arc::new(AtomicUsize::new(0));
        let steps: Vec<Arc<dyn PipelineStep>> = vec![Arc::new(CountingStep {
            name: "a",
            fail: false,
            cleanups: cleanups.clone(),
        })];
        let (tx, rx) = oneshot::channel();
        scheduler
            .enqueue(
                PipelineJob {
                    context: context(),
                    steps,
                    completion: tx,
                },
                QueuePriority::Default,
            )
            .await
            .unwrap();
        let outcome = rx.await.unwrap();
        assert!(matches!(outcome, Ok(Some(_))));
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_step_triggers_cleanup_and_propagates_the_error() {
        let metrics = Arc::new(MetricsService::new().unwrap());
        let scheduler = Scheduler::new(1, 1, metrics);
        let cleanups = Arc::new(AtomicUsize::new(0));
        let steps: Vec<Arc<dyn PipelineStep>> = vec![Arc::new(CountingStep {
            name: "a",
            fail: true,
            cleanups: cleanups.clone(),
        })];
        let (tx, rx) = oneshot::channel();
        scheduler
            .enqueue(
                PipelineJob {
                    context: context(),
                    steps,
                    completion: tx,
                },
                QueuePriority::High,
            )
            .await
            .unwrap();
        let outcome = rx.await.unwrap();
        assert!(outcome.is_err());
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_batch_token_short_circuits_a_queued_job_and_records_nothing() {
        let metrics = Arc::new(MetricsService::new().unwrap());
        let scheduler = Scheduler::new(1, 1, metrics);
        let cleanups = Arc::new(AtomicUsize::new(0));
        let steps: Vec<Arc<dyn PipelineStep>> = vec![Arc::new(CountingStep {
            name: "a",
            fail: false,
            cleanups: cleanups.clone(),
        })];
        let batch_uid = BatchUid::new();
        let token = scheduler.token_for_batch(&batch_uid);
        scheduler.cancel_batch(&batch_uid);
        assert!(token.is_cancelled());

        let mut ctx = context();
        ctx.cancellation = token;
        let (tx, rx) = oneshot::channel();
        scheduler
            .enqueue(
                PipelineJob {
                    context: ctx,
                    steps,
                    completion: tx,
                },
                QueuePriority::Default,
            )
            .await
            .unwrap();
        let outcome = rx.await.unwrap();
        assert!(matches!(outcome, Ok(None)));
    }
}

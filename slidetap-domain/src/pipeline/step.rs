// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The per-step contract (spec §4.G): each step receives
//! `(schema, storage, project, image, path)` and returns `(new_path,
//! updated_image)` or raises. Steps are ordered and composable; the
//! scheduler (`slidetap-app`) is the one that sequences them and commits
//! under a rollback barrier.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::Project;
use crate::error::CoreResult;
use crate::item::Image;
use crate::schema::SchemaRegistry;

use super::cancellation::CancellationToken;

/// Everything a step needs to do its work. Owned (not borrowed) so it can
/// cross an `.await` and be handed to a boxed trait object without
/// fighting lifetimes.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub registry: Arc<SchemaRegistry>,
    pub project: Project,
    pub image: Image,
    pub path: PathBuf,
    /// Checked at each step boundary (spec §5, §4.G) - set by the
    /// scheduler from the image's batch so a batch deletion can stop the
    /// remaining steps of every in-flight image in that batch.
    pub cancellation: CancellationToken,
}

/// What a step produces on success: the image's new on-disk location and
/// the image record with whatever fields the step updated (`files`,
/// `format`, `thumbnail_path`, ...).
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub new_path: PathBuf,
    pub image: Image,
}

/// One stage of the per-image pipeline (Dicomize, Thumbnail, Store,
/// Finish, or a project-specific extension).
#[async_trait]
pub trait PipelineStep: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: StepContext) -> CoreResult<StepOutcome>;

    /// Releases any scratch resources the step holds. Infallible - per
    /// spec §4.G, cleanup runs even after a failed step and must not
    /// itself raise.
    async fn cleanup(&self, ctx: &StepContext);
}

/// An ordered sequence of steps, run in declared order for one image
/// (spec §5: "within one image, steps execute sequentially in declared
/// order").
pub struct StepPipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
}

impl StepPipeline {
    pub fn new(steps: Vec<Arc<dyn PipelineStep>>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Arc<dyn PipelineStep>] {
        &self.steps
    }
}

// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Batch state machine (spec §4.F). [`apply`] is the sole authorized
//! mutator of [`BatchStatus`] - every other module that needs a batch to
//! move to a new status must go through here, and a disallowed transition
//! returns [`CoreError::NotAllowedAction`] rather than silently no-op'ing.

use crate::entities::Batch;
use crate::error::{CoreError, CoreResult};
use crate::value_objects::{BatchStatus, ProcessingPhase};

/// Events that drive the batch state machine. Named after the user
/// actions / pipeline outcomes in spec §4.F's transition table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BatchEvent {
    StartSearch,
    SearchComplete,
    Reset,
    Fail,
    StartPreProcessing,
    /// Internal: raised by [`try_aggregate`] once no selected image remains
    /// non-terminal in the pre-processing phase.
    AllImagesPreOk,
    StartPostProcessing,
    /// Internal: post-processing counterpart of [`BatchEvent::AllImagesPreOk`].
    AllImagesPostOk,
    Complete,
    Delete,
    /// Forced recovery from `IMAGE_POST_PROCESSING` back to
    /// `IMAGE_PRE_PROCESSING_COMPLETE` (restart). Legal only from that
    /// source state - spec §4.F's "forced transition argument".
    RestartToPreProcessed,
}

/// Applies `event` to `batch`, mutating its status on success. The sole
/// authorized mutator of [`BatchStatus`] (invariant vi, spec §3).
pub fn apply(batch: &mut Batch, event: BatchEvent) -> CoreResult<()> {
    use BatchStatus::*;
    let next = match (batch.status, event) {
        (_, BatchEvent::Delete) => Deleted,
        (_, BatchEvent::Fail) => Failed,
        (Initialized, BatchEvent::StartSearch) => MetadataSearching,
        (MetadataSearching, BatchEvent::SearchComplete) => MetadataSearchComplete,
        (MetadataSearchComplete, BatchEvent::Reset) => Initialized,
        (MetadataSearchComplete, BatchEvent::StartPreProcessing) => ImagePreProcessing,
        (ImagePreProcessing, BatchEvent::AllImagesPreOk) => ImagePreProcessingComplete,
        (ImagePreProcessingComplete, BatchEvent::StartPostProcessing) => ImagePostProcessing,
        (ImagePostProcessing, BatchEvent::AllImagesPostOk) => ImagePostProcessingComplete,
        (ImagePostProcessingComplete, BatchEvent::Complete) => Completed,
        (ImagePostProcessing, BatchEvent::RestartToPreProcessed) => ImagePreProcessingComplete,
        (from, event) => {
            return Err(CoreError::not_allowed(format!(
                "batch {}: cannot apply {event:?} from {from:?}",
                batch.uid
            )))
        }
    };
    batch.status = next;
    Ok(())
}

/// Aggregation rule (spec §4.F, §5): advances `batch` to the matching
/// `*_COMPLETE` status iff it is currently in the processing status for
/// `phase` and `any_selected_non_terminal` is false. Returns whether the
/// transition happened.
///
/// Callers must hold exclusive access to `batch` for the duration of this
/// call (e.g. a per-batch row lock) - this function implements the
/// compare-and-set logic itself but cannot provide the mutual exclusion
/// the concurrency model requires; see spec §5's "conditional update"
/// description. Given that contract, N concurrent callers racing this
/// function serialize at the lock and at most one observes
/// `any_selected_non_terminal == false` while `batch.status` still equals
/// the expected processing state, so the transition fires exactly once
/// (testable property 6).
pub fn try_aggregate(batch: &mut Batch, phase: ProcessingPhase, any_selected_non_terminal: bool) -> bool {
    if any_selected_non_terminal {
        return false;
    }
    let event = match phase {
        ProcessingPhase::Pre => BatchEvent::AllImagesPreOk,
        ProcessingPhase::Post => BatchEvent::AllImagesPostOk,
    };
    apply(batch, event).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{BatchUid, ProjectUid};
    use chrono::Utc;

    fn batch_in(status: BatchStatus) -> Batch {
        let mut batch = Batch::new("b1", ProjectUid::new(), Utc::now(), false);
        batch.status = status;
        batch.uid = BatchUid::new();
        batch
    }

    #[test]
    fn happy_path_reaches_completed() {
        let mut batch = batch_in(BatchStatus::Initialized);
        apply(&mut batch, BatchEvent::StartSearch).unwrap();
        apply(&mut batch, BatchEvent::SearchComplete).unwrap();
        apply(&mut batch, BatchEvent::StartPreProcessing).unwrap();
        apply(&mut batch, BatchEvent::AllImagesPreOk).unwrap();
        apply(&mut batch, BatchEvent::StartPostProcessing).unwrap();
        apply(&mut batch, BatchEvent::AllImagesPostOk).unwrap();
        apply(&mut batch, BatchEvent::Complete).unwrap();
        assert_eq!(batch.status, BatchStatus::Completed);
    }

    #[test]
    fn disallowed_transition_is_rejected() {
        let mut batch = batch_in(BatchStatus::Initialized);
        let err = apply(&mut batch, BatchEvent::StartPreProcessing).unwrap_err();
        assert!(matches!(err, CoreError::NotAllowedAction(_)));
        assert_eq!(batch.status, BatchStatus::Initialized);
    }

    #[test]
    fn restart_is_legal_only_from_post_processing() {
        let mut from_post = batch_in(BatchStatus::ImagePostProcessing);
        apply(&mut from_post, BatchEvent::RestartToPreProcessed).unwrap();
        assert_eq!(from_post.status, BatchStatus::ImagePreProcessingComplete);

        let mut from_other = batch_in(BatchStatus::ImagePreProcessing);
        assert!(apply(&mut from_other, BatchEvent::RestartToPreProcessed).is_err());
    }

    #[test]
    fn aggregation_only_fires_when_nothing_remains_in_flight() {
        let mut batch = batch_in(BatchStatus::ImagePreProcessing);
        assert!(!try_aggregate(&mut batch, ProcessingPhase::Pre, true));
        assert_eq!(batch.status, BatchStatus::ImagePreProcessing);
        assert!(try_aggregate(&mut batch, ProcessingPhase::Pre, false));
        assert_eq!(batch.status, BatchStatus::ImagePreProcessingComplete);
    }

    #[test]
    fn aggregation_is_a_noop_from_a_non_processing_state() {
        let mut batch = batch_in(BatchStatus::Completed);
        assert!(!try_aggregate(&mut batch, ProcessingPhase::Pre, false));
        assert_eq!(batch.status, BatchStatus::Completed);
    }

    #[test]
    fn any_status_can_fail_or_be_deleted() {
        let mut batch = batch_in(BatchStatus::MetadataSearching);
        apply(&mut batch, BatchEvent::Fail).unwrap();
        assert_eq!(batch.status, BatchStatus::Failed);

        let mut batch = batch_in(BatchStatus::ImagePostProcessingComplete);
        apply(&mut batch, BatchEvent::Delete).unwrap();
        assert_eq!(batch.status, BatchStatus::Deleted);
    }
}

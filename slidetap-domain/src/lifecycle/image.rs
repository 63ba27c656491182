// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Per-image status transitions (spec §4.F/§4.G) and retry semantics
//! (testable property 9).

use crate::error::{CoreError, CoreResult};
use crate::item::Image;
use crate::value_objects::{ImageStatus, ProcessingPhase};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ImageEvent {
    StartDownload,
    DownloadComplete,
    DownloadFailed,
    StartPreProcessing,
    PreProcessingComplete,
    PreProcessingFailed,
    StartPostProcessing,
    PostProcessingComplete,
    PostProcessingFailed,
}

/// The sole authorized mutator of [`Image::status`].
pub fn apply(image: &mut Image, event: ImageEvent) -> CoreResult<()> {
    use ImageStatus::*;
    let next = match (image.status, event) {
        (NotStarted, ImageEvent::StartDownload) => Downloading,
        (Downloading, ImageEvent::DownloadComplete) => Downloaded,
        (Downloading, ImageEvent::DownloadFailed) => DownloadingFailed,
        (Downloaded, ImageEvent::StartPreProcessing) => PreProcessing,
        (PreProcessing, ImageEvent::PreProcessingComplete) => PreProcessed,
        (PreProcessing, ImageEvent::PreProcessingFailed) => PreProcessingFailed,
        (PreProcessed, ImageEvent::StartPostProcessing) => PostProcessing,
        (PostProcessing, ImageEvent::PostProcessingComplete) => PostProcessed,
        (PostProcessing, ImageEvent::PostProcessingFailed) => PostProcessingFailed,
        (from, event) => {
            return Err(CoreError::not_allowed(format!(
                "image {}: cannot apply {event:?} from {from:?}",
                image.common.uid
            )))
        }
    };
    image.status = next;
    Ok(())
}

/// True when the image is already at the terminal success status for
/// `phase` - the per-image execution contract's `skip_image` check (spec
/// §4.G step 2).
pub fn skip_image(status: ImageStatus, phase: ProcessingPhase) -> bool {
    match phase {
        ProcessingPhase::Pre => status == ImageStatus::PreProcessed,
        ProcessingPhase::Post => status == ImageStatus::PostProcessed,
    }
}

/// User-initiated retry (spec §4.F "Retry semantics"): permitted only from
/// a `*_FAILED` status. Resets to the pre-state of the failed phase and
/// clears `status_message`.
pub fn retry(image: &mut Image) -> CoreResult<()> {
    let Some(target) = image.status.retry_reset_target() else {
        return Err(CoreError::not_allowed(format!(
            "image {}: retry is only allowed from a *_FAILED status, got {:?}",
            image.common.uid, image.status
        )));
    };
    image.status = target;
    image.status_message.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCommon;
    use crate::value_objects::{BatchUid, DatasetUid, ItemSchemaUid, ItemUid};
    use std::collections::{BTreeMap, BTreeSet};

    fn image_with(status: ImageStatus) -> Image {
        let common = ItemCommon {
            uid: ItemUid::new(),
            identifier: "img-1".into(),
            name: "img-1".into(),
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
        };
        let mut image = Image::new(common);
        image.status = status;
        image.samples = BTreeSet::new();
        image
    }

    #[test]
    fn retry_resets_to_pre_failure_state_and_clears_message() {
        // Scenario S5 / testable property 9.
        let mut image = image_with(ImageStatus::PreProcessingFailed);
        image.status_message = "Failed at step Dicomize due to bad file".into();
        retry(&mut image).unwrap();
        assert_eq!(image.status, ImageStatus::Downloaded);
        assert_eq!(image.status_message, "");
    }

    #[test]
    fn retry_rejects_non_failed_status() {
        let mut image = image_with(ImageStatus::PreProcessing);
        let err = retry(&mut image).unwrap_err();
        assert!(matches!(err, CoreError::NotAllowedAction(_)));
    }

    #[test]
    fn skip_image_true_only_at_phase_destination() {
        assert!(skip_image(ImageStatus::PreProcessed, ProcessingPhase::Pre));
        assert!(!skip_image(ImageStatus::Downloaded, ProcessingPhase::Pre));
        assert!(skip_image(ImageStatus::PostProcessed, ProcessingPhase::Post));
    }

    #[test]
    fn full_pre_and_post_processing_path() {
        let mut image = image_with(ImageStatus::NotStarted);
        apply(&mut image, ImageEvent::StartDownload).unwrap();
        apply(&mut image, ImageEvent::DownloadComplete).unwrap();
        apply(&mut image, ImageEvent::StartPreProcessing).unwrap();
        apply(&mut image, ImageEvent::PreProcessingComplete).unwrap();
        apply(&mut image, ImageEvent::StartPostProcessing).unwrap();
        apply(&mut image, ImageEvent::PostProcessingComplete).unwrap();
        assert_eq!(image.status, ImageStatus::PostProcessed);
    }
}

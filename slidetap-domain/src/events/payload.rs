// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use crate::value_objects::{BatchStatus, BatchUid, ImageStatus, ItemUid, ProjectStatus, ProjectUid};

/// Significant occurrences raised by components D (Item Store) and F
/// (Lifecycle Coordinator). One variant per status-bearing transition
/// plus item lifecycle; intentionally does not cover attribute/mapper
/// churn, which is too high-frequency to be event-worthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideTapEvent {
    ImageStatusChanged {
        image: ItemUid,
        batch: BatchUid,
        from: ImageStatus,
        to: ImageStatus,
    },
    BatchStatusChanged {
        batch: BatchUid,
        from: BatchStatus,
        to: BatchStatus,
    },
    ProjectStatusChanged {
        project: ProjectUid,
        from: ProjectStatus,
        to: ProjectStatus,
    },
    ItemDeleted {
        item: ItemUid,
        batch: BatchUid,
    },
    MappingReapplied {
        mapper_group: crate::value_objects::MapperGroupUid,
        affected_items: usize,
    },
}

impl SlideTapEvent {
    /// A short, stable name for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            SlideTapEvent::ImageStatusChanged { .. } => "image_status_changed",
            SlideTapEvent::BatchStatusChanged { .. } => "batch_status_changed",
            SlideTapEvent::ProjectStatusChanged { .. } => "project_status_changed",
            SlideTapEvent::ItemDeleted { .. } => "item_deleted",
            SlideTapEvent::MappingReapplied { .. } => "mapping_reapplied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DomainEvent;

    #[test]
    fn wraps_in_envelope_with_fresh_id() {
        let event = SlideTapEvent::ItemDeleted {
            item: ItemUid::new(),
            batch: BatchUid::new(),
        };
        let first = DomainEvent::new(event.clone());
        let second = DomainEvent::new(event);
        assert_ne!(first.event_id, second.event_id);
    }

    #[test]
    fn kind_names_are_stable() {
        let event = SlideTapEvent::BatchStatusChanged {
            batch: BatchUid::new(),
            from: BatchStatus::ImagePostProcessingComplete,
            to: BatchStatus::Completed,
        };
        assert_eq!(event.kind(), "batch_status_changed");
    }
}

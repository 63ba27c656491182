// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Project status: derived from its batches, plus the export request
//! transitions (spec §4.F).

use crate::entities::{Batch, Project};
use crate::error::{CoreError, CoreResult};
use crate::value_objects::{BatchStatus, ProjectStatus};

/// Derives project status from its (non-deleted) batches: all `COMPLETED`
/// implies `COMPLETED`, otherwise `IN_PROGRESS`. A project with no
/// batches left (all deleted) is also `IN_PROGRESS` - there is nothing to
/// export yet.
pub fn derive_status(batches: &[Batch]) -> ProjectStatus {
    let live: Vec<&Batch> = batches.iter().filter(|b| b.status != BatchStatus::Deleted).collect();
    if !live.is_empty() && live.iter().all(|b| b.status == BatchStatus::Completed) {
        ProjectStatus::Completed
    } else {
        ProjectStatus::InProgress
    }
}

/// Starts an export; legal only from `COMPLETED`.
pub fn start_export(project: &mut Project) -> CoreResult<()> {
    if project.status != ProjectStatus::Completed {
        return Err(CoreError::not_allowed(format!(
            "project {} cannot start export from {:?}",
            project.uid, project.status
        )));
    }
    project.status = ProjectStatus::Exporting;
    Ok(())
}

/// Finishes an export; legal only from `EXPORTING`.
pub fn finish_export(project: &mut Project) -> CoreResult<()> {
    if project.status != ProjectStatus::Exporting {
        return Err(CoreError::not_allowed(format!(
            "project {} cannot finish export from {:?}",
            project.uid, project.status
        )));
    }
    project.status = ProjectStatus::ExportComplete;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::ProjectUid;
    use chrono::Utc;

    fn project_completed() -> Project {
        let mut p = Project::new(
            "p",
            crate::value_objects::RootSchemaUid::new(),
            crate::value_objects::RootSchemaUid::new(),
            crate::value_objects::DatasetUid::new(),
            crate::value_objects::BatchUid::new(),
            Utc::now(),
        );
        p.status = ProjectStatus::Completed;
        p
    }

    #[test]
    fn derives_completed_when_all_live_batches_completed() {
        let project_uid = ProjectUid::new();
        let batches = vec![
            Batch::new("a", project_uid.clone(), Utc::now(), true),
            {
                let mut b = Batch::new("b", project_uid.clone(), Utc::now(), false);
                b.status = BatchStatus::Completed;
                b
            },
        ];
        assert_eq!(derive_status(&[batches[1].clone()]), ProjectStatus::Completed);
        assert_eq!(derive_status(&batches), ProjectStatus::InProgress);
    }

    #[test]
    fn export_requires_completed_project() {
        let mut project = Project::new(
            "p",
            crate::value_objects::RootSchemaUid::new(),
            crate::value_objects::RootSchemaUid::new(),
            crate::value_objects::DatasetUid::new(),
            crate::value_objects::BatchUid::new(),
            Utc::now(),
        );
        assert!(start_export(&mut project).is_err());

        let mut project = project_completed();
        start_export(&mut project).unwrap();
        assert_eq!(project.status, ProjectStatus::Exporting);
        finish_export(&mut project).unwrap();
        assert_eq!(project.status, ProjectStatus::ExportComplete);
    }
}

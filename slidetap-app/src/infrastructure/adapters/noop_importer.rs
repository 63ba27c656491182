// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! No-op [`MetadataImporter`] and [`ImageImporter`]. Vendor-specific
//! metadata search and LIS/archive download integrations are outside the
//! curation engine's scope (spec §1 non-goals); this adapter lets the
//! scheduler and pipeline run against manually-seeded items in tests and
//! demos without a real importer configured.

use std::path::PathBuf;

use async_trait::async_trait;
use slidetap_domain::entities::Project;
use slidetap_domain::error::CoreResult;
use slidetap_domain::item::Image;
use slidetap_domain::pipeline::{ImageImporter, MetadataImporter, SearchParameters};

pub struct NoopImporter;

#[async_trait]
impl MetadataImporter for NoopImporter {
    async fn parse_file(&self, _bytes: &[u8]) -> CoreResult<SearchParameters> {
        Ok(SearchParameters::default())
    }

    async fn import_image_metadata(&self, _image: &mut Image) -> CoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ImageImporter for NoopImporter {
    async fn download(&self, _image: &Image, _project: &Project) -> CoreResult<(PathBuf, Vec<String>)> {
        Ok((PathBuf::new(), Vec::new()))
    }
}

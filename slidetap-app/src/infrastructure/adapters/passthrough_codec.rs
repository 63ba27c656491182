// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Deliberately inert [`ImageCodec`]. Converting whole-slide formats to a
//! binary DICOM representation is explicitly out of scope (spec §1
//! non-goals: "does not itself encode/convert images"); this adapter copies
//! the source file unchanged and manufactures a placeholder thumbnail, so
//! the pipeline and scheduler can be exercised end-to-end without a real
//! codec binding. A deployment replaces this with one that shells out to
//! (or links against) an actual WSI conversion library.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use slidetap_domain::item::ImageFile;
use slidetap_domain::error::CoreResult;
use slidetap_domain::pipeline::{DicomizeConfig, ImageCodec};
use slidetap_domain::value_objects::ItemUid;

pub struct PassthroughCodec;

#[async_trait]
impl ImageCodec for PassthroughCodec {
    async fn dicomize(&self, source: &Path, target_dir: &Path, _config: &DicomizeConfig, _metadata: Value) -> CoreResult<Vec<ImageFile>> {
        tokio::fs::create_dir_all(target_dir).await?;
        let filename = source.file_name().and_then(|n| n.to_str()).unwrap_or("image.bin").to_string();
        let target = target_dir.join(&filename);
        if source != target {
            tokio::fs::copy(source, &target).await?;
        }
        Ok(vec![ImageFile {
            uid: ItemUid::new(),
            filename,
        }])
    }

    async fn thumbnail(&self, _source: &Path, _max_size: u32) -> CoreResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

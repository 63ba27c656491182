// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Lifecycle Coordinator (component F): batch, image, and project state
//! machines. Transitions are the sole authorized mutator of their
//! respective `status` fields; a disallowed transition is a typed
//! [`crate::error::CoreError::NotAllowedAction`], never a silent no-op.

pub mod batch;
pub mod image;
pub mod project;

pub use batch::{apply as apply_batch_event, try_aggregate, BatchEvent};
pub use image::{apply as apply_image_event, retry as retry_image, skip_image, ImageEvent};

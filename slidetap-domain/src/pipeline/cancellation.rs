// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! A minimal cancellation token (spec §5 "tasks honor a context/token
//! checked at each step boundary"; spec §4.G "Cancellation: batch deletion
//! cancels in-flight image tasks at the next step boundary"), grounded on
//! the teacher's `adaptive_pipeline_bootstrap::shutdown::CancellationToken`
//! - a lightweight, clone-able, poll-based flag - simplified to a bare
//! atomic (no `Notify`) since steps only ever poll the token between
//! synchronous boundaries rather than awaiting it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clone-able handle shared between the holder of a batch/image task and
/// whoever requests its cancellation (the Lifecycle Coordinator's batch
/// deletion path).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! A thin generic envelope, grounded on the teacher's
//! `adaptive_pipeline_domain::events::generic_event::DomainEvent<T>` but
//! trimmed to what this crate actually needs - no event-sourcing replay,
//! no cross-service causation chains, since SlideTap isn't event-sourced
//! (spec §4.F: state machines are plain mutation, not event replay).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent<T> {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub payload: T,
}

impl<T> DomainEvent<T> {
    pub fn new(payload: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            payload,
        }
    }
}

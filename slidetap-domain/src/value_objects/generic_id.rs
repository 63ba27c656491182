// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Generic, type-safe entity identifier.
//!
//! Every entity in the domain (schemas, attributes, items, batches,
//! projects, datasets, mappers, mapping items) is identified by a UUID per
//! the external-interfaces contract ("all entity ids are UUIDs; external
//! representation is canonical hex with hyphens"). [`Uid<T>`] wraps a
//! [`uuid::Uuid`] with a phantom marker type so that, for example, a
//! [`crate::value_objects::ItemUid`] can never be passed where a
//! [`crate::value_objects::BatchUid`] is expected, while all entity ids
//! still share one implementation.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

/// Per-entity-kind customization point for [`Uid`].
///
/// Most entity kinds use the default (non-nil) validation; the reproducible
/// uid derivation used for re-ingest idempotency (see
/// [`Uid::from_reproducible_parts`]) is exposed on the generic type rather
/// than per category, since it only applies to import-time identifiers.
pub trait IdCategory {
    /// Stable name used in error messages and logs.
    fn category_name() -> &'static str;

    /// Category-specific validation; default rejects the nil UUID.
    fn validate(id: &Uuid) -> Result<(), CoreError> {
        if id.is_nil() {
            return Err(CoreError::invariant_violation(format!(
                "{} id cannot be nil",
                Self::category_name()
            )));
        }
        Ok(())
    }
}

/// Type-safe UUID wrapper, generic over an [`IdCategory`] marker.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Uid<T: IdCategory> {
    value: Uuid,
    _marker: PhantomData<T>,
}

impl<T: IdCategory> Serialize for Uid<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.to_string().serialize(serializer)
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for Uid<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value = Uuid::parse_str(&s).map_err(serde::de::Error::custom)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }
}

impl<T: IdCategory> Uid<T> {
    /// Generates a new random (v4) identifier.
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4(),
            _marker: PhantomData,
        }
    }

    /// Wraps an existing UUID, validating it for this category.
    pub fn from_uuid(value: Uuid) -> Result<Self, CoreError> {
        T::validate(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Parses a canonical hyphenated hex string.
    pub fn from_string(s: &str) -> Result<Self, CoreError> {
        let value =
            Uuid::parse_str(s).map_err(|e| CoreError::invariant_violation(format!("invalid {} id: {e}", T::category_name())))?;
        Self::from_uuid(value)
    }

    /// Deterministically derives a uid from `(dataset_uid, schema_uid,
    /// identifier)` so that re-ingesting the same metadata is idempotent,
    /// per the Item identity invariant in §3 of the specification. Uses
    /// UUID v5 (name-based, SHA-1) seeded by the dataset uid as namespace.
    pub fn from_reproducible_parts(dataset_uid: Uuid, schema_uid: Uuid, identifier: &str) -> Self {
        let namespace = Uuid::new_v5(&dataset_uid, schema_uid.as_bytes());
        let value = Uuid::new_v5(&namespace, identifier.as_bytes());
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> Uuid {
        self.value
    }

    pub fn category(&self) -> &'static str {
        T::category_name()
    }

    pub fn is_nil(&self) -> bool {
        self.value.is_nil()
    }

    /// A fixed nil id, useful as a sentinel in tests.
    pub fn nil() -> Self {
        Self {
            value: Uuid::nil(),
            _marker: PhantomData,
        }
    }
}

impl<T: IdCategory> Default for Uid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Display for Uid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdCategory> FromStr for Uid<T> {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestMarker;
    impl IdCategory for TestMarker {
        fn category_name() -> &'static str {
            "test"
        }
    }
    type TestUid = Uid<TestMarker>;

    #[test]
    fn round_trips_through_string() {
        let id = TestUid::new();
        let parsed = TestUid::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn nil_is_rejected_by_default_validation() {
        let err = TestUid::from_uuid(Uuid::nil());
        assert!(err.is_err());
    }

    #[test]
    fn reproducible_ids_are_deterministic() {
        let dataset = Uuid::new_v4();
        let schema = Uuid::new_v4();
        let a = TestUid::from_reproducible_parts(dataset, schema, "ABC-1");
        let b = TestUid::from_reproducible_parts(dataset, schema, "ABC-1");
        let c = TestUid::from_reproducible_parts(dataset, schema, "ABC-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

//! Object metadata shared by every namespace-scoped resource.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Namespace, ObjectName};

/// Monotonic version stamp assigned by a store on every successful write.
///
/// Used for optimistic concurrency: an update must carry the version it was
/// read at.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVersion(u64);

impl ResourceVersion {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The version a store assigns after accepting a write at `self`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl core::fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identity and versioning of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: ObjectName,
    pub namespace: Namespace,
    pub uid: Uuid,
    #[serde(default)]
    pub resource_version: ResourceVersion,
}

impl ObjectMeta {
    /// Metadata for a fresh object (UUIDv7 uid, version zero).
    ///
    /// Prefer passing uids explicitly in tests for determinism.
    pub fn new(namespace: Namespace, name: ObjectName) -> Self {
        Self {
            name,
            namespace,
            uid: Uuid::now_v7(),
            resource_version: ResourceVersion::default(),
        }
    }
}

/// A namespace-scoped object: identity is (namespace, name).
pub trait NamespacedObject {
    fn meta(&self) -> &ObjectMeta;

    fn name(&self) -> &ObjectName {
        &self.meta().name
    }

    fn namespace(&self) -> &Namespace {
        &self.meta().namespace
    }
}

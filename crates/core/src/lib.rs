//! `rolesweep-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or transport concerns).

pub mod error;
pub mod meta;
pub mod name;

pub use error::{DomainError, DomainResult};
pub use meta::{NamespacedObject, ObjectMeta, ResourceVersion};
pub use name::{Namespace, ObjectName};

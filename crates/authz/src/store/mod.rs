//! Authorization store capability.
//!
//! The remove-user operation only ever needs two calls against the store: list
//! every policy binding in a namespace, and write back one role binding. Both
//! are synchronous from the caller's point of view.

mod file;
mod in_memory;

pub use file::{BindingsDocument, FileAuthorizationStore};
pub use in_memory::InMemoryAuthorizationStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use rolesweep_core::{DomainError, Namespace, NamespacedObject, ObjectName, ResourceVersion};

use crate::{PolicyBinding, RoleBinding};

/// Store error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("namespace not found: {0}")]
    NamespaceNotFound(Namespace),

    #[error("role binding '{name}' not found in namespace '{namespace}'")]
    NotFound { namespace: Namespace, name: ObjectName },

    #[error("conflict on role binding '{name}': stored version {stored}, submitted {submitted}")]
    Conflict {
        name: ObjectName,
        stored: ResourceVersion,
        submitted: ResourceVersion,
    },

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("corrupt store data: {0}")]
    Corrupt(String),
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        Self::Invalid(value.to_string())
    }
}

/// Access to policy and role bindings held by an authorization service.
pub trait AuthorizationStore: Send + Sync {
    /// Full snapshot of the namespace's policy bindings, in store order.
    fn list_policy_bindings(&self, namespace: &Namespace) -> Result<Vec<PolicyBinding>, StoreError>;

    /// Replace a role binding's subjects. Returns the stored result.
    fn update_role_binding(
        &self,
        namespace: &Namespace,
        binding: RoleBinding,
    ) -> Result<RoleBinding, StoreError>;
}

impl<S> AuthorizationStore for Arc<S>
where
    S: AuthorizationStore + ?Sized,
{
    fn list_policy_bindings(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<PolicyBinding>, StoreError> {
        (**self).list_policy_bindings(namespace)
    }

    fn update_role_binding(
        &self,
        namespace: &Namespace,
        binding: RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        (**self).update_role_binding(namespace, binding)
    }
}

impl<S> AuthorizationStore for &S
where
    S: AuthorizationStore + ?Sized,
{
    fn list_policy_bindings(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<PolicyBinding>, StoreError> {
        (**self).list_policy_bindings(namespace)
    }

    fn update_role_binding(
        &self,
        namespace: &Namespace,
        binding: RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        (**self).update_role_binding(namespace, binding)
    }
}

/// Apply a role binding update to a namespace's policy bindings.
///
/// Shared by the store implementations so they agree on the update contract:
/// the binding must exist, its version must match, `uid` and `role_ref` are
/// immutable. On success the stored binding takes the submitted subjects,
/// its version advances and the owning policy binding is stamped `now`.
pub(crate) fn apply_role_binding_update(
    policy_bindings: &mut [PolicyBinding],
    namespace: &Namespace,
    update: RoleBinding,
    now: DateTime<Utc>,
) -> Result<RoleBinding, StoreError> {
    if update.namespace() != namespace {
        return Err(StoreError::Invalid(format!(
            "role binding '{}' belongs to namespace '{}', not '{}'",
            update.name(),
            update.namespace(),
            namespace
        )));
    }

    let not_found = || StoreError::NotFound {
        namespace: namespace.clone(),
        name: update.name().clone(),
    };
    let owner = policy_bindings
        .iter_mut()
        .find(|pb| pb.role_binding(update.name()).is_some())
        .ok_or_else(not_found)?;
    let stored = owner.role_binding_mut(update.name()).ok_or_else(not_found)?;

    if stored.metadata.resource_version != update.metadata.resource_version {
        return Err(StoreError::Conflict {
            name: update.name().clone(),
            stored: stored.metadata.resource_version,
            submitted: update.metadata.resource_version,
        });
    }
    if stored.metadata.uid != update.metadata.uid {
        return Err(StoreError::Invalid(format!(
            "uid of role binding '{}' is immutable",
            update.name()
        )));
    }
    if stored.role_ref != update.role_ref {
        return Err(StoreError::Invalid(format!(
            "role_ref of role binding '{}' is immutable",
            update.name()
        )));
    }

    stored.users = update.users;
    stored.groups = update.groups;
    stored.metadata.resource_version = stored.metadata.resource_version.next();
    let written = stored.clone();

    owner.last_modified = now;

    Ok(written)
}

use std::collections::BTreeMap;
use std::iter;
use std::sync::{RwLock, RwLockWriteGuard};

use chrono::Utc;

use rolesweep_core::{Namespace, NamespacedObject, ObjectName};

use super::{AuthorizationStore, StoreError, apply_role_binding_update};
use crate::{PolicyBinding, RoleBinding, validate_role_binding_names};

type Namespaces = BTreeMap<Namespace, Vec<PolicyBinding>>;

/// In-memory authorization store for tests/dev.
///
/// Policy bindings are kept per namespace in insertion order; listing returns
/// them in that order, unsorted.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationStore {
    namespaces: RwLock<Namespaces>,
}

impl InMemoryAuthorizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty namespace (listing it yields no bindings rather than
    /// `NamespaceNotFound`).
    pub fn create_namespace(&self, namespace: Namespace) -> Result<(), StoreError> {
        let mut map = self.write()?;
        map.entry(namespace).or_default();
        Ok(())
    }

    /// Insert or replace a policy binding (matched by name within its namespace).
    ///
    /// Rejected if any of its role binding names is already held by another
    /// policy binding in the namespace.
    pub fn insert_policy_binding(&self, binding: PolicyBinding) -> Result<(), StoreError> {
        binding.validate()?;

        let mut map = self.write()?;
        let bindings = map.entry(binding.namespace().clone()).or_default();
        let others = bindings.iter().filter(|pb| pb.name() != binding.name());
        validate_role_binding_names(others.chain(iter::once(&binding)))?;

        match bindings.iter().position(|pb| pb.name() == binding.name()) {
            Some(idx) => bindings[idx] = binding,
            None => bindings.push(binding),
        }
        Ok(())
    }

    /// Current state of a namespace's policy bindings, in insertion order.
    pub fn policy_bindings(&self, namespace: &Namespace) -> Vec<PolicyBinding> {
        match self.namespaces.read() {
            Ok(map) => map.get(namespace).cloned().unwrap_or_default(),
            Err(_) => vec![],
        }
    }

    /// Current state of one role binding.
    pub fn role_binding(&self, namespace: &Namespace, name: &ObjectName) -> Option<RoleBinding> {
        self.policy_bindings(namespace)
            .iter()
            .find_map(|pb| pb.role_binding(name).cloned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Namespaces>, StoreError> {
        self.namespaces
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

impl AuthorizationStore for InMemoryAuthorizationStore {
    fn list_policy_bindings(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<PolicyBinding>, StoreError> {
        let map = self
            .namespaces
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        map.get(namespace)
            .cloned()
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.clone()))
    }

    fn update_role_binding(
        &self,
        namespace: &Namespace,
        binding: RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        let mut map = self.write()?;
        let bindings = map
            .get_mut(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.clone()))?;

        apply_role_binding_update(bindings, namespace, binding, Utc::now())
    }
}

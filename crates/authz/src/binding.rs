//! Policy bindings and the role bindings they contain.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolesweep_core::{
    DomainError, DomainResult, Namespace, NamespacedObject, ObjectMeta, ObjectName,
};

use crate::SubjectSet;

/// Reference to the role a binding grants.
///
/// A role without a namespace is cluster-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub name: ObjectName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
}

/// Reference to the policy a policy binding binds to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
}

/// Association between a role and the subjects granted it within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub metadata: ObjectMeta,
    pub role_ref: RoleRef,
    #[serde(default)]
    pub users: SubjectSet,
    #[serde(default)]
    pub groups: SubjectSet,
}

impl RoleBinding {
    pub fn new(metadata: ObjectMeta, role_ref: RoleRef) -> Self {
        Self {
            metadata,
            role_ref,
            users: SubjectSet::new(),
            groups: SubjectSet::new(),
        }
    }

    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.extend(users);
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups);
        self
    }

    /// Compute the binding with `targets` removed from its users.
    ///
    /// Returns `None` when no target is a member, so callers never issue a
    /// write that would change nothing. Otherwise returns the updated binding
    /// (every other field untouched) and the users that were removed.
    pub fn without_users(&self, targets: &SubjectSet) -> Option<(RoleBinding, SubjectSet)> {
        if !self.users.has_any(targets) {
            return None;
        }

        let removed = self.users.intersection(targets);
        let mut updated = self.clone();
        updated.users = self.users.difference(targets);
        Some((updated, removed))
    }
}

impl NamespacedObject for RoleBinding {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// Namespace-scoped bundle of role bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyBinding {
    pub metadata: ObjectMeta,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub policy_ref: PolicyRef,
    #[serde(default)]
    pub role_bindings: Vec<RoleBinding>,
}

impl PolicyBinding {
    pub fn new(metadata: ObjectMeta, last_modified: DateTime<Utc>) -> Self {
        Self {
            metadata,
            last_modified,
            policy_ref: PolicyRef::default(),
            role_bindings: Vec::new(),
        }
    }

    pub fn with_role_binding(mut self, binding: RoleBinding) -> Self {
        self.role_bindings.push(binding);
        self
    }

    pub fn role_binding(&self, name: &ObjectName) -> Option<&RoleBinding> {
        self.role_bindings.iter().find(|rb| rb.name() == name)
    }

    pub fn role_binding_mut(&mut self, name: &ObjectName) -> Option<&mut RoleBinding> {
        self.role_bindings.iter_mut().find(|rb| rb.name() == name)
    }

    /// Check structural invariants.
    ///
    /// - Every role binding lives in the policy binding's namespace.
    /// - Role binding names are unique within the policy binding.
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen: HashSet<&ObjectName> = HashSet::new();

        for rb in &self.role_bindings {
            if rb.namespace() != self.namespace() {
                return Err(DomainError::invariant(format!(
                    "role binding '{}' is in namespace '{}' but policy binding '{}' is in '{}'",
                    rb.name(),
                    rb.namespace(),
                    self.name(),
                    self.namespace()
                )));
            }
            if !seen.insert(rb.name()) {
                return Err(DomainError::invariant(format!(
                    "duplicate role binding '{}' in policy binding '{}'",
                    rb.name(),
                    self.name()
                )));
            }
        }

        Ok(())
    }
}

impl NamespacedObject for PolicyBinding {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// Check that no role binding name is held by two policy bindings.
///
/// Role bindings are addressed by name alone within a namespace, so the names
/// must be unique across all of the namespace's policy bindings.
pub fn validate_role_binding_names<'a, I>(policy_bindings: I) -> DomainResult<()>
where
    I: IntoIterator<Item = &'a PolicyBinding>,
{
    let mut owners: HashMap<&ObjectName, &ObjectName> = HashMap::new();

    for pb in policy_bindings {
        for rb in &pb.role_bindings {
            if let Some(owner) = owners.insert(rb.name(), pb.name()) {
                return Err(DomainError::invariant(format!(
                    "role binding '{}' is held by both policy binding '{}' and '{}'",
                    rb.name(),
                    owner,
                    pb.name()
                )));
            }
        }
    }

    Ok(())
}

//! Remove users from every role binding in a namespace.
//!
//! Two stages, run strictly one after the other:
//!
//! 1. [`enumerate_bindings`] takes a full snapshot of the namespace's policy
//!    bindings and flattens it into a deterministic sequence of role bindings
//!    (policy bindings ascending by name, role bindings within each descending
//!    by name).
//! 2. [`remove_users`] walks that sequence and writes back every role binding
//!    whose users intersect the targets, with the targets removed.
//!
//! The first failed write stops the walk. Writes already made stay in place;
//! re-running is safe because a binding that no longer holds any target is
//! never written again.

use rolesweep_core::{Namespace, NamespacedObject, ObjectName};

use crate::sorting::{SortOrder, sort_policy_bindings, sort_role_bindings};
use crate::store::AuthorizationStore;
use crate::{RemoveUserError, RoleBinding, SubjectSet};

/// Users to remove, exactly as the operator gave them.
///
/// Order and duplicates are kept for display; matching uses the set view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUsers {
    users: Vec<String>,
    set: SubjectSet,
}

impl TargetUsers {
    /// Build from command arguments. At least one user is required.
    pub fn from_args<I, S>(args: I) -> Result<Self, RemoveUserError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users: Vec<String> = args.into_iter().map(Into::into).collect();
        if users.is_empty() {
            return Err(RemoveUserError::Usage);
        }
        let set = users.iter().cloned().collect();
        Ok(Self { users, set })
    }

    pub fn as_slice(&self) -> &[String] {
        &self.users
    }

    pub fn as_set(&self) -> &SubjectSet {
        &self.set
    }
}

/// One role binding in enumeration order, with the policy binding it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    pub policy_binding: ObjectName,
    pub role_binding: RoleBinding,
}

/// A role binding that was rewritten, and which users left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFrom {
    pub policy_binding: ObjectName,
    pub role_binding: ObjectName,
    pub users: SubjectSet,
}

/// Outcome of a (possibly partial) removal pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Role bindings examined, including the one that failed, if any.
    pub visited: usize,
    /// Role bindings written, in the order they were written.
    pub updated: Vec<RemovedFrom>,
}

impl RemovalReport {
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty()
    }
}

/// Snapshot a namespace's role bindings in deterministic order.
///
/// Fails with [`RemoveUserError::Retrieval`] if the listing fails; there is
/// no partial enumeration.
pub fn enumerate_bindings<S>(
    store: &S,
    namespace: &Namespace,
) -> Result<Vec<BindingEntry>, RemoveUserError>
where
    S: AuthorizationStore + ?Sized,
{
    let mut policy_bindings = store
        .list_policy_bindings(namespace)
        .map_err(|source| RemoveUserError::Retrieval {
            namespace: namespace.clone(),
            source,
        })?;
    sort_policy_bindings(&mut policy_bindings);

    let entries: Vec<BindingEntry> = policy_bindings
        .iter()
        .flat_map(|pb| {
            sort_role_bindings(&pb.role_bindings, SortOrder::Descending)
                .into_iter()
                .map(move |role_binding| BindingEntry {
                    policy_binding: pb.name().clone(),
                    role_binding,
                })
        })
        .collect();

    tracing::debug!(
        namespace = %namespace,
        policy_bindings = policy_bindings.len(),
        role_bindings = entries.len(),
        "enumerated bindings"
    );

    Ok(entries)
}

/// Remove `targets` from every entry whose users intersect them.
///
/// Entries are visited in the given order, one store write at a time. Entries
/// without overlap are never written.
pub fn remove_users<S>(
    store: &S,
    namespace: &Namespace,
    entries: Vec<BindingEntry>,
    targets: &TargetUsers,
) -> Result<RemovalReport, RemoveUserError>
where
    S: AuthorizationStore + ?Sized,
{
    let mut report = RemovalReport::default();

    for entry in entries {
        report.visited += 1;

        let Some((updated, removed)) = entry.role_binding.without_users(targets.as_set()) else {
            tracing::debug!(
                namespace = %namespace,
                policy_binding = %entry.policy_binding,
                role_binding = %entry.role_binding.name(),
                "no target users bound, skipping"
            );
            continue;
        };

        let role_binding = updated.name().clone();
        if let Err(source) = store.update_role_binding(namespace, updated) {
            tracing::warn!(
                namespace = %namespace,
                policy_binding = %entry.policy_binding,
                role_binding = %role_binding,
                error = %source,
                applied = report.updated.len(),
                "role binding update failed; stopping"
            );
            return Err(RemoveUserError::Update {
                namespace: namespace.clone(),
                policy_binding: entry.policy_binding,
                role_binding,
                applied: report,
                source,
            });
        }

        tracing::info!(
            namespace = %namespace,
            policy_binding = %entry.policy_binding,
            role_binding = %role_binding,
            removed = %removed,
            "removed users from role binding"
        );
        report.updated.push(RemovedFrom {
            policy_binding: entry.policy_binding,
            role_binding,
            users: removed,
        });
    }

    Ok(report)
}

/// Remove `targets` from every role binding in `namespace`.
pub fn remove_users_from_project<S>(
    store: &S,
    namespace: &Namespace,
    targets: &TargetUsers,
) -> Result<RemovalReport, RemoveUserError>
where
    S: AuthorizationStore + ?Sized,
{
    let entries = enumerate_bindings(store, namespace)?;
    let report = remove_users(store, namespace, entries, targets)?;

    tracing::debug!(
        namespace = %namespace,
        visited = report.visited,
        updated = report.updated.len(),
        "remove-user pass complete"
    );
    Ok(report)
}

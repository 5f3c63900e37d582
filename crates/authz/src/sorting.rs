//! Deterministic ordering over bindings.
//!
//! Stores return bindings in whatever order suits them. Anything that walks
//! bindings and mutates as it goes must sort first, so that two runs against
//! the same snapshot visit (and fail at) the same binding.

use rolesweep_core::NamespacedObject;

use crate::{PolicyBinding, RoleBinding};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stable sort by object name.
fn sort_by_name<T: NamespacedObject>(items: &mut [T], order: SortOrder) {
    match order {
        SortOrder::Ascending => items.sort_by(|a, b| a.name().cmp(b.name())),
        SortOrder::Descending => items.sort_by(|a, b| b.name().cmp(a.name())),
    }
}

/// Sort policy bindings in place, ascending by name.
pub fn sort_policy_bindings(bindings: &mut [PolicyBinding]) {
    sort_by_name(bindings, SortOrder::Ascending);
}

/// Return a policy binding's role bindings ordered by name.
pub fn sort_role_bindings(bindings: &[RoleBinding], order: SortOrder) -> Vec<RoleBinding> {
    let mut sorted = bindings.to_vec();
    sort_by_name(&mut sorted, order);
    sorted
}

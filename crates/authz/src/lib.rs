//! `rolesweep-authz` — authorization bindings and user removal.
//!
//! This crate is decoupled from transport: the authorization service is
//! reached only through the [`AuthorizationStore`] capability, passed in
//! explicitly by the caller.

pub mod binding;
pub mod error;
pub mod remove_user;
pub mod sorting;
pub mod store;
pub mod subjects;

pub use binding::{
    PolicyBinding, PolicyRef, RoleBinding, RoleRef, validate_role_binding_names,
};
pub use error::RemoveUserError;
pub use remove_user::{
    BindingEntry, RemovalReport, RemovedFrom, TargetUsers, enumerate_bindings, remove_users,
    remove_users_from_project,
};
pub use sorting::{SortOrder, sort_policy_bindings, sort_role_bindings};
pub use store::{
    AuthorizationStore, BindingsDocument, FileAuthorizationStore, InMemoryAuthorizationStore,
    StoreError,
};
pub use subjects::SubjectSet;

use thiserror::Error;

use rolesweep_core::{Namespace, ObjectName};

use crate::remove_user::RemovalReport;
use crate::store::StoreError;

/// Failure of the remove-user operation.
#[derive(Debug, Clone, Error)]
pub enum RemoveUserError {
    /// No target users were supplied. Raised before any store access.
    #[error("You must specify at least one argument: <user> [user]...")]
    Usage,

    /// Listing the namespace's policy bindings failed; nothing was changed.
    #[error("failed to list policy bindings in namespace '{namespace}'")]
    Retrieval {
        namespace: Namespace,
        #[source]
        source: StoreError,
    },

    /// A role binding update failed. Updates in `applied` were committed
    /// before the failure and are not rolled back.
    #[error(
        "failed to update role binding '{role_binding}' of policy binding '{policy_binding}' in namespace '{namespace}'"
    )]
    Update {
        namespace: Namespace,
        policy_binding: ObjectName,
        role_binding: ObjectName,
        applied: RemovalReport,
        #[source]
        source: StoreError,
    },
}

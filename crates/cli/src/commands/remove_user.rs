//! `rolesweep remove-user <user> [user]...`

use anyhow::Result;
use clap::Args;

use rolesweep_authz::{AuthorizationStore, RemovalReport, TargetUsers, remove_users_from_project};
use rolesweep_core::Namespace;

use crate::cli::GlobalOptions;
use crate::config::{LoadedConfig, resolve_config_path};
use crate::factory::Factory;

/// Remove users from every role binding in the current project.
#[derive(Debug, Args)]
pub struct RemoveUserCommand {
    /// Users to remove (exact identifiers).
    #[arg(value_name = "USER")]
    pub users: Vec<String>,
}

impl RemoveUserCommand {
    pub fn run(self, global: &GlobalOptions) -> Result<()> {
        // Argument check comes before any config or store access.
        let targets = TargetUsers::from_args(self.users)?;

        let config_path = resolve_config_path(global.config.as_deref())?;
        let loaded = LoadedConfig::load(&config_path)?;
        rolesweep_observability::init(global.log_options(loaded.config.log_format));

        let factory = Factory::from_env(loaded);
        let namespace = factory.default_namespace()?;
        let store = factory.authorization_store();

        execute(store.as_ref(), &namespace, &targets)?;
        Ok(())
    }
}

/// Run the removal against an already-built store.
pub fn execute<S>(store: &S, namespace: &Namespace, targets: &TargetUsers) -> Result<RemovalReport>
where
    S: AuthorizationStore + ?Sized,
{
    let report = remove_users_from_project(store, namespace, targets)?;

    tracing::info!(
        namespace = %namespace,
        users = ?targets.as_slice(),
        visited = report.visited,
        updated = report.updated.len(),
        "remove-user finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rolesweep_authz::{BindingsDocument, RemoveUserError};

    use super::*;

    fn global(config: Option<&Path>) -> GlobalOptions {
        GlobalOptions {
            config: config.map(Path::to_path_buf),
            log_format: None,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn no_users_fails_before_reading_config() {
        let missing = Path::new("/definitely/not/here/config.json");
        let err = RemoveUserCommand { users: vec![] }.run(&global(Some(missing))).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RemoveUserError>(),
            Some(RemoveUserError::Usage)
        ));
    }

    #[test]
    fn missing_config_is_reported() {
        let missing = Path::new("/definitely/not/here/config.json");
        let err = RemoveUserCommand { users: vec!["bob".to_string()] }
            .run(&global(Some(missing)))
            .unwrap_err();

        assert!(err.downcast_ref::<RemoveUserError>().is_none());
        assert!(format!("{err:#}").contains("client config"));
    }

    #[test]
    fn runs_against_configured_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let bindings = serde_json::json!({
            "namespaces": {
                "project-a": [{
                    "metadata": { "name": "project-a", "namespace": "project-a", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000001" },
                    "last_modified": "2024-01-01T00:00:00Z",
                    "role_bindings": [{
                        "metadata": { "name": "editors", "namespace": "project-a", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000002" },
                        "role_ref": { "name": "edit" },
                        "users": ["alice", "bob"]
                    }]
                }]
            }
        });
        std::fs::write(dir.path().join("bindings.json"), bindings.to_string()).unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(
            &config,
            r#"{ "namespace": "project-a", "store": { "path": "bindings.json" } }"#,
        )
        .unwrap();

        // Built directly so ROLESWEEP_NAMESPACE in the test environment is ignored.
        let loaded = LoadedConfig::load(&config).unwrap();
        let factory = Factory::new(loaded, None);
        let namespace = factory.default_namespace().unwrap();
        let targets = TargetUsers::from_args(["bob"]).unwrap();

        let report = execute(factory.authorization_store().as_ref(), &namespace, &targets).unwrap();
        assert_eq!(report.updated.len(), 1);

        let doc = BindingsDocument::read_from(&dir.path().join("bindings.json")).unwrap();
        let users = &doc.namespaces[&namespace][0].role_bindings[0].users;
        assert!(users.contains("alice"));
        assert!(!users.contains("bob"));
    }
}

//! Builds the store capability and resolves the current namespace from config.

use std::sync::Arc;

use anyhow::Context;

use rolesweep_authz::{AuthorizationStore, FileAuthorizationStore};
use rolesweep_core::Namespace;

use crate::config::{LoadedConfig, NAMESPACE_ENV};

/// Hands commands the collaborators they need, built from client config.
#[derive(Debug, Clone)]
pub struct Factory {
    loaded: LoadedConfig,
    namespace_override: Option<String>,
}

impl Factory {
    pub fn new(loaded: LoadedConfig, namespace_override: Option<String>) -> Self {
        Self {
            loaded,
            namespace_override,
        }
    }

    /// Factory reading the namespace override from the environment.
    pub fn from_env(loaded: LoadedConfig) -> Self {
        Self::new(loaded, std::env::var(NAMESPACE_ENV).ok())
    }

    pub fn config(&self) -> &LoadedConfig {
        &self.loaded
    }

    /// The namespace commands act on when none is given.
    pub fn default_namespace(&self) -> anyhow::Result<Namespace> {
        if let Some(raw) = &self.namespace_override {
            return Namespace::new(raw.as_str())
                .with_context(|| format!("invalid namespace in {NAMESPACE_ENV}"));
        }

        self.loaded.config.namespace.clone().with_context(|| {
            format!(
                "no default namespace: set \"namespace\" in {} or {NAMESPACE_ENV}",
                self.loaded.source.display()
            )
        })
    }

    pub fn authorization_store(&self) -> Arc<dyn AuthorizationStore> {
        let path = self.loaded.store_path();
        tracing::debug!(path = %path.display(), "using file authorization store");
        Arc::new(FileAuthorizationStore::open(path))
    }
}

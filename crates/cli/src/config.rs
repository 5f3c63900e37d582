//! Client configuration: where the bindings live and which project is current.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use rolesweep_core::Namespace;
use rolesweep_observability::LogFormat;

/// Environment variable overriding the configured default namespace.
pub const NAMESPACE_ENV: &str = "ROLESWEEP_NAMESPACE";

/// On-disk client configuration.
///
/// ```json
/// { "namespace": "project-a", "store": { "path": "bindings.json" }, "log_format": "json" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Default namespace (project) commands act on.
    #[serde(default)]
    pub namespace: Option<Namespace>,
    pub store: StoreConfig,
    #[serde(default)]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Bindings file. Relative paths resolve against the config file's directory.
    pub path: PathBuf,
}

/// A config together with the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: ClientConfig,
    pub source: PathBuf,
}

impl LoadedConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read client config at {}", path.display()))?;
        let config: ClientConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse client config at {}", path.display()))?;

        Ok(Self {
            config,
            source: path.to_path_buf(),
        })
    }

    pub fn store_path(&self) -> PathBuf {
        let path = &self.config.store.path;
        if path.is_absolute() {
            return path.clone();
        }
        match self.source.parent() {
            Some(dir) => dir.join(path),
            None => path.clone(),
        }
    }
}

/// Pick the config file: explicit path first, then the per-user default.
pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// `{config_dir}/rolesweep/config.json`, falling back to `~/.rolesweep/config.json`.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    if let Some(mut dir) = dirs::config_dir() {
        dir.push("rolesweep");
        dir.push("config.json");
        return Ok(dir);
    }

    let mut home = dirs::home_dir().context(
        "failed to resolve a config location - tried config_dir() and home_dir()/.rolesweep",
    )?;
    home.push(".rolesweep");
    home.push("config.json");
    Ok(home)
}

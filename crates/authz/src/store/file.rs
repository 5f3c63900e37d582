use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use rolesweep_core::Namespace;

use super::{AuthorizationStore, StoreError, apply_role_binding_update};
use crate::{PolicyBinding, RoleBinding, validate_role_binding_names};

/// On-disk layout of a [`FileAuthorizationStore`].
///
/// ```json
/// { "namespaces": { "project-a": [ { "metadata": { ... }, "role_bindings": [ ... ] } ] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingsDocument {
    #[serde(default)]
    pub namespaces: BTreeMap<Namespace, Vec<PolicyBinding>>,
}

impl BindingsDocument {
    /// Check every policy binding's invariants, that it is filed under its
    /// own namespace, and that role binding names are unique per namespace.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (namespace, bindings) in &self.namespaces {
            for pb in bindings {
                if &pb.metadata.namespace != namespace {
                    return Err(StoreError::Corrupt(format!(
                        "policy binding '{}' is filed under namespace '{}' but declares '{}'",
                        pb.metadata.name, namespace, pb.metadata.namespace
                    )));
                }
                pb.validate().map_err(|e| StoreError::Corrupt(e.to_string()))?;
            }
            validate_role_binding_names(bindings)
                .map_err(|e| StoreError::Corrupt(format!("namespace '{namespace}': {e}")))?;
        }
        Ok(())
    }

    /// Serialize to `path`, replacing it atomically.
    ///
    /// The document is written to a uniquely named temp file next to `path`
    /// and renamed over it. The temp file is removed if anything fails.
    pub fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::Storage(format!("serialize bindings: {e}")))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let prefix = match path.file_name() {
            Some(name) => format!(".{}.", name.to_string_lossy()),
            None => ".bindings.".to_string(),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| {
                StoreError::Storage(format!("create temp file in {}: {e}", dir.display()))
            })?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::Storage(format!("write {}: {e}", tmp.path().display())))?;
        tmp.persist(path)
            .map_err(|e| StoreError::Storage(format!("replace {}: {}", path.display(), e.error)))?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| StoreError::Storage(format!("read {}: {e}", path.display())))?;
        let doc: Self = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        doc.validate()?;
        Ok(doc)
    }
}

/// Authorization store backed by a single JSON file.
///
/// The file is re-read on every call, so each listing is a fresh snapshot and
/// edits made by other tools between runs are picked up. Writes go to a
/// sibling temp file that is renamed over the original.
///
/// There is no concurrent-writer safety. Every update rewrites the whole
/// document, so two processes updating different role bindings at the same
/// time can silently lose one of the changes. A resource-version conflict is
/// only reported when a stale copy of the same role binding is written.
#[derive(Debug, Clone)]
pub struct FileAuthorizationStore {
    path: PathBuf,
}

impl FileAuthorizationStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuthorizationStore for FileAuthorizationStore {
    fn list_policy_bindings(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<PolicyBinding>, StoreError> {
        let mut doc = BindingsDocument::read_from(&self.path)?;
        doc.namespaces
            .remove(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.clone()))
    }

    fn update_role_binding(
        &self,
        namespace: &Namespace,
        binding: RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        let mut doc = BindingsDocument::read_from(&self.path)?;
        let bindings = doc
            .namespaces
            .get_mut(namespace)
            .ok_or_else(|| StoreError::NamespaceNotFound(namespace.clone()))?;

        let written = apply_role_binding_update(bindings, namespace, binding, Utc::now())?;
        doc.write_to(&self.path)?;

        tracing::trace!(path = %self.path.display(), "bindings file rewritten");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAuthorizationStore::open(dir.path().join("absent.json"));

        let err = store
            .list_policy_bindings(&Namespace::new("default").unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[test]
    fn malformed_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileAuthorizationStore::open(&path)
            .list_policy_bindings(&Namespace::new("default").unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn misfiled_policy_binding_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        fs::write(
            &path,
            r#"{"namespaces":{"a":[{
                "metadata":{"name":"b","namespace":"b","uid":"0190c3a2-6f1e-7d4b-9c2a-1b2c3d4e5f60"},
                "last_modified":"2024-01-01T00:00:00Z"
            }]}}"#,
        )
        .unwrap();

        let err = BindingsDocument::read_from(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn empty_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");

        BindingsDocument::default().write_to(&path).unwrap();
        BindingsDocument::default().write_to(&path).unwrap();
        assert_eq!(BindingsDocument::read_from(&path).unwrap(), BindingsDocument::default());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("bindings.json")]);
    }

    #[test]
    fn role_binding_name_shared_across_policy_bindings_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        fs::write(
            &path,
            r#"{"namespaces":{"p":[
                {
                    "metadata":{"name":"b","namespace":"p","uid":"0190c3a2-6f1e-7d4b-9c2a-000000000001"},
                    "last_modified":"2024-01-01T00:00:00Z",
                    "role_bindings":[{
                        "metadata":{"name":"editors","namespace":"p","uid":"0190c3a2-6f1e-7d4b-9c2a-000000000002"},
                        "role_ref":{"name":"edit"},
                        "users":["bob"]
                    }]
                },
                {
                    "metadata":{"name":"a","namespace":"p","uid":"0190c3a2-6f1e-7d4b-9c2a-000000000003"},
                    "last_modified":"2024-01-01T00:00:00Z",
                    "role_bindings":[{
                        "metadata":{"name":"editors","namespace":"p","uid":"0190c3a2-6f1e-7d4b-9c2a-000000000004"},
                        "role_ref":{"name":"edit"},
                        "users":["alice","bob"]
                    }]
                }
            ]}}"#,
        )
        .unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let err = FileAuthorizationStore::open(&path)
            .list_policy_bindings(&Namespace::new("p").unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(ref msg) if msg.contains("'editors'")));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}

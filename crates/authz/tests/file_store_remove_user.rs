//! End-to-end removal against the JSON file store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use rolesweep_authz::{
    AuthorizationStore, BindingsDocument, FileAuthorizationStore, RemoveUserError, StoreError,
    SubjectSet, TargetUsers, remove_users_from_project,
};
use rolesweep_core::{Namespace, ObjectName, ResourceVersion};

const BINDINGS: &str = r#"{
  "namespaces": {
    "project-a": [
      {
        "metadata": { "name": "project-a", "namespace": "project-a", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000001" },
        "last_modified": "2024-01-01T00:00:00Z",
        "role_bindings": [
          {
            "metadata": { "name": "viewers", "namespace": "project-a", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000002", "resource_version": 4 },
            "role_ref": { "name": "view" },
            "users": ["alice", "bob", "carol"],
            "groups": ["auditors"]
          },
          {
            "metadata": { "name": "admins", "namespace": "project-a", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000003" },
            "role_ref": { "name": "admin" },
            "users": ["root"]
          }
        ]
      },
      {
        "metadata": { "name": "shared", "namespace": "project-a", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000004" },
        "last_modified": "2024-01-01T00:00:00Z",
        "policy_ref": { "namespace": "shared-policies" },
        "role_bindings": [
          {
            "metadata": { "name": "editors", "namespace": "project-a", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000005" },
            "role_ref": { "name": "edit", "namespace": "shared-policies" },
            "users": ["bob"]
          }
        ]
      }
    ],
    "project-b": [
      {
        "metadata": { "name": "project-b", "namespace": "project-b", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000006" },
        "last_modified": "2024-01-01T00:00:00Z",
        "role_bindings": [
          {
            "metadata": { "name": "viewers", "namespace": "project-b", "uid": "0190c3a2-6f1e-7d4b-9c2a-000000000007" },
            "role_ref": { "name": "view" },
            "users": ["bob"]
          }
        ]
      }
    ]
  }
}"#;

fn seed(dir: &Path) -> PathBuf {
    let path = dir.join("bindings.json");
    std::fs::write(&path, BINDINGS).unwrap();
    path
}

fn ns(s: &str) -> Namespace {
    Namespace::new(s).unwrap()
}

fn users_of(path: &Path, namespace: &str, rb: &str) -> SubjectSet {
    let doc = BindingsDocument::read_from(path).unwrap();
    doc.namespaces[&ns(namespace)]
        .iter()
        .find_map(|pb| pb.role_binding(&ObjectName::new(rb).unwrap()).cloned())
        .unwrap()
        .users
}

#[test]
fn removes_users_across_policy_bindings_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path());
    let store = FileAuthorizationStore::open(&path);

    let targets = TargetUsers::from_args(["bob", "carol"]).unwrap();
    let report = remove_users_from_project(&store, &ns("project-a"), &targets).unwrap();

    assert_eq!(report.visited, 3);
    let updated: Vec<&str> = report.updated.iter().map(|u| u.role_binding.as_str()).collect();
    assert_eq!(updated, vec!["viewers", "editors"]);

    assert_eq!(users_of(&path, "project-a", "viewers"), SubjectSet::from_iter(["alice"]));
    assert!(users_of(&path, "project-a", "editors").is_empty());
    assert_eq!(users_of(&path, "project-a", "admins"), SubjectSet::from_iter(["root"]));
    // other namespaces are out of reach
    assert_eq!(users_of(&path, "project-b", "viewers"), SubjectSet::from_iter(["bob"]));
}

#[test]
fn update_preserves_untouched_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path());
    let store = FileAuthorizationStore::open(&path);

    remove_users_from_project(&store, &ns("project-a"), &TargetUsers::from_args(["bob"]).unwrap())
        .unwrap();

    let pbs = store.list_policy_bindings(&ns("project-a")).unwrap();
    let viewers = pbs[0].role_binding(&ObjectName::new("viewers").unwrap()).unwrap();
    assert_eq!(viewers.groups, SubjectSet::from_iter(["auditors"]));
    assert_eq!(viewers.role_ref.name.as_str(), "view");
    assert_eq!(viewers.metadata.resource_version, ResourceVersion::new(5));
    let seeded_at: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
    assert!(pbs[0].last_modified > seeded_at);

    let admins = pbs[0].role_binding(&ObjectName::new("admins").unwrap()).unwrap();
    assert_eq!(admins.metadata.resource_version, ResourceVersion::new(0));
}

#[test]
fn second_run_leaves_file_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path());
    let store = FileAuthorizationStore::open(&path);
    let targets = TargetUsers::from_args(["bob"]).unwrap();

    remove_users_from_project(&store, &ns("project-a"), &targets).unwrap();
    let after_first = std::fs::read_to_string(&path).unwrap();

    let report = remove_users_from_project(&store, &ns("project-a"), &targets).unwrap();
    assert!(report.is_noop());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn unknown_namespace_is_retrieval_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = seed(dir.path());
    let store = FileAuthorizationStore::open(&path);

    let targets = TargetUsers::from_args(["bob"]).unwrap();
    let err = remove_users_from_project(&store, &ns("project-z"), &targets).unwrap_err();

    assert!(matches!(
        err,
        RemoveUserError::Retrieval {
            source: StoreError::NamespaceNotFound(_),
            ..
        }
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), BINDINGS);
}

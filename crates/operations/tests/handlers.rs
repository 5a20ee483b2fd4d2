//! Every verb end to end through its handler, JSON in and JSON out.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use geocat_catalog::{PermissionDefaults, ResourceManager};
use geocat_core::{ExecutionId, Principal, ResourceKey, Subject};
use geocat_execution::FuncName;
use geocat_operations::{
    ErrorClass, OperationContext, OperationError, OperationHandler, default_operations,
};
use geocat_permission::codename::VIEW_RESOURCEBASE;
use geocat_storage_memory::{MemoryDirectory, MemoryResourceRepo};
use geocat_telemetry::EventBus;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

struct Harness {
    manager: Arc<ResourceManager>,
    handlers: HashMap<FuncName, Arc<dyn OperationHandler>>,
}

impl Harness {
    fn new() -> Self {
        let manager = Arc::new(ResourceManager::new(
            Arc::new(MemoryResourceRepo::new()),
            Arc::new(MemoryDirectory::new().with_user(Principal::superuser("root"))),
            Arc::new(EventBus::new(64)),
            PermissionDefaults::default(),
        ));
        let handlers = default_operations(&manager)
            .into_iter()
            .map(|handler| (handler.func(), handler))
            .collect();
        Self { manager, handlers }
    }

    async fn run(&self, func: FuncName, input: Value) -> Result<Value, OperationError> {
        let ctx = OperationContext::detached(ExecutionId::v4(), "alice");
        self.handlers[&func].execute(input, &ctx).await
    }

    async fn create(&self, uuid: &str, resource_type: &str) {
        self.run(
            FuncName::Create,
            json!({"uuid": uuid, "resource_type": resource_type, "defaults": {"owner": "alice"}}),
        )
        .await
        .unwrap();
    }
}

fn key(raw: &str) -> ResourceKey {
    ResourceKey::new(raw).unwrap()
}

#[test]
fn every_verb_has_exactly_one_handler() {
    let harness = Harness::new();
    assert_eq!(harness.handlers.len(), FuncName::ALL.len());
}

#[tokio::test]
async fn create_outputs_uuid_and_stores_defaults_in_metadata() {
    let h = Harness::new();
    let output = h
        .run(
            FuncName::Create,
            json!({
                "uuid": "r1",
                "resource_type": "dataset:vector",
                "defaults": {"owner": "alice", "title": "Rivers", "abstract": "flowing"},
            }),
        )
        .await
        .unwrap();
    assert_eq!(output, json!({"uuid": "r1"}));

    let resource = h.manager.get(&key("r1")).await.unwrap();
    assert_eq!(resource.title, "Rivers");
    assert_eq!(resource.owner, "alice");
    assert_eq!(resource.metadata["abstract"], "flowing");
    assert!(resource.metadata.get("owner").is_none());
}

#[tokio::test]
async fn duplicate_create_is_a_user_error() {
    let h = Harness::new();
    h.create("r1", "map").await;
    let err = h
        .run(
            FuncName::Create,
            json!({"uuid": "r1", "resource_type": "map", "defaults": {"owner": "bob"}}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::DuplicateResource(_)));
    assert_eq!(err.class(), ErrorClass::User);
}

#[tokio::test]
async fn ingest_is_idempotent_on_uuid() {
    let h = Harness::new();
    let input = json!({
        "uuid": "d1",
        "files": ["upload/report.pdf"],
        "resource_type": "document",
        "defaults": {"owner": "alice"},
    });
    assert_eq!(h.run(FuncName::Ingest, input.clone()).await.unwrap(), json!({"uuid": "d1"}));
    assert_eq!(h.run(FuncName::Ingest, input).await.unwrap(), json!({"uuid": "d1"}));
}

#[tokio::test]
async fn update_of_missing_resource_fails_with_not_found() {
    let h = Harness::new();
    let err = h
        .run(FuncName::Update, json!({"uuid": "ghost", "vals": {"title": "x"}}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "resource not found: ghost");
}

#[tokio::test]
async fn update_applies_partial_values() {
    let h = Harness::new();
    h.create("r1", "geoapp").await;
    h.run(
        FuncName::Update,
        json!({"uuid": "r1", "regions": ["EU"], "custom": {"theme": "dark"}}),
    )
    .await
    .unwrap();
    let resource = h.manager.get(&key("r1")).await.unwrap();
    assert_eq!(resource.metadata["regions"], json!(["EU"]));
    assert_eq!(resource.metadata["custom"], json!({"theme": "dark"}));
}

#[tokio::test]
async fn delete_twice_outputs_one_then_zero() {
    let h = Harness::new();
    h.create("r1", "map").await;
    assert_eq!(h.run(FuncName::Delete, json!({"uuid": "r1"})).await.unwrap(), json!(1));
    assert_eq!(h.run(FuncName::Delete, json!({"uuid": "r1"})).await.unwrap(), json!(0));
}

#[tokio::test]
async fn copy_outputs_a_fresh_uuid() {
    let h = Harness::new();
    h.create("r1", "document").await;
    let output = h
        .run(FuncName::Copy, json!({"instance": "r1", "owner": "bob", "defaults": {}}))
        .await
        .unwrap();
    let uuid = output["uuid"].as_str().unwrap();
    assert_ne!(uuid, "r1");
    assert_eq!(h.manager.get(&key(uuid)).await.unwrap().owner, "bob");
}

#[tokio::test]
async fn set_permissions_accepts_both_forms() {
    let h = Harness::new();
    h.create("r1", "dataset:vector").await;
    h.run(
        FuncName::SetPermissions,
        json!({
            "uuid": "r1",
            "owner": "alice",
            "permissions": {
                "bob": "view",
                "group:editors": ["view_resourcebase", "change_dataset_style"],
            },
        }),
    )
    .await
    .unwrap();

    let resource = h.manager.get(&key("r1")).await.unwrap();
    assert_eq!(
        resource.acl.get(&Subject::user("bob")),
        Some(&BTreeSet::from([VIEW_RESOURCEBASE.to_owned()]))
    );
    assert_eq!(resource.acl.get(&Subject::group("editors")).map(BTreeSet::len), Some(2));
}

#[tokio::test]
async fn set_permissions_rejects_manage_for_registered_members() {
    let h = Harness::new();
    h.create("r1", "map").await;
    let before = h.manager.get(&key("r1")).await.unwrap();

    let err = h
        .run(
            FuncName::SetPermissions,
            json!({"uuid": "r1", "owner": "alice", "permissions": {"registered-members": "manage"}}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::InvalidPermissionSpec(_)));
    assert_eq!(h.manager.get(&key("r1")).await.unwrap(), before);
}

#[tokio::test]
async fn null_permissions_need_the_created_flag() {
    let h = Harness::new();
    h.create("r1", "map").await;
    let err = h
        .run(
            FuncName::SetPermissions,
            json!({"uuid": "r1", "owner": "alice", "permissions": null}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation(_)));

    h.run(
        FuncName::SetPermissions,
        json!({"uuid": "r1", "owner": "alice", "permissions": null, "created": true}),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn remove_permissions_outputs_uuid() {
    let h = Harness::new();
    h.create("r1", "map").await;
    let output = h
        .run(FuncName::RemovePermissions, json!({"uuid": "r1"}))
        .await
        .unwrap();
    assert_eq!(output, json!({"uuid": "r1"}));
    let resource = h.manager.get(&key("r1")).await.unwrap();
    assert!(resource.acl.get(&Subject::Anonymous).is_none());
}

//! End-to-end Set/Delete behaviour over the in-memory cache and the schema validator.

use gnmi_set_core::{
    CacheEntry, Code, ConfigEntry, DeleteMode, HandlerConfig, InMemoryCache, NamespacedName,
    Operation, Path, SchemaValidator, SetHandler, SetRequest, TypedValue, Update,
};
use serde_json::{json, Value};
use std::sync::Arc;

const INTERFACES_SCHEMA: &str = r#"
type: object
properties:
  interfaces:
    type: object
    properties:
      interface:
        type: array
        items:
          type: object
          required: [name]
          properties:
            name: { type: string }
            config:
              type: object
              properties:
                mtu: { type: integer, minimum: 68, maximum: 9216 }
                enabled: { type: boolean }
"#;

const SYSTEM_SCHEMA: &str = r#"
type: object
properties:
  system:
    type: object
    properties:
      config:
        type: object
        required: [hostname]
        properties:
          hostname: { type: string }
          mtu: { type: integer }
"#;

fn schema() -> Value {
    serde_yaml::from_str(INTERFACES_SCHEMA).unwrap()
}

fn key(target: &str, origin: &str) -> NamespacedName {
    NamespacedName::from_target_and_origin(target, origin)
}

fn seeded_cache() -> Arc<InMemoryCache> {
    let cache = Arc::new(InMemoryCache::new());
    cache
        .insert(ConfigEntry::new(key("dev1", "openconfig"), json!({})).with_schema(schema()))
        .unwrap();
    cache
        .insert(ConfigEntry::new(key("dev1", "oc"), json!({})).with_schema(schema()))
        .unwrap();
    cache
}

fn system_cache() -> Arc<InMemoryCache> {
    let cache = Arc::new(InMemoryCache::new());
    let system: Value = serde_yaml::from_str(SYSTEM_SCHEMA).unwrap();
    for origin in ["a", "b"] {
        let running = json!({"system": {"config": {"hostname": "r1", "mtu": 1500}}});
        cache
            .insert(ConfigEntry::new(key("dev1", origin), running).with_schema(system.clone()))
            .unwrap();
    }
    cache
}

fn handler(cache: Arc<InMemoryCache>, config: HandlerConfig) -> SetHandler {
    SetHandler::new(cache, Arc::new(SchemaValidator::new()), config)
}

fn prefix(target: &str, origin: &str) -> Path {
    Path::new().with_target(target).with_origin(origin)
}

fn mtu_update(origin: &str, mtu: i64) -> Update {
    let path: Path = format!("{origin}:/interfaces/interface[name=eth0]/config")
        .parse()
        .unwrap();
    Update::new(path, TypedValue::JsonVal(format!(r#"{{"mtu": {mtu}}}"#)))
}

#[test]
fn update_with_origin_on_path_marks_entry_dirty() {
    let cache = seeded_cache();
    let h = handler(cache.clone(), HandlerConfig::default());
    let update = mtu_update("openconfig", 1500);

    let resp = h.set(Some(&prefix("dev1", "")), &update).unwrap();

    assert_eq!(resp.response.len(), 1);
    let result = &resp.response[0];
    assert_eq!(result.op, Operation::Update);
    assert_eq!(Some(&result.path), update.path.as_ref());
    assert!(result.timestamp > 0);

    let entry = cache.entry(&key("dev1", "openconfig")).unwrap();
    assert!(entry.system_cache_status());
    assert_eq!(
        entry.running_config(),
        json!({"interfaces": {"interface": [{"name": "eth0", "config": {"mtu": 1500}}]}})
    );
    let untouched = cache.entry(&key("dev1", "oc")).unwrap();
    assert!(!untouched.system_cache_status());
    assert_eq!(untouched.running_config(), json!({}));
}

#[test]
fn set_replaces_stored_leaf_value() {
    let cache = system_cache();
    let h = handler(cache.clone(), HandlerConfig::default());
    let hostname = Update::new(
        "/system/config/hostname".parse().unwrap(),
        TypedValue::StringVal("r2".into()),
    );

    h.set(Some(&prefix("dev1", "a")), &hostname).unwrap();

    let entry = cache.entry(&key("dev1", "a")).unwrap();
    assert_eq!(
        entry.running_config(),
        json!({"system": {"config": {"hostname": "r2", "mtu": 1500}}})
    );
    assert!(entry.system_cache_status());
}

#[test]
fn prefix_origin_selects_missing_entry() {
    let cache = seeded_cache();
    let h = handler(cache.clone(), HandlerConfig::default());

    let status = h
        .set(Some(&prefix("dev2", "oc")), &mtu_update("other", 1500))
        .unwrap_err();

    assert_eq!(status.code, Code::NotFound);
    assert_eq!(
        status.to_string(),
        "rpc error: code = NotFound desc = could not find target in cache"
    );
}

#[test]
fn rejected_value_is_internal_and_entry_stays_clean() {
    let cache = seeded_cache();
    let h = handler(cache.clone(), HandlerConfig::default());
    let malformed = Update::new(
        "/interfaces/interface[name=eth0]/config".parse().unwrap(),
        TypedValue::JsonVal("{mtu: ".into()),
    );

    let status = h.set(Some(&prefix("dev1", "oc")), &malformed).unwrap_err();
    assert_eq!(status.code, Code::Internal);

    let status = h
        .set(Some(&prefix("dev1", "oc")), &mtu_update("oc", 12))
        .unwrap_err();
    assert_eq!(status.code, Code::Internal);
    assert!(status.message.contains("schema validation failed"), "{}", status.message);

    let entry = cache.entry(&key("dev1", "oc")).unwrap();
    assert!(!entry.system_cache_status());
}

#[test]
fn strict_origin_rejects_update_for_other_namespace() {
    let cache = seeded_cache();
    let h = handler(cache, HandlerConfig::default());

    // Prefix picks the "oc" entry; the update path claims "openconfig".
    let status = h
        .set(Some(&prefix("dev1", "oc")), &mtu_update("openconfig", 1500))
        .unwrap_err();
    assert_eq!(status.code, Code::Internal);
    assert!(status.message.contains("does not match entry origin"));

    let relaxed = HandlerConfig {
        strict_origin: false,
        ..Default::default()
    };
    let h = handler(seeded_cache(), relaxed);
    assert!(h
        .set(Some(&prefix("dev1", "oc")), &mtu_update("openconfig", 1500))
        .is_ok());
}

#[test]
fn delete_is_unimplemented_by_default() {
    let cache = seeded_cache();
    let h = handler(cache.clone(), HandlerConfig::default());
    let path: Path = "openconfig:/interfaces".parse().unwrap();

    for pf in [None, Some(prefix("dev1", "")), Some(prefix("nope", "x"))] {
        let status = h.delete(pf.as_ref(), Some(&path)).unwrap_err();
        assert_eq!(status.code, Code::Unimplemented);
    }
    let entry = cache.entry(&key("dev1", "openconfig")).unwrap();
    assert!(!entry.system_cache_status());
}

#[test]
fn frozen_entry_fails_as_internal() {
    let cache = seeded_cache();
    cache.entry(&key("dev1", "oc")).unwrap().freeze();
    let h = handler(cache, HandlerConfig::default());

    let status = h
        .set(Some(&prefix("dev1", "oc")), &mtu_update("oc", 1500))
        .unwrap_err();
    assert_eq!(status.code, Code::Internal);
    assert!(status.message.contains("frozen"));
}

#[test]
fn batch_is_all_or_nothing_across_entries() {
    let cache = seeded_cache();
    let config = HandlerConfig {
        delete_mode: DeleteMode::MarkDirty,
        validation_failure_code: Code::InvalidArgument,
        ..Default::default()
    };
    let h = handler(cache.clone(), config);

    let bad = SetRequest {
        prefix: Some(prefix("dev1", "")),
        update: vec![mtu_update("openconfig", 1500), mtu_update("oc", 10)],
        ..Default::default()
    };
    let status = h.handle(&bad).unwrap_err();
    assert_eq!(status.code, Code::InvalidArgument);
    for origin in ["openconfig", "oc"] {
        let entry = cache.entry(&key("dev1", origin)).unwrap();
        assert!(!entry.system_cache_status());
    }

    let good = SetRequest {
        prefix: Some(prefix("dev1", "")),
        delete: vec!["oc:/interfaces".parse().unwrap()],
        update: vec![mtu_update("openconfig", 1500)],
        ..Default::default()
    };
    let resp = h.handle(&good).unwrap();
    let ops: Vec<Operation> = resp.response.iter().map(|r| r.op).collect();
    assert_eq!(ops, vec![Operation::Delete, Operation::Update]);
    for origin in ["openconfig", "oc"] {
        let entry = cache.entry(&key("dev1", origin)).unwrap();
        assert!(entry.system_cache_status());
    }
}

#[test]
fn batch_update_can_restore_leaf_dropped_by_replace() {
    let cache = system_cache();
    let h = handler(cache.clone(), HandlerConfig::default());

    // On its own the replace loses the required hostname.
    let replace = Update::new(
        "/system/config".parse().unwrap(),
        TypedValue::JsonVal(r#"{"mtu": 9000}"#.into()),
    );
    let alone = SetRequest {
        prefix: Some(prefix("dev1", "a")),
        replace: vec![replace.clone()],
        ..Default::default()
    };
    let status = h.handle(&alone).unwrap_err();
    assert_eq!(status.code, Code::Internal);
    assert!(status.message.contains("schema validation failed"), "{}", status.message);

    let req = SetRequest {
        prefix: Some(prefix("dev1", "a")),
        replace: vec![replace],
        update: vec![Update::new(
            "/system/config/hostname".parse().unwrap(),
            TypedValue::StringVal("r2".into()),
        )],
        ..Default::default()
    };
    let resp = h.handle(&req).unwrap();
    let ops: Vec<Operation> = resp.response.iter().map(|r| r.op).collect();
    assert_eq!(ops, vec![Operation::Replace, Operation::Update]);

    let entry = cache.entry(&key("dev1", "a")).unwrap();
    assert_eq!(
        entry.running_config(),
        json!({"system": {"config": {"hostname": "r2", "mtu": 9000}}})
    );
}

#[test]
fn batch_delete_of_required_leaf_is_rejected() {
    let cache = system_cache();
    let config = HandlerConfig {
        delete_mode: DeleteMode::MarkDirty,
        ..Default::default()
    };
    let h = handler(cache.clone(), config);

    let req = SetRequest {
        prefix: Some(prefix("dev1", "a")),
        delete: vec!["/system/config/hostname".parse().unwrap()],
        update: vec![Update::new(
            "/system/config/mtu".parse().unwrap(),
            TypedValue::IntVal(9000),
        )],
        ..Default::default()
    };
    let status = h.handle(&req).unwrap_err();
    assert_eq!(status.code, Code::Internal);

    let entry = cache.entry(&key("dev1", "a")).unwrap();
    assert!(!entry.system_cache_status());
    assert_eq!(
        entry.running_config(),
        json!({"system": {"config": {"hostname": "r1", "mtu": 1500}}})
    );
}

#[test]
fn batch_with_frozen_second_entry_leaves_first_untouched() {
    let cache = system_cache();
    cache.entry(&key("dev1", "b")).unwrap().freeze();
    let h = handler(cache.clone(), HandlerConfig::default());

    let hostname = |origin: &str| {
        Update::new(
            format!("{origin}:/system/config/hostname").parse().unwrap(),
            TypedValue::StringVal("r2".into()),
        )
    };
    let req = SetRequest {
        prefix: Some(prefix("dev1", "")),
        update: vec![hostname("a"), hostname("b")],
        ..Default::default()
    };
    let status = h.handle(&req).unwrap_err();
    assert_eq!(status.code, Code::Internal);
    assert!(status.message.contains("frozen"), "{}", status.message);

    for origin in ["a", "b"] {
        let entry = cache.entry(&key("dev1", origin)).unwrap();
        assert!(!entry.system_cache_status(), "{origin} marked dirty");
        assert_eq!(
            entry.running_config(),
            json!({"system": {"config": {"hostname": "r1", "mtu": 1500}}})
        );
    }
}

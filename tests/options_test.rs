//! Tests for option merging, control extraction and digests.

use std::time::Duration;

use serde_json::{Map, Value, json};

use transient_query::config::default_query_args;
use transient_query::{QueryConfig, QueryOptions, TransientKeys, TransientQueryError};

const MONTH: Duration = Duration::from_secs(30 * 24 * 3600);

fn options(value: Value) -> QueryOptions {
    QueryOptions::from_value(value).unwrap()
}

// =========================================================================
// Defaults merge
// =========================================================================

#[test]
fn merge_fills_missing_defaults() {
    let merged = QueryOptions::new().merge_defaults(&default_query_args());
    assert_eq!(merged.as_map(), &default_query_args());
}

#[test]
fn merge_never_overrides_explicit_values() {
    let merged = options(json!({"post_type": "page", "fields": "all"}))
        .merge_defaults(&default_query_args());
    assert_eq!(merged.get("post_type"), Some(&json!("page")));
    assert_eq!(merged.get("fields"), Some(&json!("all")));
    assert_eq!(merged.get("no_found_rows"), Some(&json!(true)));
}

#[test]
fn merge_keys_are_union_of_inputs() {
    let input = options(json!({"posts_per_page": 5, "post_type": "page", "meta": {"k": 1}}));
    let defaults = default_query_args();
    let merged = input.clone().merge_defaults(&defaults);

    for (name, value) in input.as_map() {
        assert_eq!(merged.get(name), Some(value), "explicit {name} dropped");
    }
    for name in merged.as_map().keys() {
        assert!(
            input.get(name).is_some() || defaults.contains_key(name),
            "foreign key {name}"
        );
    }
    assert_eq!(merged.len(), 5);
}

#[test]
fn explicit_null_is_kept() {
    let merged = options(json!({"post_type": null})).merge_defaults(&default_query_args());
    assert_eq!(merged.get("post_type"), Some(&Value::Null));
}

// =========================================================================
// Control options
// =========================================================================

#[test]
fn control_defaults() {
    let resolved = QueryOptions::new().resolve(MONTH).unwrap();
    assert!(!resolved.control.force);
    assert_eq!(resolved.control.expiration, MONTH);
}

#[test]
fn control_options_are_extracted() {
    let resolved = options(json!({"force": true, "expiration": 60, "post_type": "page"}))
        .resolve(MONTH)
        .unwrap();
    assert!(resolved.control.force);
    assert_eq!(resolved.control.expiration, Duration::from_secs(60));
    assert!(resolved.args.get("force").is_none());
    assert!(resolved.args.get("expiration").is_none());
    assert_eq!(resolved.args.get("post_type"), Some(&json!("page")));
}

#[test]
fn null_control_options_take_defaults() {
    let resolved = options(json!({"force": null, "expiration": null}))
        .resolve(MONTH)
        .unwrap();
    assert!(!resolved.control.force);
    assert_eq!(resolved.control.expiration, MONTH);
}

#[test]
fn numeric_string_expiration() {
    let resolved = options(json!({"expiration": "86400"}))
        .resolve(MONTH)
        .unwrap();
    assert_eq!(resolved.control.expiration, Duration::from_secs(86_400));
}

#[test]
fn non_boolean_force_is_rejected() {
    for bad in [json!(1), json!("true"), json!([true])] {
        let err = options(json!({ "force": bad })).resolve(MONTH).unwrap_err();
        assert!(matches!(err, TransientQueryError::InvalidOption { .. }));
    }
}

#[test]
fn non_object_options_are_rejected() {
    assert!(QueryOptions::from_value(json!([1, 2])).is_err());
    assert!(QueryOptions::from_value(json!("post_type=page")).is_err());
    assert!(QueryOptions::from_value(Value::Null).unwrap().is_empty());
}

// =========================================================================
// Digest and keys
// =========================================================================

fn digest_of(options: QueryOptions) -> String {
    options
        .merge_defaults(&default_query_args())
        .resolve(MONTH)
        .unwrap()
        .args
        .digest()
        .unwrap()
}

#[test]
fn digest_is_stable() {
    let a = digest_of(options(json!({"post_type": "page"})));
    let b = digest_of(options(json!({"post_type": "page"})));
    assert_eq!(a, b);
}

#[test]
fn digest_ignores_insertion_order() {
    let forward: QueryOptions = [("a", json!(1)), ("b", json!({"y": 1, "x": 2}))]
        .into_iter()
        .collect();
    let mut reversed_map = Map::new();
    reversed_map.insert("b".into(), json!({"x": 2, "y": 1}));
    reversed_map.insert("a".into(), json!(1));
    assert_eq!(digest_of(forward), digest_of(reversed_map.into()));
}

#[test]
fn digest_ignores_control_options() {
    let plain = digest_of(QueryOptions::new());
    let forced = digest_of(
        QueryOptions::new()
            .force(true)
            .expiration(Duration::from_secs(5)),
    );
    assert_eq!(plain, forced);
}

#[test]
fn explicit_default_values_share_a_digest() {
    assert_eq!(
        digest_of(QueryOptions::new()),
        digest_of(QueryOptions::new().set("post_type", "post"))
    );
}

#[test]
fn digest_differs_on_values() {
    assert_ne!(
        digest_of(QueryOptions::new().set("posts_per_page", 5)),
        digest_of(QueryOptions::new().set("posts_per_page", 6))
    );
}

#[test]
fn keys_share_the_digest() {
    let args = QueryOptions::new().resolve(MONTH).unwrap().args;
    let config = QueryConfig::new()
        .cache_prefix("c-")
        .limit_prefix("l-");
    let keys = TransientKeys::derive(&args, &config).unwrap();
    assert_eq!(keys.cache, format!("c-{}", keys.digest));
    assert_eq!(keys.limit, format!("l-{}", keys.digest));
}

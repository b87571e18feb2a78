//! Tests for [`PostCollection`] — the in-memory post query executor.

use std::io::Write;

use serde_json::{Value, json};

use transient_query::{PostCollection, QueryExecutor, QueryOptions, TransientQueryError};

fn posts() -> PostCollection {
    PostCollection::new(vec![
        json!({"ID": 1, "post_type": "post", "post_status": "publish", "post_title": "One"}),
        json!({"ID": 2, "post_type": "page", "post_status": "publish", "post_title": "Two"}),
        json!({"ID": 3, "post_type": "post", "post_status": "draft", "post_title": "Three"}),
        json!({"ID": 4, "post_type": "post", "post_title": "Four"}),
        json!({"ID": 5, "post_type": "product", "post_status": "publish", "post_title": "Five"}),
    ])
}

async fn run(collection: &PostCollection, options: Value) -> Vec<Value> {
    let args = QueryOptions::from_value(options)
        .unwrap()
        .resolve(std::time::Duration::ZERO)
        .unwrap()
        .args;
    collection.query(&args).await.unwrap()
}

#[tokio::test]
async fn filters_by_post_type_and_published_status() {
    let result = run(&posts(), json!({"post_type": "post", "fields": "ids"})).await;
    assert_eq!(result, vec![json!(1), json!(4)]);
}

#[tokio::test]
async fn post_type_any_and_arrays() {
    let any = run(&posts(), json!({"post_type": "any", "fields": "ids"})).await;
    assert_eq!(any, vec![json!(1), json!(2), json!(4), json!(5)]);

    let some = run(&posts(), json!({"post_type": ["page", "product"], "fields": "ids"})).await;
    assert_eq!(some, vec![json!(2), json!(5)]);
}

#[tokio::test]
async fn post_status_can_be_widened() {
    let drafts = run(
        &posts(),
        json!({"post_type": "post", "post_status": "draft", "fields": "ids"}),
    )
    .await;
    assert_eq!(drafts, vec![json!(3)]);

    let all = run(
        &posts(),
        json!({"post_type": "post", "post_status": "any", "fields": "ids"}),
    )
    .await;
    assert_eq!(all, vec![json!(1), json!(3), json!(4)]);
}

#[tokio::test]
async fn full_records_without_ids_field() {
    let result = run(&posts(), json!({"post_type": "page"})).await;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0]["post_title"], "Two");
}

#[tokio::test]
async fn paging() {
    let many: Vec<Value> = (1..=15)
        .map(|id| json!({"ID": id, "post_type": "post"}))
        .collect();
    let collection = PostCollection::new(many);

    let default_page = run(&collection, json!({"fields": "ids"})).await;
    assert_eq!(default_page.len(), 10);

    let unbounded = run(&collection, json!({"fields": "ids", "posts_per_page": -1})).await;
    assert_eq!(unbounded.len(), 15);

    let nopaging = run(&collection, json!({"fields": "ids", "nopaging": true})).await;
    assert_eq!(nopaging.len(), 15);

    let second = run(
        &collection,
        json!({"fields": "ids", "posts_per_page": "5", "offset": 5}),
    )
    .await;
    assert_eq!(second, (6..=10).map(|id| json!(id)).collect::<Vec<_>>());
}

#[tokio::test]
async fn no_match_is_empty() {
    let result = run(&posts(), json!({"post_type": "attachment"})).await;
    assert!(result.is_empty());
}

#[tokio::test]
async fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"ID": 9, "post_type": "post"}}]"#).unwrap();

    let collection = PostCollection::load(file.path()).await.unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(run(&collection, json!({"fields": "ids"})).await, vec![json!(9)]);
}

#[tokio::test]
async fn load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = PostCollection::load(dir.path().join("posts.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransientQueryError::Executor(_)));
}

#[tokio::test]
async fn load_invalid_json_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{\"not\": \"an array\"}}").unwrap();
    let err = PostCollection::load(file.path()).await.unwrap_err();
    assert!(matches!(err, TransientQueryError::Json(_)));
}

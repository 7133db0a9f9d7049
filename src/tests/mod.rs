use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::controller::Page;
use crate::error::Failure;
use crate::model::{get_next_id, Entity};
use crate::query::{QueryEngine, SortDirection, SortKey};
use crate::remote::{MemoryBackend, RemoteClient};

const BASE: &str = "http://localhost:3000";

fn entities(values: Vec<Value>) -> Vec<Entity> {
    values.into_iter().filter_map(Entity::from_value).collect()
}

fn ids(collection: &[Entity]) -> Vec<String> {
    collection.iter().map(|e| e.id()).collect()
}

fn page_for(backend: Arc<MemoryBackend>) -> Page {
    Page::new(RemoteClient::new(BASE, backend).unwrap())
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn vietnamese_posts() -> Vec<Value> {
    vec![
        json!({"id": "1", "title": "Đèn", "views": "7", "isDeleted": false}),
        json!({"id": "2", "title": "Áo", "views": "10", "isDeleted": false}),
        json!({"id": "3", "title": "bàn", "views": "2", "isDeleted": false}),
        json!({"id": "4", "title": "Ăn", "views": "31", "isDeleted": false}),
        json!({"id": "5", "title": "dao", "views": "5", "isDeleted": false}),
    ]
}

#[test]
fn empty_search_is_identity() {
    let collection = entities(vietnamese_posts());
    let engine = QueryEngine::default();
    assert_eq!(engine.search(&collection, ""), collection);
    assert_eq!(engine.search(&collection, "   "), collection);
}

#[test]
fn descending_reverses_ascending_for_distinct_keys() {
    let collection = entities(vietnamese_posts());
    let engine = QueryEngine::default();
    for key in [SortKey::text("title"), SortKey::numeric("views")] {
        let asc = engine.sort(&collection, &key, SortDirection::Asc);
        let desc = engine.sort(&asc, &key, SortDirection::Desc);
        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
    }
}

#[test]
fn text_sort_follows_vietnamese_alphabet() {
    let collection = entities(vietnamese_posts());
    let sorted = QueryEngine::default().sort(&collection, &SortKey::text("title"), SortDirection::Asc);
    assert_eq!(ids(&sorted), vec!["2", "4", "3", "5", "1"]);
}

#[test]
fn next_id_examples() {
    assert_eq!(get_next_id(&[]), "1");
    let collection = entities(vec![json!({"id": "2"}), json!({"id": "5"})]);
    assert_eq!(get_next_id(&collection), "6");
}

#[tokio::test]
async fn soft_delete_then_restore_touches_only_the_flag() {
    let backend = Arc::new(MemoryBackend::new().with_collection("posts", vietnamese_posts()));
    let page = page_for(backend.clone());
    page.load("posts").await.unwrap();
    let before = backend.collection("posts").await;

    page.soft_delete("posts", "2").await.unwrap();
    assert!(page.get("posts", "2").await.unwrap().is_deleted());
    page.restore("posts", "2").await.unwrap();

    assert_eq!(backend.collection("posts").await, before);
    assert_eq!(page.snapshot("posts").await, entities(before));
}

#[tokio::test]
async fn server_error_keeps_previous_collection() {
    let backend = Arc::new(MemoryBackend::new().with_collection("posts", vietnamese_posts()));
    let page = page_for(backend.clone());
    page.load("posts").await.unwrap();
    let before = page.snapshot("posts").await;

    backend.fail_with("posts", 500).await;
    let err = page.load("posts").await.unwrap_err();
    assert_eq!(err, Failure::HttpStatus { code: 500 });
    assert_eq!(page.snapshot("posts").await, before);

    let markup = page.render("posts").await;
    assert!(markup.starts_with("<div class=\"error\">"));
    assert!(markup.contains("<small>HTTP 500</small>"));

    backend.recover("posts").await;
    page.load("posts").await.unwrap();
    assert!(page.render("posts").await.starts_with("<table"));
}

#[tokio::test]
async fn deleted_row_shows_badge_and_restore() {
    let backend = Arc::new(MemoryBackend::new().with_collection(
        "posts",
        vec![json!({"id": "1", "title": "Áo", "views": "10", "isDeleted": false})],
    ));
    let page = page_for(backend);
    page.load("posts").await.unwrap();
    page.soft_delete("posts", "1").await.unwrap();

    assert!(page.get("posts", "1").await.unwrap().is_deleted());
    let markup = page.render("posts").await;
    assert_eq!(markup.matches("<tr").count(), 2);
    assert_eq!(markup.matches("<tr class=\"deleted\">").count(), 1);
    assert!(markup.contains(">Deleted</span>"));
    assert!(markup.contains(r#"data-action="restore" data-id="1""#));
    assert!(!markup.contains(r#"data-action="delete""#));
    assert!(markup.contains("Áo"));
}

#[tokio::test]
async fn overlapping_mutations_on_one_resource_do_not_interleave() {
    let backend = Arc::new(
        MemoryBackend::new()
            .with_collection("posts", vietnamese_posts())
            .with_latency(Duration::from_millis(10)),
    );
    let page = page_for(backend.clone());
    page.load("posts").await.unwrap();

    let (first, updated, second) = tokio::join!(
        page.soft_delete("posts", "1"),
        page.update("posts", "3", fields(json!({"views": "99"}))),
        page.soft_delete("posts", "4"),
    );
    first.unwrap();
    updated.unwrap();
    second.unwrap();

    let log = backend.requests().await;
    assert_eq!(log.len(), 7);
    for pair in log[1..].chunks(2) {
        assert!(pair[0].starts_with("PATCH /posts/"), "{pair:?}");
        assert_eq!(pair[1], "GET /posts");
    }

    let snapshot = page.snapshot("posts").await;
    let deleted: Vec<String> = snapshot
        .iter()
        .filter(|e| e.is_deleted())
        .map(|e| e.id())
        .collect();
    assert_eq!(deleted, vec!["1", "4"]);
    assert_eq!(page.get("posts", "3").await.unwrap().text("views").as_deref(), Some("99"));
}

#[tokio::test]
async fn static_document_renders_products() {
    let url = "https://static.example/db.json";
    let backend = Arc::new(MemoryBackend::new());
    backend
        .serve_document(
            url,
            json!({
                "meta": {"count": 2},
                "products": [
                    {"id": 1, "title": "Laptop", "price": 1299.5, "category": {"name": "Tech"},
                     "description": "A".repeat(60), "images": ["https://img.example/1.png"]},
                    {"id": 2, "title": "Mug", "price": "8", "description": "short"}
                ]
            }),
        )
        .await;
    let page = page_for(backend);
    assert_eq!(page.load_document("products", url).await.unwrap(), 2);

    let markup = page.render("products").await;
    assert!(markup.contains("$1,299.5"));
    assert!(markup.contains("$8"));
    assert!(markup.contains(&format!("{}...", "A".repeat(50))));
    assert!(markup.contains(">short<"));
    assert!(markup.contains("No image"));
    assert!(markup.contains(">N/A<"));
    assert!(!markup.contains("Restore"));
}

#[tokio::test]
async fn document_without_known_key_is_a_validation_error() {
    let url = "https://static.example/odd.json";
    let backend = Arc::new(MemoryBackend::new());
    backend.serve_document(url, json!({"records": []})).await;
    let page = page_for(backend);
    let err = page.load_document("products", url).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(page.render("products").await.contains("<div class=\"error\">"));
}

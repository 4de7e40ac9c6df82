//! End-to-end HTTP API tests against a server on an ephemeral port.

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use studyhub_core::catalog::Catalog;
use studyhub_server::{router, StateStore};

/// Spawn the API on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let store = Arc::new(StateStore::in_memory(Arc::new(Catalog::builtin())));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(store)).await.unwrap();
    });
    format!("http://{addr}")
}

fn client_id() -> String {
    Uuid::new_v4().to_string()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let base = spawn_server().await;
    let resp = reqwest::get(format!("{base}/api/")).await.unwrap();
    assert!(resp.status().is_success());
}

#[tokio::test]
async fn branches_list_and_lookup() {
    let base = spawn_server().await;

    let branches: Vec<Value> = reqwest::get(format!("{base}/api/branches"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(branches.len(), 6);
    assert!(branches[0].get("keyIdeas").is_some());

    let branch: Value = reqwest::get(format!("{base}/api/branches/cognitive"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(branch["name"], "Cognitive Psychology");

    let resp = reqwest::get(format!("{base}/api/branches/phrenology"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("phrenology"));
}

#[tokio::test]
async fn fresh_client_state_is_empty() {
    let base = spawn_server().await;
    let id = client_id();
    let state: Value = reqwest::get(format!("{base}/api/state/{id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["client_id"], id.as_str());
    assert_eq!(state["bookmarks"], json!({}));
    assert_eq!(state["tasks"], json!({}));
    assert_eq!(state["quiz"], json!({}));
    assert_eq!(state["notes"], "");
}

#[tokio::test]
async fn bookmark_put_echoes_and_persists() {
    let base = spawn_server().await;
    let id = client_id();
    let http = reqwest::Client::new();

    let ack: Value = http
        .put(format!("{base}/api/state/{id}/bookmarks/social"))
        .json(&json!({ "bookmarked": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ack, json!({ "slug": "social", "bookmarked": true }));

    let state: Value = http
        .get(format!("{base}/api/state/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["bookmarks"]["social"], true);
}

#[tokio::test]
async fn tasks_lazy_init_then_round_trip() {
    let base = spawn_server().await;
    let id = client_id();
    let http = reqwest::Client::new();

    let tasks: Vec<Value> = http
        .get(format!("{base}/api/state/{id}/tasks/methods"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!tasks.is_empty());
    assert_eq!(tasks[0]["done"], false);

    let replacement = json!({ "tasks": [{ "text": "only task", "done": true }] });
    let resp = http
        .put(format!("{base}/api/state/{id}/tasks/methods"))
        .json(&replacement)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let tasks: Vec<Value> = http
        .get(format!("{base}/api/state/{id}/tasks/methods"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tasks, vec![json!({ "text": "only task", "done": true })]);
}

#[tokio::test]
async fn quiz_best_is_overwritten_verbatim() {
    let base = spawn_server().await;
    let id = client_id();
    let http = reqwest::Client::new();

    for best in [40, 10] {
        let ack: Value = http
            .put(format!("{base}/api/state/{id}/quiz/clinical"))
            .json(&json!({ "best": best }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(ack["best"], best);
    }

    let quiz: Value = http
        .get(format!("{base}/api/state/{id}/quiz"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["clinical"]["best"], 10);
}

#[tokio::test]
async fn notes_round_trip() {
    let base = spawn_server().await;
    let id = client_id();
    let http = reqwest::Client::new();

    let notes: Value = http
        .get(format!("{base}/api/state/{id}/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(notes, json!({ "notes": "" }));

    http.put(format!("{base}/api/state/{id}/notes"))
        .json(&json!({ "notes": "ZPD ≠ scaffolding" }))
        .send()
        .await
        .unwrap();

    let notes: Value = http
        .get(format!("{base}/api/state/{id}/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(notes["notes"], "ZPD ≠ scaffolding");
}

#[tokio::test]
async fn writes_against_unknown_slug_are_404() {
    let base = spawn_server().await;
    let id = client_id();
    let http = reqwest::Client::new();

    let resp = http
        .put(format!("{base}/api/state/{id}/bookmarks/phrenology"))
        .json(&json!({ "bookmarked": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = http
        .put(format!("{base}/api/state/{id}/quiz/phrenology"))
        .json(&json!({ "best": 50 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn malformed_body_is_400() {
    let base = spawn_server().await;
    let id = client_id();
    let http = reqwest::Client::new();

    let resp = http
        .put(format!("{base}/api/state/{id}/notes"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Wrong shape (missing field) is a validation error too.
    let resp = http
        .put(format!("{base}/api/state/{id}/bookmarks/social"))
        .json(&json!({ "starred": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

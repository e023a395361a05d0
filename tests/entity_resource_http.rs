//! End-to-end checks of the resource surface over a real socket.
//!
//! Every test serves its own router on an ephemeral port, backed by a fresh
//! in-memory store, and drives it with reqwest.

use entity_crud_service::transport::http::{create_router, AppState};
use entity_crud_service::{EntityRegistry, InMemoryDocumentStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

const APP: &str = "testApp";
const MERGE_PATCH: &str = "application/merge-patch+json";

struct TestServer {
    base_url: String,
    client: Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let state = AppState::new(store, EntityRegistry::standard(), APP);
        let router = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, path: &str, body: Value) -> Value {
        let resp = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }

    async fn total(&self, path: &str) -> u64 {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.headers()["x-total-count"].to_str().unwrap().parse().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn header<'a>(resp: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn create_assigns_id_and_reports_location() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/api/cron-schedulers"))
        .json(&json!({ "name": "nightly", "cronExpression": "0 0 * * *" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let location = header(&resp, "location").unwrap().to_string();
    let alert = header(&resp, "x-testapp-alert").unwrap().to_string();
    let params = header(&resp, "x-testapp-params").unwrap().to_string();
    let body: Value = resp.json().await.unwrap();

    let id = body["id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(location, format!("/api/cron-schedulers/{}", id));
    assert!(alert.contains("cronScheduler"));
    assert_eq!(params, id);
    assert_eq!(body["name"], "nightly");
    assert_eq!(body["cronExpression"], "0 0 * * *");

    let fetched: Value = server
        .client
        .get(server.url(&location))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn create_rejects_client_supplied_id_without_writing() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/api/users"))
        .json(&json!({ "id": "abc", "name": "ann" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.idexists"));
    assert_eq!(header(&resp, "x-testapp-params"), Some("user"));

    assert_eq!(server.total("/api/users").await, 0);
}

#[tokio::test]
async fn missing_required_field_is_rejected_before_any_write() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/api/traffic-data"))
        .json(&json!({ "rank": "A", "impressions": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.validation"));

    let resp = server
        .client
        .post(server.url("/api/cron-schedulers"))
        .json(&json!({ "name": null, "cronExpression": "* * * * *" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(server.total("/api/traffic-data").await, 0);
    assert_eq!(server.total("/api/cron-schedulers").await, 0);
}

#[tokio::test]
async fn malformed_body_and_wrong_media_type_are_client_errors() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/api/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.invalidbody"));

    let resp = server
        .client
        .post(server.url("/api/users"))
        .header("content-type", "text/plain")
        .body(r#"{"name":"ann"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn full_update_guards_id_and_replaces_wholesale() {
    let server = TestServer::start().await;
    let created = server
        .create(
            "/api/traffic-data",
            json!({ "rank": "A", "impressions": 100, "clicks": 7, "date": "2024-03-01" }),
        )
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    let item = server.url(&format!("/api/traffic-data/{}", id));

    // No id in the body.
    let resp = server.client.put(&item).json(&json!({ "clicks": 1 })).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.idnull"));

    // Body id differs from the path id.
    let resp = server
        .client
        .put(&item)
        .json(&json!({ "id": "000000000000000000000000", "clicks": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.idinvalid"));

    // Consistent ids, but nothing stored under them.
    let ghost = "0123456789abcdef01234567";
    let resp = server
        .client
        .put(server.url(&format!("/api/traffic-data/{}", ghost)))
        .json(&json!({ "id": ghost, "clicks": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.idnotfound"));
    assert_eq!(server.total("/api/traffic-data").await, 1);

    // Success: omitted fields are cleared, not merged.
    let resp = server
        .client
        .put(&item)
        .json(&json!({ "id": id, "clicks": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-testapp-params"), Some(id.as_str()));
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["clicks"], 9);

    let stored: Value = server.client.get(&item).send().await.unwrap().json().await.unwrap();
    assert_eq!(stored["clicks"], 9);
    assert!(stored.get("rank").map_or(true, Value::is_null));
    assert!(stored.get("impressions").map_or(true, Value::is_null));
    assert!(stored.get("date").map_or(true, Value::is_null));
}

#[tokio::test]
async fn full_update_missing_required_field_leaves_record_untouched() {
    let server = TestServer::start().await;
    let created = server
        .create("/api/traffic-data", json!({ "rank": "A", "clicks": 7 }))
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    let item = server.url(&format!("/api/traffic-data/{}", id));

    let resp = server
        .client
        .put(&item)
        .json(&json!({ "id": id, "rank": "B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.validation"));

    let stored: Value = server.client.get(&item).send().await.unwrap().json().await.unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn merge_patch_guards_body_id() {
    let server = TestServer::start().await;
    let created = server.create("/api/users", json!({ "name": "ann" })).await;
    let id = created["id"].as_str().unwrap().to_string();
    let item = server.url(&format!("/api/users/{}", id));

    let resp = server
        .client
        .patch(&item)
        .header("content-type", MERGE_PATCH)
        .body(json!({ "email": "a@b.c" }).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.idnull"));

    let resp = server
        .client
        .patch(&item)
        .header("content-type", MERGE_PATCH)
        .body(json!({ "id": "000000000000000000000000", "email": "a@b.c" }).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.idinvalid"));

    let stored: Value = server.client.get(&item).send().await.unwrap().json().await.unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn merge_patch_overwrites_only_present_fields() {
    let server = TestServer::start().await;
    let created = server
        .create(
            "/api/traffic-data",
            json!({ "rank": "A", "impressions": 100, "clicks": 7, "date": "2024-03-01" }),
        )
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    let resp = server
        .client
        .patch(server.url(&format!("/api/traffic-data/{}", id)))
        .header("content-type", MERGE_PATCH)
        .body(json!({ "id": id, "clicks": 9, "rank": null }).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let merged: Value = resp.json().await.unwrap();

    assert_eq!(merged["id"], id);
    assert_eq!(merged["rank"], "A");
    assert_eq!(merged["impressions"], 100);
    assert_eq!(merged["clicks"], 9);
    assert_eq!(merged["date"], "2024-03-01");

    let stored: Value = server
        .client
        .get(server.url(&format!("/api/traffic-data/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored, merged);
}

#[tokio::test]
async fn merge_patch_of_unknown_id_is_rejected() {
    let server = TestServer::start().await;
    let ghost = "0123456789abcdef01234567";

    let resp = server
        .client
        .patch(server.url(&format!("/api/users/{}", ghost)))
        .header("content-type", MERGE_PATCH)
        .body(json!({ "id": ghost, "email": "a@b.c" }).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.idnotfound"));
    assert_eq!(server.total("/api/users").await, 0);
}

#[tokio::test]
async fn update_verbs_on_collection_path_are_not_allowed() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .put(server.url("/api/users"))
        .json(&json!({ "name": "ann" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = server
        .client
        .patch(server.url("/api/users"))
        .header("content-type", MERGE_PATCH)
        .body(r#"{"name":"ann"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn get_one_returns_404_for_unknown_id() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .get(server.url("/api/cron-schedulers/0123456789abcdef01234567"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn buffered_and_streamed_lists_carry_the_same_records() {
    let server = TestServer::start().await;
    for n in 0..4 {
        server
            .create("/api/users", json!({ "name": format!("user-{}", n), "email": format!("u{}@example.com", n) }))
            .await;
    }

    let resp = server
        .client
        .get(server.url("/api/users?sort=id,desc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-total-count"), Some("4"));
    let buffered: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(buffered.len(), 4);

    let ids: Vec<&str> = buffered.iter().map(|u| u["id"].as_str().unwrap()).collect();
    let mut expected = ids.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, expected);

    let resp = server
        .client
        .get(server.url("/api/users?sort=id,desc"))
        .header("accept", "application/x-ndjson")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), Some("application/x-ndjson"));
    let text = resp.text().await.unwrap();
    let streamed: Vec<Value> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(streamed, buffered);
}

#[tokio::test]
async fn unknown_sort_field_is_a_bad_request() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .get(server.url("/api/users?sort=shoeSize,asc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "x-testapp-error"), Some("error.invalidsort"));

    let resp = server
        .client
        .get(server.url("/api/users?sort=name,sideways"))
        .header("accept", "application/x-ndjson")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_answers_204_whether_or_not_the_record_existed() {
    let server = TestServer::start().await;
    let created = server.create("/api/users", json!({ "name": "ann" })).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(server.total("/api/users").await, 1);

    let resp = server
        .client
        .delete(server.url(&format!("/api/users/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(header(&resp, "x-testapp-params"), Some(id.as_str()));
    assert_eq!(server.total("/api/users").await, 0);

    let resp = server
        .client
        .delete(server.url(&format!("/api/users/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.total("/api/users").await, 0);
}

#[tokio::test]
async fn entity_families_do_not_share_collections() {
    let server = TestServer::start().await;
    server.create("/api/users", json!({ "name": "ann" })).await;
    server.create("/api/traffic-data", json!({ "clicks": 1 })).await;

    assert_eq!(server.total("/api/users").await, 1);
    assert_eq!(server.total("/api/traffic-data").await, 1);
    assert_eq!(server.total("/api/cron-schedulers").await, 0);
}

#[tokio::test]
async fn health_reports_registered_collections() {
    let server = TestServer::start().await;

    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(
        body["data"]["collections"],
        json!(["cron_scheduler", "traffic_data", "users"])
    );
}

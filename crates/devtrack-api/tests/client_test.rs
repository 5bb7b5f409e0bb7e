#![allow(clippy::unwrap_used)]
// Integration tests for `DeviationClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devtrack_api::{
    CreateDeviation, DeviationClient, DeviationPriority, DeviationStatus, Error, ListParams,
    SortOrder, UpdateDeviation,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviationClient) {
    let server = MockServer::start().await;
    let client =
        DeviationClient::with_client(reqwest::Client::new(), &format!("{}/api", server.uri()))
            .unwrap();
    (server, client)
}

fn deviation_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Observed during the morning inspection round",
        "status": "open",
        "priority": "medium",
        "category": "Process",
        "createdBy": "alice",
        "createdAt": "2026-03-01T08:00:00Z",
        "updatedAt": "2026-03-01T08:00:00Z"
    })
}

// ── List ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_without_params_sends_no_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deviations"))
        .and(query_param_is_missing("page"))
        .and(query_param_is_missing("status"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [deviation_json("d1", "Pump Leak"), deviation_json("d2", "Valve")],
            "total": 2,
            "page": 1,
            "pageSize": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.list(None).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.page_size, 25);
    let ids: Vec<_> = page.data.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);
}

#[tokio::test]
async fn test_list_sends_only_present_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deviations"))
        .and(query_param("page", "2"))
        .and(query_param("status", "in_progress"))
        .and(query_param("sortOrder", "desc"))
        .and(query_param_is_missing("pageSize"))
        .and(query_param_is_missing("priority"))
        .and(query_param_is_missing("search"))
        .and(query_param_is_missing("sortBy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "total": 0,
            "page": 2,
            "pageSize": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = ListParams {
        page: Some(2),
        status: Some(DeviationStatus::InProgress),
        sort_order: Some(SortOrder::Desc),
        ..ListParams::default()
    };
    let page = client.list(Some(&params)).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.page, 2);
}

// ── Get ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deviations/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Deviation not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_deviation("missing").await.unwrap_err();
    assert!(err.is_not_found(), "expected 404, got: {err:?}");
    assert_eq!(err.server_message(), Some("Deviation not found"));
}

#[tokio::test]
async fn test_get_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deviations/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get_deviation("d1").await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Create / update / delete ────────────────────────────────────────

#[tokio::test]
async fn test_create_posts_payload_without_absent_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/deviations"))
        .and(body_json(json!({
            "title": "Pump Leak",
            "description": "Oil pooling under pump 3",
            "priority": "high",
            "category": "Equipment",
            "tags": []
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(deviation_json("d9", "Pump Leak")))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create(&CreateDeviation {
            title: "Pump Leak".into(),
            description: "Oil pooling under pump 3".into(),
            priority: DeviationPriority::High,
            category: "Equipment".into(),
            assigned_to: None,
            due_date: None,
            tags: Some(vec![]),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "d9");
}

#[tokio::test]
async fn test_create_validation_error_without_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/deviations"))
        .respond_with(ResponseTemplate::new(422).set_body_string("Unprocessable"))
        .mount(&server)
        .await;

    let err = client
        .create(&CreateDeviation {
            title: "abc".into(),
            description: "0123456789".into(),
            priority: DeviationPriority::Low,
            category: "x".into(),
            assigned_to: None,
            due_date: None,
            tags: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn test_update_uses_patch() {
    let (server, client) = setup().await;

    let mut updated = deviation_json("d1", "Pump Leak");
    updated["status"] = json!("closed");

    Mock::given(method("PATCH"))
        .and(path("/api/deviations/d1"))
        .and(body_json(json!({ "status": "closed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .update(
            "d1",
            &UpdateDeviation {
                status: Some(DeviationStatus::Closed),
                ..UpdateDeviation::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(result.status, DeviationStatus::Closed);
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/deviations/d1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_deviation("d1").await.unwrap();
}

#[tokio::test]
async fn test_delete_encodes_id_segment() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/deviations/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_deviation("a/b").await.unwrap();
}

// ── Stats ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stats() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deviations/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 5,
            "byStatus": { "open": 3, "closed": 2 },
            "byPriority": { "high": 1, "low": 4 }
        })))
        .mount(&server)
        .await;

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.by_status.get(&DeviationStatus::Open), Some(&3));
    assert_eq!(stats.by_priority.get(&DeviationPriority::Low), Some(&4));
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    let client =
        DeviationClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9/api").unwrap();
    let err = client.stats().await.unwrap_err();
    assert!(err.is_connect(), "expected connect error, got: {err:?}");
    assert!(err.is_transient());
}

use remote::{HttpWebhookSink, RestAssignmentStore, RestClient, RestConfig, RestMessageStore};
use std::time::Duration;
use wiremock::matchers::{body_json, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use workspace_core::{
    AgentKey, AssignmentStore, MessageStore, Tool, WebhookSink, WorkspaceId,
};

fn client_for(server: &MockServer) -> RestClient {
    RestClient::new(&RestConfig {
        base_url: server.uri(),
        api_key: "anon-key".to_string(),
        ..RestConfig::default()
    })
}

#[tokio::test]
async fn test_fetch_returns_first_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/agent_assignments"))
        .and(query_param("workspace_id", "eq.ws-1"))
        .and(query_param("limit", "1"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            serde_json::json!([
                {"workspace_id": "ws-1", "leo": "apollo", "mike": null, "extra_column": 3}
            ])
            .to_string(),
            "application/json",
        ))
        .mount(&server)
        .await;

    let store = RestAssignmentStore::new(client_for(&server), "agent_assignments");
    let row = store
        .fetch(&WorkspaceId::from("ws-1"))
        .await
        .expect("fetch row")
        .expect("row present");
    assert_eq!(row.get(AgentKey::Leo), Some("apollo"));
    assert_eq!(row.get(AgentKey::Mike), None);
}

#[tokio::test]
async fn test_fetch_missing_row_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/agent_assignments"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let store = RestAssignmentStore::new(client_for(&server), "agent_assignments");
    assert_eq!(store.fetch(&WorkspaceId::from("ws-1")).await.unwrap(), None);
}

#[tokio::test]
async fn test_fetch_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/agent_assignments"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = RestAssignmentStore::new(client_for(&server), "agent_assignments");
    let err = store.fetch(&WorkspaceId::from("ws-1")).await.unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("Assignment fetch failed"));
}

#[tokio::test]
async fn test_upsert_sends_single_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/agent_assignments"))
        .and(query_param("on_conflict", "workspace_id"))
        .and(headers("prefer", vec!["resolution=merge-duplicates", "return=minimal"]))
        .and(body_json(serde_json::json!({"workspace_id": "ws-1", "nina": "Google Calendar"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = RestAssignmentStore::new(client_for(&server), "agent_assignments");
    store
        .upsert_field(&WorkspaceId::from("ws-1"), AgentKey::Nina, Some(Tool::GoogleCalendar))
        .await
        .expect("upsert");
}

#[tokio::test]
async fn test_create_empty_sends_only_workspace_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/agent_assignments"))
        .and(body_json(serde_json::json!({"workspace_id": "ws-9"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = RestAssignmentStore::new(client_for(&server), "agent_assignments");
    store.create_empty(&WorkspaceId::from("ws-9")).await.unwrap();
}

#[tokio::test]
async fn test_messages_since_filters_by_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/chat_messages"))
        .and(query_param("workspace_id", "eq.ws-1"))
        .and(query_param("order", "created_at.asc"))
        .and(query_param("created_at", "gte.2025-01-01T10:00:00.000000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            serde_json::json!([{
                "id": 7,
                "workspace_id": "ws-1",
                "author": "ana",
                "body": "@mike use lemlist",
                "created_at": "2025-01-01T10:00:05Z"
            }])
            .to_string(),
            "application/json",
        ))
        .mount(&server)
        .await;

    let store = RestMessageStore::new(client_for(&server), "chat_messages");
    let after = chrono::DateTime::parse_from_rfc3339("2025-01-01T10:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let messages = store
        .messages_since(&WorkspaceId::from("ws-1"), Some(after))
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, 7);
    assert_eq!(messages[0].body, "@mike use lemlist");
}

#[tokio::test]
async fn test_webhook_sends_organization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/step-1"))
        .and(header("x-organization-id", "org-42"))
        .and(body_json(serde_json::json!({"target_count": "500"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ignored", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = HttpWebhookSink::new(Duration::from_secs(2));
    sink.post_json(
        &format!("{}/hooks/step-1", server.uri()),
        "org-42",
        &serde_json::json!({"target_count": "500"}),
    )
    .await
    .expect("delivered");
}

#[tokio::test]
async fn test_webhook_failure_is_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = HttpWebhookSink::new(Duration::from_secs(2));
    let err = sink
        .post_json(&format!("{}/hooks/final", server.uri()), "org-1", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(err.is_alert());
}

#[tokio::test]
async fn test_webhook_timeout_is_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let sink = HttpWebhookSink::new(Duration::from_millis(50));
    let err = sink
        .post_json(&format!("{}/slow", server.uri()), "org-1", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(err.is_alert());
}

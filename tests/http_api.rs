#![allow(clippy::panic, missing_docs)]

mod common;

use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

async fn gateway(upstream_url: String) -> String {
    let Some(addr) = common::spawn_gateway(upstream_url).await else {
        panic!("gateway failed to start");
    };
    format!("http://{addr}")
}

async fn post_json(url: &str, body: Value) -> (u16, Value) {
    let Ok(resp) = reqwest::Client::new().post(url).json(&body).send().await else {
        panic!("request to {url} failed");
    };
    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_and_config_endpoints() {
    let base = gateway("http://127.0.0.1:9/".to_string()).await;

    let Ok(resp) = reqwest::get(format!("{base}/health")).await else {
        panic!("health failed");
    };
    assert_eq!(resp.status().as_u16(), 200);

    let Ok(theme) = reqwest::get(format!("{base}/config/theme")).await else {
        panic!("theme failed");
    };
    let theme = theme.json::<Value>().await.unwrap_or(Value::Null);
    assert_eq!(theme["theme"], "light");

    let Ok(policy) = reqwest::get(format!("{base}/config/realtime")).await else {
        panic!("policy failed");
    };
    let policy = policy.json::<Value>().await.unwrap_or(Value::Null);
    assert_eq!(policy["reconnectionAttempts"], 5);
    assert_eq!(policy["reconnectionDelay"], 1_000);
    assert_eq!(policy["reconnectionDelayMax"], 5_000);
    assert_eq!(policy["timeout"], 10_000);
    assert_eq!(policy["transports"], json!(["websocket", "polling"]));

    let Ok(events) = reqwest::get(format!("{base}/config/events")).await else {
        panic!("events failed");
    };
    let events = events.json::<Value>().await.unwrap_or(Value::Null);
    assert_eq!(events.as_array().map(Vec::len), Some(21));
}

#[tokio::test]
async fn session_routing_navigates_once() {
    let base = gateway("http://127.0.0.1:9/".to_string()).await;

    let (status, opened) = post_json(&format!("{base}/api/v1/sessions"), json!({})).await;
    assert_eq!(status, 201);
    let Some(id) = opened["session_id"].as_str().map(str::to_string) else {
        panic!("no session id in {opened}");
    };
    let route = format!("{base}/api/v1/sessions/{id}/route");

    let (_, body) = post_json(
        &route,
        json!({ "user": { "id": "c-1", "role": "COLLECTION_AGENT" }, "isLoading": true }),
    )
    .await;
    assert_eq!(body["state"], "loading");
    assert!(body.get("destination").is_none());

    let agent = json!({ "user": { "id": "c-1", "role": "COLLECTION_AGENT" }, "isLoading": false });
    let (_, body) = post_json(&route, agent.clone()).await;
    assert_eq!(body["state"], "navigate");
    assert_eq!(body["destination"], "/collection-agent");

    let (_, body) = post_json(&route, agent).await;
    assert_eq!(body["state"], "navigated");
    assert_eq!(body["destination"], "/collection-agent");

    let (_, body) = post_json(&route, json!({ "isLoading": false })).await;
    assert_eq!(body["state"], "navigate");
    assert_eq!(body["destination"], "/login");
}

#[tokio::test]
async fn unknown_role_and_unknown_session() {
    let base = gateway("http://127.0.0.1:9/".to_string()).await;

    let (_, opened) = post_json(&format!("{base}/api/v1/sessions"), json!({})).await;
    let id = opened["session_id"].as_str().unwrap_or_default().to_string();
    let (_, body) = post_json(
        &format!("{base}/api/v1/sessions/{id}/route"),
        json!({ "user": { "id": "x", "role": "AUDITOR" }, "isLoading": false }),
    )
    .await;
    assert_eq!(body["destination"], "/login");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = post_json(
        &format!("{base}/api/v1/sessions/{missing}/route"),
        json!({ "isLoading": false }),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn publishing_validates_event_names() {
    let base = gateway("http://127.0.0.1:9/".to_string()).await;
    let url = format!("{base}/api/v1/events");

    let alert = json!({ "event": "risk:alert", "data": { "score": 91 } });
    let (status, body) = post_json(&url, alert).await;
    assert_eq!(status, 202);
    assert_eq!(body["message"]["event"], "risk:alert");

    let (status, body) = post_json(&url, json!({ "event": "risk:panic" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], 1002);

    let (status, _) = post_json(&url, json!({ "event": "connect" })).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn subscription_proxy_relays_upstream_answer() {
    let upstream = Router::new().route(
        "/subscriptions",
        post(|Json(body): Json<Value>| async move {
            (
                axum::http::StatusCode::CREATED,
                Json(json!({ "success": true, "echo": body })),
            )
        }),
    );
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(upstream_addr) = listener.local_addr() else {
        panic!("no addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });

    let base = gateway(format!("http://{upstream_addr}/subscriptions")).await;
    let (status, body) = post_json(
        &format!("{base}/api/subscription"),
        json!({ "email": "a@example.com", "plan": "pro" }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["echo"]["plan"], "pro");
}

#[tokio::test]
async fn subscription_proxy_failure_envelope() {
    let port = common::closed_port().await;
    let base = gateway(format!("http://127.0.0.1:{port}/subscriptions")).await;
    let (status, body) =
        post_json(&format!("{base}/api/subscription"), json!({ "plan": "pro" })).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "success": false, "message": "Failed to subscribe" }));
}

async fn serve_upstream(upstream: Router) -> String {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });
    format!("http://{addr}/subscriptions")
}

#[tokio::test]
async fn subscription_proxy_rejects_non_json_upstream_body() {
    let upstream = Router::new().route(
        "/subscriptions",
        post(|| async { ([("content-type", "text/plain")], "created, thanks") }),
    );
    let base = gateway(serve_upstream(upstream).await).await;
    let (status, body) =
        post_json(&format!("{base}/api/subscription"), json!({ "plan": "pro" })).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "success": false, "message": "Failed to subscribe" }));
}

#[tokio::test]
async fn subscription_proxy_relays_upstream_rejection() {
    let upstream = Router::new().route(
        "/subscriptions",
        post(|| async {
            (
                axum::http::StatusCode::CONFLICT,
                Json(json!({ "success": false, "message": "dup" })),
            )
        }),
    );
    let base = gateway(serve_upstream(upstream).await).await;
    let (status, body) = post_json(
        &format!("{base}/api/subscription"),
        json!({ "email": "a@example.com" }),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body, json!({ "success": false, "message": "dup" }));
}

#[tokio::test]
async fn publishing_rejects_blank_event() {
    let base = gateway("http://127.0.0.1:9/".to_string()).await;
    let (status, body) =
        post_json(&format!("{base}/api/v1/events"), json!({ "event": "" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn session_limit_evicts_least_recently_used() {
    let mut config = common::test_config("http://127.0.0.1:9/".to_string());
    config.max_sessions = 2;
    let Some(addr) = common::spawn_gateway_with(config).await else {
        panic!("gateway failed to start");
    };
    let base = format!("http://{addr}");

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (status, opened) = post_json(&format!("{base}/api/v1/sessions"), json!({})).await;
        assert_eq!(status, 201);
        ids.push(opened["session_id"].as_str().unwrap_or_default().to_string());
    }

    let mut statuses = Vec::new();
    for id in &ids {
        let (status, _) = post_json(
            &format!("{base}/api/v1/sessions/{id}/route"),
            json!({ "isLoading": true }),
        )
        .await;
        statuses.push(status);
    }
    assert_eq!(statuses, vec![404, 200, 200]);
}

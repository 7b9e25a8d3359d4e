//! End-to-end tests for the HTTP API.
//!
//! Each test spins up the full Axum router on a random local port with the
//! fixture catalog loaded; no external services are needed.

use apigov::config::AppConfig;
use apigov::services::catalog::Catalog;
use apigov::AppState;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

const CURL: &str = r#"curl 'https://api.shop.test/v1/orders?page=2&customer=c-77' -X POST -H 'Content-Type: application/json' -H 'Authorization: Bearer t0k3n' -d '{"order":{"sku":"A-1","qty":2},"note":"gift"}'"#;

/// Spin up the app on a random port, returning the base URL and a handle
/// to stop the server.
async fn start_server(config: AppConfig) -> (String, tokio::task::JoinHandle<()>) {
    let catalog = Catalog::from_json(include_str!("fixtures/catalog.json")).expect("catalog");
    let state = AppState::new(config, catalog);
    let app = apigov::routes::router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (base_url, handle)
}

/// Helper: extract `data` from the API envelope, panic with message on error.
fn extract_data(body: &Value) -> &Value {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        panic!(
            "API error: {}: {}",
            err["code"].as_str().unwrap_or("?"),
            err["message"].as_str().unwrap_or("?"),
        );
    }
    body.get("data").expect("missing 'data' field")
}

fn sample_response() -> Value {
    json!({
        "status": 201,
        "status_text": "Created",
        "headers": {
            "Content-Type": "application/json",
            "Set-Cookie": "sid=9f2; Path=/; HttpOnly"
        },
        "body": "{\"id\":\"ord-1\",\"customer\":{\"email\":\"c@shop.test\"},\"items\":[1,2]}"
    })
}

async fn analyze(client: &Client, base: &str) -> Value {
    let resp: Value = client
        .post(format!("{base}/api/v1/traffic/analyze"))
        .json(&json!({ "curl": CURL, "response": sample_response() }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    extract_data(&resp).clone()
}

fn paths(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field_path"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_probes() {
    let (base, _handle) = start_server(AppConfig::default()).await;
    let client = Client::new();

    let resp = client.get(format!("{base}/health/live")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");

    let ready: Value = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = extract_data(&ready);
    assert_eq!(data["entities"], 4);
    assert_eq!(data["risks"], 3);
    assert_eq!(data["sessions"], 0);
    assert_eq!(data["classifier"], "pending");
}

#[tokio::test]
async fn parse_endpoint() {
    let (base, _handle) = start_server(AppConfig::default()).await;
    let client = Client::new();

    let resp: Value = client
        .post(format!("{base}/api/v1/traffic/parse"))
        .json(&json!({ "curl": "curl 'https://a.b/c?x=1' -X POST -H 'A: b' -d '{\"n\":1}'" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let parsed = extract_data(&resp);
    assert_eq!(parsed["url"], "https://a.b/c?x=1");
    assert_eq!(parsed["method"], "POST");
    assert_eq!(parsed["headers"], json!({ "A": "b" }));
    assert_eq!(parsed["body"], "{\"n\":1}");

    let resp = client
        .post(format!("{base}/api/v1/traffic/parse"))
        .json(&json!({ "curl": "wget https://a.b" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CURL_PARSE_ERROR");

    let resp = client
        .post(format!("{base}/api/v1/traffic/parse"))
        .json(&json!({ "curl": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn analysis_session_lifecycle() {
    let (base, _handle) = start_server(AppConfig::default()).await;
    let client = Client::new();

    // ──────────────────────────────────────────────────────────
    // 1. Analyze a request/response pair
    // ──────────────────────────────────────────────────────────
    let session = analyze(&client, &base).await;
    let id = session["id"].as_str().unwrap().to_string();
    let inventory = &session["inventory"];

    assert_eq!(
        paths(&inventory["request_headers"]),
        vec!["Authorization", "Content-Type"]
    );
    assert_eq!(paths(&inventory["request_query"]), vec!["page", "customer"]);
    assert_eq!(
        paths(&inventory["request_body"]),
        vec!["order", "order.sku", "order.qty", "note"]
    );
    assert_eq!(
        paths(&inventory["response_cookies"]),
        vec!["session_id", "csrf_token", "user_preferences"]
    );
    assert_eq!(
        paths(&inventory["response_body"]),
        vec!["id", "customer", "customer.email", "items"]
    );

    // ──────────────────────────────────────────────────────────
    // 2. Filter and paginate fields
    // ──────────────────────────────────────────────────────────
    let resp: Value = client
        .get(format!(
            "{base}/api/v1/traffic/sessions/{id}/fields?category=Body&source=Request&per_page=3&page=2"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let page = extract_data(&resp);
    assert_eq!(page["total"], 4);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(paths(&page["items"]), vec!["note"]);

    let resp: Value = client
        .get(format!(
            "{base}/api/v1/traffic/sessions/{id}/fields?search=does-not-exist"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let page = extract_data(&resp);
    assert_eq!(page["total"], 0);
    assert_eq!(page["total_pages"], 0);
    assert!(page["items"].as_array().unwrap().is_empty());

    // ──────────────────────────────────────────────────────────
    // 3. Annotate a field
    // ──────────────────────────────────────────────────────────
    let resp: Value = client
        .put(format!(
            "{base}/api/v1/traffic/sessions/{id}/fields/customer.email-Response-Body/annotation"
        ))
        .json(&json!({
            "finding": { "reference": "CMP-1042", "url": "https://compliance.test/findings/1042" },
            "comment": { "text": "Email leaves EU region", "images": ["capture-1.png"] }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let field = extract_data(&resp);
    assert_eq!(field["annotation"]["finding"]["reference"], "CMP-1042");

    let resp: Value = client
        .get(format!(
            "{base}/api/v1/traffic/sessions/{id}/fields?annotated=true"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(paths(&extract_data(&resp)["items"]), vec!["customer.email"]);

    let resp = client
        .put(format!(
            "{base}/api/v1/traffic/sessions/{id}/fields/ghost-Request-Body/annotation"
        ))
        .json(&json!({ "comment": { "text": "x" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put(format!(
            "{base}/api/v1/traffic/sessions/{id}/fields/note-Request-Body/annotation"
        ))
        .json(&json!({ "finding": { "reference": "" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // ──────────────────────────────────────────────────────────
    // 4. Export and list
    // ──────────────────────────────────────────────────────────
    let resp = client
        .get(format!("{base}/api/v1/traffic/sessions/{id}/export"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let csv = resp.text().await.unwrap();
    assert!(csv.starts_with("id,source,category,field_path"));
    assert!(csv.contains("CMP-1042,Email leaves EU region,capture-1.png"));

    let resp: Value = client
        .get(format!("{base}/api/v1/traffic/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let sessions = extract_data(&resp).as_array().unwrap().clone();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["annotated_count"], 1);
    assert_eq!(sessions[0]["status"], 201);

    // ──────────────────────────────────────────────────────────
    // 5. Delete
    // ──────────────────────────────────────────────────────────
    let resp = client
        .delete(format!("{base}/api/v1/traffic/sessions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/api/v1/traffic/sessions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn parsed_cookie_mode_and_keyword_classifier() {
    let config = AppConfig {
        cookie_mode: apigov::services::field_inventory::CookieMode::Parsed,
        sensitive_keywords: Some(vec!["email".to_string(), "authorization".to_string()]),
        ..AppConfig::default()
    };
    let (base, _handle) = start_server(config).await;
    let client = Client::new();

    let session = analyze(&client, &base).await;
    let inventory = &session["inventory"];
    assert_eq!(paths(&inventory["response_cookies"]), vec!["sid"]);

    let email = inventory["response_body"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["field_path"] == "customer.email")
        .unwrap();
    assert_eq!(email["tags"]["policy_action"], "Review");
    assert_eq!(email["tags"]["has_schema"], true);

    let id = session["id"].as_str().unwrap();
    let resp: Value = client
        .get(format!(
            "{base}/api/v1/traffic/sessions/{id}/fields?policy_action=Review"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut flagged = paths(&extract_data(&resp)["items"]);
    flagged.sort();
    assert_eq!(flagged, vec!["Authorization", "customer.email", "sid"]);
}

#[tokio::test]
async fn catalog_and_dashboard() {
    let (base, _handle) = start_server(AppConfig::default()).await;
    let client = Client::new();

    let resp: Value = client
        .get(format!("{base}/api/v1/entities?psm=payments-api&method=GET"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let page = extract_data(&resp);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], "ent-2");

    let resp: Value = client
        .get(format!("{base}/api/v1/entities?search=v1&per_page=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let page = extract_data(&resp);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);

    let resp: Value = client
        .get(format!("{base}/api/v1/risks/risk-sqli/entities"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = extract_data(&resp)
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["ent-1", "ent-4"]);

    let resp: Value = client
        .get(format!("{base}/api/v1/governance-groups?status=Remediated"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(extract_data(&resp)["items"][0]["id"], "gov-2");

    let resp = client
        .get(format!("{base}/api/v1/entities/ent-404"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp: Value = client
        .get(format!("{base}/api/v1/dashboard/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stats = extract_data(&resp);
    assert_eq!(stats["entity_count"], 4);
    assert_eq!(stats["average_compliance_rate"], 70.0);
    assert_eq!(stats["risk_exposure"][0]["risk_id"], "risk-pii");
    assert_eq!(stats["risk_exposure"][0]["entity_count"], 3);
    assert_eq!(stats["top_psms"][0]["psm"], "payments-api");
    assert_eq!(stats["groups_by_status"]["remediated"], 1);
}

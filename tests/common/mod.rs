#![allow(dead_code)]

use peloton_history::{ClientConfig, Credentials, PelotonApiClient, PelotonAuthenticator};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: &str = "5a1e2b3c4d";

pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(server.uri())
        .with_min_request_interval(Duration::from_millis(5))
}

pub fn credentials() -> Credentials {
    Credentials::new("rider@example.com", "correct horse").unwrap()
}

pub async fn mount_login_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "peloton_session_id=sess-42; Path=/")
                .set_body_json(json!({
                    "user_id": USER_ID,
                    "session_id": "sess-42"
                })),
        )
        .mount(server)
        .await;
}

pub async fn mount_login_rejected(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "message": "Login failed"
        })))
        .mount(server)
        .await;
}

/// Logs in against the mock server and builds an API client from the session.
pub async fn api_client(server: &MockServer, config: &ClientConfig) -> PelotonApiClient {
    mount_login_success(server).await;
    let mut auth = PelotonAuthenticator::new(credentials(), config.clone());
    assert!(auth.login().await);
    PelotonApiClient::new(
        auth.get_session().unwrap().clone(),
        auth.get_user_id().unwrap(),
        config,
    )
}

/// A page of `count` workouts numbered from `first`.
pub fn workout_page(page: u32, first: usize, count: usize) -> Value {
    let data: Vec<Value> = (first..first + count)
        .map(|n| {
            json!({
                "id": format!("workout-{n:04}"),
                "created_at": 1_600_000_000 + n as i64,
                "total_work": 1000.0 * n as f64,
                "status": "COMPLETE"
            })
        })
        .collect();

    json!({
        "data": data,
        "page": page,
        "limit": 100,
        "count": count,
        "show_previous": page > 0
    })
}

pub fn workouts_path() -> String {
    format!("/api/user/{USER_ID}/workouts")
}

//! Integration tests for the public liveness endpoint

use authkeeper::configuration::{JwtSettings, PasswordSettings};
use authkeeper::startup::{run, AppState};
use authkeeper::store::InMemoryUserStore;
use secrecy::Secret;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let jwt = JwtSettings {
        secret: Secret::new("health-check-secret".to_string()),
        access_token_ttl_hours: 24,
        refresh_token_ttl_hours: 168,
    };
    let state = AppState::new(
        Arc::new(InMemoryUserStore::new()),
        &jwt,
        &PasswordSettings { hash_cost: 4 },
        Duration::from_secs(5),
    )
    .expect("Failed to build app state");
    let server = run(listener, state).expect("Failed to create server");

    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn health_check_needs_no_token() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .header("Authorization", "Bearer garbage")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
}

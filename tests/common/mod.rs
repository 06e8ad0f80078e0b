// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use recognizer::{config::Config, routes, state::AppState, store::MemoryStore};

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port, backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        upload_dir: std::env::temp_dir().join(format!("recognizer-{}", uuid::Uuid::new_v4())),
        cors_origins: vec!["http://localhost:3000".to_string()],
    };

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config,
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a fresh user and returns (token, user id).
    pub async fn register(&self) -> (String, i64) {
        let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
        let body: serde_json::Value = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({ "username": username, "password": "password123" }))
            .send()
            .await
            .expect("Register failed")
            .json()
            .await
            .expect("Failed to parse register json");

        (
            body["token"].as_str().expect("Token not found").to_string(),
            body["user"]["id"].as_i64().expect("User id not found"),
        )
    }

    pub async fn post_json(&self, path: &str, token: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates an exam and returns its id.
    pub async fn create_exam(&self, token: &str, name: &str) -> i64 {
        let resp = self
            .post_json("/api/exams", token, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<serde_json::Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    pub async fn create_group(&self, token: &str, exam_id: i64, name: &str) -> i64 {
        let resp = self
            .post_json(
                "/api/groups",
                token,
                serde_json::json!({ "name": name, "examId": exam_id }),
            )
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<serde_json::Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    pub async fn create_item(&self, token: &str, exam_id: i64, group_id: i64, name: &str) -> i64 {
        let resp = self
            .post_json(
                "/api/items",
                token,
                serde_json::json!({
                    "name": name,
                    "image": format!("{}.png", name),
                    "examId": exam_id,
                    "groupId": group_id
                }),
            )
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<serde_json::Value>().await.unwrap()["id"].as_i64().unwrap()
    }
}

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use roomhub::config::Config;
use roomhub::db::{MemoryStore, PgStore, Store};
use roomhub::email::{Mailer, OutgoingEmail};

/// Captures outgoing mail; can be switched to fail every delivery.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: Mutex<bool>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_deliveries(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), String> {
        if *self.fail.lock().unwrap() {
            return Err("SMTP connection refused".to_string());
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// A running server on a random port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<dyn Store>,
    pub mailer: Arc<RecordingMailer>,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn register(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post_json(
            "/register/",
            &json!({
                "email": email,
                "first_name": "Ada",
                "last_name": "Lovelace",
                "password": password,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post_json("/login/", &json!({ "email": email, "password": password }))
            .await
    }

    /// Register a user and return an access token for it.
    pub async fn bootstrap(&self) -> String {
        let (body, status) = self.register("ada@test.com", "password123").await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let (body, status) = self.login("ada@test.com", "password123").await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://app.test".to_string(),
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        reset_timeout: Duration::days(3),
        session_ttl: Duration::days(14),
        smtp: None,
    }
}

/// Spawn a test app over an in-memory store.
pub async fn spawn_app() -> TestApp {
    serve(Arc::new(MemoryStore::new()), test_config()).await
}

/// Spawn a test app over a fresh temporary PostgreSQL database.
/// Returns `None` when `DATABASE_URL` is not set.
pub async fn spawn_pg_app() -> Option<TestApp> {
    let _ = dotenvy::dotenv();

    let Ok(base_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };

    let db_name = format!("roomhub_test_{}", Uuid::now_v7().simple());

    // Connect to the default postgres DB to create the test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        ..test_config()
    };

    Some(serve(Arc::new(PgStore::new(pool)), config).await)
}

async fn serve(store: Arc<dyn Store>, config: Config) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state = roomhub::build_state(store.clone(), mailer.clone(), config);
    let app = roomhub::build_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        store,
        mailer,
        client,
    }
}

/// `(uid, token)` from the reset link in an email body.
pub fn reset_link_parts(html: &str) -> (String, String) {
    let marker = "/reset-password/";
    let start = html.find(marker).expect("reset link in email") + marker.len();
    let mut parts = html[start..].split('/');
    let uid = parts.next().unwrap().to_string();
    let token = parts.next().unwrap().to_string();
    (uid, token)
}

/// Value of the named cookie from a response's `Set-Cookie` headers.
pub fn cookie_value(resp: &reqwest::Response, name: &str) -> Option<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

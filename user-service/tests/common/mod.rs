//! Shared helpers for user-service integration tests.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    Router,
};
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use service_core::middleware::cors::CorsPolicy;
use std::future::Future;
use std::sync::Arc;
use tower::util::ServiceExt;
use user_service::config::{ConnectFailurePolicy, MongoConfig, UserServiceConfig};
use user_service::services::{DatabaseHandle, InMemoryUserRepository, UserRepository};
use user_service::{build_router, AppState, Application};

/// Router backed by a connected in-memory repository.
pub fn connected_app() -> (Router, Arc<InMemoryUserRepository>) {
    connected_app_with(Arc::new(InMemoryUserRepository::new()))
}

pub fn connected_app_with(
    repo: Arc<InMemoryUserRepository>,
) -> (Router, Arc<InMemoryUserRepository>) {
    let state = AppState {
        db: DatabaseHandle::ready(repo.clone()),
        cors: CorsPolicy::Any,
    };
    (build_router(state), repo)
}

/// Router whose database handle was never initialized.
pub fn disconnected_app() -> Router {
    build_router(AppState {
        db: DatabaseHandle::empty(),
        cors: CorsPolicy::Any,
    })
}

pub fn app_with_cors(cors: CorsPolicy) -> Router {
    build_router(AppState {
        db: DatabaseHandle::ready(Arc::new(InMemoryUserRepository::new())),
        cors,
    })
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, body)
}

pub async fn send_json(
    router: &Router,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(router, request).await;
    let json = serde_json::from_slice(&body).expect("Failed to parse JSON");
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn test_config(policy: ConnectFailurePolicy) -> UserServiceConfig {
    UserServiceConfig {
        common: CoreConfig { port: 0 },
        service_name: "user-service-test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: "mongodb://127.0.0.1:27017".to_string(),
            database: None,
        },
        cors: CorsPolicy::Any,
        connect_failure: policy,
    }
}

/// A running server on a random port.
pub struct SpawnedApp {
    pub address: String,
    pub db: DatabaseHandle,
    pub server: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl SpawnedApp {
    pub async fn spawn<F>(policy: ConnectFailurePolicy, connect: F) -> Self
    where
        F: Future<Output = Result<Arc<dyn UserRepository>, AppError>> + Send + 'static,
    {
        let app = Application::build_with_connector(test_config(policy), connect)
            .await
            .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());
        let db = app.db().clone();
        let server = tokio::spawn(app.run_until_stopped());

        // Wait for the server to answer the liveness route
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        SpawnedApp {
            address,
            db,
            server,
        }
    }
}

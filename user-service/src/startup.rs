//! Application startup and lifecycle management.

use crate::config::UserServiceConfig;
use crate::handlers;
use crate::services::{connect_in_background, connect_with, DatabaseHandle, UserRepository};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors::{cors_layer, options_middleware, CorsPolicy},
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseHandle,
    pub cors: CorsPolicy,
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors);

    Router::new()
        .route("/", get(handlers::root))
        .route("/test-db", get(handlers::test_db))
        .route("/users", post(handlers::create_user))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(options_middleware))
        .layer(cors)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    connector: JoinHandle<Result<(), AppError>>,
}

impl Application {
    /// Starts connecting to MongoDB in the background and binds the listener
    /// without waiting for the connection.
    pub async fn build(config: UserServiceConfig) -> Result<Self, AppError> {
        let db = DatabaseHandle::empty();
        let connector =
            connect_in_background(config.mongodb.clone(), db.clone(), config.connect_failure);
        Self::bind(config, db, connector).await
    }

    /// Same as [`Application::build`] with a caller-supplied connection future.
    pub async fn build_with_connector<F>(
        config: UserServiceConfig,
        connect: F,
    ) -> Result<Self, AppError>
    where
        F: Future<Output = Result<Arc<dyn UserRepository>, AppError>> + Send + 'static,
    {
        let db = DatabaseHandle::empty();
        let connector = connect_with(connect, db.clone(), config.connect_failure);
        Self::bind(config, db, connector).await
    }

    async fn bind(
        config: UserServiceConfig,
        db: DatabaseHandle,
        connector: JoinHandle<Result<(), AppError>>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
                connector.abort();
                return Err(AppError::from(e));
            }
        };
        let port = listener.local_addr()?.port();

        tracing::info!("Server running at http://localhost:{}", port);

        Ok(Self {
            port,
            listener,
            state: AppState {
                db,
                cors: config.cors,
            },
            connector,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &DatabaseHandle {
        &self.state.db
    }

    /// Serves until a shutdown signal arrives or, under the `exit` connect
    /// policy, until the startup connection fails.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = build_router(self.state);
        let server = axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .into_future();

        let connector = self.connector;
        let connect_failed = async move {
            match connector.await {
                Ok(Err(e)) => e,
                Ok(Ok(())) => std::future::pending().await,
                Err(e) => AppError::InternalError(anyhow::Error::new(e)),
            }
        };

        tokio::select! {
            result = server => {
                if let Err(e) = &result {
                    tracing::error!("HTTP server error: {}", e);
                }
                result
            }
            e = connect_failed => {
                tracing::error!(error = %e, "Stopping server after database connection failure");
                Err(std::io::Error::other(format!("Database connection error: {}", e)))
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

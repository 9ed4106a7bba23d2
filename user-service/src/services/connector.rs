//! Background connection to the database.
//!
//! The HTTP listener is bound before the connection completes, so the handle
//! stays empty for the first requests and `GET /test-db` reports it.

use super::database::{DatabaseHandle, MongoUserRepository, UserRepository};
use crate::config::{ConnectFailurePolicy, MongoConfig};
use service_core::error::AppError;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Spawns the MongoDB connection attempt.
pub fn connect_in_background(
    mongo: MongoConfig,
    handle: DatabaseHandle,
    policy: ConnectFailurePolicy,
) -> JoinHandle<Result<(), AppError>> {
    connect_with(
        async move {
            let repo = MongoUserRepository::connect(&mongo.uri, mongo.database.as_deref()).await?;
            Ok(Arc::new(repo) as Arc<dyn UserRepository>)
        },
        handle,
        policy,
    )
}

/// Runs `connect` on a new task and installs its repository into `handle`.
///
/// The task resolves to `Err` only when the attempt failed under
/// [`ConnectFailurePolicy::Exit`].
pub fn connect_with<F>(
    connect: F,
    handle: DatabaseHandle,
    policy: ConnectFailurePolicy,
) -> JoinHandle<Result<(), AppError>>
where
    F: Future<Output = Result<Arc<dyn UserRepository>, AppError>> + Send + 'static,
{
    tokio::spawn(async move {
        match connect.await {
            Ok(repo) => {
                if !handle.set(repo) {
                    tracing::warn!("Database handle was already initialized");
                }
                tracing::info!("MongoDB connected");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, policy = ?policy, "MongoDB connection failed");
                match policy {
                    ConnectFailurePolicy::Exit => Err(e),
                    ConnectFailurePolicy::Degrade => {
                        tracing::warn!("Serving without a database; data routes will fail");
                        Ok(())
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryUserRepository;

    fn failing() -> impl Future<Output = Result<Arc<dyn UserRepository>, AppError>> {
        async { Err(AppError::DatabaseError(anyhow::anyhow!("connection refused"))) }
    }

    #[tokio::test]
    async fn test_success_fills_handle() {
        let handle = DatabaseHandle::empty();
        let repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());

        connect_with(async move { Ok(repo) }, handle.clone(), ConnectFailurePolicy::Exit)
            .await
            .unwrap()
            .unwrap();

        assert!(handle.is_ready());
    }

    #[tokio::test]
    async fn test_failure_with_exit_policy_is_fatal() {
        let handle = DatabaseHandle::empty();
        let result = connect_with(failing(), handle.clone(), ConnectFailurePolicy::Exit)
            .await
            .unwrap();

        assert!(result.is_err());
        assert!(!handle.is_ready());
    }

    #[tokio::test]
    async fn test_failure_with_degrade_policy_is_not_fatal() {
        let handle = DatabaseHandle::empty();
        let result = connect_with(failing(), handle.clone(), ConnectFailurePolicy::Degrade)
            .await
            .unwrap();

        assert!(result.is_ok());
        assert!(!handle.is_ready());
    }
}

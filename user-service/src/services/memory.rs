//! In-process repository for tests and local runs without MongoDB.

use super::database::UserRepository;
use crate::models::{user::USERS_COLLECTION, CollectionInfo, NewUser, User};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    collections: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the collection listing.
    pub fn with_collections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: Mutex::new(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Makes every subsequent insert fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes listing and ping fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "simulated write failure on {}",
                USERS_COLLECTION
            )));
        }

        let user = User::from_new(new_user);
        self.users.lock().await.push(user.clone());

        // First insert creates the collection, as MongoDB does.
        let mut collections = self.collections.lock().await;
        if !collections.iter().any(|c| c == USERS_COLLECTION) {
            collections.push(USERS_COLLECTION.to_string());
        }

        Ok(user)
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "simulated listCollections failure"
            )));
        }

        Ok(self
            .collections
            .lock()
            .await
            .iter()
            .map(CollectionInfo::collection)
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "simulated ping failure"
            )));
        }
        Ok(())
    }
}

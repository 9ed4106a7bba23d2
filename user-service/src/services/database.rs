use crate::models::{user::USERS_COLLECTION, CollectionInfo, NewUser, User};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    results::CollectionType,
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;
use std::sync::{Arc, OnceLock};

/// Database name used when neither the config nor the URI names one.
pub const FALLBACK_DATABASE: &str = "test";

/// Persistence operations the HTTP handlers depend on.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user and returns it with its assigned identifier.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

/// Set-once slot for the process-wide repository.
///
/// Empty until the background connector succeeds. Handlers only read it.
#[derive(Clone, Default)]
pub struct DatabaseHandle {
    inner: Arc<OnceLock<Arc<dyn UserRepository>>>,
}

impl DatabaseHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ready(repo: Arc<dyn UserRepository>) -> Self {
        let handle = Self::default();
        handle.set(repo);
        handle
    }

    /// Returns `false` if a repository was already installed.
    pub fn set(&self, repo: Arc<dyn UserRepository>) -> bool {
        self.inner.set(repo).is_ok()
    }

    pub fn get(&self) -> Option<Arc<dyn UserRepository>> {
        self.inner.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }
}

#[derive(Clone)]
pub struct MongoUserRepository {
    client: MongoClient,
    db: Database,
}

impl MongoUserRepository {
    /// Builds the client and confirms the deployment answers a `ping`.
    ///
    /// `database` wins over the URI path, which wins over [`FALLBACK_DATABASE`].
    pub async fn connect(uri: &str, database: Option<&str>) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::from(e)
        })?;

        let db = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
        };

        let repo = Self { client, db };
        repo.ping().await?;

        tracing::info!(database = %repo.db.name(), "Successfully connected to MongoDB database");
        Ok(repo)
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection(USERS_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = User::from_new(new_user);
        self.users().insert_one(&user, None).await.map_err(|e| {
            tracing::error!("Failed to insert user: {}", e);
            AppError::from(e)
        })?;
        Ok(user)
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, AppError> {
        let specs: Vec<_> = self
            .db
            .list_collections(None, None)
            .await?
            .try_collect()
            .await?;

        specs
            .into_iter()
            .map(|spec| {
                let mut info = doc! { "readOnly": spec.info.read_only };
                if let Some(uuid) = spec.info.uuid {
                    info.insert("uuid", uuid);
                }
                Ok(CollectionInfo {
                    kind: match spec.collection_type {
                        CollectionType::View => "view",
                        CollectionType::Timeseries => "timeseries",
                        _ => "collection",
                    }
                    .to_string(),
                    options: bson::to_document(&spec.options)?,
                    info,
                    id_index: spec
                        .id_index
                        .map(|index| bson::to_document(&index))
                        .transpose()?,
                    name: spec.name,
                })
            })
            .collect::<Result<Vec<_>, bson::ser::Error>>()
            .map_err(|e| {
                tracing::error!("Failed to read collection listing: {}", e);
                AppError::DatabaseError(e.into())
            })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB ping failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryUserRepository;

    #[test]
    fn test_handle_starts_empty() {
        let handle = DatabaseHandle::empty();
        assert!(!handle.is_ready());
        assert!(handle.get().is_none());
    }

    #[test]
    fn test_handle_is_set_once() {
        let handle = DatabaseHandle::empty();
        assert!(handle.set(Arc::new(InMemoryUserRepository::new())));
        assert!(!handle.set(Arc::new(InMemoryUserRepository::new())));
        assert!(handle.is_ready());
    }

    #[test]
    fn test_clones_share_slot() {
        let handle = DatabaseHandle::empty();
        let clone = handle.clone();
        handle.set(Arc::new(InMemoryUserRepository::new()));
        assert!(clone.is_ready());
    }
}

use crate::dtos::TestDbResponse;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

/// Reports database connectivity by listing the collections of the
/// configured database.
pub async fn test_db(State(state): State<AppState>) -> Result<Json<TestDbResponse>, AppError> {
    let repo = state.db.get().ok_or(AppError::DatabaseNotInitialized)?;

    let collections = repo
        .list_collections()
        .await
        .map_err(|e| AppError::DatabaseUnreachable(anyhow::Error::new(e)))?;

    Ok(Json(TestDbResponse::connected(collections)))
}

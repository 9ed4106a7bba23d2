use crate::dtos::{CreateUserRequest, CreateUserResponse};
use crate::models::NewUser;
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;

/// Persists whatever `name`/`age` the client sent, cast to the stored
/// types, and echoes the stored record.
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateUserResponse>, AppError> {
    let request = CreateUserRequest::from_body(&body)?;
    let message = request.confirmation_message();

    let repo = state.db.get().ok_or_else(|| {
        AppError::DatabaseError(anyhow::anyhow!("user write attempted before database connected"))
    })?;

    let user = repo.insert_user(NewUser::try_from(request)?).await?;
    tracing::info!(user_id = %user.id, "Saved user to database");

    Ok(Json(CreateUserResponse {
        message,
        user: user.into(),
    }))
}

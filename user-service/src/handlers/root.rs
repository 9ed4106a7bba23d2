pub const LIVENESS_MESSAGE: &str = "Server is live! Try /test-db to check MongoDB connection.";

/// Liveness probe. Never touches the database.
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

use service_core::error::AppError;
use service_core::observability::init_tracing;
use user_service::config::UserServiceConfig;
use user_service::services::init_metrics;
use user_service::Application;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast before any socket is bound
    let config = UserServiceConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        port = config.common.port,
        cors = ?config.cors,
        connect_failure = ?config.connect_failure,
        "Starting user service"
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use service_core::middleware::cors::CorsPolicy;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub cors: CorsPolicy,
    pub connect_failure: ConnectFailurePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    /// Overrides the database named in the URI path.
    pub database: Option<String>,
}

/// What happens when the startup connection to MongoDB fails.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectFailurePolicy {
    /// Stop serving and exit with an error.
    #[default]
    Exit,
    /// Keep serving; database routes fail until restart.
    Degrade,
}

impl FromStr for ConnectFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exit" => Ok(ConnectFailurePolicy::Exit),
            "degrade" => Ok(ConnectFailurePolicy::Degrade),
            _ => Err(format!("Invalid DB_CONNECT_FAILURE policy: {}", s)),
        }
    }
}

impl UserServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env, APP__ prefix and PORT)
        let common_config = core_config::Config::load()?;
        Self::from_parts(common_config, |key| env::var(key).ok())
    }

    /// Builds the service section from any key lookup.
    pub fn from_parts<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(UserServiceConfig {
            common,
            service_name: get("SERVICE_NAME").unwrap_or_else(|| "user-service".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            otlp_endpoint: get("OTLP_ENDPOINT"),
            mongodb: MongoConfig {
                uri: get("MONGO_URI").ok_or_else(|| {
                    AppError::config("MONGO_URI is not defined in environment variables")
                })?,
                database: get("MONGO_DATABASE"),
            },
            cors: get("CORS_ALLOWED_ORIGINS")
                .unwrap_or_default()
                .parse()
                .map_err(AppError::config)?,
            connect_failure: match get("DB_CONNECT_FAILURE") {
                Some(v) => v.parse().map_err(AppError::config)?,
                None => ConnectFailurePolicy::default(),
            },
        })
    }
}

use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Layers: `configuration.*` file, `APP__*` variables, then a bare `PORT`.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", env::var("PORT").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the PORT mutations never race each other.
    #[test]
    fn test_port_resolution() {
        unsafe { env::remove_var("PORT") };
        if env::var("APP__PORT").is_err() {
            assert_eq!(Config::load().unwrap().port, DEFAULT_PORT);
        }

        unsafe { env::set_var("PORT", "11000") };
        assert_eq!(Config::load().unwrap().port, 11000);

        unsafe { env::set_var("PORT", "not-a-port") };
        assert!(matches!(Config::load(), Err(AppError::ConfigError(_))));

        unsafe { env::remove_var("PORT") };
    }
}

//! Server Configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | ./data | working directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development / staging / production |
//! | LOG_LEVEL | info | tracing filter level |
//! | JWT_SECRET | (generated in dev) | token signing secret |
//! | JWT_EXPIRATION_MINUTES | 1440 | token lifetime |

use crate::auth::JwtConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the embedded database and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Log filter level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Path of the embedded database directory
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Path of the log directory
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Ensure the working directory structure exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

//! Server configuration
//!
//! All settings come from environment variables with defaults:
//!
//! | Env var | Default | Meaning |
//! |---------|---------|---------|
//! | WORK_DIR | ./data | working directory (db + uploads) |
//! | HTTP_PORT | 3000 | HTTP listen port |
//! | DATABASE_PATH | {WORK_DIR}/funko.db | SQLite file |
//! | UPLOAD_DIR | uploads | image dir under WORK_DIR |
//! | ENVIRONMENT | development | development / staging / production |
//! | JWT_SECRET / JWT_EXPIRATION_MINUTES / JWT_ISSUER / JWT_AUDIENCE | see auth | token settings |

use crate::auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub database_path: String,
    pub upload_dir: String,
    pub jwt: JwtConfig,
    pub environment: String,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{work_dir}/funko.db"));
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// Full path of the upload directory.
    pub fn upload_path(&self) -> String {
        format!("{}/{}", self.work_dir, self.upload_dir)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

//! Configuration module for the PeopleSearch backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database holding people and their interests
    pub people_db_path: PathBuf,
    /// Path to the SQLite database holding image blobs
    pub image_db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let people_db_path = env::var("PEOPLESEARCH_PEOPLE_DB_PATH")
            .unwrap_or_else(|_| "./data/people.sqlite".to_string())
            .into();

        let image_db_path = env::var("PEOPLESEARCH_IMAGE_DB_PATH")
            .unwrap_or_else(|_| "./data/images.sqlite".to_string())
            .into();

        let bind_addr = env::var("PEOPLESEARCH_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid PEOPLESEARCH_BIND_ADDR format");

        let log_level = env::var("PEOPLESEARCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            people_db_path,
            image_db_path,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("PEOPLESEARCH_PEOPLE_DB_PATH");
        env::remove_var("PEOPLESEARCH_IMAGE_DB_PATH");
        env::remove_var("PEOPLESEARCH_BIND_ADDR");
        env::remove_var("PEOPLESEARCH_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.people_db_path, PathBuf::from("./data/people.sqlite"));
        assert_eq!(config.image_db_path, PathBuf::from("./data/images.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }
}

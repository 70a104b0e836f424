//! Configuration module for the team service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address the HTTP gateway binds to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Size of the connection pool
    pub max_connections: u32,
    /// How many teams a single leader may own
    pub max_teams_per_leader: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("TEAMS_DB_PATH")
            .unwrap_or_else(|_| "./data/teams.sqlite".to_string())
            .into();

        let bind_addr = env::var("TEAMS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid TEAMS_BIND_ADDR format");

        let log_level = env::var("TEAMS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("TEAMS_LOG_FORMAT")
            .map(|s| LogFormat::parse(&s))
            .unwrap_or(LogFormat::Pretty);

        let max_connections = env::var("TEAMS_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let max_teams_per_leader = env::var("TEAMS_MAX_TEAMS_PER_LEADER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Self {
            db_path,
            bind_addr,
            log_level,
            log_format,
            max_connections,
            max_teams_per_leader,
        }
    }
}

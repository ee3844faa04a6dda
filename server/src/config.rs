//! Process configuration from flags and `TODO_SERVICE_*` environment
//! variables.
//!
//! Every setting has a default except the database DSN. Validation reports all
//! problems at once so a broken deployment can be fixed in one pass.

use std::str::FromStr;
use std::time::Duration;

use clap::{Args, Parser};
use thiserror::Error;
use todo_core::storage::{StorageConfig, POSTGRES_DRIVER};

pub const DEFAULT_APP_NAME: &str = "todo-service";

#[derive(Debug, Error)]
#[error("invalid flag(s): {}", .0.join("; "))]
pub struct ConfigError(pub Vec<String>);

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-service", version, about = "CRUD service for user-owned todo items")]
pub struct AppConfig {
    /// Service name.
    #[arg(long, env = "TODO_SERVICE_APP_NAME", default_value = DEFAULT_APP_NAME)]
    pub app_name: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "TODO_SERVICE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub http: HttpConfig,

    #[command(flatten)]
    pub db: DbConfig,
}

#[derive(Debug, Clone, Args)]
pub struct HttpConfig {
    /// Host part of listening address.
    #[arg(long, env = "TODO_SERVICE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listening port.
    #[arg(long, env = "TODO_SERVICE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long = "shutdown-timeout", env = "TODO_SERVICE_SHUTDOWN_TIMEOUT", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,

    /// Mount runtime introspection routes under /debug/pprof.
    #[arg(long, env = "TODO_SERVICE_INIT_PROFILING")]
    pub init_profiling: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DbConfig {
    /// Data service driver.
    #[arg(long = "db-driver", env = "TODO_SERVICE_DB_DRIVER", default_value = POSTGRES_DRIVER)]
    pub driver: String,

    /// Data service data source name.
    #[arg(long = "db-dsn", env = "TODO_SERVICE_DB_DSN", default_value = "")]
    pub dsn: String,

    /// Seconds a single query may run before it is cancelled.
    #[arg(long = "db-query-timeout", env = "TODO_SERVICE_DB_QUERY_TIMEOUT", default_value_t = 5)]
    pub query_timeout_secs: u64,

    /// Maximum pooled connections.
    #[arg(long = "db-pool-size", env = "TODO_SERVICE_DB_POOL_SIZE", default_value_t = 16)]
    pub pool_size: usize,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errs = Vec::new();
        if tracing::Level::from_str(&self.log_level).is_err() {
            errs.push(format!("unknown log level {:?}", self.log_level));
        }
        errs.extend(self.http.problems());
        if let Err(db_errs) = self.db.storage_config().validate() {
            errs.extend(db_errs);
        }
        if errs.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(errs))
        }
    }
}

impl HttpConfig {
    fn problems(&self) -> Vec<String> {
        let mut errs = Vec::new();
        if self.host.is_empty() {
            errs.push("empty http host".to_string());
        }
        if self.port == 0 {
            errs.push("wrong http port".to_string());
        }
        errs
    }

    pub fn addr(&self) -> String {
        // host may be a name, so this is not a SocketAddr yet
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl DbConfig {
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            driver: self.driver.clone(),
            dsn: self.dsn.clone(),
            query_timeout: Duration::from_secs(self.query_timeout_secs),
            pool_size: self.pool_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let mut argv = vec!["todo-service"];
        argv.extend_from_slice(args);
        AppConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = parse(&["--db-dsn", "postgresql://localhost/postgres"]);
        assert_eq!(cfg.app_name, "todo-service");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.http.host, "0.0.0.0");
        assert_eq!(cfg.http.port, 8080);
        assert_eq!(cfg.http.shutdown_timeout(), Duration::from_secs(10));
        assert!(!cfg.http.init_profiling);
        assert_eq!(cfg.db.driver, "postgres");
        assert_eq!(cfg.db.storage_config().query_timeout, Duration::from_secs(5));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--shutdown-timeout",
            "3",
            "--init-profiling",
            "--db-dsn",
            "postgresql://db/todo",
            "--db-pool-size",
            "4",
        ]);
        assert_eq!(cfg.http.addr(), "127.0.0.1:9000");
        assert_eq!(cfg.http.shutdown_timeout(), Duration::from_secs(3));
        assert!(cfg.http.init_profiling);
        assert_eq!(cfg.db.pool_size, 4);
    }

    #[test]
    fn missing_dsn_fails_validation() {
        let err = parse(&["--db-dsn", ""]).validate().unwrap_err();
        assert!(err.to_string().contains("db DSN cannot be empty"), "{err}");
    }

    #[test]
    fn every_problem_is_reported() {
        let err = parse(&["--host", "", "--port", "0", "--log-level", "loud", "--db-dsn", ""])
            .validate()
            .unwrap_err();
        assert_eq!(err.0.len(), 4, "{err}");
    }

    #[test]
    fn port_out_of_range_is_a_parse_error() {
        let result = AppConfig::try_parse_from(["todo-service", "--port", "70000"]);
        assert!(result.is_err());
    }
}

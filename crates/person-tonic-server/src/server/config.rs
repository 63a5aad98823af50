use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Runtime configuration for the `person-tonic-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first), with defaults that run a self-contained, in-memory
/// service.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "person-tonic-server",
    version,
    about = "A gRPC CRUD service for people"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/person-uds.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// sqlx connection URL of the SQLite database.
    ///
    /// The schema is dropped, recreated and reseeded on every start, so a file
    /// database does not carry state across restarts either.
    ///
    /// Environment variable: `DATABASE_URL`
    #[arg(long, env = "DATABASE_URL", default_value_t = String::from("sqlite::memory:"))]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    ///
    /// Ignored for in-memory databases, which always use a single connection.
    ///
    /// Environment variable: `DB_MAX_CONNECTIONS`
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 4)]
    pub db_max_connections: u32,

    /// Seconds to wait for a free database connection before failing the
    /// request.
    ///
    /// Environment variable: `DB_ACQUIRE_TIMEOUT_SECS`
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 30)]
    pub db_acquire_timeout_secs: u64,

    /// Reject blank names with `INVALID_ARGUMENT` instead of answering with an
    /// empty response.
    ///
    /// Environment variable: `STRICT_VALIDATION`
    #[arg(long, env = "STRICT_VALIDATION", default_value_t = false)]
    pub strict_validation: bool,
}

/// How the handlers answer a create or update carrying a blank name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Return a well-formed response with the `person` field unset.
    #[default]
    Lenient,
    /// Fail the call with `INVALID_ARGUMENT`.
    Strict,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    /// An in-memory database with default pool settings.
    pub fn in_memory() -> Self {
        Self {
            database_url: String::from("sqlite::memory:"),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// Whether the URL names a private in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        let url = self.database_url.as_str();
        url.contains(":memory:") || url.contains("mode=memory")
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub store: StoreConfig,
    pub validation: ValidationMode,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        if !args.database_url.starts_with("sqlite:") {
            bail!(
                "DATABASE_URL ({}) must be a sqlite URL, e.g. `sqlite::memory:` or `sqlite://people.db?mode=rwc`",
                args.database_url
            );
        }

        if args.db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be greater than 0");
        }

        if args.db_acquire_timeout_secs == 0 {
            bail!("DB_ACQUIRE_TIMEOUT_SECS must be greater than 0");
        }

        let validation = if args.strict_validation {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        };

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            store: StoreConfig {
                database_url: args.database_url,
                max_connections: args.db_max_connections,
                acquire_timeout: Duration::from_secs(args.db_acquire_timeout_secs),
            },
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("person-tonic-server").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn defaults_run_in_memory_and_lenient() {
        let config = ServerConfig::try_from(parse(&[])).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:50051");
        assert!(!config.uds);
        assert!(config.store.is_in_memory());
        assert_eq!(config.store.acquire_timeout, Duration::from_secs(30));
        assert_eq!(config.validation, ValidationMode::Lenient);
    }

    #[test]
    fn strict_flag_selects_strict_validation() {
        let config = ServerConfig::try_from(parse(&["--strict-validation"])).unwrap();
        assert_eq!(config.validation, ValidationMode::Strict);
    }

    #[test]
    fn file_database_is_not_in_memory() {
        let config = ServerConfig::try_from(parse(&[
            "--database-url",
            "sqlite://people.db?mode=rwc",
            "--db-max-connections",
            "8",
        ]))
        .unwrap();
        assert!(!config.store.is_in_memory());
        assert_eq!(config.store.max_connections, 8);
    }

    #[test]
    fn rejects_zero_connections() {
        let err = ServerConfig::try_from(parse(&["--db-max-connections", "0"])).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn rejects_zero_acquire_timeout() {
        let err = ServerConfig::try_from(parse(&["--db-acquire-timeout-secs", "0"])).unwrap_err();
        assert!(err.to_string().contains("DB_ACQUIRE_TIMEOUT_SECS"));
    }

    #[test]
    fn rejects_non_sqlite_urls() {
        let err = ServerConfig::try_from(parse(&["--database-url", "postgres://localhost/people"]))
            .unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }
}

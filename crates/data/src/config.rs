use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default time-to-live for cached profile and settings fetches.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default size of the remote connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default directory for the file-backed local store.
pub const DEFAULT_STORAGE_DIR: &str = "./.little-things";

/// Data layer configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Remote store connection string. `None` runs local-only.
    pub database_url: Option<String>,
    /// Directory holding the file-backed local store.
    pub storage_dir: PathBuf,
    /// How long a resolved profile/settings fetch is served from cache.
    pub cache_ttl: Duration,
    /// Remote connection pool size.
    pub max_connections: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DataConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                            | Default              |
    /// |------------------------------------|----------------------|
    /// | `DATABASE_URL`                     | unset (local-only)   |
    /// | `LITTLE_THINGS_STORAGE_DIR`        | `./.little-things`   |
    /// | `LITTLE_THINGS_CACHE_TTL_SECS`     | `300`                |
    /// | `LITTLE_THINGS_DB_MAX_CONNECTIONS` | `5`                  |
    ///
    /// Unparseable numbers fall back to their default with a warning.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let storage_dir = std::env::var("LITTLE_THINGS_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR));

        let cache_ttl_secs = parse_or_default(
            "LITTLE_THINGS_CACHE_TTL_SECS",
            std::env::var("LITTLE_THINGS_CACHE_TTL_SECS").ok().as_deref(),
            DEFAULT_CACHE_TTL_SECS,
        );

        let max_connections = parse_or_default(
            "LITTLE_THINGS_DB_MAX_CONNECTIONS",
            std::env::var("LITTLE_THINGS_DB_MAX_CONNECTIONS").ok().as_deref(),
            DEFAULT_MAX_CONNECTIONS,
        );

        Self {
            database_url,
            storage_dir,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            max_connections,
        }
    }

    /// Load `.env` (if present) into the process environment, then
    /// [`from_env`](Self::from_env).
    pub fn from_env_file() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

fn parse_or_default<T>(name: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = raw, %default, "Invalid value, using default");
            default
        }),
    }
}

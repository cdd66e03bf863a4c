use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Which document store backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}' (expected postgres or memory)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub coordinator_seed: PathBuf,
    pub session_key: Option<String>,
}

impl Config {
    /// Read settings from the environment (and `.env` if present).
    pub fn load() -> Result<Self, String> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Ignoring unreadable .env file: {e}");
            }
        }

        let store_backend: StoreBackend = try_load("STORE_BACKEND", "postgres")?;
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set when STORE_BACKEND=postgres".to_string());
        }

        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:8080")?,
            store_backend,
            database_url,
            db_max_connections: try_load("DB_MAX_CONNECTIONS", "8")?,
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
            coordinator_seed: try_load("COORDINATOR_SEED", "data/seed/coordinators.json")?,
            session_key: env::var("SESSION_KEY").ok(),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        log::info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e| format!("Invalid {key} value '{raw}': {e}"))
}

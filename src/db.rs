use std::path::Path;
use std::sync::Arc;

use crate::auth::password;
use crate::config::{Config, StoreBackend};
use crate::errors::AppError;
use crate::models::coordinator::{Coordinator, CoordinatorSeed};
use crate::store::{DocumentStore, MemoryStore, PgStore};

/// Open the configured document store. PostgreSQL runs pending migrations.
pub async fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>, AppError> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Internal("DATABASE_URL is not set".to_string()))?;
            let store = PgStore::connect(url, config.db_max_connections).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Insert coordinators that do not exist yet. Returns (created, skipped).
pub async fn seed_coordinators(
    store: &dyn DocumentStore,
    seeds: Vec<CoordinatorSeed>,
) -> Result<(usize, usize), AppError> {
    let mut created = 0;
    let mut skipped = 0;
    for seed in seeds {
        if store.find_coordinator(&seed.coordinator_id).await?.is_some() {
            skipped += 1;
            continue;
        }
        let coordinator = Coordinator {
            coordinator_id: seed.coordinator_id,
            department: seed.department,
            password_hash: password::hash_password(&seed.password)?,
        };
        if store.insert_coordinator(coordinator).await? {
            created += 1;
        } else {
            skipped += 1;
        }
    }
    Ok((created, skipped))
}

/// Load the coordinator seed file if it exists and import it.
pub async fn seed_coordinators_from_file(
    store: &dyn DocumentStore,
    path: &Path,
) -> Result<(), AppError> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No coordinator seed at {}, skipping", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let seeds: Vec<CoordinatorSeed> = serde_json::from_str(&json)
        .map_err(|e| AppError::Internal(format!("Bad coordinator seed {}: {e}", path.display())))?;

    let (created, skipped) = seed_coordinators(store, seeds).await?;
    log::info!("Coordinator seed: created={created}, skipped={skipped}");
    Ok(())
}

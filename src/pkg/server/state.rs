use std::sync::Arc;

use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

use crate::{
    conf::{StoreBackend, settings},
    pkg::internal::{
        adaptors::jobs::{JobStore, PgJobStore, memory::MemoryJobStore},
        catalog::CatalogOptions,
    },
    prelude::Result,
};

/// Connects on first use; every clone shares the same pool.
pub fn db_pool() -> Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_pool_max_connections)
        .connect_lazy(&settings.database_url)?;
    Ok(pool)
}

pub fn job_store() -> Result<Arc<dyn JobStore>> {
    let store: Arc<dyn JobStore> = match settings.store_backend {
        StoreBackend::Postgres => Arc::new(PgJobStore::new(Arc::new(db_pool()?))),
        StoreBackend::Memory => {
            tracing::warn!("using in-memory job store, postings are lost on restart");
            Arc::new(MemoryJobStore::new())
        }
    };
    Ok(store)
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub catalog: Arc<CatalogOptions>,
    pub body_limit: usize,
}

impl AppState {
    pub fn new() -> Result<AppState> {
        Ok(AppState {
            store: job_store()?,
            catalog: Arc::new(settings.catalog_options()),
            body_limit: settings.body_limit_bytes,
        })
    }
}

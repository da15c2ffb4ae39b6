use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::pkg::internal::{
    adaptors::jobs::mutators::MAX_ROWS_PER_INSERT,
    catalog::{CatalogOptions, SkillsMatch},
};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub service_name: String,
    pub listen_port: String,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub database_pool_max_connections: u32,
    //catalog
    pub default_page_limit: i64,
    pub max_page_limit: i64,
    pub skills_match: SkillsMatch,
    //ingestion
    pub insert_batch_size: usize,
    pub body_limit_bytes: usize,
    //retention
    pub retention_days: i64,
    pub purge_interval_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .set_default("service_name", "jobcatalog")?
            .set_default("listen_port", "3000")?
            .set_default("store_backend", "postgres")?
            .set_default("database_url", "")?
            .set_default("database_pool_max_connections", 10)?
            .set_default("default_page_limit", 9)?
            .set_default("max_page_limit", 1000)?
            .set_default("skills_match", "any")?
            .set_default("insert_batch_size", 500)?
            .set_default("body_limit_bytes", 5 * 1024 * 1024)?
            .set_default("retention_days", 60)?
            .set_default("purge_interval_secs", 3600)?
            .add_source(Environment::default())
            .build()?;
        let s: Settings = conf.try_deserialize()?;
        if s.store_backend == StoreBackend::Postgres && s.database_url.is_empty() {
            return Err(ConfigError::Message(
                "DATABASE_URL is required for the postgres store".into(),
            ));
        }
        Ok(s.clamped())
    }

    fn clamped(mut self) -> Self {
        self.max_page_limit = self.max_page_limit.max(1);
        self.default_page_limit = self.default_page_limit.clamp(1, self.max_page_limit);
        self.insert_batch_size = self.insert_batch_size.clamp(1, MAX_ROWS_PER_INSERT);
        self
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            default_limit: self.default_page_limit,
            max_limit: self.max_page_limit,
            skills_match: self.skills_match,
            insert_batch_size: self.insert_batch_size,
        }
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}

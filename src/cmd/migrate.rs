use sqlx::migrate::Migrator;

use crate::{pkg::server::state::db_pool, prelude::Result};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn apply() -> Result<()> {
    let pool = db_pool()?;
    let mut tx = pool.begin().await?;
    tracing::debug!("connected to db");
    MIGRATOR.run(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("migrations applied successfully");
    Ok(())
}

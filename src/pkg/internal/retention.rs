//! Expiry of postings older than the retention window.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::{pkg::internal::adaptors::jobs::JobStore, prelude::Result};

pub async fn purge_once(store: &dyn JobStore, retention_days: i64) -> Result<u64> {
    let cutoff = Utc::now() - chrono::Duration::days(retention_days);
    let removed = store.purge_expired(cutoff).await?;
    if removed > 0 {
        tracing::info!("purged {} jobs created before {}", removed, cutoff);
    }
    Ok(removed)
}

pub fn spawn_sweeper(store: Arc<dyn JobStore>, retention_days: i64, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            if let Err(e) = purge_once(store.as_ref(), retention_days).await {
                tracing::error!("retention sweep failed: {}", e);
            }
        }
    })
}

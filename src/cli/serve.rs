//! `dogdo serve`

use super::open_adapter;
use crate::bridge;
use crate::config::AppConfig;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(config: &AppConfig, db_path: &Path) -> Result<()> {
    let adapter = Arc::new(open_adapter(config, db_path).await);
    info!(path = %db_path.display(), "Bridge listening on stdio");

    let outcome = bridge::serve(Arc::clone(&adapter), tokio::io::stdin(), tokio::io::stdout()).await;
    adapter.close().await;

    let (summary, _) = outcome?;
    if summary.failed > 0 {
        info!(failed = summary.failed, "Some intents did not reach storage");
    }
    Ok(())
}

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use gacha_clients::PostgresClient;
use gacha_common::ModuleClient;
use gacha_runtime::{CatalogSource, GachaEnv, PostgresCatalog, RateUpStore, StaticCatalog};

pub const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

pub struct CatalogBackend {
    pub source: Arc<dyn CatalogSource>,
    /// Only available when the catalog lives in Postgres.
    pub rate_ups: Option<RateUpStore>,
    pub description: String,
}

/// `CATALOG_JSON` wins, then Postgres when `DATABASE_URL` is set, then the
/// bundled demo catalog.
pub async fn select_backend(env: &GachaEnv) -> Result<CatalogBackend> {
    if let Some(path) = &env.catalog_json {
        info!("[select_backend] reading catalog from {}", path);
        return Ok(CatalogBackend {
            source: Arc::new(StaticCatalog::from_json_file(path)?),
            rate_ups: None,
            description: format!("json file {}", path),
        });
    }

    if std::env::var("DATABASE_URL").is_ok() {
        let client = PostgresClient::connect().await?;
        let pool = sqlx::PgPool::clone(client.client());
        info!("[select_backend] reading catalog from postgres");
        return Ok(CatalogBackend {
            source: Arc::new(PostgresCatalog::new(pool.clone())),
            rate_ups: Some(RateUpStore::new(pool)),
            description: "postgres".to_string(),
        });
    }

    info!("[select_backend] no catalog configured, using the bundled demo catalog");
    Ok(CatalogBackend {
        source: Arc::new(StaticCatalog::from_json_str(BUNDLED_CATALOG)?),
        rate_ups: None,
        description: "bundled demo catalog".to_string(),
    })
}

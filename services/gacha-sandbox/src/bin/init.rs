use anyhow::Result;
use colored::*;
use tracing::info;

use gacha_clients::connect_gacha_database;
use gacha_common::EnvVars;
use gacha_database::{SqlxCrud, SqlxSchema};
use gacha_runtime::{setup_tracing, DrawableItem, GachaEnv, StaticCatalog};
use gacha_sandbox::catalog::BUNDLED_CATALOG;

/// Creates the gacha tables and seeds `gacha_items` when it is empty.
/// `--reset` drops every table first.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing()?;

    let reset = std::env::args().any(|a| a == "--reset");
    let env = GachaEnv::load();
    let db = connect_gacha_database(reset, true).await;

    let existing: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", DrawableItem::TABLE_NAME))
        .fetch_one(db)
        .await?;
    if existing > 0 {
        println!("{} already holds {} items, skipping seed", DrawableItem::TABLE_NAME, existing);
        return Ok(());
    }

    let catalog = match &env.catalog_json {
        Some(path) => StaticCatalog::from_json_file(path)?,
        None => StaticCatalog::from_json_str(BUNDLED_CATALOG)?,
    };

    let mut tx = db.begin().await?;
    for item in catalog.items() {
        item.clone().create(&mut *tx).await?;
    }
    tx.commit().await?;

    info!("[init] seeded {} items", catalog.items().len());
    println!("{}", format!("Database initialized with {} items", catalog.items().len()).green());
    Ok(())
}

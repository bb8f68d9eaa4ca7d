use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use gacha_database::{OrderDirection, QueryCriteria, SqlxFilterQuery};

use crate::item::{DrawableItem, ItemKind, Rarity};

/// Backing store of drawable items.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_items(&self, kind: ItemKind, rarity: Rarity) -> Result<Vec<DrawableItem>>;
}

/// In-memory catalog, usually loaded from a JSON array of items.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<DrawableItem>,
}

impl StaticCatalog {
    pub fn new(items: Vec<DrawableItem>) -> Self {
        Self { items }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let items: Vec<DrawableItem> = serde_json::from_str(raw)
            .context("StaticCatalog::from_json_str: malformed catalog json")?;
        Ok(Self::new(items))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("StaticCatalog::from_json_file: cannot read {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn items(&self) -> &[DrawableItem] {
        &self.items
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_items(&self, kind: ItemKind, rarity: Rarity) -> Result<Vec<DrawableItem>> {
        Ok(self.items.iter()
            .filter(|i| i.kind == kind && i.rarity == rarity)
            .cloned()
            .collect())
    }
}

/// Reads the `gacha_items` table.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalog {
    async fn fetch_items(&self, kind: ItemKind, rarity: Rarity) -> Result<Vec<DrawableItem>> {
        let items = DrawableItem::find_by_criteria(
            QueryCriteria::new()
                .add_valued_filter("kind", "=", kind)
                .add_valued_filter("rarity", "=", rarity)
                .order_by("name_en", OrderDirection::Asc),
            &self.pool,
        ).await?;
        Ok(items)
    }
}

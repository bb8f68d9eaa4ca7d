use serde::{Deserialize, Serialize};
use sqlx::postgres::PgArguments;
use sqlx::types::Uuid;
use sqlx::{PgPool, Postgres};
use tracing::{debug, info};

use gacha_common::get_current_timestamp;
use gacha_database::{OrderDirection, QueryCriteria, SqlxCrud, SqlxFilterQuery, SqlxSchema};

use crate::banner::RateUpEntry;
use crate::catalog::CatalogSnapshot;

/// A rate-up a player saved for themselves; `rate` is a percentage of all
/// draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRateUp {
    pub id: Uuid,
    pub user_id: String,
    pub item_id: Uuid,
    pub rate: f64,
    pub created_at: i64,
}

impl UserRateUp {
    pub fn new(user_id: impl Into<String>, item_id: Uuid, rate: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            item_id,
            rate,
            created_at: get_current_timestamp() as i64,
        }
    }
}

impl SqlxSchema for UserRateUp {
    type Id = Uuid;
    type Row = UserRateUp;

    const TABLE_NAME: &'static str = "user_rate_ups";
    const ID_COLUMN_NAME: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "user_id", "item_id", "rate", "created_at"];
    const INDEXES_SQL: &'static [&'static str] = &[
        "CREATE INDEX IF NOT EXISTS idx_user_rate_ups_user_id ON \"user_rate_ups\" (\"user_id\")",
    ];

    fn get_id_value(&self) -> Uuid {
        self.id
    }

    fn from_row(row: UserRateUp) -> Self {
        row
    }

    fn create_table_sql() -> String {
        r#"CREATE TABLE IF NOT EXISTS "user_rate_ups" (
            "id" UUID PRIMARY KEY,
            "user_id" TEXT NOT NULL,
            "item_id" UUID NOT NULL REFERENCES "gacha_items" ("id") ON DELETE CASCADE,
            "rate" DOUBLE PRECISION NOT NULL CHECK ("rate" > 0 AND "rate" <= 100),
            "created_at" BIGINT NOT NULL,
            UNIQUE ("user_id", "item_id")
        );"#.to_string()
    }
}

impl SqlxFilterQuery for UserRateUp {}

impl SqlxCrud for UserRateUp {
    fn bind_insert<'q>(&self, query: sqlx::query::QueryAs<'q, Postgres, UserRateUp, PgArguments>)
        -> sqlx::query::QueryAs<'q, Postgres, UserRateUp, PgArguments>
    {
        query
            .bind(self.id)
            .bind(self.user_id.clone())
            .bind(self.item_id)
            .bind(self.rate)
            .bind(self.created_at)
    }
}

/// Per-player rate-up lists, one row per (player, item).
#[derive(Clone)]
pub struct RateUpStore {
    pool: PgPool,
}

impl RateUpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn upsert_sql() -> String {
        let insert = UserRateUp::insert_sql();
        let (head, returning) = insert.split_once(" RETURNING ").unwrap_or((insert.as_str(), "*"));
        format!(
            "{} ON CONFLICT (\"user_id\", \"item_id\") DO UPDATE SET \"rate\" = EXCLUDED.\"rate\" RETURNING {}",
            head, returning
        )
    }

    /// Sets the rate of `item_id` for `user_id`, replacing any earlier rate.
    pub async fn upsert(&self, user_id: &str, item_id: Uuid, rate: f64) -> anyhow::Result<UserRateUp> {
        let sql = Self::upsert_sql();
        let row = UserRateUp::new(user_id, item_id, rate)
            .bind_insert(sqlx::query_as(&sql))
            .fetch_one(&self.pool)
            .await?;
        info!("[RateUpStore::upsert] {} set {} to {}%", user_id, item_id, rate);
        Ok(row)
    }

    pub async fn delete(&self, user_id: &str, item_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM \"user_rate_ups\" WHERE \"user_id\" = $1 AND \"item_id\" = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_user(&self, user_id: &str) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM \"user_rate_ups\" WHERE \"user_id\" = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        info!("[RateUpStore::clear_user] removed {} rate-ups of {}", result.rows_affected(), user_id);
        Ok(result.rows_affected())
    }

    pub async fn list(&self, user_id: &str) -> anyhow::Result<Vec<UserRateUp>> {
        let rows = UserRateUp::find_by_criteria(
            QueryCriteria::new()
                .add_valued_filter("user_id", "=", user_id.to_string())
                .order_by("created_at", OrderDirection::Asc),
            &self.pool,
        ).await?;
        Ok(rows)
    }

    /// Saved rate-ups resolved against `catalog`. Rows naming items the
    /// catalog no longer holds are skipped.
    pub async fn list_for_user(&self, user_id: &str, catalog: &CatalogSnapshot) -> anyhow::Result<Vec<RateUpEntry>> {
        Ok(resolve_entries(&self.list(user_id).await?, catalog))
    }
}

pub fn resolve_entries(rows: &[UserRateUp], catalog: &CatalogSnapshot) -> Vec<RateUpEntry> {
    rows.iter()
        .filter_map(|row| match catalog.find_by_id(&row.item_id) {
            Some(item) => Some(RateUpEntry::new((*item).clone(), row.rate)),
            None => {
                debug!("[RateUpStore::list_for_user] {} is not in the catalog, skipping", row.item_id);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{BilingualName, DrawableItem, ItemKind, PromotionFlags, Rarity, SeasonFlags};

    #[test]
    fn test_upsert_sql_replaces_rate() {
        assert_eq!(
            RateUpStore::upsert_sql(),
            "INSERT INTO \"user_rate_ups\" (\"id\", \"user_id\", \"item_id\", \"rate\", \"created_at\") \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (\"user_id\", \"item_id\") DO UPDATE SET \"rate\" = EXCLUDED.\"rate\" \
             RETURNING \"id\", \"user_id\", \"item_id\", \"rate\", \"created_at\""
        );
    }

    #[test]
    fn test_unknown_items_are_skipped() {
        let item = DrawableItem {
            id: Uuid::new_v4(),
            name: BilingualName::new("Sunya", ""),
            rarity: Rarity::SSR,
            kind: ItemKind::Weapon,
            character: None,
            promotions: PromotionFlags { premium: true, ..Default::default() },
            seasons: SeasonFlags::default(),
        };
        let catalog = CatalogSnapshot::from_items(vec![item.clone()]);
        let rows = vec![
            UserRateUp::new("player", item.id, 0.5),
            UserRateUp::new("player", Uuid::new_v4(), 1.0),
        ];

        let entries = resolve_entries(&rows, &catalog);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item.id, item.id);
        assert_eq!(entries[0].rate, 0.5);
    }
}

use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use sqlx::{postgres::PgArguments, Postgres};

use gacha_database::{SqlxCrud, SqlxFilterQuery, SqlxSchema};

use crate::item::{PromotionFlags, Rarity, SeasonFlags};

/// Stored as `SMALLINT` (1 = weapon, 2 = summon).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum ItemKind {
    Weapon = 1,
    Summon = 2,
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::Weapon, ItemKind::Summon];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualName {
    pub en: String,
    #[serde(default)]
    pub jp: String,
}

impl BilingualName {
    pub fn new(en: impl Into<String>, jp: impl Into<String>) -> Self {
        Self { en: en.into(), jp: jp.into() }
    }

    /// Case-insensitive match against either language.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        !query.is_empty() && (
            self.en.eq_ignore_ascii_case(query) ||
            (!self.jp.is_empty() && self.jp == query)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawableItem {
    pub id: Uuid,
    pub name: BilingualName,
    pub rarity: Rarity,
    pub kind: ItemKind,
    /// Set when the weapon recruits a character.
    #[serde(default)]
    pub character: Option<BilingualName>,
    #[serde(default)]
    pub promotions: PromotionFlags,
    #[serde(default)]
    pub seasons: SeasonFlags,
}

impl DrawableItem {
    pub fn is_character_weapon(&self) -> bool {
        self.kind == ItemKind::Weapon && self.character.is_some()
    }

    /// Matches the item name or, for character weapons, the recruited character.
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.matches(query) ||
            self.character.as_ref().is_some_and(|c| c.matches(query))
    }

    /// Seasonal or gala-exclusive items only appear on banners that name them.
    pub fn is_restricted(&self) -> bool {
        self.seasons.any() || self.promotions.is_gala_exclusive()
    }

    pub fn display_name(&self) -> String {
        match &self.character {
            Some(character) => format!("{} ({})", self.name.en, character.en),
            None => self.name.en.clone(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GachaItemRow {
    pub id: Uuid,
    pub name_en: String,
    pub name_jp: String,
    pub rarity: Rarity,
    pub kind: ItemKind,
    pub character_en: Option<String>,
    pub character_jp: Option<String>,
    pub premium: bool,
    pub classic: bool,
    pub flash: bool,
    pub legend: bool,
    pub valentines: bool,
    pub summer: bool,
    pub halloween: bool,
    pub holiday: bool,
}

impl From<GachaItemRow> for DrawableItem {
    fn from(row: GachaItemRow) -> Self {
        let character = row.character_en.map(|en| BilingualName {
            en,
            jp: row.character_jp.unwrap_or_default(),
        });

        Self {
            id: row.id,
            name: BilingualName { en: row.name_en, jp: row.name_jp },
            rarity: row.rarity,
            kind: row.kind,
            character,
            promotions: PromotionFlags {
                premium: row.premium,
                classic: row.classic,
                flash: row.flash,
                legend: row.legend,
            },
            seasons: SeasonFlags {
                valentines: row.valentines,
                summer: row.summer,
                halloween: row.halloween,
                holiday: row.holiday,
            },
        }
    }
}

impl SqlxSchema for DrawableItem {
    type Id = Uuid;
    type Row = GachaItemRow;

    const TABLE_NAME: &'static str = "gacha_items";
    const ID_COLUMN_NAME: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &[
        "id", "name_en", "name_jp", "rarity", "kind", "character_en", "character_jp",
        "premium", "classic", "flash", "legend",
        "valentines", "summer", "halloween", "holiday",
    ];
    const INDEXES_SQL: &'static [&'static str] = &[
        "CREATE INDEX IF NOT EXISTS idx_gacha_items_kind_rarity ON \"gacha_items\" (\"kind\", \"rarity\")",
    ];

    fn get_id_value(&self) -> Uuid {
        self.id
    }

    fn from_row(row: GachaItemRow) -> Self {
        row.into()
    }

    fn create_table_sql() -> String {
        r#"CREATE TABLE IF NOT EXISTS "gacha_items" (
            "id" UUID PRIMARY KEY,
            "name_en" TEXT NOT NULL,
            "name_jp" TEXT NOT NULL DEFAULT '',
            "rarity" SMALLINT NOT NULL CHECK ("rarity" BETWEEN 1 AND 3),
            "kind" SMALLINT NOT NULL CHECK ("kind" BETWEEN 1 AND 2),
            "character_en" TEXT,
            "character_jp" TEXT,
            "premium" BOOLEAN NOT NULL DEFAULT FALSE,
            "classic" BOOLEAN NOT NULL DEFAULT FALSE,
            "flash" BOOLEAN NOT NULL DEFAULT FALSE,
            "legend" BOOLEAN NOT NULL DEFAULT FALSE,
            "valentines" BOOLEAN NOT NULL DEFAULT FALSE,
            "summer" BOOLEAN NOT NULL DEFAULT FALSE,
            "halloween" BOOLEAN NOT NULL DEFAULT FALSE,
            "holiday" BOOLEAN NOT NULL DEFAULT FALSE
        );"#.to_string()
    }
}

impl SqlxFilterQuery for DrawableItem {}

impl SqlxCrud for DrawableItem {
    fn bind_insert<'q>(&self, query: sqlx::query::QueryAs<'q, Postgres, GachaItemRow, PgArguments>)
        -> sqlx::query::QueryAs<'q, Postgres, GachaItemRow, PgArguments>
    {
        let character = self.character.clone();
        query
            .bind(self.id)
            .bind(self.name.en.clone())
            .bind(self.name.jp.clone())
            .bind(self.rarity)
            .bind(self.kind)
            .bind(character.as_ref().map(|c| c.en.clone()))
            .bind(character.map(|c| c.jp))
            .bind(self.promotions.premium)
            .bind(self.promotions.classic)
            .bind(self.promotions.flash)
            .bind(self.promotions.legend)
            .bind(self.seasons.valentines)
            .bind(self.seasons.summer)
            .bind(self.seasons.halloween)
            .bind(self.seasons.holiday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_weapon() -> DrawableItem {
        DrawableItem {
            id: Uuid::new_v4(),
            name: BilingualName::new("Ixaba", "イクサバ"),
            rarity: Rarity::SSR,
            kind: ItemKind::Weapon,
            character: Some(BilingualName::new("Yamato", "ヤマト")),
            promotions: PromotionFlags { flash: true, ..Default::default() },
            seasons: SeasonFlags::default(),
        }
    }

    #[test]
    fn test_matches_item_or_character_name() {
        let weapon = sample_weapon();
        assert!(weapon.matches_name("ixaba"));
        assert!(weapon.matches_name("IXABA "));
        assert!(weapon.matches_name("yamato"));
        assert!(weapon.matches_name("ヤマト"));
        assert!(!weapon.matches_name("Yama"));
        assert!(!weapon.matches_name(""));
        assert!(weapon.is_character_weapon());
        assert!(weapon.is_restricted());
    }

    #[test]
    fn test_row_conversion_keeps_flags() {
        let row = GachaItemRow {
            id: Uuid::new_v4(),
            name_en: "Colossus Omega".to_string(),
            name_jp: "コロッサス・マグナ".to_string(),
            rarity: Rarity::SSR,
            kind: ItemKind::Summon,
            character_en: None,
            character_jp: None,
            premium: true,
            classic: false,
            flash: true,
            legend: true,
            valentines: false,
            summer: true,
            halloween: false,
            holiday: false,
        };

        let item = DrawableItem::from_row(row);
        assert!(item.character.is_none());
        assert!(item.promotions.premium && item.promotions.legend);
        assert_eq!(item.seasons.first(), Some(crate::item::Season::Summer));
        assert!(item.is_restricted());
    }

    #[test]
    fn test_insert_sql_covers_every_column() {
        let sql = DrawableItem::insert_sql();
        assert!(sql.starts_with("INSERT INTO \"gacha_items\""));
        assert!(sql.contains("$15"));
        assert!(!sql.contains("$16"));
    }
}

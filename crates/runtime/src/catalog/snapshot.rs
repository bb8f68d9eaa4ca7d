use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use sqlx::types::Uuid;
use tokio::time::Instant;

use crate::banner::PoolFilter;
use crate::item::{DrawableItem, ItemKind, Rarity};
use crate::weighted::pick_uniform;

/// One loaded copy of the catalog, partitioned by kind and rarity. Read-only
/// once built; a refresh produces a new snapshot.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pools: HashMap<(ItemKind, Rarity), Vec<Arc<DrawableItem>>>,
    loaded_at: Instant,
}

impl CatalogSnapshot {
    pub fn from_items(items: impl IntoIterator<Item = DrawableItem>) -> Self {
        let mut pools: HashMap<(ItemKind, Rarity), Vec<Arc<DrawableItem>>> = HashMap::new();
        for item in items {
            pools.entry((item.kind, item.rarity)).or_default().push(Arc::new(item));
        }
        Self { pools, loaded_at: Instant::now() }
    }

    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Weapons before summons, R to SSR, then catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<DrawableItem>> {
        ItemKind::ALL.into_iter()
            .flat_map(|kind| Rarity::ALL.into_iter().map(move |rarity| (kind, rarity)))
            .filter_map(|key| self.pools.get(&key))
            .flatten()
    }

    fn filtered(&self, kind: ItemKind, rarity: Rarity, filter: &PoolFilter) -> Vec<Arc<DrawableItem>> {
        self.pools.get(&(kind, rarity))
            .map(|pool| pool.iter().filter(|i| filter.matches(i)).cloned().collect())
            .unwrap_or_default()
    }

    /// Every eligible weapon, character-linked or not.
    pub fn weapons(&self, rarity: Rarity, filter: &PoolFilter) -> Vec<Arc<DrawableItem>> {
        self.filtered(ItemKind::Weapon, rarity, filter)
    }

    pub fn character_weapons(&self, rarity: Rarity, filter: &PoolFilter) -> Vec<Arc<DrawableItem>> {
        let mut weapons = self.weapons(rarity, filter);
        weapons.retain(|w| w.is_character_weapon());
        weapons
    }

    pub fn summons(&self, rarity: Rarity, filter: &PoolFilter) -> Vec<Arc<DrawableItem>> {
        self.filtered(ItemKind::Summon, rarity, filter)
    }

    /// Weapons and summons together.
    pub fn items(&self, rarity: Rarity, filter: &PoolFilter) -> Vec<Arc<DrawableItem>> {
        let mut items = self.weapons(rarity, filter);
        items.extend(self.summons(rarity, filter));
        items
    }

    /// SSR character weapons exclusive to the filter's gala. Empty on
    /// premium and classic banners.
    pub fn limited_weapons(&self, filter: &PoolFilter) -> Vec<Arc<DrawableItem>> {
        let mut weapons = self.character_weapons(Rarity::SSR, filter);
        weapons.retain(|w| w.promotions.is_gala_exclusive());
        weapons
    }

    pub fn fetch_item<R: Rng>(&self, rarity: Rarity, filter: &PoolFilter, rng: &mut R) -> Option<Arc<DrawableItem>> {
        pick_uniform(&self.items(rarity, filter), rng).cloned()
    }

    pub fn fetch_weapon<R: Rng>(&self, rarity: Rarity, filter: &PoolFilter, rng: &mut R) -> Option<Arc<DrawableItem>> {
        pick_uniform(&self.weapons(rarity, filter), rng).cloned()
    }

    pub fn fetch_summon<R: Rng>(&self, rarity: Rarity, filter: &PoolFilter, rng: &mut R) -> Option<Arc<DrawableItem>> {
        pick_uniform(&self.summons(rarity, filter), rng).cloned()
    }

    pub fn fetch_limited<R: Rng>(&self, filter: &PoolFilter, rng: &mut R) -> Option<Arc<DrawableItem>> {
        pick_uniform(&self.limited_weapons(filter), rng).cloned()
    }

    pub fn find_by_id(&self, id: &Uuid) -> Option<Arc<DrawableItem>> {
        self.iter().find(|i| i.id == *id).cloned()
    }

    /// Item-name matches win over recruited-character matches, then higher
    /// rarity wins. Remaining ties go to the first item in [`Self::iter`] order.
    pub fn find_by_name(&self, query: &str) -> Option<Arc<DrawableItem>> {
        self.iter()
            .filter(|i| i.matches_name(query))
            .min_by_key(|i| Reverse((i.name.matches(query), i.rarity)))
            .cloned()
    }
}

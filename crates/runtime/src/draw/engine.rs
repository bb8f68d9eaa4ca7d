use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::banner::Banner;
use crate::catalog::CatalogSnapshot;
use crate::draw::{RarityTable, SlotKind, SsrBuckets};
use crate::error::{GachaError, GachaResult};
use crate::item::{DrawableItem, Rarity, RarityCount};
use crate::weighted::pick_uniform;

pub const BATCH_SIZE: u64 = 10;
/// Ten-part draws needed to reach a spark (300 draws).
pub const SPARK_BATCHES: u32 = 30;

/// Which drawn items a batch keeps besides its rarity counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemDetail {
    #[default]
    SsrOnly,
    SrAndAbove,
    Full,
}

impl ItemDetail {
    pub fn records(&self, rarity: Rarity) -> bool {
        match self {
            ItemDetail::SsrOnly => rarity == Rarity::SSR,
            ItemDetail::SrAndAbove => rarity >= Rarity::SR,
            ItemDetail::Full => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    pub count: RarityCount,
    pub items: Vec<Arc<DrawableItem>>,
}

impl SimulationResult {
    pub fn draws(&self) -> u64 {
        self.count.total()
    }

    pub fn ssr_items(&self) -> impl Iterator<Item = &Arc<DrawableItem>> {
        self.items.iter().filter(|i| i.rarity == Rarity::SSR)
    }
}

/// Draws against one banner and one catalog snapshot. Holds no draw
/// history: every call is independent of the previous ones.
#[derive(Debug, Clone)]
pub struct DrawEngine {
    catalog: Arc<CatalogSnapshot>,
    banner: Banner,
    ordinary: RarityTable,
    guaranteed: RarityTable,
    buckets: SsrBuckets,
    sr_pool: Vec<Arc<DrawableItem>>,
    r_pool: Vec<Arc<DrawableItem>>,
}

impl DrawEngine {
    /// Resolves every pool the banner needs up front, so a misconfigured
    /// banner fails here rather than halfway through a batch.
    pub fn new(catalog: Arc<CatalogSnapshot>, banner: Banner) -> GachaResult<Self> {
        let filter = banner.filter();
        let buckets = SsrBuckets::resolve(&banner, &catalog)?;

        let sr_pool = catalog.items(Rarity::SR, &filter);
        if sr_pool.is_empty() {
            return Err(GachaError::configuration(format!("no eligible SR items for a {} banner", banner.promotion())));
        }
        let r_pool = catalog.items(Rarity::R, &filter);
        if r_pool.is_empty() {
            return Err(GachaError::configuration(format!("no eligible R items for a {} banner", banner.promotion())));
        }

        let rate_up = banner.is_rate_up();
        Ok(Self {
            catalog,
            ordinary: RarityTable::for_slot(rate_up, SlotKind::Ordinary),
            guaranteed: RarityTable::for_slot(rate_up, SlotKind::Guaranteed),
            banner,
            buckets,
            sr_pool,
            r_pool,
        })
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn buckets(&self) -> &SsrBuckets {
        &self.buckets
    }

    pub fn catalog(&self) -> &Arc<CatalogSnapshot> {
        &self.catalog
    }

    pub fn rarity_table(&self, slot: SlotKind) -> &RarityTable {
        match slot {
            SlotKind::Ordinary => &self.ordinary,
            SlotKind::Guaranteed => &self.guaranteed,
        }
    }

    fn draw_slot<R: Rng>(&self, slot: SlotKind, rng: &mut R) -> GachaResult<Arc<DrawableItem>> {
        let rarity = self.rarity_table(slot).sample(rng);
        self.draw_item(rarity, rng)
    }

    fn draw_item<R: Rng>(&self, rarity: Rarity, rng: &mut R) -> GachaResult<Arc<DrawableItem>> {
        let picked = match rarity {
            Rarity::SSR => return self.buckets.sample(rng),
            Rarity::SR => pick_uniform(&self.sr_pool, rng),
            Rarity::R => pick_uniform(&self.r_pool, rng),
        };
        picked.cloned().ok_or_else(|| GachaError::configuration(format!("{} pool is empty", rarity)))
    }

    pub fn single_roll<R: Rng>(&self, rng: &mut R) -> GachaResult<Arc<DrawableItem>> {
        self.draw_slot(SlotKind::Ordinary, rng)
    }

    /// `times` batches of nine ordinary draws and one guaranteed draw.
    pub fn ten_part_roll<R: Rng>(&self, times: u32, detail: ItemDetail, rng: &mut R) -> GachaResult<SimulationResult> {
        let mut result = SimulationResult::default();
        for _ in 0..times {
            for slot in 0..BATCH_SIZE {
                let kind = if slot + 1 == BATCH_SIZE { SlotKind::Guaranteed } else { SlotKind::Ordinary };
                let item = self.draw_slot(kind, rng)?;
                result.count.record(item.rarity);
                if detail.records(item.rarity) {
                    result.items.push(item);
                }
            }
        }
        Ok(result)
    }

    /// Exactly 300 draws. Choosing the spark SSR itself is left to the caller.
    pub fn spark<R: Rng>(&self, detail: ItemDetail, rng: &mut R) -> GachaResult<SimulationResult> {
        self.ten_part_roll(SPARK_BATCHES, detail, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::RateUpEntry;
    use crate::item::{BilingualName, ItemKind, Promotion, PromotionFlags, SeasonFlags};
    use rand::{rngs::StdRng, SeedableRng};
    use sqlx::types::Uuid;

    fn catalog() -> Arc<CatalogSnapshot> {
        let flags = PromotionFlags { premium: true, flash: true, legend: true, ..Default::default() };
        let mut items = Vec::new();
        for (rarity, count) in [(Rarity::R, 20), (Rarity::SR, 10), (Rarity::SSR, 6)] {
            for i in 0..count {
                items.push(DrawableItem {
                    id: Uuid::new_v4(),
                    name: BilingualName::new(format!("{} {}", rarity, i), ""),
                    rarity,
                    kind: if i % 3 == 0 { ItemKind::Summon } else { ItemKind::Weapon },
                    character: None,
                    promotions: flags,
                    seasons: SeasonFlags::default(),
                });
            }
        }
        Arc::new(CatalogSnapshot::from_items(items))
    }

    #[test]
    fn test_spark_is_exactly_300_draws() -> anyhow::Result<()> {
        let engine = DrawEngine::new(catalog(), Banner::standard())?;
        let mut rng = StdRng::seed_from_u64(5);
        let spark = engine.spark(ItemDetail::Full, &mut rng)?;
        assert_eq!(spark.draws(), 300);
        assert_eq!(spark.items.len(), 300);
        Ok(())
    }

    #[test]
    fn test_items_follow_detail_level() -> anyhow::Result<()> {
        let engine = DrawEngine::new(catalog(), Banner::standard())?;
        let mut rng = StdRng::seed_from_u64(8);

        let ssr_only = engine.ten_part_roll(20, ItemDetail::SsrOnly, &mut rng)?;
        assert_eq!(ssr_only.items.len() as u64, ssr_only.count.ssr);
        assert!(ssr_only.items.iter().all(|i| i.rarity == Rarity::SSR));

        let sr_up = engine.ten_part_roll(20, ItemDetail::SrAndAbove, &mut rng)?;
        assert_eq!(sr_up.items.len() as u64, sr_up.count.sr + sr_up.count.ssr);
        Ok(())
    }

    #[test]
    fn test_every_batch_has_sr_or_better() -> anyhow::Result<()> {
        let engine = DrawEngine::new(catalog(), Banner::new(Promotion::Flash, None, Vec::new()))?;
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..2_000 {
            let batch = engine.ten_part_roll(1, ItemDetail::Full, &mut rng)?;
            assert_eq!(batch.draws(), 10);
            assert_ne!(batch.items[9].rarity, Rarity::R);
            assert!(batch.count.sr + batch.count.ssr >= 1);
        }
        Ok(())
    }

    #[test]
    fn test_same_seed_same_draws() -> anyhow::Result<()> {
        let snapshot = catalog();
        let target = snapshot.find_by_name("SSR 1").ok_or_else(|| anyhow::anyhow!("missing item"))?;
        let banner = Banner::new(Promotion::Legend, None, vec![RateUpEntry::new((*target).clone(), 0.5)]);
        let engine = DrawEngine::new(snapshot, banner)?;

        let first = engine.spark(ItemDetail::Full, &mut StdRng::seed_from_u64(99))?;
        let second = engine.spark(ItemDetail::Full, &mut StdRng::seed_from_u64(99))?;
        let ids = |r: &SimulationResult| r.items.iter().map(|i| i.id).collect::<Vec<_>>();
        assert_eq!(first.count, second.count);
        assert_eq!(ids(&first), ids(&second));
        Ok(())
    }

    #[test]
    fn test_missing_rarity_pool_fails_construction() {
        let only_ssr = CatalogSnapshot::from_items(catalog().iter().filter(|i| i.rarity == Rarity::SSR).map(|i| (**i).clone()).collect::<Vec<_>>());
        let result = DrawEngine::new(Arc::new(only_ssr), Banner::standard());
        assert!(matches!(result, Err(GachaError::Configuration(_))));
    }
}

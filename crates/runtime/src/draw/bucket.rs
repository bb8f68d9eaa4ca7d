use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

use crate::banner::Banner;
use crate::catalog::CatalogSnapshot;
use crate::error::{GachaError, GachaResult};
use crate::item::{DrawableItem, Rarity};
use crate::weighted::{pick_uniform, weighted_pick};

/// SSR share of all draws, in percent, on a banner without a gala.
/// Flash and Legend double it.
pub const BASE_SSR_BUDGET: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SsrBucket {
    RateUp,
    Limited,
    Summon,
    Weapon,
}

impl fmt::Display for SsrBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SsrBucket::RateUp => "rate-up",
            SsrBucket::Limited => "limited",
            SsrBucket::Summon => "summon",
            SsrBucket::Weapon => "weapon",
        };
        f.write_str(name)
    }
}

/// Split of the SSR tier into item pools for one banner.
///
/// Every non-rate-up SSR gets an equal share of what the rate-ups leave of
/// the budget, except that a gala-exclusive weapon weighs twice a regular
/// weapon. Rate-up items are taken out of the other pools so their mass is
/// exactly the requested rate.
#[derive(Debug, Clone)]
pub struct SsrBuckets {
    budget: f64,
    rate_up_items: Vec<Arc<DrawableItem>>,
    rate_up_rates: Vec<f64>,
    limited: Vec<Arc<DrawableItem>>,
    summons: Vec<Arc<DrawableItem>>,
    weapons: Vec<Arc<DrawableItem>>,
    weapon_rate: f64,
    limited_rate: f64,
    summon_rate: f64,
    buckets: Vec<SsrBucket>,
    weights: Vec<f64>,
}

impl SsrBuckets {
    pub fn resolve(banner: &Banner, catalog: &CatalogSnapshot) -> GachaResult<Self> {
        let filter = banner.filter();
        let budget = if banner.is_rate_up() { BASE_SSR_BUDGET * 2.0 } else { BASE_SSR_BUDGET };

        let rate_up_total = banner.rate_up_total();
        let remaining = budget - rate_up_total;
        if remaining < 0.0 {
            return Err(GachaError::configuration(format!(
                "rate-ups total {:.3}% which exceeds the {:.1}% SSR budget of a {} banner",
                rate_up_total, budget, banner.promotion()
            )));
        }

        let rated: HashSet<Uuid> = banner.rate_ups().iter().map(|r| r.item.id).collect();
        let not_rated = |pool: Vec<Arc<DrawableItem>>| -> Vec<Arc<DrawableItem>> {
            pool.into_iter().filter(|i| !rated.contains(&i.id)).collect()
        };

        let all_weapons = not_rated(catalog.weapons(Rarity::SSR, &filter));
        let limited = not_rated(catalog.limited_weapons(&filter));
        let limited_ids: HashSet<Uuid> = limited.iter().map(|i| i.id).collect();
        let weapons: Vec<_> = all_weapons.iter().filter(|w| !limited_ids.contains(&w.id)).cloned().collect();
        let summons = not_rated(catalog.summons(Rarity::SSR, &filter));

        let remaining_items = all_weapons.len() + summons.len();
        if remaining_items == 0 {
            return Err(GachaError::configuration(format!(
                "no eligible SSR weapons or summons for a {} banner", banner.promotion()
            )));
        }
        let summon_rate = remaining / remaining_items as f64;

        let weapon_budget = remaining - summon_rate * summons.len() as f64;
        let weapon_denominator = weapons.len() + 2 * limited.len();
        if weapon_denominator == 0 {
            return Err(GachaError::configuration(format!(
                "no eligible SSR weapons for a {} banner", banner.promotion()
            )));
        }
        let weapon_rate = weapon_budget / weapon_denominator as f64;
        let limited_rate = weapon_rate * 2.0;

        let mut raw = Vec::with_capacity(4);
        if !banner.rate_ups().is_empty() {
            raw.push((SsrBucket::RateUp, rate_up_total));
        }
        raw.push((SsrBucket::Limited, limited_rate * limited.len() as f64));
        raw.push((SsrBucket::Summon, summon_rate * summons.len() as f64));
        raw.push((SsrBucket::Weapon, weapon_rate * weapons.len() as f64));

        let total: f64 = raw.iter().map(|(_, w)| w).sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(GachaError::configuration(format!(
                "SSR buckets carry no probability on a {} banner", banner.promotion()
            )));
        }

        Ok(Self {
            budget,
            rate_up_items: banner.rate_ups().iter().map(|r| Arc::new(r.item.clone())).collect(),
            rate_up_rates: banner.rate_ups().iter().map(|r| r.rate).collect(),
            limited,
            summons,
            weapons,
            weapon_rate,
            limited_rate,
            summon_rate,
            buckets: raw.iter().map(|(b, _)| *b).collect(),
            weights: raw.iter().map(|(_, w)| w / total).collect(),
        })
    }

    /// Normalised bucket probabilities, summing to 1.
    pub fn weights(&self) -> Vec<(SsrBucket, f64)> {
        self.buckets.iter().copied().zip(self.weights.iter().copied()).collect()
    }

    pub fn weight(&self, bucket: SsrBucket) -> f64 {
        self.buckets.iter()
            .position(|b| *b == bucket)
            .map(|i| self.weights[i])
            .unwrap_or(0.0)
    }

    /// SSR tier share of all draws, in percent.
    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn weapon_rate(&self) -> f64 {
        self.weapon_rate
    }

    pub fn limited_rate(&self) -> f64 {
        self.limited_rate
    }

    pub fn summon_rate(&self) -> f64 {
        self.summon_rate
    }

    pub fn pool(&self, bucket: SsrBucket) -> &[Arc<DrawableItem>] {
        match bucket {
            SsrBucket::RateUp => &self.rate_up_items,
            SsrBucket::Limited => &self.limited,
            SsrBucket::Summon => &self.summons,
            SsrBucket::Weapon => &self.weapons,
        }
    }

    /// Percentage of all draws that yield `item` on this banner.
    pub fn item_rate(&self, item: &DrawableItem) -> f64 {
        if let Some(i) = self.rate_up_items.iter().position(|r| r.id == item.id) {
            return self.rate_up_rates[i];
        }
        let contains = |pool: &[Arc<DrawableItem>]| pool.iter().any(|i| i.id == item.id);
        if contains(&self.limited) {
            self.limited_rate
        } else if contains(&self.summons) {
            self.summon_rate
        } else if contains(&self.weapons) {
            self.weapon_rate
        } else {
            0.0
        }
    }

    pub fn sample_bucket<R: Rng>(&self, rng: &mut R) -> GachaResult<SsrBucket> {
        weighted_pick(&self.buckets, &self.weights, rng)
            .copied()
            .ok_or_else(|| GachaError::configuration("SSR buckets carry no probability"))
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> GachaResult<Arc<DrawableItem>> {
        let bucket = self.sample_bucket(rng)?;
        let picked = match bucket {
            SsrBucket::RateUp => weighted_pick(&self.rate_up_items, &self.rate_up_rates, rng),
            other => pick_uniform(self.pool(other), rng),
        };
        picked.cloned().ok_or_else(|| GachaError::configuration(format!("SSR {} pool is empty", bucket)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::RateUpEntry;
    use crate::item::{BilingualName, ItemKind, Promotion, PromotionFlags, SeasonFlags};
    use rand::{rngs::StdRng, SeedableRng};

    fn item(name: String, kind: ItemKind, character: bool, promotions: PromotionFlags) -> DrawableItem {
        DrawableItem {
            id: Uuid::new_v4(),
            character: character.then(|| BilingualName::new(format!("{} character", name), "")),
            name: BilingualName::new(name, ""),
            rarity: Rarity::SSR,
            kind,
            promotions,
            seasons: SeasonFlags::default(),
        }
    }

    /// 50 regular weapons, 5 flash-exclusive weapons, 10 summons.
    fn flash_catalog() -> (CatalogSnapshot, Vec<DrawableItem>) {
        let evergreen = PromotionFlags { premium: true, flash: true, legend: true, ..Default::default() };
        let exclusive = PromotionFlags { flash: true, ..Default::default() };

        let mut items = Vec::new();
        for i in 0..50 {
            items.push(item(format!("Weapon {}", i), ItemKind::Weapon, i % 2 == 0, evergreen));
        }
        for i in 0..5 {
            items.push(item(format!("Limited {}", i), ItemKind::Weapon, true, exclusive));
        }
        for i in 0..10 {
            items.push(item(format!("Summon {}", i), ItemKind::Summon, false, evergreen));
        }
        (CatalogSnapshot::from_items(items.clone()), items)
    }

    #[test]
    fn test_flash_banner_with_rate_up_fills_every_bucket() -> anyhow::Result<()> {
        let (catalog, items) = flash_catalog();
        let banner = Banner::new(Promotion::Flash, None, vec![RateUpEntry::new(items[0].clone(), 1.0)]);
        let buckets = SsrBuckets::resolve(&banner, &catalog)?;

        for bucket in [SsrBucket::RateUp, SsrBucket::Limited, SsrBucket::Summon, SsrBucket::Weapon] {
            assert!(buckets.weight(bucket) > 0.0, "{} bucket is empty", bucket);
        }
        let sum: f64 = buckets.weights().iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);

        assert_eq!(buckets.budget(), 6.0);
        assert!((buckets.weight(SsrBucket::RateUp) - 1.0 / 6.0).abs() < 1e-9);
        assert!((buckets.limited_rate() - 2.0 * buckets.weapon_rate()).abs() < 1e-12);
        assert!((buckets.summon_rate() - 5.0 / 64.0).abs() < 1e-12);
        // the rated-up weapon left the regular pool
        assert_eq!(buckets.pool(SsrBucket::Weapon).len(), 49);
        assert_eq!(buckets.item_rate(&items[0]), 1.0);

        let per_item_total: f64 = items.iter().map(|i| buckets.item_rate(i)).sum();
        assert!((per_item_total - 6.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_standard_banner_drops_rate_up_bucket() -> anyhow::Result<()> {
        let (catalog, _) = flash_catalog();
        let buckets = SsrBuckets::resolve(&Banner::standard(), &catalog)?;

        assert_eq!(buckets.budget(), 3.0);
        assert_eq!(buckets.weight(SsrBucket::RateUp), 0.0);
        assert_eq!(buckets.weight(SsrBucket::Limited), 0.0);
        assert!(buckets.weights().iter().all(|(b, _)| *b != SsrBucket::RateUp));
        let sum: f64 = buckets.weights().iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_empty_pools_are_configuration_errors() {
        let only_summons = CatalogSnapshot::from_items(vec![
            item("Summon".to_string(), ItemKind::Summon, false, PromotionFlags { premium: true, ..Default::default() }),
        ]);
        let result = SsrBuckets::resolve(&Banner::standard(), &only_summons);
        assert!(matches!(result, Err(GachaError::Configuration(_))));

        let empty = CatalogSnapshot::from_items(Vec::new());
        let result = SsrBuckets::resolve(&Banner::standard(), &empty);
        assert!(matches!(result, Err(GachaError::Configuration(_))));
    }

    #[test]
    fn test_rate_ups_above_budget_are_rejected() {
        let (catalog, items) = flash_catalog();
        let banner = Banner::new(Promotion::Premium, None, vec![
            RateUpEntry::new(items[0].clone(), 2.0),
            RateUpEntry::new(items[1].clone(), 1.5),
        ]);
        let result = SsrBuckets::resolve(&banner, &catalog);
        assert!(matches!(result, Err(GachaError::Configuration(_))));
    }

    #[test]
    fn test_rate_up_draws_follow_configured_ratio() -> anyhow::Result<()> {
        let (catalog, items) = flash_catalog();
        let banner = Banner::new(Promotion::Flash, None, vec![
            RateUpEntry::new(items[2].clone(), 0.3),
            RateUpEntry::new(items[4].clone(), 0.5),
        ]);
        let buckets = SsrBuckets::resolve(&banner, &catalog)?;
        let mut rng = StdRng::seed_from_u64(2024);

        let (mut first, mut second) = (0u32, 0u32);
        for _ in 0..200_000 {
            let drawn = buckets.sample(&mut rng)?;
            if drawn.id == items[2].id {
                first += 1;
            } else if drawn.id == items[4].id {
                second += 1;
            }
        }

        let ratio = first as f64 / second as f64;
        assert!((ratio - 0.6).abs() < 0.05, "ratio was {}", ratio);
        // 0.8% of a 6% tier
        let share = (first + second) as f64 / 200_000.0;
        assert!((share - 0.8 / 6.0).abs() < 0.005, "share was {}", share);
        Ok(())
    }
}

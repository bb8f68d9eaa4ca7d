use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::{DrawableItem, Promotion, Rarity, Season};

/// Pool restriction derived from a banner. `promotion` is `None` on the
/// premium banner, where only standard items qualify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFilter {
    pub promotion: Option<Promotion>,
    pub season: Option<Season>,
}

impl PoolFilter {
    pub fn new(promotion: Promotion, season: Option<Season>) -> Self {
        let promotion = match promotion {
            Promotion::Premium => None,
            other => Some(other),
        };
        Self { promotion, season }
    }

    /// Both flags must match when both are given, the given one otherwise,
    /// and a standard premium item when neither is. Seasonal items never pass
    /// without their season and gala-exclusive items never pass without their
    /// gala.
    pub fn matches(&self, item: &DrawableItem) -> bool {
        let flagged = match (self.promotion, self.season) {
            (Some(p), Some(s)) => item.promotions.has(p) && item.seasons.has(s),
            (Some(p), None) => item.promotions.has(p),
            (None, Some(s)) => item.seasons.has(s),
            (None, None) => item.promotions.premium,
        };
        if !flagged {
            return false;
        }

        if item.seasons.any() && !self.season.is_some_and(|s| item.seasons.has(s)) {
            return false;
        }
        if item.promotions.is_gala_exclusive() && !self.promotion.is_some_and(|p| item.promotions.has(p)) {
            return false;
        }
        true
    }
}

/// A player-requested boost: `rate` is a percentage of all draws (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateUpEntry {
    pub item: DrawableItem,
    pub rate: f64,
}

impl RateUpEntry {
    pub fn new(item: DrawableItem, rate: f64) -> Self {
        Self { item, rate }
    }
}

/// Immutable banner configuration. Rate-ups that cannot apply to this
/// banner are moved to `dropped` at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    promotion: Promotion,
    season: Option<Season>,
    rate_ups: Vec<RateUpEntry>,
    dropped: Vec<RateUpEntry>,
}

impl Banner {
    pub fn new(promotion: Promotion, season: Option<Season>, rate_ups: Vec<RateUpEntry>) -> Self {
        let filter = PoolFilter::new(promotion, season);
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut dropped = Vec::new();

        for entry in rate_ups {
            let eligible = entry.item.rarity == Rarity::SSR
                && entry.rate.is_finite()
                && entry.rate > 0.0
                && filter.matches(&entry.item)
                && seen.insert(entry.item.id);

            if eligible {
                kept.push(entry);
            } else {
                debug!("[Banner::new] dropping rate-up {} ({}%) on {} banner", entry.item.name.en, entry.rate, promotion);
                dropped.push(entry);
            }
        }

        Self { promotion, season, rate_ups: kept, dropped }
    }

    pub fn standard() -> Self {
        Self::new(Promotion::Premium, None, Vec::new())
    }

    pub fn promotion(&self) -> Promotion {
        self.promotion
    }

    pub fn season(&self) -> Option<Season> {
        self.season
    }

    pub fn rate_ups(&self) -> &[RateUpEntry] {
        &self.rate_ups
    }

    pub fn dropped(&self) -> &[RateUpEntry] {
        &self.dropped
    }

    pub fn filter(&self) -> PoolFilter {
        PoolFilter::new(self.promotion, self.season)
    }

    pub fn is_rate_up(&self) -> bool {
        self.promotion.is_rate_up()
    }

    /// Sum of all active rate-up percentages.
    pub fn rate_up_total(&self) -> f64 {
        self.rate_ups.iter().map(|r| r.rate).sum()
    }

    pub fn is_rated_up(&self, item: &DrawableItem) -> bool {
        self.rate_ups.iter().any(|r| r.item.id == item.id)
    }

    /// Same rate-up request against a different promotion or season. Entries
    /// dropped earlier are reconsidered.
    pub fn with(&self, promotion: Promotion, season: Option<Season>) -> Self {
        let requested = self.rate_ups.iter().chain(self.dropped.iter()).cloned().collect();
        Self::new(promotion, season, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{BilingualName, ItemKind, PromotionFlags, SeasonFlags};
    use sqlx::types::Uuid;

    fn item(rarity: Rarity, promotions: PromotionFlags, seasons: SeasonFlags) -> DrawableItem {
        DrawableItem {
            id: Uuid::new_v4(),
            name: BilingualName::new("Test", ""),
            rarity,
            kind: ItemKind::Weapon,
            character: None,
            promotions,
            seasons,
        }
    }

    #[test]
    fn test_filter_rules() {
        let premium = item(Rarity::SSR, PromotionFlags { premium: true, flash: true, ..Default::default() }, SeasonFlags::default());
        let flash_only = item(Rarity::SSR, PromotionFlags { flash: true, ..Default::default() }, SeasonFlags::default());
        let summer = item(Rarity::SSR, PromotionFlags { premium: true, ..Default::default() }, SeasonFlags { summer: true, ..Default::default() });

        let standard = PoolFilter::new(Promotion::Premium, None);
        assert!(standard.matches(&premium));
        assert!(!standard.matches(&flash_only));
        assert!(!standard.matches(&summer));

        let flash = PoolFilter::new(Promotion::Flash, None);
        assert!(flash.matches(&premium));
        assert!(flash.matches(&flash_only));
        assert!(!flash.matches(&summer));

        let legend = PoolFilter::new(Promotion::Legend, None);
        assert!(!legend.matches(&flash_only));

        let summer_banner = PoolFilter::new(Promotion::Premium, Some(Season::Summer));
        assert!(summer_banner.matches(&summer));
        assert!(!summer_banner.matches(&premium));
        assert!(!summer_banner.matches(&flash_only));

        let summer_flash = PoolFilter::new(Promotion::Flash, Some(Season::Summer));
        assert!(!summer_flash.matches(&summer));
    }

    #[test]
    fn test_banner_drops_ineligible_rate_ups() {
        let flash_only = item(Rarity::SSR, PromotionFlags { flash: true, ..Default::default() }, SeasonFlags::default());
        let premium = item(Rarity::SSR, PromotionFlags { premium: true, ..Default::default() }, SeasonFlags::default());
        let sr = item(Rarity::SR, PromotionFlags { premium: true, ..Default::default() }, SeasonFlags::default());

        let banner = Banner::new(Promotion::Premium, None, vec![
            RateUpEntry::new(flash_only.clone(), 0.5),
            RateUpEntry::new(premium.clone(), 0.3),
            RateUpEntry::new(premium.clone(), 0.9),
            RateUpEntry::new(sr, 1.0),
            RateUpEntry::new(premium.clone(), 0.0),
        ]);

        assert_eq!(banner.rate_ups().len(), 1);
        assert_eq!(banner.rate_ups()[0].rate, 0.3);
        assert_eq!(banner.dropped().len(), 4);
        assert!((banner.rate_up_total() - 0.3).abs() < 1e-12);

        let flash_banner = banner.with(Promotion::Flash, None);
        assert!(flash_banner.is_rated_up(&flash_only));
        assert!(!flash_banner.is_rated_up(&premium));
        assert!(flash_banner.is_rate_up());
    }
}

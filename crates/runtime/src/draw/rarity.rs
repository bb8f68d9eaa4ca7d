use rand::Rng;

use crate::item::Rarity;
use crate::weighted::weighted_pick;

pub const STANDARD_SSR_RATE: f64 = 0.03;
pub const RATE_UP_SSR_RATE: f64 = 0.06;
pub const SR_RATE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Ordinary,
    /// Tenth slot of a ten-part draw: SR or better.
    Guaranteed,
}

/// Probability of each rarity for one draw slot, highest rarity first.
#[derive(Debug, Clone, PartialEq)]
pub struct RarityTable {
    rarities: Vec<Rarity>,
    weights: Vec<f64>,
}

impl RarityTable {
    pub fn for_slot(rate_up: bool, slot: SlotKind) -> Self {
        let ssr = if rate_up { RATE_UP_SSR_RATE } else { STANDARD_SSR_RATE };
        match slot {
            SlotKind::Ordinary => Self::from_listed(&[(Rarity::SSR, ssr), (Rarity::SR, SR_RATE), (Rarity::R, 0.0)]),
            SlotKind::Guaranteed => Self::from_listed(&[(Rarity::SSR, ssr), (Rarity::SR, 0.0)]),
        }
    }

    /// Builds a table from listed probabilities; whatever mass is left below
    /// 1 goes to the lowest listed rarity.
    pub fn from_listed(listed: &[(Rarity, f64)]) -> Self {
        let mut entries = listed.to_vec();
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        let assigned: f64 = entries.iter().map(|(_, p)| p.max(0.0)).sum();
        if let Some(lowest) = entries.last_mut() {
            lowest.1 = lowest.1.max(0.0) + (1.0 - assigned).max(0.0);
        }

        Self {
            rarities: entries.iter().map(|(r, _)| *r).collect(),
            weights: entries.iter().map(|(_, p)| p.max(0.0)).collect(),
        }
    }

    pub fn probability(&self, rarity: Rarity) -> f64 {
        self.rarities.iter()
            .position(|r| *r == rarity)
            .map(|i| self.weights[i])
            .unwrap_or(0.0)
    }

    pub fn lowest(&self) -> Rarity {
        self.rarities.last().copied().unwrap_or(Rarity::R)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Rarity {
        weighted_pick(&self.rarities, &self.weights, rng)
            .copied()
            .unwrap_or_else(|| self.lowest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_tables_assign_remainder_to_lowest() {
        let standard = RarityTable::for_slot(false, SlotKind::Ordinary);
        assert!((standard.probability(Rarity::R) - 0.82).abs() < 1e-12);
        assert!((standard.probability(Rarity::SR) - 0.15).abs() < 1e-12);
        assert!((standard.probability(Rarity::SSR) - 0.03).abs() < 1e-12);

        let rate_up = RarityTable::for_slot(true, SlotKind::Ordinary);
        assert!((rate_up.probability(Rarity::R) - 0.79).abs() < 1e-12);
        assert!((rate_up.probability(Rarity::SSR) - 0.06).abs() < 1e-12);

        let guaranteed = RarityTable::for_slot(true, SlotKind::Guaranteed);
        assert_eq!(guaranteed.probability(Rarity::R), 0.0);
        assert!((guaranteed.probability(Rarity::SR) - 0.94).abs() < 1e-12);
        assert_eq!(guaranteed.lowest(), Rarity::SR);

        let standard_guaranteed = RarityTable::for_slot(false, SlotKind::Guaranteed);
        assert!((standard_guaranteed.probability(Rarity::SR) - 0.97).abs() < 1e-12);
    }

    #[test]
    fn test_guaranteed_slot_never_samples_r() {
        let mut rng = StdRng::seed_from_u64(11);
        let table = RarityTable::for_slot(false, SlotKind::Guaranteed);
        for _ in 0..20_000 {
            assert_ne!(table.sample(&mut rng), Rarity::R);
        }
    }

    #[test]
    fn test_ordinary_ssr_frequency_converges() {
        for (rate_up, expected) in [(false, STANDARD_SSR_RATE), (true, RATE_UP_SSR_RATE)] {
            let mut rng = StdRng::seed_from_u64(97);
            let table = RarityTable::for_slot(rate_up, SlotKind::Ordinary);
            let trials = 100_000;
            let hits = (0..trials).filter(|_| table.sample(&mut rng) == Rarity::SSR).count();
            let observed = hits as f64 / trials as f64;
            assert!((observed - expected).abs() < 0.004, "rate_up={} observed={}", rate_up, observed);
        }
    }
}

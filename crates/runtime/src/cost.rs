use serde::{Deserialize, Serialize};

use crate::draw::BATCH_SIZE;

/// Draws that earn a spark.
pub const SPARK_DRAWS: u64 = 300;
/// Crystals per single draw.
pub const CRYSTALS_PER_DRAW: u64 = 300;

/// Prices of one ten-part draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub crystals_per_ten_pull: u64,
    pub mobacoin_per_ten_pull: u64,
    pub jpy_per_mobacoin: f64,
    pub usd_per_mobacoin: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            crystals_per_ten_pull: 3000,
            mobacoin_per_ten_pull: 3000,
            jpy_per_mobacoin: 1.0,
            usd_per_mobacoin: 0.0067,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub crystals: u64,
    pub jpy: u64,
    pub usd: u64,
}

impl CostModel {
    /// Currency amounts are rounded up.
    pub fn cost_of(&self, draws: u64) -> Cost {
        let ten_pulls = draws / BATCH_SIZE;
        let mobacoin = (ten_pulls * self.mobacoin_per_ten_pull) as f64;
        Cost {
            crystals: ten_pulls * self.crystals_per_ten_pull,
            jpy: (mobacoin * self.jpy_per_mobacoin).ceil() as u64,
            usd: (mobacoin * self.usd_per_mobacoin).ceil() as u64,
        }
    }
}

/// Stockpiled draw currency of one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkProgress {
    pub crystals: u64,
    pub tickets: u64,
    pub ten_tickets: u64,
}

impl SparkProgress {
    pub fn draws(&self) -> u64 {
        self.crystals / CRYSTALS_PER_DRAW + self.tickets + self.ten_tickets * BATCH_SIZE
    }

    pub fn remaining(&self) -> u64 {
        SPARK_DRAWS.saturating_sub(self.draws())
    }

    /// Share of a spark, capped at 100.
    pub fn percentage(&self) -> f64 {
        (self.draws() as f64 / SPARK_DRAWS as f64 * 100.0).min(100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.draws() >= SPARK_DRAWS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_of_draws() {
        let model = CostModel::default();
        let cost = model.cost_of(300);
        assert_eq!(cost.crystals, 90_000);
        assert_eq!(cost.jpy, 90_000);

        assert_eq!(model.cost_of(20).usd, 41);

        let cost = model.cost_of(10);
        assert_eq!(cost, Cost { crystals: 3000, jpy: 3000, usd: 21 });
        assert_eq!(model.cost_of(0), Cost::default());
    }

    #[test]
    fn test_spark_progress() {
        let progress = SparkProgress { crystals: 45_150, tickets: 3, ten_tickets: 2 };
        assert_eq!(progress.draws(), 150 + 3 + 20);
        assert_eq!(progress.remaining(), 127);
        assert!(!progress.is_complete());

        let done = SparkProgress { crystals: 90_000, tickets: 5, ten_tickets: 0 };
        assert!(done.is_complete());
        assert_eq!(done.remaining(), 0);
        assert_eq!(done.percentage(), 100.0);
    }
}

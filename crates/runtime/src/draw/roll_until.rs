use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::banner::{Banner, RateUpEntry};
use crate::catalog::CatalogSnapshot;
use crate::cost::{Cost, CostModel};
use crate::draw::{DrawEngine, ItemDetail, BATCH_SIZE};
use crate::error::{GachaError, GachaResult};
use crate::item::{DrawableItem, Promotion, Rarity, Season};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollUntilLimits {
    pub max_draws: u64,
    pub timeout: Duration,
}

impl Default for RollUntilLimits {
    fn default() -> Self {
        Self {
            max_draws: 1_000_000,
            timeout: Duration::from_secs(30),
        }
    }
}

/// `promotion` and `season` pin the banner; left empty they follow the
/// target's own promotion and season.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollUntilRequest {
    pub target: String,
    pub promotion: Option<Promotion>,
    pub season: Option<Season>,
    #[serde(default)]
    pub rate_ups: Vec<RateUpEntry>,
}

impl RollUntilRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollUntilOutcome {
    pub target: Arc<DrawableItem>,
    pub promotion: Promotion,
    pub season: Option<Season>,
    pub count: u64,
    pub cost: Cost,
}

/// A validated roll-until run: the target exists, can be drawn on the
/// resolved banner, and the banner itself resolves.
#[derive(Debug, Clone)]
pub struct RollUntil {
    engine: DrawEngine,
    query: String,
    target: Arc<DrawableItem>,
    limits: RollUntilLimits,
    cost_model: CostModel,
}

impl RollUntil {
    pub fn prepare(
        catalog: Arc<CatalogSnapshot>,
        request: RollUntilRequest,
        limits: RollUntilLimits,
        cost_model: CostModel,
    ) -> GachaResult<Self> {
        let target = catalog.find_by_name(&request.target)
            .ok_or_else(|| GachaError::NotFound(format!("no item or character named {:?}", request.target)))?;

        if target.rarity == Rarity::R {
            return Err(GachaError::NotFound(format!("{} is an R item and cannot be targeted", target.name.en)));
        }

        let promotion = match request.promotion {
            Some(promotion) => promotion,
            None => target.promotions.natural()
                .ok_or_else(|| GachaError::NotFound(format!("{} is not on any banner", target.name.en)))?,
        };
        let season = request.season.or_else(|| target.seasons.first());
        if request.promotion.is_none() || request.season.is_none() {
            debug!("[RollUntil::prepare] {} resolved to a {} banner, season {:?}", target.name.en, promotion, season);
        }

        let banner = Banner::new(promotion, season, request.rate_ups);
        if !banner.filter().matches(&target) {
            return Err(GachaError::NotFound(format!(
                "{} cannot be drawn on a {} banner{}",
                target.name.en,
                promotion,
                season.map(|s| format!(" during {}", s)).unwrap_or_default(),
            )));
        }

        let engine = DrawEngine::new(catalog, banner)?;
        if target.rarity == Rarity::SSR && engine.buckets().item_rate(&target) <= 0.0 {
            return Err(GachaError::NotFound(format!(
                "{} has no chance to drop once the rate-ups take the whole SSR budget",
                target.name.en
            )));
        }

        Ok(Self {
            engine,
            query: request.target,
            target,
            limits,
            cost_model,
        })
    }

    pub fn target(&self) -> &Arc<DrawableItem> {
        &self.target
    }

    pub fn banner(&self) -> &Banner {
        self.engine.banner()
    }

    /// Percentage of draws that yield the target, for SSR targets.
    pub fn target_rate(&self) -> Option<f64> {
        match self.target.rarity {
            Rarity::SSR => Some(self.engine.buckets().item_rate(&self.target)),
            _ => None,
        }
    }

    /// Rolls ten-part batches until the target shows up, `limits.max_draws`
    /// is reached, or `abort` is raised.
    pub fn run<R: Rng>(&self, rng: &mut R, abort: &AtomicBool) -> GachaResult<RollUntilOutcome> {
        let detail = match self.target.rarity {
            Rarity::SSR => ItemDetail::SsrOnly,
            _ => ItemDetail::SrAndAbove,
        };

        let mut count = 0u64;
        loop {
            if abort.load(Ordering::Relaxed) {
                return Err(GachaError::Aborted { draws: count });
            }
            if count >= self.limits.max_draws {
                warn!("[RollUntil::run] {} not drawn within {} draws", self.target.name.en, count);
                return Err(GachaError::NonConvergence { draws: count });
            }

            let batch = self.engine.ten_part_roll(1, detail, rng)?;
            count += BATCH_SIZE;

            if batch.items.iter().any(|i| i.matches_name(&self.query)) {
                return Ok(RollUntilOutcome {
                    target: self.target.clone(),
                    promotion: self.engine.banner().promotion(),
                    season: self.engine.banner().season(),
                    count,
                    cost: self.cost_model.cost_of(count),
                });
            }
        }
    }

    /// Runs on the blocking pool and gives up after `limits.timeout`.
    pub async fn run_with_timeout(self) -> GachaResult<RollUntilOutcome> {
        let abort = Arc::new(AtomicBool::new(false));
        let timeout = self.limits.timeout;

        let worker_abort = abort.clone();
        let mut handle = tokio::task::spawn_blocking(move || {
            let mut rng = rand::rng();
            self.run(&mut rng, &worker_abort)
        });

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(joined) => joined?,
            Err(_) => {
                abort.store(true, Ordering::Relaxed);
                warn!("[RollUntil::run_with_timeout] timed out after {:?}", timeout);
                handle.await?
            }
        }
    }
}

mod item;
mod banner;
mod weighted;
mod error;
mod catalog;
mod draw;
mod cost;
mod rate_up;
mod env;

pub use item::{Rarity, RarityCount, Promotion, Season, PromotionFlags, SeasonFlags,
    DrawableItem, ItemKind, BilingualName, GachaItemRow,
};
pub use banner::{Banner, PoolFilter, RateUpEntry};
pub use weighted::{weighted_pick, weighted_index, pick_uniform};
pub use error::{GachaError, GachaResult};
pub use catalog::{CatalogSource, StaticCatalog, PostgresCatalog, CatalogSnapshot, CatalogCache, DEFAULT_CATALOG_TTL};
pub use draw::{RarityTable, SlotKind, SR_RATE, STANDARD_SSR_RATE, RATE_UP_SSR_RATE,
    SsrBucket, SsrBuckets, BASE_SSR_BUDGET,
    DrawEngine, ItemDetail, SimulationResult, BATCH_SIZE, SPARK_BATCHES,
    RollUntil, RollUntilRequest, RollUntilOutcome, RollUntilLimits,
};
pub use cost::{CostModel, Cost, SparkProgress, SPARK_DRAWS, CRYSTALS_PER_DRAW};
pub use rate_up::{UserRateUp, RateUpStore, resolve_entries};
pub use env::{GachaEnv, setup_tracing};

mod rarity;
mod bucket;
mod engine;
mod roll_until;

pub use rarity::{RarityTable, SlotKind, SR_RATE, STANDARD_SSR_RATE, RATE_UP_SSR_RATE};
pub use bucket::{SsrBucket, SsrBuckets, BASE_SSR_BUDGET};
pub use engine::{DrawEngine, ItemDetail, SimulationResult, BATCH_SIZE, SPARK_BATCHES};
pub use roll_until::{RollUntil, RollUntilRequest, RollUntilOutcome, RollUntilLimits};

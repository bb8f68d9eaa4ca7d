mod rarity;
mod promotion;
mod drawable;

pub use rarity::{Rarity, RarityCount};
pub use promotion::{Promotion, Season, PromotionFlags, SeasonFlags};
pub use drawable::{DrawableItem, ItemKind, BilingualName, GachaItemRow};

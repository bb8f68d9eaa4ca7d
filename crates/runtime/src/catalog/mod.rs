mod source;
mod snapshot;
mod cache;

pub use source::{CatalogSource, StaticCatalog, PostgresCatalog};
pub use snapshot::CatalogSnapshot;
pub use cache::{CatalogCache, DEFAULT_CATALOG_TTL};

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::catalog::{CatalogSnapshot, CatalogSource};
use crate::error::GachaResult;
use crate::item::{ItemKind, Rarity};

/// Four days.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(4 * 24 * 60 * 60);

/// Catalog pools loaded from a [`CatalogSource`] and kept for a fixed TTL.
///
/// Lifecycle: [`CatalogCache::load`] returns only once every pool is
/// populated; simulations take an `Arc<CatalogSnapshot>`; [`CatalogCache::refresh`]
/// swaps in a new snapshot without touching the ones already handed out.
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogCache {
    pub async fn load(source: Arc<dyn CatalogSource>, ttl: Duration) -> GachaResult<Self> {
        let snapshot = Self::fetch(source.as_ref()).await?;
        Ok(Self {
            source,
            ttl,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    async fn fetch(source: &dyn CatalogSource) -> GachaResult<CatalogSnapshot> {
        let requests = [ItemKind::Weapon, ItemKind::Summon].into_iter()
            .flat_map(|kind| Rarity::ALL.into_iter().map(move |rarity| (kind, rarity)))
            .map(|(kind, rarity)| source.fetch_items(kind, rarity));

        let pools = try_join_all(requests).await?;
        let snapshot = CatalogSnapshot::from_items(pools.into_iter().flatten());
        info!("[CatalogCache::load] loaded {} items in {} pools", snapshot.len(), snapshot.pool_count());
        Ok(snapshot)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current snapshot, stale or not.
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let snapshot = self.snapshot.read().await.clone();
        if snapshot.loaded_at().elapsed() >= self.ttl {
            warn!("[CatalogCache::snapshot] serving a catalog older than {:?}", self.ttl);
        }
        snapshot
    }

    pub async fn is_stale(&self) -> bool {
        self.snapshot.read().await.loaded_at().elapsed() >= self.ttl
    }

    /// Reloads every pool. On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> GachaResult<Arc<CatalogSnapshot>> {
        let fresh = Arc::new(Self::fetch(self.source.as_ref()).await?);
        *self.snapshot.write().await = fresh.clone();
        info!("[CatalogCache::refresh] catalog refreshed");
        Ok(fresh)
    }

    /// Snapshot, refreshed first if the TTL has elapsed.
    pub async fn snapshot_fresh(&self) -> GachaResult<Arc<CatalogSnapshot>> {
        if self.is_stale().await {
            return self.refresh().await;
        }
        Ok(self.snapshot.read().await.clone())
    }
}

use std::env;
use std::time::Duration;

use gacha_common::{env_or, EnvVars};

use crate::catalog::DEFAULT_CATALOG_TTL;
use crate::cost::CostModel;
use crate::draw::RollUntilLimits;

/// Tunables of the simulator. Every value has a default, so nothing here
/// is required to be set.
#[derive(Debug, Clone, PartialEq)]
pub struct GachaEnv {
    pub catalog_ttl_secs: u64,
    pub catalog_json: Option<String>,
    pub roll_until_max_draws: u64,
    pub roll_until_timeout_secs: u64,
    pub crystals_per_ten_pull: u64,
    pub mobacoin_per_ten_pull: u64,
    pub jpy_per_mobacoin: f64,
    pub usd_per_mobacoin: f64,
}

impl Default for GachaEnv {
    fn default() -> Self {
        let cost = CostModel::default();
        let limits = RollUntilLimits::default();
        Self {
            catalog_ttl_secs: DEFAULT_CATALOG_TTL.as_secs(),
            catalog_json: None,
            roll_until_max_draws: limits.max_draws,
            roll_until_timeout_secs: limits.timeout.as_secs(),
            crystals_per_ten_pull: cost.crystals_per_ten_pull,
            mobacoin_per_ten_pull: cost.mobacoin_per_ten_pull,
            jpy_per_mobacoin: cost.jpy_per_mobacoin,
            usd_per_mobacoin: cost.usd_per_mobacoin,
        }
    }
}

impl EnvVars for GachaEnv {
    fn load() -> Self {
        let defaults = Self::default();
        Self {
            catalog_ttl_secs: env_or("CATALOG_TTL_SECS", defaults.catalog_ttl_secs),
            catalog_json: env::var("CATALOG_JSON").ok().filter(|p| !p.trim().is_empty()),
            roll_until_max_draws: env_or("ROLL_UNTIL_MAX_DRAWS", defaults.roll_until_max_draws),
            roll_until_timeout_secs: env_or("ROLL_UNTIL_TIMEOUT_SECS", defaults.roll_until_timeout_secs),
            crystals_per_ten_pull: env_or("CRYSTALS_PER_TEN_PULL", defaults.crystals_per_ten_pull),
            mobacoin_per_ten_pull: env_or("MOBACOIN_PER_TEN_PULL", defaults.mobacoin_per_ten_pull),
            jpy_per_mobacoin: env_or("JPY_PER_MOBACOIN", defaults.jpy_per_mobacoin),
            usd_per_mobacoin: env_or("USD_PER_MOBACOIN", defaults.usd_per_mobacoin),
        }
    }

    fn get_env_var(&self, key: &str) -> String {
        match key {
            "CATALOG_TTL_SECS" => self.catalog_ttl_secs.to_string(),
            "CATALOG_JSON" => self.catalog_json.clone().unwrap_or_default(),
            "ROLL_UNTIL_MAX_DRAWS" => self.roll_until_max_draws.to_string(),
            "ROLL_UNTIL_TIMEOUT_SECS" => self.roll_until_timeout_secs.to_string(),
            "CRYSTALS_PER_TEN_PULL" => self.crystals_per_ten_pull.to_string(),
            "MOBACOIN_PER_TEN_PULL" => self.mobacoin_per_ten_pull.to_string(),
            "JPY_PER_MOBACOIN" => self.jpy_per_mobacoin.to_string(),
            "USD_PER_MOBACOIN" => self.usd_per_mobacoin.to_string(),
            _ => String::new(),
        }
    }
}

impl GachaEnv {
    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel {
            crystals_per_ten_pull: self.crystals_per_ten_pull,
            mobacoin_per_ten_pull: self.mobacoin_per_ten_pull,
            jpy_per_mobacoin: self.jpy_per_mobacoin,
            usd_per_mobacoin: self.usd_per_mobacoin,
        }
    }

    pub fn roll_until_limits(&self) -> RollUntilLimits {
        RollUntilLimits {
            max_draws: self.roll_until_max_draws.max(crate::draw::BATCH_SIZE),
            timeout: Duration::from_secs(self.roll_until_timeout_secs.max(1)),
        }
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the INFO default.
pub fn setup_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {}", e))
}

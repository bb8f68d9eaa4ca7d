mod client;
mod env;

pub use client::ModuleClient;
pub use env::{EnvVars, env_or};

#[doc(hidden)]
pub use {anyhow, async_trait, tracing};

pub fn get_current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

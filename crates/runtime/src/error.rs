use thiserror::Error;

#[derive(Debug, Error)]
pub enum GachaError {
    /// A banner cannot be resolved against the catalog: an empty pool, a zero
    /// denominator, or rate-ups exceeding the SSR budget.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("target was not drawn within {draws} draws")]
    NonConvergence { draws: u64 },

    #[error("roll-until aborted after {draws} draws")]
    Aborted { draws: u64 },

    #[error("roll-until worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Catalog(#[from] anyhow::Error),
}

impl GachaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        GachaError::Configuration(message.into())
    }

    /// Draws performed before a roll-until gave up, if this is a roll-until failure.
    pub fn draws_so_far(&self) -> Option<u64> {
        match self {
            GachaError::NonConvergence { draws } | GachaError::Aborted { draws } => Some(*draws),
            _ => None,
        }
    }
}

pub type GachaResult<T> = Result<T, GachaError>;

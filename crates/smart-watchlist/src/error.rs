use thiserror::Error;

/// Build-level failures. Per-instrument problems never surface here; they
/// shrink the watchlist instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WatchlistError {
    #[error("Insufficient universe: {found} qualifying instruments, {required} required")]
    InsufficientUniverse { found: usize, required: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type WatchlistResult<T> = Result<T, WatchlistError>;

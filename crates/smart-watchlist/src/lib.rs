//! Smart Watchlist Module
//!
//! Probabilistic watchlist engine: for each instrument in a universe, forecasts
//! a price range, a target price and the probability of finishing the horizon
//! at or above the current price, then assembles a size- and
//! diversity-constrained watchlist.

pub mod builder;
pub mod config;
pub mod error;
pub mod models;
pub mod momentum;
pub mod provider;
pub mod range_model;
pub mod volatility;


pub use builder::WatchlistBuilder;
pub use config::{DiversityPolicy, Ranking, WatchlistConfig};
pub use error::{WatchlistError, WatchlistResult};
pub use models::{BuildReport, Exclusion, Watchlist, WatchlistEntry};
pub use momentum::trend_signal;
pub use provider::{BarHistoryProvider, StaticDataProvider};
pub use range_model::{RangeBiasModel, RangeForecast};
pub use volatility::{VolatilityEstimate, VolatilityEstimator};

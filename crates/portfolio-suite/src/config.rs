use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use smart_watchlist::WatchlistConfig;

use crate::workflows::Workflow;

#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub workflow: Workflow,
    /// JSON array of instruments served to the watchlist engine
    pub data_file: Option<PathBuf>,
    /// Restrict the universe to these symbols (defaults to every instrument in the file)
    pub universe: Option<Vec<String>>,
    /// Print the watchlist as JSON instead of a table
    pub json_output: bool,
    pub watchlist: WatchlistConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            workflow: Workflow::Home,
            data_file: None,
            universe: None,
            json_output: false,
            watchlist: WatchlistConfig::default(),
        }
    }
}

impl SuiteConfig {
    pub fn from_env() -> Result<Self> {
        let workflow = env::var("SUITE_WORKFLOW")
            .unwrap_or_else(|_| "home".to_string())
            .parse::<Workflow>()
            .context("SUITE_WORKFLOW")?;

        let universe = env::var("WATCHLIST_UNIVERSE").ok().map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Ok(Self {
            workflow,
            data_file: env::var("WATCHLIST_DATA_FILE").ok().map(PathBuf::from),
            universe,
            json_output: env::var("SUITE_OUTPUT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            watchlist: WatchlistConfig::from_env().context("invalid WATCHLIST_* settings")?,
        })
    }
}

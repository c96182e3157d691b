use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use smart_watchlist::{StaticDataProvider, WatchlistBuilder};

use crate::config::SuiteConfig;
use crate::render;

/// Analysis workflows the suite can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Workflow {
    Home,
    TacticalMomentum,
    LongTermQuality,
}

impl Workflow {
    pub fn all() -> [Workflow; 3] {
        [
            Workflow::Home,
            Workflow::TacticalMomentum,
            Workflow::LongTermQuality,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Workflow::Home => "Home - Feature Overview",
            Workflow::TacticalMomentum => "Tactical Momentum Tracker",
            Workflow::LongTermQuality => "Long-Term Quality Stocks",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Workflow::Home => "Overview of the available analysis tools",
            Workflow::TacticalMomentum => {
                "Short-term momentum watchlist with forecast ranges, targets and bullish bias (1-12 weeks)"
            }
            Workflow::LongTermQuality => {
                "Conservative screening of defensive, dividend-paying quality stocks (3-10 years)"
            }
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Workflow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" | "" => Ok(Workflow::Home),
            "tactical" | "momentum" | "tactical_momentum" => Ok(Workflow::TacticalMomentum),
            "quality" | "long_term_quality" => Ok(Workflow::LongTermQuality),
            other => bail!(
                "unknown workflow '{}' (expected home, tactical or quality)",
                other
            ),
        }
    }
}

/// Entry point of one workflow.
#[async_trait]
pub trait WorkflowHandler: Send + Sync {
    async fn run(&self, config: &SuiteConfig, registry: &CapabilityRegistry) -> Result<()>;
}

/// Workflows available in this process, registered once at startup.
#[derive(Default)]
pub struct CapabilityRegistry {
    handlers: BTreeMap<Workflow, Arc<dyn WorkflowHandler>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every workflow this build ships.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Workflow::Home, HomeOverview);
        registry.register(Workflow::TacticalMomentum, TacticalMomentumTracker);
        registry
    }

    pub fn register<H>(&mut self, workflow: Workflow, handler: H)
    where
        H: WorkflowHandler + 'static,
    {
        self.handlers.insert(workflow, Arc::new(handler));
    }

    pub fn is_available(&self, workflow: Workflow) -> bool {
        self.handlers.contains_key(&workflow)
    }

    pub fn available(&self) -> Vec<Workflow> {
        self.handlers.keys().copied().collect()
    }

    /// Run the handler registered for `workflow`.
    pub async fn dispatch(&self, workflow: Workflow, config: &SuiteConfig) -> Result<()> {
        match self.handlers.get(&workflow) {
            Some(handler) => handler.run(config, self).await,
            None => bail!("{} is not available in this build", workflow),
        }
    }
}

pub struct HomeOverview;

#[async_trait]
impl WorkflowHandler for HomeOverview {
    async fn run(&self, _config: &SuiteConfig, registry: &CapabilityRegistry) -> Result<()> {
        print!("{}", render::home_page(registry));
        Ok(())
    }
}

pub struct TacticalMomentumTracker;

#[async_trait]
impl WorkflowHandler for TacticalMomentumTracker {
    async fn run(&self, config: &SuiteConfig, _registry: &CapabilityRegistry) -> Result<()> {
        let path = config
            .data_file
            .as_ref()
            .context("WATCHLIST_DATA_FILE must point to a JSON instrument file")?;
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let provider = StaticDataProvider::from_json(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;

        let universe = match &config.universe {
            Some(symbols) => symbols.clone(),
            None => provider.universe(),
        };
        tracing::info!("Loaded {} instruments from {}", universe.len(), path.display());

        let builder = WatchlistBuilder::new(Arc::new(provider));
        let watchlist = builder.build_watchlist(&universe, &config.watchlist).await?;

        if config.json_output {
            println!("{}", serde_json::to_string_pretty(&watchlist)?);
        } else {
            print!("{}", render::watchlist_table(&watchlist));
        }
        Ok(())
    }
}

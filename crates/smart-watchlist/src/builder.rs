//! Watchlist Builder
//!
//! Runs the volatility estimator and range model over a universe, one tokio
//! task per instrument, then applies the diversity and size constraints.
//! Results are re-assembled in universe order, so membership and numbers do
//! not depend on task completion order.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use analysis_core::{AnalysisError, InstrumentDataProvider};
use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::{Ranking, WatchlistConfig};
use crate::error::{WatchlistError, WatchlistResult};
use crate::models::{BuildReport, Exclusion, Watchlist, WatchlistEntry};
use crate::momentum::trend_signal;
use crate::range_model::RangeBiasModel;
use crate::volatility::VolatilityEstimator;

/// Per-instrument evaluation shared by all tasks of one build.
struct InstrumentPipeline {
    estimator: VolatilityEstimator,
    model: RangeBiasModel,
    lookback: usize,
    momentum_lookback: usize,
    fetch_timeout: Duration,
}

/// Provider data for one instrument.
struct InstrumentInputs {
    price: f64,
    history: Vec<f64>,
    group: Option<String>,
    supplied_signal: Option<f64>,
}

impl InstrumentPipeline {
    async fn evaluate<P>(&self, provider: &P, symbol: &str) -> Result<WatchlistEntry, AnalysisError>
    where
        P: InstrumentDataProvider + ?Sized,
    {
        let InstrumentInputs {
            price,
            history,
            group,
            supplied_signal,
        } = self.fetch(provider, symbol).await?;

        let volatility = self.estimator.estimate(&history)?;
        let signal =
            supplied_signal.unwrap_or_else(|| trend_signal(&history, self.momentum_lookback));
        let forecast = self.model.forecast(price, volatility.horizon, signal)?;

        tracing::debug!(
            "{}: price={:.2} vol={:.4} signal={:.3} range=[{:.2}, {:.2}] p_up={:.3}",
            symbol,
            price,
            volatility.horizon,
            signal,
            forecast.range_low,
            forecast.range_high,
            forecast.bullish_probability
        );

        Ok(WatchlistEntry {
            current_price: price,
            range_low: forecast.range_low,
            range_high: forecast.range_high,
            target_price: forecast.target_price,
            bullish_probability: forecast.bullish_probability,
            volatility: volatility.horizon,
            momentum_signal: signal,
            group,
        })
    }

    /// Fetch everything the instrument needs within one fetch timeout. An
    /// expired attempt is retried once from scratch.
    async fn fetch<P>(&self, provider: &P, symbol: &str) -> Result<InstrumentInputs, AnalysisError>
    where
        P: InstrumentDataProvider + ?Sized,
    {
        let mut attempt = 1;
        loop {
            match tokio::time::timeout(self.fetch_timeout, self.load(provider, symbol)).await {
                Ok(result) => return result,
                Err(_) => {
                    let err = AnalysisError::DataFetchTimeout {
                        symbol: symbol.to_string(),
                        timeout_ms: self.fetch_timeout.as_millis() as u64,
                    };
                    if attempt < 2 && err.is_retryable() {
                        tracing::debug!("{} (attempt {}), retrying", err, attempt);
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn load<P>(&self, provider: &P, symbol: &str) -> Result<InstrumentInputs, AnalysisError>
    where
        P: InstrumentDataProvider + ?Sized,
    {
        Ok(InstrumentInputs {
            price: provider.current_price(symbol).await?,
            history: provider.history(symbol, self.lookback).await?,
            group: provider.group(symbol).await?,
            supplied_signal: provider.momentum_signal(symbol).await?,
        })
    }
}

struct Candidate {
    index: usize,
    symbol: String,
    entry: WatchlistEntry,
}

/// Builds watchlists from a data provider.
pub struct WatchlistBuilder<P: ?Sized> {
    provider: Arc<P>,
}

impl<P: ?Sized> Clone for WatchlistBuilder<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P> WatchlistBuilder<P>
where
    P: InstrumentDataProvider + ?Sized + 'static,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Build a watchlist for `universe`, bounded by the configured deadline.
    pub async fn build_watchlist(
        &self,
        universe: &[String],
        config: &WatchlistConfig,
    ) -> WatchlistResult<Watchlist> {
        self.build_watchlist_until(universe, config, std::future::pending::<()>())
            .await
    }

    /// Like [`build_watchlist`](Self::build_watchlist), but also stops scanning
    /// as soon as `cancel` completes. Whatever finished by then is kept and
    /// still has to meet the minimum size.
    pub async fn build_watchlist_until<C>(
        &self,
        universe: &[String],
        config: &WatchlistConfig,
        cancel: C,
    ) -> WatchlistResult<Watchlist>
    where
        C: Future<Output = ()>,
    {
        config.validate()?;
        let started = Instant::now();

        let pipeline = Arc::new(InstrumentPipeline {
            estimator: VolatilityEstimator::from_config(config),
            model: RangeBiasModel::from_config(config)?,
            lookback: config.lookback,
            momentum_lookback: config.momentum_lookback,
            fetch_timeout: config.fetch_timeout,
        });

        let mut seen = HashSet::new();
        let symbols: Vec<String> = universe
            .iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();

        tracing::info!(
            "Building watchlist from {} symbols (horizon {} periods, size {}-{})",
            symbols.len(),
            config.horizon_periods,
            config.min_size,
            config.max_size
        );

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::with_capacity(symbols.len());

        for (index, symbol) in symbols.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let pipeline = Arc::clone(&pipeline);
            let semaphore = Arc::clone(&semaphore);
            let symbol = symbol.clone();
            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let outcome = pipeline.evaluate(&*provider, &symbol).await;
                (index, symbol, outcome)
            });
            task_index.insert(handle.id(), index);
        }

        let deadline = tokio::time::sleep(config.build_deadline);
        tokio::pin!(deadline);
        tokio::pin!(cancel);

        let mut completed = Vec::with_capacity(symbols.len());
        let mut failed = Vec::new();
        let mut partial = false;

        loop {
            tokio::select! {
                biased;
                joined = tasks.join_next() => match joined {
                    Some(Ok(done)) => completed.push(done),
                    Some(Err(e)) => match task_index.get(&e.id()) {
                        Some(&index) => failed.push((index, e.to_string())),
                        None => tracing::error!("Watchlist task failed: {}", e),
                    },
                    None => break,
                },
                _ = &mut deadline => {
                    tracing::warn!(
                        "Watchlist build deadline of {:?} expired with {} of {} instruments done",
                        config.build_deadline,
                        completed.len(),
                        symbols.len()
                    );
                    partial = true;
                    break;
                }
                _ = &mut cancel => {
                    tracing::warn!(
                        "Watchlist build cancelled with {} of {} instruments done",
                        completed.len(),
                        symbols.len()
                    );
                    partial = true;
                    break;
                }
            }
        }
        tasks.abort_all();

        completed.sort_by_key(|(index, _, _)| *index);

        let mut report = BuildReport {
            scanned: symbols.len(),
            partial,
            ..Default::default()
        };

        let mut finished = vec![false; symbols.len()];
        let mut candidates = Vec::with_capacity(completed.len());
        let mut excluded = Vec::new();
        for (index, symbol, outcome) in completed {
            finished[index] = true;
            match outcome {
                Ok(entry) => candidates.push(Candidate {
                    index,
                    symbol,
                    entry,
                }),
                Err(e) => {
                    if e.is_contract_violation() {
                        tracing::error!("Excluding {}: {}", symbol, e);
                    } else {
                        tracing::warn!("Excluding {}: {}", symbol, e);
                    }
                    excluded.push((
                        index,
                        Exclusion {
                            symbol,
                            kind: e.kind().to_string(),
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }
        for (index, reason) in failed {
            finished[index] = true;
            let symbol = symbols[index].clone();
            tracing::error!("Excluding {}: task failed: {}", symbol, reason);
            excluded.push((
                index,
                Exclusion {
                    symbol,
                    kind: "task_failed".to_string(),
                    reason,
                },
            ));
        }
        excluded.sort_by_key(|(index, _)| *index);
        report.excluded = excluded.into_iter().map(|(_, e)| e).collect();
        report.unfinished = symbols
            .iter()
            .zip(&finished)
            .filter(|(_, done)| !**done)
            .map(|(s, _)| s.clone())
            .collect();
        report.qualified = candidates.len();

        rank(&mut candidates, config.ranking);

        let mut admitted = apply_diversity(candidates, config, &mut report);

        if admitted.len() < config.min_size {
            let err = WatchlistError::InsufficientUniverse {
                found: admitted.len(),
                required: config.min_size,
            };
            tracing::error!(
                "{} (scanned {}, excluded {}, unfinished {})",
                err,
                report.scanned,
                report.excluded.len(),
                report.unfinished.len()
            );
            return Err(err);
        }

        if admitted.len() > config.max_size {
            report.dropped_by_size = admitted
                .drain(config.max_size..)
                .map(|c| c.symbol)
                .collect();
        }

        report.elapsed = started.elapsed();
        report.generated_at = Some(Utc::now());

        tracing::info!(
            "Watchlist complete: {}/{} symbols selected ({} excluded, {} capped by diversity, {} capped by size{})",
            admitted.len(),
            report.scanned,
            report.excluded.len(),
            report.dropped_by_diversity.len(),
            report.dropped_by_size.len(),
            if report.partial { ", partial" } else { "" }
        );

        Ok(Watchlist::from_selection(
            admitted.into_iter().map(|c| (c.symbol, c.entry)).collect(),
            report,
        ))
    }
}

fn rank(candidates: &mut [Candidate], ranking: Ranking) {
    match ranking {
        Ranking::UniverseOrder => candidates.sort_by_key(|c| c.index),
        Ranking::Conviction => candidates.sort_by(|a, b| {
            b.entry
                .conviction()
                .partial_cmp(&a.entry.conviction())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.index.cmp(&b.index))
        }),
    }
}

/// Admit candidates in ranked order, skipping any whose group is already full.
/// Ungrouped candidates are never capped.
fn apply_diversity(
    candidates: Vec<Candidate>,
    config: &WatchlistConfig,
    report: &mut BuildReport,
) -> Vec<Candidate> {
    let Some(policy) = config.diversity else {
        return candidates;
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut admitted = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(group) = &candidate.entry.group {
            let count = counts.entry(group.clone()).or_insert(0);
            if *count >= policy.max_per_group {
                tracing::debug!(
                    "Dropping {}: group {} already has {} members",
                    candidate.symbol,
                    group,
                    count
                );
                report.dropped_by_diversity.push(candidate.symbol);
                continue;
            }
            *count += 1;
        }
        admitted.push(candidate);
    }
    admitted
}

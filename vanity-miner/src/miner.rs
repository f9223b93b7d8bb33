//! Time-boxed mining runs
//!
//! A run lives on its own tokio task. Batches of keypairs are generated on the
//! blocking pool, matches are persisted and reported in discovery order, and
//! events flow to the caller through a bounded channel. Dropping the stream
//! ends the run at the next send.

use crate::cipher::SymmetricCipher;
use crate::error::{MinerError, MinerResult};
use crate::events::{CompleteSummary, MiningEvent};
use crate::keygen::{KeyGenerator, MatchedKeypair};
use crate::store::{KeypairSink, NewVanityKeypair, PoolBreakdown, PoolStats, PoolStatsProvider};
use crate::suffix::Suffix;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

/// Stream of events for one run
pub type MiningStream = ReceiverStream<MiningEvent>;

/// Longest budget a single run accepts
pub const MAX_RUN_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct MiningRequest {
    pub suffix: String,
    pub target_count: u32,
    pub max_duration: Duration,
}

#[derive(Debug, Clone)]
pub struct MinerSettings {
    /// Keypairs generated between time checks and progress events
    pub batch_size: u32,
    /// Minimum spacing of progress events
    pub progress_interval: Duration,
    /// Buffered events before the run waits on the consumer
    pub channel_capacity: usize,
}

impl Default for MinerSettings {
    fn default() -> Self {
        Self {
            batch_size: 3000,
            progress_interval: Duration::from_secs(2),
            channel_capacity: 64,
        }
    }
}

/// Entry point for mining runs; cheap to clone and share across handlers
#[derive(Clone)]
pub struct VanityMiner {
    stats: Arc<dyn PoolStatsProvider>,
    sink: Arc<dyn KeypairSink>,
    cipher: Arc<dyn SymmetricCipher>,
    settings: MinerSettings,
}

impl VanityMiner {
    pub fn new(
        stats: Arc<dyn PoolStatsProvider>,
        sink: Arc<dyn KeypairSink>,
        cipher: Arc<dyn SymmetricCipher>,
    ) -> Self {
        Self {
            stats,
            sink,
            cipher,
            settings: MinerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: MinerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &MinerSettings {
        &self.settings
    }

    /// Validate the request and spawn the run. Must be called from within a
    /// tokio runtime.
    pub fn start(&self, request: MiningRequest) -> MinerResult<MiningStream> {
        let suffix = Suffix::parse(&request.suffix)?;
        if request.target_count == 0 {
            return Err(MinerError::InvalidRequest(
                "target count must be at least 1".to_string(),
            ));
        }
        if request.max_duration.is_zero() {
            return Err(MinerError::InvalidRequest(
                "max duration must be positive".to_string(),
            ));
        }
        if request.max_duration > MAX_RUN_DURATION {
            return Err(MinerError::InvalidRequest(format!(
                "max duration must not exceed {:?}",
                MAX_RUN_DURATION
            )));
        }
        if self.settings.batch_size == 0 {
            return Err(MinerError::InvalidRequest(
                "batch size must be positive".to_string(),
            ));
        }

        let generator = KeyGenerator::new()?;
        let (events, receiver) = mpsc::channel(self.settings.channel_capacity.max(1));

        let run = MiningRun {
            stats: self.stats.clone(),
            sink: self.sink.clone(),
            cipher: self.cipher.clone(),
            settings: self.settings.clone(),
            suffix,
            target_count: request.target_count,
            max_duration: request.max_duration,
            attempts: 0,
            found: Vec::new(),
            events,
        };

        info!(
            "Starting vanity run: suffix={}, target={}, budget={:?}",
            run.suffix, run.target_count, run.max_duration
        );
        tokio::spawn(run.execute(generator));

        Ok(ReceiverStream::new(receiver))
    }
}

/// Why the generation loop ended early
enum RunStop {
    /// Consumer dropped the stream
    Disconnected,
    /// Unrecoverable fault
    Fault(String),
}

struct MiningRun {
    stats: Arc<dyn PoolStatsProvider>,
    sink: Arc<dyn KeypairSink>,
    cipher: Arc<dyn SymmetricCipher>,
    settings: MinerSettings,
    suffix: Suffix,
    target_count: u32,
    max_duration: Duration,
    attempts: u64,
    found: Vec<String>,
    events: mpsc::Sender<MiningEvent>,
}

impl MiningRun {
    async fn execute(mut self, generator: KeyGenerator) {
        let started = Instant::now();

        let pool = match self.stats.pool_stats(self.suffix.as_str()).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to read pool statistics for '{}': {}", self.suffix, e);
                let _ = self
                    .events
                    .send(MiningEvent::Error {
                        message: format!("Failed to read pool statistics: {}", e),
                        addresses: Vec::new(),
                    })
                    .await;
                return;
            }
        };

        if pool.available >= self.target_count as u64 {
            info!(
                "Pool for '{}' already holds {} available keypairs, nothing to mine",
                self.suffix, pool.available
            );
            let breakdown = self.read_breakdown().await;
            let _ = self
                .events
                .send(MiningEvent::Complete(CompleteSummary {
                    found: 0,
                    attempts: 0,
                    duration_ms: 0,
                    rate: 0.0,
                    addresses: Vec::new(),
                    pool_size: pool.available,
                    breakdown,
                }))
                .await;
            return;
        }

        let start_event = MiningEvent::Start {
            suffix: self.suffix.to_string(),
            target_count: self.target_count,
            pool_size: pool.available,
            max_duration_ms: millis(self.max_duration),
        };
        if self.events.send(start_event).await.is_err() {
            debug!("Consumer gone before start for '{}'", self.suffix);
            return;
        }

        match self.mine(generator, started).await {
            Ok(()) => {}
            Err(RunStop::Disconnected) => {
                info!(
                    "Consumer disconnected, stopping run for '{}' after {} attempts",
                    self.suffix, self.attempts
                );
                return;
            }
            Err(RunStop::Fault(message)) => {
                error!("Vanity run for '{}' failed: {}", self.suffix, message);
                let _ = self
                    .events
                    .send(MiningEvent::Error {
                        message,
                        addresses: self.found.clone(),
                    })
                    .await;
                return;
            }
        }

        let summary = self.summarize(pool, started).await;
        info!(
            "Vanity run for '{}' complete: found={}, attempts={}, rate={:.0}/s",
            self.suffix, summary.found, summary.attempts, summary.rate
        );
        let _ = self.events.send(MiningEvent::Complete(summary)).await;
    }

    /// Generate batches until the time budget is spent
    async fn mine(&mut self, mut generator: KeyGenerator, started: Instant) -> Result<(), RunStop> {
        let deadline = started
            .checked_add(self.max_duration)
            .ok_or_else(|| RunStop::Fault("Run deadline is out of range".to_string()))?;
        let mut last_progress = started;

        while started.elapsed() < self.max_duration {
            let suffix = self.suffix.clone();
            let batch_size = self.settings.batch_size;

            let (returned, batch) = tokio::task::spawn_blocking(move || {
                let batch = generator.run_batch(&suffix, batch_size, deadline);
                (generator, batch)
            })
            .await
            .map_err(|e| RunStop::Fault(format!("Key generation task failed: {}", e)))?;
            generator = returned;

            let attempts_before = self.attempts;
            self.attempts += batch.attempts as u64;

            for matched in batch.matches {
                self.record_match(matched, attempts_before, started).await?;
            }

            if last_progress.elapsed() >= self.settings.progress_interval {
                let elapsed = started.elapsed();
                let progress = MiningEvent::Progress {
                    attempts: self.attempts,
                    found: self.found.len() as u64,
                    elapsed_ms: millis(elapsed),
                    rate: rate(self.attempts, elapsed),
                    percent: budget_percent(elapsed, self.max_duration),
                };
                self.emit(progress).await?;
                last_progress = Instant::now();
            }
        }

        Ok(())
    }

    /// Persist, then report. A failed save is logged and the key still counts.
    async fn record_match(
        &mut self,
        matched: MatchedKeypair,
        attempts_before: u64,
        started: Instant,
    ) -> Result<(), RunStop> {
        let keypair = NewVanityKeypair {
            suffix: self.suffix.to_string(),
            public_key: matched.public_key.clone(),
            secret_key_encrypted: self.cipher.seal(&matched.keypair_bytes),
        };

        match self.sink.save_keypair(&keypair).await {
            Ok(()) => debug!("Saved vanity keypair {}", matched.public_key),
            Err(e) => warn!("Failed to save vanity keypair {}: {}", matched.public_key, e),
        }

        self.found.push(matched.public_key.clone());
        let attempts = attempts_before + matched.index as u64 + 1;
        let elapsed = started.elapsed();

        self.emit(MiningEvent::Found {
            address: matched.public_key,
            found: self.found.len() as u64,
            attempts,
            elapsed_ms: millis(elapsed),
            rate: rate(attempts, elapsed),
        })
        .await
    }

    async fn emit(&self, event: MiningEvent) -> Result<(), RunStop> {
        self.events
            .send(event)
            .await
            .map_err(|_| RunStop::Disconnected)
    }

    async fn summarize(&self, initial_pool: PoolStats, started: Instant) -> CompleteSummary {
        let elapsed = started.elapsed();
        let pool_size = match self.stats.pool_stats(self.suffix.as_str()).await {
            Ok(pool) => pool.available,
            Err(e) => {
                warn!("Failed to refresh pool statistics for '{}': {}", self.suffix, e);
                initial_pool.available + self.found.len() as u64
            }
        };

        CompleteSummary {
            found: self.found.len() as u64,
            attempts: self.attempts,
            duration_ms: millis(elapsed),
            rate: rate(self.attempts, elapsed),
            addresses: self.found.clone(),
            pool_size,
            breakdown: self.read_breakdown().await,
        }
    }

    async fn read_breakdown(&self) -> PoolBreakdown {
        match self.stats.pool_breakdown().await {
            Ok(breakdown) => breakdown,
            Err(e) => {
                warn!("Failed to read pool breakdown: {}", e);
                PoolBreakdown::new()
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Attempts per second
fn rate(attempts: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        attempts as f64 / secs
    } else {
        0.0
    }
}

fn budget_percent(elapsed: Duration, budget: Duration) -> f64 {
    if budget.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / budget.as_secs_f64() * 100.0).min(100.0)
}

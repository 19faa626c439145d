//! Batch scoring and the parallel score driver.
//!
//! The driver partitions the metabolomic collection into contiguous
//! near-equal shards, spawns one scoped worker thread per non-empty shard,
//! and collects each worker's partial table over an mpsc channel. Workers
//! share read-only references to the genomic collection and the strain
//! universe and never talk to each other. The merge is a disjoint-key
//! union, so worker completion order does not affect the result content.

use log::{debug, info};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::{GenomicUnit, MetabolomicUnit};
use crate::scoring::{ScoreRecord, ScoreTable, ScoreValue};
use crate::strain::StrainCollection;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("genomic-unit collection is empty")]
    EmptyGenomicCollection,

    #[error("worker for shard {shard} failed")]
    WorkerFailed { shard: usize },

    #[error("timed out waiting for shards {missing:?}")]
    Timeout { missing: Vec<usize> },

    #[error("scoring run cancelled")]
    Cancelled,

    #[error("metabolomic unit '{key}' scored by more than one shard")]
    ShardCollision { key: String },
}

/// Cooperative cancellation flag, checked by workers between metabolomic
/// units.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for one batch of scoring work.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Also score each pair's randomized surrogates for the null model.
    pub compute_random: bool,
    /// Log progress every this many metabolomic units; 0 disables.
    pub progress_interval: usize,
    /// Cancellation flag shared with the caller.
    pub cancel: CancelToken,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            compute_random: true,
            progress_interval: 100,
            cancel: CancelToken::new(),
        }
    }
}

/// Configuration for the parallel driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Number of worker threads; shards beyond the unit count are skipped.
    pub workers: usize,
    /// Upper bound on the wait for worker results; `None` blocks.
    pub timeout: Option<Duration>,
    pub batch: BatchOptions,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            workers: num_cpus::get(),
            timeout: None,
            batch: BatchOptions::default(),
        }
    }
}

/// Splits `0..len` into up to `workers` contiguous shards whose sizes
/// differ by at most one: the first `len % workers` shards take the extra
/// element. Zero-length shards are omitted, so at most `min(len, workers)`
/// ranges are returned.
pub fn partition_shards(len: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 || len == 0 {
        return Vec::new();
    }
    let base = len / workers;
    let remainder = len % workers;
    let mut shards = Vec::new();
    let mut start = 0;
    for i in 0..workers {
        let size = base + usize::from(i < remainder);
        if size == 0 {
            break;
        }
        shards.push(start..start + size);
        start += size;
    }
    shards
}

/// Scores one shard of metabolomic units against the full genomic
/// collection.
///
/// Every pair in the cross product gets a record; a scorer returning
/// not-applicable still produces a record with a null observed score. When
/// `options.compute_random` is set and both sides carry surrogates, the
/// surrogate pair is scored with the same function and stored as the
/// record's random component; a missing surrogate degrades to `None`.
pub fn score_batch<M, G, F>(
    metabolomic_units: &[M],
    genomic_units: &[G],
    strains: &StrainCollection,
    scorer: &F,
    options: &BatchOptions,
) -> Result<ScoreTable, DriverError>
where
    M: MetabolomicUnit,
    G: GenomicUnit,
    F: Fn(&M, &G, &StrainCollection) -> ScoreValue,
{
    let mut table = ScoreTable::new();
    for (done, unit) in metabolomic_units.iter().enumerate() {
        if options.cancel.is_cancelled() {
            return Err(DriverError::Cancelled);
        }
        if options.progress_interval > 0 && done > 0 && done % options.progress_interval == 0 {
            debug!("scored {} of {} units", done, metabolomic_units.len());
        }
        for genomic in genomic_units {
            let value = scorer(unit, genomic, strains);
            let random = if options.compute_random {
                match (unit.surrogate(), genomic.surrogate()) {
                    (Some(m), Some(g)) => scorer(m, g, strains).score,
                    _ => {
                        debug!("no surrogate pair for ({}, {})", unit.id(), genomic.id());
                        None
                    }
                }
            } else {
                None
            };
            table.insert(
                unit.id(),
                genomic.id(),
                ScoreRecord {
                    observed: value.score,
                    random,
                    evidence: value.evidence,
                },
            );
        }
    }
    Ok(table)
}

enum Wait {
    Message((usize, Result<ScoreTable, DriverError>)),
    TimedOut,
    Closed,
}

fn missing_shards(received: &[bool]) -> Vec<usize> {
    received
        .iter()
        .enumerate()
        .filter_map(|(shard, &done)| (!done).then_some(shard))
        .collect()
}

/// Computes the full score table for `metabolomic_units` × `genomic_units`
/// across `config.workers` worker threads.
///
/// Configuration problems (zero workers, empty genomic collection) are
/// reported before any worker is spawned; an empty metabolomic collection
/// returns an empty table. Every worker is joined before this returns, and
/// any failure — a panicking worker, a timed-out shard, a cancelled run —
/// surfaces as an error rather than a partial table presented as complete.
pub fn compute_all_scores<M, G, F>(
    metabolomic_units: &[M],
    genomic_units: &[G],
    strains: &StrainCollection,
    scorer: &F,
    config: &DriverConfig,
) -> Result<ScoreTable, DriverError>
where
    M: MetabolomicUnit + Sync,
    G: GenomicUnit + Sync,
    F: Fn(&M, &G, &StrainCollection) -> ScoreValue + Sync,
{
    if config.workers == 0 {
        return Err(DriverError::InvalidWorkerCount);
    }
    if genomic_units.is_empty() {
        return Err(DriverError::EmptyGenomicCollection);
    }
    if metabolomic_units.is_empty() {
        return Ok(ScoreTable::new());
    }

    let shards = partition_shards(metabolomic_units.len(), config.workers);
    debug!(
        "partitioned {} metabolomic units into {} shards",
        metabolomic_units.len(),
        shards.len()
    );
    let started = Instant::now();
    let deadline = config.timeout.map(|t| started + t);

    let result = thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel();
        let mut handles = Vec::with_capacity(shards.len());
        for (shard, range) in shards.iter().enumerate() {
            let sender = sender.clone();
            let units = &metabolomic_units[range.clone()];
            let options = &config.batch;
            handles.push(scope.spawn(move || {
                let outcome = score_batch(units, genomic_units, strains, scorer, options);
                // a send failure means the driver already gave up on the run
                let _ = sender.send((shard, outcome));
            }));
        }
        drop(sender);

        let mut table = ScoreTable::new();
        let mut received = vec![false; shards.len()];
        let mut pending = shards.len();
        let mut failure: Option<DriverError> = None;

        while pending > 0 && failure.is_none() {
            let wait = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match receiver.recv_timeout(remaining) {
                        Ok(message) => Wait::Message(message),
                        Err(mpsc::RecvTimeoutError::Timeout) => Wait::TimedOut,
                        Err(mpsc::RecvTimeoutError::Disconnected) => Wait::Closed,
                    }
                }
                None => match receiver.recv() {
                    Ok(message) => Wait::Message(message),
                    Err(_) => Wait::Closed,
                },
            };
            match wait {
                Wait::Message((shard, Ok(partial))) => {
                    received[shard] = true;
                    pending -= 1;
                    if let Err(key) = table.merge(partial) {
                        failure = Some(DriverError::ShardCollision { key });
                    }
                }
                Wait::Message((shard, Err(error))) => {
                    received[shard] = true;
                    pending -= 1;
                    failure = Some(error);
                }
                Wait::TimedOut => {
                    // stop in-flight workers at their next unit boundary so
                    // the scope join below cannot hang
                    config.batch.cancel.cancel();
                    failure = Some(DriverError::Timeout {
                        missing: missing_shards(&received),
                    });
                }
                // every sender is gone: any shard still pending panicked,
                // which the joins below turn into WorkerFailed
                Wait::Closed => break,
            }
        }

        for (shard, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() && failure.is_none() {
                failure = Some(DriverError::WorkerFailed { shard });
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(table),
        }
    });

    if result.is_ok() {
        let elapsed = started.elapsed().as_secs_f64().max(f64::EPSILON);
        info!(
            "scored {} metabolomic units against {} genomic units in {:.1}s ({:.1}/s)",
            metabolomic_units.len(),
            genomic_units.len(),
            elapsed,
            metabolomic_units.len() as f64 / elapsed,
        );
    }
    result
}

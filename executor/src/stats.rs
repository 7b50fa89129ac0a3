use std::{
    iter::Sum,
    ops::AddAssign,
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::time_unit::TimeUnit;

/// Outcome tallies of one worker, or of a whole run once summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Transactions handed to the worker.
    pub assigned: u64,
    /// Begun transactions, retries included.
    pub attempts: u64,
    pub committed: u64,
    pub failures: u64,
    pub rw_conflicts: u64,
    pub ww_conflicts: u64,
    pub read_snapshot_misses: u64,
    pub write_snapshot_misses: u64,
    pub invalid_txs: u64,
    pub canceled_txs: u64,
}

impl AddAssign for Counters {
    fn add_assign(&mut self, other: Self) {
        self.assigned += other.assigned;
        self.attempts += other.attempts;
        self.committed += other.committed;
        self.failures += other.failures;
        self.rw_conflicts += other.rw_conflicts;
        self.ww_conflicts += other.ww_conflicts;
        self.read_snapshot_misses += other.read_snapshot_misses;
        self.write_snapshot_misses += other.write_snapshot_misses;
        self.invalid_txs += other.invalid_txs;
        self.canceled_txs += other.canceled_txs;
    }
}

impl Sum for Counters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Counters::default(), |mut acc, c| {
            acc += c;
            acc
        })
    }
}

/// What one worker observed. Owned by the worker until it is joined.
#[derive(Debug, Clone)]
pub struct ThreadResult {
    pub worker: usize,
    pub cpu: Option<usize>,
    pub counters: Counters,
    pub start: Instant,
    pub end: Instant,
}

impl ThreadResult {
    pub fn new(worker: usize) -> Self {
        let now = Instant::now();
        Self {
            worker,
            cpu: None,
            counters: Counters::default(),
            start: now,
            end: now,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }
}

/// Per-worker results reduced to run totals.
#[derive(Debug, Clone)]
pub struct Summary {
    pub workers: Vec<ThreadResult>,
    pub totals: Counters,
    /// From the earliest worker start to the latest worker end.
    pub duration: Duration,
}

impl Summary {
    pub fn aggregate(mut workers: Vec<ThreadResult>) -> Self {
        workers.sort_by_key(|w| w.worker);
        let totals = workers.iter().map(|w| w.counters).sum();

        let start = workers.iter().map(|w| w.start).min();
        let end = workers.iter().map(|w| w.end).max();
        let duration = match (start, end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        };

        Self {
            workers,
            totals,
            duration,
        }
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Transactions that were not canceled.
    pub fn completed(&self) -> u64 {
        self.totals.assigned - self.totals.canceled_txs
    }

    /// Completed transactions per `unit`. Zero for an empty window.
    pub fn throughput(&self, unit: TimeUnit) -> f64 {
        let elapsed = unit.convert(self.duration);
        if elapsed == 0.0 {
            return 0.0;
        }
        self.completed() as f64 / elapsed
    }
}

use std::{ops::Range, thread};

use key_value::SampleSet;
use log::{debug, info, warn};
use workload::{Transaction, Workload};

use crate::{
    cpu::{self, CpuLayout},
    error::{ConfigError, ExecError},
    partition::{Partitioning, partition},
    replay::replay,
    stats::{Summary, ThreadResult},
    store::Store,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingConfig {
    pub threads: usize,
    /// Extra attempts per transaction before it is canceled.
    pub retries: u32,
    pub cpus: CpuLayout,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            retries: 0,
            cpus: CpuLayout::default(),
        }
    }
}

impl ScalingConfig {
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn cpus(mut self, cpus: CpuLayout) -> Self {
        self.cpus = cpus;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        self.cpus.validate()
    }
}

/// Replays a workload on `config.threads` OS threads against one shared
/// store and reduces what the workers saw into a [`Summary`].
pub struct ScalingExecutor<'a, S: Store> {
    store: &'a S,
    pairs: &'a SampleSet,
    config: ScalingConfig,
}

impl<'a, S: Store> ScalingExecutor<'a, S> {
    pub fn new(store: &'a S, pairs: &'a SampleSet, config: ScalingConfig) -> Self {
        Self {
            store,
            pairs,
            config,
        }
    }

    pub fn run(&self, partitioning: Partitioning<'_>) -> Result<Summary, ExecError> {
        self.config.validate()?;
        let assignments = self.assign(partitioning)?;
        self.check_indices(&assignments)?;

        info!(
            "replaying {} transactions on {} threads, {} retries",
            partitioning.transaction_count(),
            self.config.threads,
            self.config.retries
        );

        let results = thread::scope(|scope| -> Result<Vec<ThreadResult>, ExecError> {
            let mut handles = Vec::with_capacity(assignments.len());
            for (worker, transactions) in assignments.iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("worker-{}", worker))
                    .spawn_scoped(scope, move || self.work(worker, transactions))?;
                handles.push(handle);
            }

            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| {
                    handle
                        .join()
                        .map_err(|_| ExecError::WorkerPanicked(worker))
                })
                .collect()
        })?;

        let summary = Summary::aggregate(results);
        info!(
            "run finished in {:?}: {} committed, {} canceled",
            summary.duration, summary.totals.committed, summary.totals.canceled_txs
        );
        Ok(summary)
    }

    /// The transactions each worker replays, indexed by worker.
    fn assign<'w>(
        &self,
        partitioning: Partitioning<'w>,
    ) -> Result<Vec<&'w [Transaction]>, ConfigError> {
        let threads = self.config.threads;
        match partitioning {
            Partitioning::Shared(workload) => {
                let ranges = partition(workload.len(), threads)?;
                for (worker, range) in ranges.iter().enumerate() {
                    debug!("worker {} replays transactions {:?}", worker, range);
                }
                Ok(ranges
                    .into_iter()
                    .map(move |Range { start, end }| &workload.transactions()[start..end])
                    .collect())
            }
            Partitioning::PreSplit(pool) => {
                if threads > pool.len() {
                    return Err(ConfigError::PoolTooSmall {
                        threads,
                        workloads: pool.len(),
                    });
                }
                Ok(pool[..threads].iter().map(Workload::transactions).collect())
            }
        }
    }

    fn check_indices(&self, assignments: &[&[Transaction]]) -> Result<(), ConfigError> {
        let samples = self.pairs.len();
        for (worker, transactions) in assignments.iter().enumerate() {
            for (transaction, tx) in transactions.iter().enumerate() {
                if let Some(cmd) = tx.iter().find(|cmd| cmd.index >= samples) {
                    return Err(ConfigError::DataIndexOutOfRange {
                        worker,
                        transaction,
                        index: cmd.index,
                        samples,
                    });
                }
            }
        }
        Ok(())
    }

    fn work(&self, worker: usize, transactions: &[Transaction]) -> ThreadResult {
        let mut result = ThreadResult::new(worker);

        let layout = self.config.cpus;
        if layout.pin {
            let target = layout.cpu_for(worker);
            match cpu::pin_current_thread(target) {
                Ok(()) => result.cpu = Some(target),
                Err(e) => warn!("worker {}: could not pin to cpu {}: {}", worker, target, e),
            }
        }
        debug!(
            "worker {} running on cpu {:?} with {} transactions",
            worker,
            cpu::current_cpu(),
            transactions.len()
        );

        replay(
            self.store,
            self.pairs,
            transactions,
            self.config.retries,
            &mut result,
        );
        result
    }
}

use thiserror::Error;

/// Rejected run configurations. Raised before any worker starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("{threads} threads requested for only {transactions} transactions")]
    TooManyThreads { threads: usize, transactions: usize },

    #[error("{threads} threads requested but the pool holds {workloads} workloads")]
    PoolTooSmall { threads: usize, workloads: usize },

    #[error(
        "worker {worker}, transaction {transaction}: data index {index} out of range for {samples} samples"
    )]
    DataIndexOutOfRange {
        worker: usize,
        transaction: usize,
        index: usize,
        samples: usize,
    },

    #[error("smt ratio must be at least 1")]
    InvalidSmtRatio,

    #[error("unknown time unit '{0}', expected one of s, ms, us, ns")]
    InvalidTimeUnit(String),

    #[error("sample set is empty")]
    EmptySampleSet,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

use std::ops::Range;

use workload::Workload;

use crate::error::ConfigError;

/// How a run's transactions are spread over its workers.
#[derive(Debug, Clone, Copy)]
pub enum Partitioning<'a> {
    /// One workload cut into contiguous ranges, one per worker.
    Shared(&'a Workload),
    /// Worker `i` replays all of pool entry `i`.
    PreSplit(&'a [Workload]),
}

impl Partitioning<'_> {
    /// Transactions available to the run as a whole.
    pub fn transaction_count(&self) -> usize {
        match self {
            Partitioning::Shared(workload) => workload.len(),
            Partitioning::PreSplit(pool) => pool.iter().map(Workload::len).sum(),
        }
    }
}

/// Splits `[0, len)` into `threads` contiguous ranges whose sizes differ by
/// at most one. The first `len % threads` ranges carry the extra element.
pub fn partition(len: usize, threads: usize) -> Result<Vec<Range<usize>>, ConfigError> {
    if threads == 0 {
        return Err(ConfigError::ZeroThreads);
    }
    if threads > len {
        return Err(ConfigError::TooManyThreads {
            threads,
            transactions: len,
        });
    }

    let base = len / threads;
    let remainder = len % threads;
    let mut start = 0;
    let ranges = (0..threads)
        .map(|i| {
            let size = base + usize::from(i < remainder);
            let range = start..start + size;
            start += size;
            range
        })
        .collect();
    Ok(ranges)
}

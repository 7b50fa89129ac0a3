use std::{hint::black_box, time::Instant};

use key_value::SampleSet;
use log::trace;
use workload::{OpCode, Transaction};

use crate::{
    stats::{Counters, ThreadResult},
    store::{Status, Store},
};

/// Replays `transactions` in order against `store`, filling `result`.
///
/// A transaction that fails is re-run from `begin` up to `retries` more
/// times; after that it is canceled and the worker moves on. `retries == 0`
/// cancels on the first failure.
pub fn replay<S: Store>(
    store: &S,
    pairs: &SampleSet,
    transactions: &[Transaction],
    retries: u32,
    result: &mut ThreadResult,
) {
    let counters = &mut result.counters;
    counters.assigned += transactions.len() as u64;

    result.start = Instant::now();
    let mut position = 0;
    let mut retry_count = 0;
    while position < transactions.len() {
        if execute(store, pairs, &transactions[position], counters) {
            counters.committed += 1;
        } else {
            counters.failures += 1;
            if retries > 0 && retry_count < retries {
                retry_count += 1;
                trace!("retrying tx {} ({}/{})", position, retry_count, retries);
                continue;
            }
            counters.canceled_txs += 1;
        }
        position += 1;
        retry_count = 0;
    }
    result.end = Instant::now();
}

/// Runs one attempt of `tx`. True when it committed.
fn execute<S: Store>(
    store: &S,
    pairs: &SampleSet,
    tx: &Transaction,
    counters: &mut Counters,
) -> bool {
    counters.attempts += 1;
    let mut handle = store.begin();

    for cmd in tx {
        let pair = &pairs[cmd.index];
        match cmd.opcode {
            OpCode::Get => {
                let (value, status) = store.read(&mut handle, &pair.key);
                black_box(value);
                if status == Status::ValueNotFound {
                    counters.read_snapshot_misses += 1;
                }
            }
            OpCode::Put => {
                if store.write(&mut handle, &pair.key, &pair.value) == Status::ValueNotFound {
                    counters.write_snapshot_misses += 1;
                }
            }
        }
    }

    if store.has_failed(&handle) {
        return false;
    }

    match store.commit(handle) {
        Status::Ok => true,
        Status::WwConflict => {
            counters.ww_conflicts += 1;
            false
        }
        Status::RwConflict => {
            counters.rw_conflicts += 1;
            false
        }
        Status::InvalidTx => {
            counters.invalid_txs += 1;
            false
        }
        Status::ValueNotFound => false,
    }
}

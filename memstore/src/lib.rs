//! An in-memory optimistic store.
//!
//! Committed data lives in a lock-free skip list, each key tagged with the
//! version of the commit that last touched it. Transactions read straight
//! from the skip list and buffer their writes; commits are validated and
//! installed one at a time.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use crossbeam_skiplist::SkipMap;
use executor::{Status, Store};
use key_value::SampleSet;
use log::{debug, info};

#[derive(Debug)]
struct Record {
    /// `None` marks a deleted key.
    value: Option<Box<[u8]>>,
    version: u64,
}

#[derive(Debug, Default)]
pub struct MemTx {
    start: u64,
    reads: BTreeSet<Box<[u8]>>,
    writes: BTreeMap<Box<[u8]>, Option<Box<[u8]>>>,
    failed: bool,
}

impl MemTx {
    /// The commit version this transaction reads at.
    pub fn snapshot(&self) -> u64 {
        self.start
    }
}

#[derive(Debug, Default)]
pub struct MemStore {
    data: SkipMap<Box<[u8]>, Record>,
    /// Version of the latest installed commit.
    visible: AtomicU64,
    commit_lock: Mutex<()>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every pair in one transaction.
    pub fn populate(&self, pairs: &SampleSet) -> Status {
        let mut tx = self.begin();
        for pair in pairs {
            self.write(&mut tx, &pair.key, &pair.value);
        }
        let status = self.commit(tx);
        info!("populated store with {} pairs: {}", pairs.len(), status);
        status
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.data.iter().filter(|e| e.value().value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.visible.load(Ordering::Acquire)
    }

    fn newer_than(&self, key: &[u8], start: u64) -> bool {
        self.data
            .get(key)
            .is_some_and(|entry| entry.value().version > start)
    }
}

impl Store for MemStore {
    type Tx = MemTx;

    fn begin(&self) -> MemTx {
        MemTx {
            start: self.visible.load(Ordering::Acquire),
            ..MemTx::default()
        }
    }

    fn read(&self, tx: &mut MemTx, key: &[u8]) -> (Option<Vec<u8>>, Status) {
        if let Some(pending) = tx.writes.get(key) {
            return match pending {
                Some(value) => (Some(value.to_vec()), Status::Ok),
                None => (None, Status::ValueNotFound),
            };
        }

        tx.reads.insert(key.into());
        match self.data.get(key) {
            Some(entry) => {
                let record = entry.value();
                match &record.value {
                    Some(value) if record.version <= tx.start => (Some(value.to_vec()), Status::Ok),
                    _ => (None, Status::ValueNotFound),
                }
            }
            None => (None, Status::ValueNotFound),
        }
    }

    fn write(&self, tx: &mut MemTx, key: &[u8], value: &[u8]) -> Status {
        if self.newer_than(key, tx.start) {
            tx.failed = true;
            return Status::ValueNotFound;
        }
        tx.writes.insert(key.into(), Some(value.into()));
        Status::Ok
    }

    fn drop_key(&self, tx: &mut MemTx, key: &[u8]) -> Status {
        if let Some(pending) = tx.writes.get_mut(key) {
            return match pending.take() {
                Some(_) => Status::Ok,
                None => Status::ValueNotFound,
            };
        }

        let live = self.data.get(key).is_some_and(|entry| {
            let record = entry.value();
            record.value.is_some() && record.version <= tx.start
        });
        if !live {
            return Status::ValueNotFound;
        }
        tx.writes.insert(key.into(), None);
        Status::Ok
    }

    fn commit(&self, tx: MemTx) -> Status {
        if tx.failed {
            return Status::InvalidTx;
        }

        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if tx.writes.keys().any(|key| self.newer_than(key, tx.start)) {
            return Status::WwConflict;
        }
        if tx.reads.iter().any(|key| self.newer_than(key, tx.start)) {
            return Status::RwConflict;
        }
        if tx.writes.is_empty() {
            return Status::Ok;
        }

        let version = self.visible.load(Ordering::Acquire) + 1;
        let installed = tx.writes.len();
        for (key, value) in tx.writes {
            self.data.insert(key, Record { value, version });
        }
        self.visible.store(version, Ordering::Release);
        debug!("installed commit {} with {} writes", version, installed);
        Status::Ok
    }

    fn has_failed(&self, tx: &MemTx) -> bool {
        tx.failed
    }
}

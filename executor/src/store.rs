use std::fmt;

/// Outcome of a store operation. Conflicts and snapshot misses are normal
/// results under contention, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    InvalidTx,
    RwConflict,
    WwConflict,
    ValueNotFound,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::InvalidTx => "INVALID_TX",
            Status::RwConflict => "RW_CONFLICT",
            Status::WwConflict => "WW_CONFLICT",
            Status::ValueNotFound => "VALUE_NOT_FOUND",
        };
        f.write_str(name)
    }
}

/// A transactional key-value store driven by the executor.
///
/// One instance is shared by every worker thread, so implementations bring
/// their own concurrency control. A transaction handle is owned by the
/// worker that began it and is consumed by `commit`.
pub trait Store: Sync {
    type Tx;

    fn begin(&self) -> Self::Tx;

    fn read(&self, tx: &mut Self::Tx, key: &[u8]) -> (Option<Vec<u8>>, Status);

    fn write(&self, tx: &mut Self::Tx, key: &[u8], value: &[u8]) -> Status;

    fn drop_key(&self, tx: &mut Self::Tx, key: &[u8]) -> Status;

    fn commit(&self, tx: Self::Tx) -> Status;

    /// Whether the store already knows `tx` cannot commit.
    fn has_failed(&self, _tx: &Self::Tx) -> bool {
        false
    }
}

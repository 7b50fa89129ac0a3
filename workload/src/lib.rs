pub mod error;
pub mod generator;
pub mod opcode;
pub mod profile;
pub mod serializer;

use std::{ops::Index, slice};

pub use error::{GenerateError, ParseError, ProfileError};
pub use generator::{Generator, GeneratorConfig, generate, generate_pool};
pub use opcode::OpCode;
pub use profile::{ProfileTable, TransactionProfile};

/// One step of a transaction: an operation on the sample pair at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub opcode: OpCode,
    pub index: usize,
}

impl Command {
    pub fn new(opcode: OpCode, index: usize) -> Self {
        Self { opcode, index }
    }
}

/// Commands in execution order; replayed as one atomic unit.
pub type Transaction = Vec<Command>;

/// A replayable sequence of transactions. Immutable once generated or loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    transactions: Vec<Transaction>,
}

impl Workload {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn command_count(&self) -> usize {
        self.transactions.iter().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> Vec<Transaction> {
        self.transactions
    }
}

impl Index<usize> for Workload {
    type Output = Transaction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.transactions[index]
    }
}

impl<'a> IntoIterator for &'a Workload {
    type Item = &'a Transaction;
    type IntoIter = slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

impl FromIterator<Transaction> for Workload {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}

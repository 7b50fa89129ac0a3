use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{Command, OpCode, Transaction, Workload, error::ParseError};

#[derive(Debug, Serialize, Deserialize)]
struct CommandDoc {
    cmd: String,
    pos: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct TransactionDoc {
    size: usize,
    cmds: Vec<CommandDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkloadDoc {
    size: usize,
    txs: Vec<TransactionDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PoolDoc {
    size: usize,
    workloads: Vec<WorkloadDoc>,
}

impl From<&Workload> for WorkloadDoc {
    fn from(workload: &Workload) -> Self {
        let txs = workload
            .iter()
            .map(|tx| TransactionDoc {
                size: tx.len(),
                cmds: tx
                    .iter()
                    .map(|cmd| CommandDoc {
                        cmd: cmd.opcode.as_str().to_string(),
                        pos: cmd.index,
                    })
                    .collect(),
            })
            .collect();
        Self {
            size: workload.len(),
            txs,
        }
    }
}

impl TryFrom<WorkloadDoc> for Workload {
    type Error = ParseError;

    fn try_from(doc: WorkloadDoc) -> Result<Self, Self::Error> {
        check_size("workload", doc.size, doc.txs.len())?;

        doc.txs
            .into_iter()
            .enumerate()
            .map(|(i, tx)| {
                check_size(&format!("transaction {}", i), tx.size, tx.cmds.len())?;
                tx.cmds
                    .into_iter()
                    .map(|cmd| -> Result<Command, ParseError> {
                        Ok(Command::new(cmd.cmd.parse()?, cmd.pos))
                    })
                    .collect::<Result<Transaction, _>>()
            })
            .collect()
    }
}

fn check_size(what: &str, declared: usize, actual: usize) -> Result<(), ParseError> {
    if declared != actual {
        return Err(ParseError::SizeMismatch {
            what: what.to_string(),
            declared,
            actual,
        });
    }
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), ParseError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn to_writer<W: Write>(writer: W, workload: &Workload) -> Result<(), ParseError> {
    serde_json::to_writer_pretty(writer, &WorkloadDoc::from(workload))?;
    Ok(())
}

pub fn from_reader<R: Read>(reader: R) -> Result<Workload, ParseError> {
    let doc: WorkloadDoc = serde_json::from_reader(reader)?;
    Workload::try_from(doc)
}

/// Writes `workload` to `path`, creating missing parent directories.
pub fn write(path: &Path, workload: &Workload) -> Result<(), ParseError> {
    create_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    to_writer(&mut writer, workload)?;
    writer.flush()?;
    info!(
        "wrote {} transactions to {}",
        workload.len(),
        path.display()
    );
    Ok(())
}

pub fn read(path: &Path) -> Result<Workload, ParseError> {
    let file = File::open(path)?;
    let workload = from_reader(BufReader::new(file))?;
    info!(
        "read {} transactions from {}",
        workload.len(),
        path.display()
    );
    Ok(workload)
}

pub fn pool_to_writer<W: Write>(writer: W, pool: &[Workload]) -> Result<(), ParseError> {
    let doc = PoolDoc {
        size: pool.len(),
        workloads: pool.iter().map(WorkloadDoc::from).collect(),
    };
    serde_json::to_writer_pretty(writer, &doc)?;
    Ok(())
}

pub fn pool_from_reader<R: Read>(reader: R) -> Result<Vec<Workload>, ParseError> {
    let doc: PoolDoc = serde_json::from_reader(reader)?;
    check_size("workload pool", doc.size, doc.workloads.len())?;
    doc.workloads.into_iter().map(Workload::try_from).collect()
}

pub fn write_pool(path: &Path, pool: &[Workload]) -> Result<(), ParseError> {
    create_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    pool_to_writer(&mut writer, pool)?;
    writer.flush()?;
    info!("wrote pool of {} workloads to {}", pool.len(), path.display());
    Ok(())
}

pub fn read_pool(path: &Path) -> Result<Vec<Workload>, ParseError> {
    let file = File::open(path)?;
    let pool = pool_from_reader(BufReader::new(file))?;
    info!("read pool of {} workloads from {}", pool.len(), path.display());
    Ok(pool)
}

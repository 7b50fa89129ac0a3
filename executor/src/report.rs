use std::fmt::{self, Write};

use serde::Serialize;

use crate::{
    stats::{Counters, Summary},
    time_unit::TimeUnit,
};

const RULE: &str = "----------------------------------------";

#[derive(Debug, Clone, Serialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub cpu: Option<usize>,
    pub duration: f64,
    #[serde(flatten)]
    pub counters: Counters,
}

/// A summary rendered in one time unit, ready to print or serialize.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub unit: TimeUnit,
    pub threads: usize,
    pub duration: f64,
    pub throughput: f64,
    pub totals: Counters,
    pub workers: Vec<WorkerReport>,
}

impl Report {
    pub fn new(summary: &Summary, unit: TimeUnit) -> Self {
        let workers = summary
            .workers
            .iter()
            .map(|w| WorkerReport {
                worker: w.worker,
                cpu: w.cpu,
                duration: unit.convert(w.elapsed()),
                counters: w.counters,
            })
            .collect();

        Self {
            unit,
            threads: summary.threads(),
            duration: unit.convert(summary.duration),
            throughput: summary.throughput(unit),
            totals: summary.totals,
            workers,
        }
    }

    /// The classic text block. `verbose` adds one block per worker ahead of
    /// the summary.
    pub fn write_text<W: Write>(&self, out: &mut W, verbose: bool) -> fmt::Result {
        let unit = self.unit;
        if verbose {
            for w in &self.workers {
                writeln!(out, "{}", RULE)?;
                writeln!(out, "results for thread-{}", w.worker)?;
                writeln!(out, "{}", RULE)?;
                if let Some(cpu) = w.cpu {
                    writeln!(out, "cpu           = {}", cpu)?;
                }
                write_counters(out, &w.counters, false)?;
                writeln!(out, "duration      = {}{}", w.duration, unit)?;
            }
            writeln!(out, "{}", RULE)?;
            writeln!(out, "summary")?;
            writeln!(out, "{}", RULE)?;
        }

        writeln!(out, "time          = {} {}", self.duration, unit)?;
        write_counters(out, &self.totals, true)?;
        writeln!(out, "throughput    = {}/{}", self.throughput, unit)
    }

    pub fn to_text(&self, verbose: bool) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut text, verbose);
        text
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn write_counters<W: Write>(out: &mut W, c: &Counters, invalid: bool) -> fmt::Result {
    writeln!(out, "failures      = {}", c.failures)?;
    writeln!(out, "canceled      = {}", c.canceled_txs)?;
    writeln!(out, "r snap misses = {}", c.read_snapshot_misses)?;
    writeln!(out, "w snap misses = {}", c.write_snapshot_misses)?;
    if invalid {
        writeln!(out, "invalid txs   = {}", c.invalid_txs)?;
    }
    writeln!(out, "w/w conflicts = {}", c.ww_conflicts)?;
    writeln!(out, "r/w conflicts = {}", c.rw_conflicts)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f, false)
    }
}

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    ops::Index,
    path::Path,
    slice,
};

use log::{debug, info};

use crate::{KeyValue, error::SampleError};

pub const DELIMITER: u8 = b';';

/// The ordered sample data a benchmark draws from. Workloads refer to pairs
/// by their position here, so the order of the source file is significant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SampleSet {
    pairs: Vec<KeyValue>,
}

impl SampleSet {
    pub fn new(pairs: Vec<KeyValue>) -> Self {
        Self { pairs }
    }

    /// Loads `KEY;VALUE` lines from `path`.
    pub fn load(path: &Path) -> Result<Self, SampleError> {
        let file = File::open(path)?;
        let samples = Self::from_reader(BufReader::new(file))?;
        info!("loaded {} sample pairs from {}", samples.len(), path.display());
        Ok(samples)
    }

    /// Each non-empty line is split at its first `;`. Empty lines are skipped,
    /// any other line without a delimiter is rejected.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, SampleError> {
        let mut pairs = Vec::new();
        let mut line = Vec::new();
        let mut line_number = 0;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            line_number += 1;

            if line.last() == Some(&b'\n') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            pairs.push(parse_line(&line, line_number)?);
        }

        debug!("parsed {} pairs from {} lines", pairs.len(), line_number);
        Ok(Self { pairs })
    }

    pub fn write(&self, path: &Path) -> Result<(), SampleError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> Result<(), SampleError> {
        for (index, kv) in self.pairs.iter().enumerate() {
            if kv.key.contains(&DELIMITER) {
                return Err(SampleError::DelimiterInKey { index });
            }
            writer.write_all(&kv.key)?;
            writer.write_all(&[DELIMITER])?;
            writer.write_all(&kv.value)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KeyValue> {
        self.pairs.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, KeyValue> {
        self.pairs.iter()
    }
}

impl Index<usize> for SampleSet {
    type Output = KeyValue;

    fn index(&self, index: usize) -> &Self::Output {
        &self.pairs[index]
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a KeyValue;
    type IntoIter = slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl FromIterator<KeyValue> for SampleSet {
    fn from_iter<I: IntoIterator<Item = KeyValue>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

fn parse_line(line: &[u8], line_number: usize) -> Result<KeyValue, SampleError> {
    let delimiter = line
        .iter()
        .position(|byte| *byte == DELIMITER)
        .ok_or(SampleError::MissingDelimiter { line: line_number })?;

    Ok(KeyValue {
        key: line[..delimiter].into(),
        value: line[delimiter + 1..].into(),
    })
}

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
    slice,
};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    OpCode,
    error::{ParseError, ProfileError},
};

/// Draws used for profile and operation selection are uniform in `1..=SELECTION_RANGE`.
pub const SELECTION_RANGE: u32 = 100;

/// A named recipe for one shape of transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionProfile {
    pub name: String,
    /// Unnormalized selection weight, same unit as the operation weights.
    pub weight: f64,
    pub operations: Vec<(OpCode, f64)>,
    pub length_min: usize,
    pub length_max: usize,
}

impl TransactionProfile {
    /// The profile's own length bounds, if they describe a usable range.
    pub fn length_bounds(&self) -> Option<(usize, usize)> {
        (self.length_min >= 1 && self.length_max >= self.length_min)
            .then_some((self.length_min, self.length_max))
    }

    pub fn select_operation(&self, draw: u32) -> Option<OpCode> {
        weighted_scan(self.operations.iter().copied(), draw)
    }
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    prob: Option<f64>,
    ops: Option<BTreeMap<String, f64>>,
    length_min: Option<usize>,
    length_max: Option<usize>,
}

/// Profiles in selection order. Documents are read as sorted maps, so the
/// order is lexicographic by profile name, and operations within a profile
/// are ordered by their key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileTable {
    profiles: Vec<TransactionProfile>,
}

impl ProfileTable {
    pub fn new(profiles: Vec<TransactionProfile>) -> Self {
        Self { profiles }
    }

    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file))?;
        info!(
            "loaded {} transaction profiles from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParseError> {
        let raw: BTreeMap<String, RawProfile> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let raw: BTreeMap<String, RawProfile> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeMap<String, RawProfile>) -> Result<Self, ParseError> {
        let profiles = raw
            .into_iter()
            .map(|(name, raw)| parse_profile(name, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { profiles })
    }

    /// Checks that every draw in `1..=SELECTION_RANGE` selects a profile and,
    /// inside every profile, an operation.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.profiles.is_empty() {
            return Err(ProfileError::Empty);
        }

        for profile in &self.profiles {
            if profile.weight < 0.0 || profile.operations.iter().any(|(_, w)| *w < 0.0) {
                return Err(ProfileError::NegativeWeight {
                    profile: profile.name.clone(),
                });
            }
            let total: f64 = profile.operations.iter().map(|(_, w)| w).sum();
            if total < f64::from(SELECTION_RANGE) {
                return Err(ProfileError::OperationWeightsBelowRange {
                    profile: profile.name.clone(),
                    total,
                    range: SELECTION_RANGE,
                });
            }
        }

        let total: f64 = self.profiles.iter().map(|p| p.weight).sum();
        if total < f64::from(SELECTION_RANGE) {
            return Err(ProfileError::WeightsBelowRange {
                total,
                range: SELECTION_RANGE,
            });
        }
        Ok(())
    }

    pub fn select(&self, draw: u32) -> Option<&TransactionProfile> {
        weighted_scan(self.profiles.iter().map(|p| (p, p.weight)), draw)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TransactionProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> slice::Iter<'_, TransactionProfile> {
        self.profiles.iter()
    }
}

fn parse_profile(name: String, raw: RawProfile) -> Result<TransactionProfile, ParseError> {
    let weight = raw.prob.ok_or_else(|| ParseError::MissingField {
        profile: name.clone(),
        field: "prob",
    })?;
    let ops = raw.ops.ok_or_else(|| ParseError::MissingField {
        profile: name.clone(),
        field: "ops",
    })?;

    let mut operations = Vec::with_capacity(ops.len());
    for (key, op_weight) in ops {
        match key.parse::<OpCode>() {
            Ok(opcode) => operations.push((opcode, op_weight)),
            Err(_) => warn!("profile '{}': ignoring unknown operation '{}'", name, key),
        }
    }
    if operations.is_empty() {
        return Err(ParseError::NoOperations { profile: name });
    }

    let profile = TransactionProfile {
        name,
        weight,
        operations,
        length_min: raw.length_min.unwrap_or(0),
        length_max: raw.length_max.unwrap_or(0),
    };
    debug!("parsed profile {:?}", profile);
    Ok(profile)
}

/// Walks `items` in order, subtracting each weight from the draw until the
/// residual fits. `None` when the weights are exhausted first.
pub(crate) fn weighted_scan<T>(items: impl IntoIterator<Item = (T, f64)>, draw: u32) -> Option<T> {
    let mut residual = f64::from(draw);
    for (item, weight) in items {
        if residual <= weight {
            return Some(item);
        }
        residual -= weight;
    }
    None
}

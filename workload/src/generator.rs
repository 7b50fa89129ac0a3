use key_value::SampleSet;
use log::{debug, info};
use rand::{
    Rng, SeedableRng,
    distributions::{Distribution, Uniform},
    rngs::StdRng,
};

use crate::{
    Command, Transaction, TransactionProfile, Workload,
    error::GenerateError,
    profile::{ProfileTable, SELECTION_RANGE},
};

/// Offsets the length stream's seed from the selection stream's.
const LENGTH_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub num_transactions: usize,
    pub length_min: usize,
    pub length_max: usize,
    /// `None` seeds from OS entropy; the result is then not reproducible.
    pub seed: Option<u64>,
    /// Prefer a profile's own length bounds over the global ones when it has
    /// valid bounds.
    pub profile_lengths: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_transactions: 1,
            length_min: 2,
            length_max: 64,
            seed: None,
            profile_lengths: false,
        }
    }
}

impl GeneratorConfig {
    pub fn num_transactions(mut self, num_transactions: usize) -> Self {
        self.num_transactions = num_transactions;
        self
    }

    pub fn length_bounds(mut self, length_min: usize, length_max: usize) -> Self {
        self.length_min = length_min;
        self.length_max = length_max;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn profile_lengths(mut self, profile_lengths: bool) -> Self {
        self.profile_lengths = profile_lengths;
        self
    }

    fn check_bounds(&self) -> Result<(), GenerateError> {
        if self.length_min < 1 || self.length_max < self.length_min {
            return Err(GenerateError::InvalidLengthBounds {
                min: self.length_min,
                max: self.length_max,
            });
        }
        Ok(())
    }
}

/// Seed for worker `worker` of a run seeded with `seed`.
pub fn derive_seed(seed: u64, worker: usize) -> u64 {
    seed.wrapping_add((worker as u64).wrapping_add(1).wrapping_mul(LENGTH_STREAM))
}

/// Turns a profile table into workloads. Owns two independent random
/// streams: one for profile, operation and pair selection, one for
/// transaction lengths.
pub struct Generator<'a> {
    profiles: &'a ProfileTable,
    config: GeneratorConfig,
    choice_rng: StdRng,
    length_rng: StdRng,
}

impl<'a> Generator<'a> {
    pub fn new(profiles: &'a ProfileTable, config: GeneratorConfig) -> Self {
        let (choice_rng, length_rng) = match config.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed ^ LENGTH_STREAM),
            ),
            None => (StdRng::from_entropy(), StdRng::from_entropy()),
        };
        Self {
            profiles,
            config,
            choice_rng,
            length_rng,
        }
    }

    pub fn generate(&mut self, pairs: &SampleSet) -> Result<Workload, GenerateError> {
        self.config.check_bounds()?;

        let probability = Uniform::new_inclusive(1, SELECTION_RANGE);
        let positions = (!pairs.is_empty()).then(|| Uniform::new(0, pairs.len()));

        let mut transactions = Vec::with_capacity(self.config.num_transactions);
        for i in 0..self.config.num_transactions {
            let draw = probability.sample(&mut self.choice_rng);
            let profile = self
                .profiles
                .select(draw)
                .ok_or(GenerateError::NoMatchingProfile { draw })?;

            let (min, max) = self.length_bounds(profile);
            let length = self.length_rng.gen_range(min..=max);

            let mut tx: Transaction = Vec::with_capacity(length);
            for _ in 0..length {
                let draw = probability.sample(&mut self.choice_rng);
                let opcode = profile.select_operation(draw).ok_or_else(|| {
                    GenerateError::NoMatchingOperation {
                        profile: profile.name.clone(),
                        draw,
                    }
                })?;
                let index = positions
                    .as_ref()
                    .ok_or(GenerateError::EmptySampleSet)?
                    .sample(&mut self.choice_rng);
                tx.push(Command { opcode, index });
            }

            debug!("tx {}: profile '{}', length {}", i, profile.name, length);
            transactions.push(tx);
        }

        let workload = Workload::new(transactions);
        info!(
            "generated {} transactions with {} commands",
            workload.len(),
            workload.command_count()
        );
        Ok(workload)
    }

    fn length_bounds(&self, profile: &TransactionProfile) -> (usize, usize) {
        match profile.length_bounds() {
            Some(bounds) if self.config.profile_lengths => bounds,
            _ => (self.config.length_min, self.config.length_max),
        }
    }
}

/// Generates a single workload; see [`Generator`].
pub fn generate(
    pairs: &SampleSet,
    profiles: &ProfileTable,
    config: GeneratorConfig,
) -> Result<Workload, GenerateError> {
    Generator::new(profiles, config).generate(pairs)
}

/// Generates one independent workload per worker. Each worker's generator is
/// seeded from the run seed and its index.
pub fn generate_pool(
    pairs: &SampleSet,
    profiles: &ProfileTable,
    config: GeneratorConfig,
    workers: usize,
) -> Result<Vec<Workload>, GenerateError> {
    (0..workers)
        .map(|worker| {
            let config = GeneratorConfig {
                seed: config.seed.map(|seed| derive_seed(seed, worker)),
                ..config.clone()
            };
            generate(pairs, profiles, config)
        })
        .collect()
}

use log::info;
use rand::{
    SeedableRng,
    distributions::{Distribution, Uniform},
    rngs::StdRng,
};

use crate::{KeyValue, SampleSet, error::SampleError};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Produces random alphanumeric sample data of a fixed shape.
pub struct SampleSetBuilder {
    key_size: usize,
    value_size: usize,
    pairs: usize,
    seed: Option<u64>,
}

impl Default for SampleSetBuilder {
    fn default() -> Self {
        Self {
            key_size: 16,
            value_size: 64,
            pairs: 1000,
            seed: None,
        }
    }
}

impl SampleSetBuilder {
    pub fn key_size(mut self, key_size: usize) -> Self {
        self.key_size = key_size;
        self
    }

    pub fn value_size(mut self, value_size: usize) -> Self {
        self.value_size = value_size;
        self
    }

    pub fn pairs(mut self, pairs: usize) -> Self {
        self.pairs = pairs;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SampleSet, SampleError> {
        if self.key_size == 0 {
            return Err(SampleError::InvalidKeySize(self.key_size));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let letters = Uniform::from(0..ALPHABET.len());
        let mut draw = |size: usize| -> Vec<u8> {
            (0..size)
                .map(|_| ALPHABET[letters.sample(&mut rng)])
                .collect()
        };

        let samples: SampleSet = (0..self.pairs)
            .map(|_| {
                let key = draw(self.key_size);
                let value = draw(self.value_size);
                KeyValue::new(key, value)
            })
            .collect();

        info!(
            "generated {} pairs (key size {}, value size {})",
            samples.len(),
            self.key_size,
            self.value_size
        );
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() -> Result<(), SampleError> {
        let samples = SampleSetBuilder::default()
            .key_size(8)
            .value_size(32)
            .pairs(100)
            .seed(7)
            .build()?;

        assert_eq!(samples.len(), 100);
        for kv in &samples {
            assert_eq!(kv.key.len(), 8);
            assert_eq!(kv.value.len(), 32);
            assert!(kv.key.iter().chain(kv.value.iter()).all(|b| ALPHABET.contains(b)));
        }

        Ok(())
    }

    #[test]
    fn test_seeded_builds_match() -> Result<(), SampleError> {
        let a = SampleSetBuilder::default().pairs(20).seed(99).build()?;
        let b = SampleSetBuilder::default().pairs(20).seed(99).build()?;
        let c = SampleSetBuilder::default().pairs(20).seed(100).build()?;

        assert_eq!(a, b);
        assert_ne!(a, c);

        Ok(())
    }

    #[test]
    fn test_zero_key_size() {
        let result = SampleSetBuilder::default().key_size(0).build();
        assert!(matches!(result, Err(SampleError::InvalidKeySize(0))));
    }
}

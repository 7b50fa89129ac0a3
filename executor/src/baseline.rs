use std::{
    hint::black_box,
    time::{Duration, Instant},
};

use key_value::SampleSet;
use log::{debug, info};
use rand::{
    Rng,
    distributions::{Distribution, Uniform},
};
use serde::Serialize;
use workload::OpCode;

use crate::{error::ConfigError, store::Store, time_unit::TimeUnit};

/// Reduced single-operation latencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub median: Duration,
    pub mean: Duration,
}

impl LatencyStats {
    /// `None` when there are no samples.
    pub fn from_samples(mut samples: Vec<Duration>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let count = samples.len();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (samples[mid - 1] + samples[mid]) / 2
        } else {
            samples[mid]
        };
        let total: Duration = samples.iter().sum();

        Some(Self {
            count,
            min: samples[0],
            max: samples[count - 1],
            median,
            mean: total / count as u32,
        })
    }

    pub fn render(&self, unit: TimeUnit) -> String {
        format!(
            "count  = {}\nmin    = {} {unit}\nmax    = {} {unit}\nmedian = {} {unit}\navg    = {} {unit}\n",
            self.count,
            unit.convert(self.min),
            unit.convert(self.max),
            unit.convert(self.median),
            unit.convert(self.mean),
        )
    }
}

/// Times `repeats` single `opcode` calls on uniformly drawn sample pairs,
/// all inside one transaction that is committed at the end.
pub fn measure<S: Store, R: Rng>(
    store: &S,
    pairs: &SampleSet,
    opcode: OpCode,
    repeats: usize,
    rng: &mut R,
) -> Result<Vec<Duration>, ConfigError> {
    if pairs.is_empty() {
        return Err(ConfigError::EmptySampleSet);
    }
    let positions = Uniform::new(0, pairs.len());

    info!("timing {} {} operations", repeats, opcode);
    let mut samples = Vec::with_capacity(repeats);
    let mut tx = store.begin();
    for _ in 0..repeats {
        let pair = &pairs[positions.sample(rng)];
        let start = Instant::now();
        match opcode {
            OpCode::Get => {
                black_box(store.read(&mut tx, &pair.key));
            }
            OpCode::Put => {
                black_box(store.write(&mut tx, &pair.key, &pair.value));
            }
        }
        samples.push(start.elapsed());
    }
    let status = store.commit(tx);
    debug!("baseline transaction committed with {}", status);

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::store::Status;
    use key_value::KeyValue;
    use rand::{SeedableRng, rngs::StdRng};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_odd_count() {
        let stats = LatencyStats::from_samples(vec![ms(5), ms(1), ms(3)]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, ms(1));
        assert_eq!(stats.max, ms(5));
        assert_eq!(stats.median, ms(3));
        assert_eq!(stats.mean, ms(3));
    }

    #[test]
    fn test_even_count() {
        let stats = LatencyStats::from_samples(vec![ms(8), ms(2), ms(4), ms(10)]).unwrap();
        assert_eq!(stats.median, ms(6));
        assert_eq!(stats.mean, ms(6));
        assert_eq!(stats.min, ms(2));
        assert_eq!(stats.max, ms(10));
    }

    #[test]
    fn test_no_samples() {
        assert_eq!(LatencyStats::from_samples(Vec::new()), None);
    }

    #[test]
    fn test_render() {
        let stats = LatencyStats::from_samples(vec![ms(1), ms(3)]).unwrap();
        let text = stats.render(TimeUnit::Ms);
        assert!(text.contains("median = 2 ms\n"));
        assert!(text.contains("count  = 2\n"));
    }

    #[derive(Default)]
    struct Recorder {
        reads: AtomicUsize,
        writes: AtomicUsize,
        commits: AtomicUsize,
    }

    impl Store for Recorder {
        type Tx = ();

        fn begin(&self) {}

        fn read(&self, _tx: &mut (), key: &[u8]) -> (Option<Vec<u8>>, Status) {
            self.reads.fetch_add(1, Ordering::Relaxed);
            (Some(key.to_vec()), Status::Ok)
        }

        fn write(&self, _tx: &mut (), _key: &[u8], _value: &[u8]) -> Status {
            self.writes.fetch_add(1, Ordering::Relaxed);
            Status::Ok
        }

        fn drop_key(&self, _tx: &mut (), _key: &[u8]) -> Status {
            Status::Ok
        }

        fn commit(&self, _tx: ()) -> Status {
            self.commits.fetch_add(1, Ordering::Relaxed);
            Status::Ok
        }
    }

    #[test]
    fn test_measure() -> Result<(), ConfigError> {
        let store = Recorder::default();
        let pairs = SampleSet::new(vec![KeyValue::new("a", "1"), KeyValue::new("b", "2")]);
        let mut rng = StdRng::seed_from_u64(9);

        let samples = measure(&store, &pairs, OpCode::Put, 25, &mut rng)?;

        assert_eq!(samples.len(), 25);
        assert_eq!(store.writes.load(Ordering::Relaxed), 25);
        assert_eq!(store.reads.load(Ordering::Relaxed), 0);
        assert_eq!(store.commits.load(Ordering::Relaxed), 1);

        let empty = measure(&store, &SampleSet::default(), OpCode::Get, 5, &mut rng);
        assert_eq!(empty, Err(ConfigError::EmptySampleSet));

        Ok(())
    }
}

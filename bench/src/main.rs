mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use error::BenchError;
use executor::{
    CpuLayout, LatencyStats, Partitioning, Report, ScalingConfig, ScalingExecutor, Status,
    TimeUnit, baseline,
};
use key_value::{SampleSet, SampleSetBuilder};
use memstore::MemStore;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{Level, info};
use workload::{GeneratorConfig, OpCode, ProfileTable, generate, generate_pool, serializer};

#[derive(Parser)]
#[command(author, version, about = "Workload generator and scaling benchmark for transactional key-value stores", long_about = None)]
struct Cli {
    /// Per-thread results and debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write random alphanumeric sample data as KEY;VALUE lines.
    KvGen {
        #[arg(long)]
        key_size: usize,
        #[arg(long)]
        value_size: usize,
        #[arg(long)]
        pairs: usize,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate a workload (or with --split, a pool of workloads).
    Gen {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        profile: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long = "num-txs", default_value_t = 1)]
        num_txs: usize,
        #[arg(long = "tx-length-min", default_value_t = 2)]
        tx_length_min: usize,
        #[arg(long = "tx-length-max", default_value_t = 64)]
        tx_length_max: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// Number of independent workloads to generate, one per worker.
        #[arg(long)]
        split: Option<usize>,
        /// Use each profile's own length bounds where it declares valid ones.
        #[arg(long)]
        profile_lengths: bool,
    },
    /// Replay a workload against the in-memory store.
    Run {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        workload: PathBuf,
        /// The workload file holds a pool, one workload per thread.
        #[arg(long)]
        pool: bool,
        #[arg(long, default_value_t = 1)]
        threads: usize,
        #[arg(long, default_value_t = 0)]
        retries: u32,
        #[arg(long, default_value_t = 0)]
        cpu_offset: usize,
        #[arg(long, default_value_t = 2)]
        smt_ratio: usize,
        /// Logical CPU count to plan placement with instead of the detected one.
        #[arg(long)]
        cpus: Option<usize>,
        #[arg(long)]
        no_pin: bool,
        #[arg(long, default_value_t = TimeUnit::S)]
        unit: TimeUnit,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Time single operations against the in-memory store.
    Baseline {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        op: OpCode,
        #[arg(long, default_value_t = 1000)]
        repeats: usize,
        #[arg(long, default_value_t = TimeUnit::S)]
        unit: TimeUnit,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn handle_kv_gen(
    key_size: usize,
    value_size: usize,
    pairs: usize,
    output: &Path,
    seed: Option<u64>,
) -> Result<(), BenchError> {
    let mut builder = SampleSetBuilder::default()
        .key_size(key_size)
        .value_size(value_size)
        .pairs(pairs);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }

    let samples = builder.build()?;
    samples.write(output)?;
    info!("wrote {} pairs to {}", samples.len(), output.display());
    Ok(())
}

fn handle_gen(
    data: &Path,
    profile: &Path,
    output: &Path,
    config: GeneratorConfig,
    split: Option<usize>,
) -> Result<(), BenchError> {
    let pairs = SampleSet::load(data)?;
    let profiles = ProfileTable::load(profile)?;
    profiles.validate()?;

    match split {
        Some(workers) => {
            let pool = generate_pool(&pairs, &profiles, config, workers)?;
            serializer::write_pool(output, &pool)?;
        }
        None => {
            let workload = generate(&pairs, &profiles, config)?;
            serializer::write(output, &workload)?;
        }
    }
    Ok(())
}

fn populated_store(pairs: &SampleSet) -> Result<MemStore, BenchError> {
    let store = MemStore::new();
    match store.populate(pairs) {
        Status::Ok => Ok(store),
        status => Err(BenchError::Populate(status)),
    }
}

fn handle_run(
    data: &Path,
    workload: &Path,
    pool: bool,
    config: ScalingConfig,
    unit: TimeUnit,
) -> Result<Report, BenchError> {
    config.validate()?;
    let pairs = SampleSet::load(data)?;
    let store = populated_store(&pairs)?;
    let executor = ScalingExecutor::new(&store, &pairs, config);

    let summary = if pool {
        let workloads = serializer::read_pool(workload)?;
        executor.run(Partitioning::PreSplit(&workloads))?
    } else {
        let workload = serializer::read(workload)?;
        executor.run(Partitioning::Shared(&workload))?
    };

    Ok(Report::new(&summary, unit))
}

fn handle_baseline(
    data: &Path,
    op: OpCode,
    repeats: usize,
    seed: Option<u64>,
) -> Result<Option<LatencyStats>, BenchError> {
    let pairs = SampleSet::load(data)?;
    let store = populated_store(&pairs)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let samples = baseline::measure(&store, &pairs, op, repeats, &mut rng)?;
    Ok(LatencyStats::from_samples(samples))
}

fn dispatch(command: Commands, verbose: bool) -> Result<(), BenchError> {
    match command {
        Commands::KvGen {
            key_size,
            value_size,
            pairs,
            output,
            seed,
        } => handle_kv_gen(key_size, value_size, pairs, &output, seed)?,
        Commands::Gen {
            data,
            profile,
            output,
            num_txs,
            tx_length_min,
            tx_length_max,
            seed,
            split,
            profile_lengths,
        } => {
            let mut config = GeneratorConfig::default()
                .num_transactions(num_txs)
                .length_bounds(tx_length_min, tx_length_max)
                .profile_lengths(profile_lengths);
            config.seed = seed;
            handle_gen(&data, &profile, &output, config, split)?;
        }
        Commands::Run {
            data,
            workload,
            pool,
            threads,
            retries,
            cpu_offset,
            smt_ratio,
            cpus,
            no_pin,
            unit,
            format,
        } => {
            let mut layout = CpuLayout::default()
                .offset(cpu_offset)
                .smt_ratio(smt_ratio)
                .pin(!no_pin);
            layout.logical_cpus = cpus;
            let config = ScalingConfig::default()
                .threads(threads)
                .retries(retries)
                .cpus(layout);

            let report = handle_run(&data, &workload, pool, config, unit)?;
            match format {
                Format::Text => print!("{}", report.to_text(verbose)),
                Format::Json => println!("{}", report.to_json()?),
            }
        }
        Commands::Baseline {
            data,
            op,
            repeats,
            unit,
            seed,
        } => match handle_baseline(&data, op, repeats, seed)? {
            Some(stats) => print!("{}", stats.render(unit)),
            None => println!("no samples"),
        },
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(e) = dispatch(cli.command, cli.verbose) {
        tracing::error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use executor::ConfigError;
    use tempfile::tempdir;
    use workload::ParseError;

    const PROFILES: &str = r#"{
        "read_heavy": { "prob": 70, "ops": { "get": 90, "put": 10 } },
        "write_heavy": { "prob": 30, "ops": { "get": 20, "put": 80 } }
    }"#;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from([
            "txbench", "run", "--data", "d.txt", "--workload", "w.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                threads,
                retries,
                smt_ratio,
                cpus,
                no_pin,
                unit,
                format,
                ..
            } => {
                assert_eq!(threads, 1);
                assert_eq!(retries, 0);
                assert_eq!(smt_ratio, 2);
                assert_eq!(cpus, None);
                assert!(!no_pin);
                assert_eq!(unit, TimeUnit::S);
                assert_eq!(format, Format::Text);
            }
            _ => panic!("expected run"),
        }

        let cli = Cli::try_parse_from([
            "txbench", "gen", "--data", "d", "--profile", "p", "--output", "o",
        ])
        .unwrap();
        match cli.command {
            Commands::Gen {
                num_txs,
                tx_length_min,
                tx_length_max,
                split,
                ..
            } => {
                assert_eq!((num_txs, tx_length_min, tx_length_max), (1, 2, 64));
                assert_eq!(split, None);
            }
            _ => panic!("expected gen"),
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_unit = Cli::try_parse_from([
            "txbench", "run", "--data", "d", "--workload", "w", "--unit", "minutes",
        ]);
        assert!(bad_unit.is_err());

        let bad_op = Cli::try_parse_from(["txbench", "baseline", "--data", "d", "--op", "scan"]);
        assert!(bad_op.is_err());

        let bad_format = Cli::try_parse_from([
            "txbench", "run", "--data", "d", "--workload", "w", "--format", "xml",
        ]);
        assert!(bad_format.is_err());
    }

    #[test]
    fn test_generate_and_run() -> Result<(), BenchError> {
        let dir = tempdir().map_err(key_value::SampleError::from)?;
        let data = dir.path().join("data.txt");
        let profile = dir.path().join("profiles.json");
        let output = dir.path().join("out").join("workload.json");
        std::fs::write(&profile, PROFILES).map_err(ParseError::from)?;

        handle_kv_gen(8, 16, 50, &data, Some(1))?;
        let config = GeneratorConfig::default()
            .num_transactions(200)
            .length_bounds(1, 8)
            .seed(2);
        handle_gen(&data, &profile, &output, config, None)?;

        let config = ScalingConfig::default()
            .threads(4)
            .retries(2)
            .cpus(CpuLayout::default().pin(false));
        let report = handle_run(&data, &output, false, config, TimeUnit::Ms)?;

        assert_eq!(report.threads, 4);
        assert_eq!(report.totals.assigned, 200);
        assert_eq!(
            report.totals.committed + report.totals.canceled_txs,
            200
        );

        Ok(())
    }

    #[test]
    fn test_pool_run() -> Result<(), BenchError> {
        let dir = tempdir().map_err(key_value::SampleError::from)?;
        let data = dir.path().join("data.txt");
        let profile = dir.path().join("profiles.json");
        let output = dir.path().join("pool.json");
        std::fs::write(&profile, PROFILES).map_err(ParseError::from)?;

        handle_kv_gen(8, 8, 20, &data, Some(3))?;
        let config = GeneratorConfig::default().num_transactions(10).seed(4);
        handle_gen(&data, &profile, &output, config, Some(3))?;

        let config = ScalingConfig::default()
            .threads(3)
            .cpus(CpuLayout::default().pin(false));
        let report = handle_run(&data, &output, true, config, TimeUnit::S)?;
        assert_eq!(report.totals.assigned, 30);

        let config = ScalingConfig::default()
            .threads(4)
            .cpus(CpuLayout::default().pin(false));
        let too_many = handle_run(&data, &output, true, config, TimeUnit::S);
        assert!(matches!(
            too_many,
            Err(BenchError::Exec(executor::ExecError::Config(
                ConfigError::PoolTooSmall { .. }
            )))
        ));

        Ok(())
    }

    #[test]
    fn test_invalid_profile_table() -> Result<(), BenchError> {
        let dir = tempdir().map_err(key_value::SampleError::from)?;
        let data = dir.path().join("data.txt");
        let profile = dir.path().join("profiles.json");
        std::fs::write(&profile, r#"{ "p": { "prob": 50, "ops": { "get": 100 } } }"#)
            .map_err(ParseError::from)?;
        handle_kv_gen(4, 4, 5, &data, Some(5))?;

        let result = handle_gen(
            &data,
            &profile,
            &dir.path().join("w.json"),
            GeneratorConfig::default(),
            None,
        );
        assert!(matches!(result, Err(BenchError::Profile(_))));

        Ok(())
    }

    #[test]
    fn test_baseline() -> Result<(), BenchError> {
        let dir = tempdir().map_err(key_value::SampleError::from)?;
        let data = dir.path().join("data.txt");
        handle_kv_gen(4, 4, 10, &data, Some(6))?;

        let stats = handle_baseline(&data, OpCode::Get, 100, Some(7))?.unwrap();
        assert_eq!(stats.count, 100);
        assert!(stats.min <= stats.median && stats.median <= stats.max);

        assert_eq!(handle_baseline(&data, OpCode::Put, 0, None)?, None);

        Ok(())
    }

    #[test]
    fn test_zero_threads_rejected_before_loading() {
        let config = ScalingConfig::default().threads(0);
        let result = handle_run(
            Path::new("missing.txt"),
            Path::new("missing.json"),
            false,
            config,
            TimeUnit::S,
        );
        assert!(matches!(
            result,
            Err(BenchError::Config(ConfigError::ZeroThreads))
        ));
    }
}

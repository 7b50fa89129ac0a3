use executor::{
    ConfigError, CpuLayout, ExecError, Partitioning, Report, ScalingConfig, ScalingExecutor, Status,
    Store, TimeUnit,
};
use key_value::{KeyValue, SampleSet, SampleSetBuilder};
use memstore::MemStore;
use tempfile::tempdir;
use workload::{
    Command, GeneratorConfig, OpCode, ParseError, ProfileTable, Workload, generate, generate_pool,
    serializer,
};

fn unpinned(threads: usize) -> ScalingConfig {
    ScalingConfig::default()
        .threads(threads)
        .cpus(CpuLayout::default().pin(false))
}

#[test]
fn test_two_pairs_single_get() -> Result<(), Box<dyn std::error::Error>> {
    let pairs = SampleSet::new(vec![KeyValue::new("k1", "v1"), KeyValue::new("k2", "v2")]);
    let profiles = ProfileTable::from_json(
        r#"{ "p": { "prob": 100, "ops": { "get": 100 }, "length_min": 1, "length_max": 1 } }"#,
    )?;
    let config = GeneratorConfig::default()
        .num_transactions(5)
        .length_bounds(1, 1)
        .seed(99);

    let workload = generate(&pairs, &profiles, config)?;

    assert_eq!(workload.len(), 5);
    for tx in &workload {
        assert_eq!(tx.len(), 1);
        assert_eq!(tx[0].opcode, OpCode::Get);
        assert!(tx[0].index <= 1);
    }

    let store = MemStore::new();
    assert_eq!(store.populate(&pairs), Status::Ok);
    let summary = ScalingExecutor::new(&store, &pairs, unpinned(2)).run(Partitioning::Shared(&workload))?;

    assert_eq!(summary.totals.committed, 5);
    assert_eq!(summary.totals.read_snapshot_misses, 0);
    assert_eq!(summary.completed(), 5);

    Ok(())
}

#[test]
fn test_files_round_trip_then_replay() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let data = dir.path().join("data.txt");
    let workload_path = dir.path().join("workload.json");

    SampleSetBuilder::default()
        .key_size(12)
        .value_size(24)
        .pairs(300)
        .seed(5)
        .build()?
        .write(&data)?;
    let pairs = SampleSet::load(&data)?;
    assert_eq!(pairs.len(), 300);

    let profiles = ProfileTable::from_json(
        r#"{
            "a": { "prob": 50, "ops": { "get": 100 } },
            "b": { "prob": 50, "ops": { "get": 50, "put": 50 } }
        }"#,
    )?;
    profiles.validate()?;
    let config = GeneratorConfig::default()
        .num_transactions(1_000)
        .length_bounds(1, 10)
        .seed(17);
    let workload = generate(&pairs, &profiles, config)?;

    serializer::write(&workload_path, &workload)?;
    let loaded = serializer::read(&workload_path)?;
    assert_eq!(loaded, workload);

    let store = MemStore::new();
    store.populate(&pairs);
    let config = unpinned(4).retries(3);
    let summary = ScalingExecutor::new(&store, &pairs, config).run(Partitioning::Shared(&loaded))?;

    let totals = summary.totals;
    assert_eq!(totals.assigned, 1_000);
    assert_eq!(totals.committed + totals.canceled_txs, 1_000);
    assert_eq!(totals.attempts, totals.committed + totals.failures);
    assert!(totals.failures >= totals.ww_conflicts + totals.rw_conflicts + totals.invalid_txs);

    let report = Report::new(&summary, TimeUnit::Us);
    assert!(report.to_text(false).starts_with("time          = "));

    Ok(())
}

#[test]
fn test_pool_replay() -> Result<(), Box<dyn std::error::Error>> {
    let pairs = SampleSetBuilder::default().pairs(64).seed(3).build()?;
    let profiles = ProfileTable::from_json(r#"{ "w": { "prob": 100, "ops": { "put": 100 } } }"#)?;
    let config = GeneratorConfig::default()
        .num_transactions(25)
        .length_bounds(1, 4)
        .seed(8);
    let pool = generate_pool(&pairs, &profiles, config, 3)?;

    let store = MemStore::new();
    store.populate(&pairs);
    let summary = ScalingExecutor::new(&store, &pairs, unpinned(3).retries(5))
        .run(Partitioning::PreSplit(&pool))?;

    assert_eq!(summary.threads(), 3);
    for worker in &summary.workers {
        assert_eq!(worker.counters.assigned, 25);
    }

    Ok(())
}

#[test]
fn test_hot_key_contention() -> Result<(), Box<dyn std::error::Error>> {
    let pairs = SampleSet::new(vec![KeyValue::new("hot", "0")]);
    let workload: Workload = (0..400)
        .map(|_| vec![Command::new(OpCode::Get, 0), Command::new(OpCode::Put, 0)])
        .collect();

    let store = MemStore::new();
    store.populate(&pairs);
    let summary = ScalingExecutor::new(&store, &pairs, unpinned(4)).run(Partitioning::Shared(&workload))?;

    let totals = summary.totals;
    assert_eq!(totals.committed + totals.canceled_txs, 400);
    assert_eq!(totals.failures, totals.canceled_txs);

    let mut tx = store.begin();
    assert_eq!(store.read(&mut tx, b"hot").1, Status::Ok);

    Ok(())
}

#[test]
fn test_workload_indices_beyond_samples() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("w.json");
    std::fs::write(
        &path,
        r#"{ "size": 1, "txs": [ { "size": 1, "cmds": [ { "cmd": "get", "pos": 7 } ] } ] }"#,
    )?;
    let workload = serializer::read(&path)?;

    let pairs = SampleSet::new(vec![KeyValue::new("only", "one")]);
    let store = MemStore::new();
    let result = ScalingExecutor::new(&store, &pairs, unpinned(1)).run(Partitioning::Shared(&workload));

    assert!(matches!(
        result,
        Err(ExecError::Config(ConfigError::DataIndexOutOfRange { index: 7, .. }))
    ));

    std::fs::write(
        &path,
        r#"{ "size": 1, "txs": [ { "size": 1, "cmds": [ { "cmd": "del", "pos": 0 } ] } ] }"#,
    )?;
    assert!(matches!(
        serializer::read(&path),
        Err(ParseError::UnexpectedOpcode(_))
    ));

    Ok(())
}

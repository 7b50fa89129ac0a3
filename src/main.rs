use executor::{CpuLayout, Partitioning, Report, ScalingConfig, ScalingExecutor, Status, TimeUnit};
use key_value::SampleSetBuilder;
use log::error;
use memstore::MemStore;
use workload::{GeneratorConfig, ProfileTable, generate};

const PROFILES: &str = r#"{
    "read_heavy": { "prob": 70, "ops": { "get": 90, "put": 10 } },
    "write_heavy": { "prob": 30, "ops": { "get": 20, "put": 80 } }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let pairs = SampleSetBuilder::default().pairs(1_000).seed(42).build()?;
    let profiles = ProfileTable::from_json(PROFILES)?;
    profiles.validate()?;

    let config = GeneratorConfig::default()
        .num_transactions(10_000)
        .length_bounds(2, 16)
        .seed(42);
    let workload = generate(&pairs, &profiles, config)?;

    let store = MemStore::new();
    if store.populate(&pairs) != Status::Ok {
        error!("could not load sample data into the store");
        return Err("populate failed".into());
    }

    let config = ScalingConfig::default()
        .threads(4)
        .retries(2)
        .cpus(CpuLayout::default().pin(false));
    let summary = ScalingExecutor::new(&store, &pairs, config).run(Partitioning::Shared(&workload))?;

    print!("{}", Report::new(&summary, TimeUnit::Ms).to_text(true));
    Ok(())
}

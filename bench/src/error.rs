use executor::{ConfigError, ExecError, Status};
use key_value::SampleError;
use thiserror::Error;
use workload::{GenerateError, ParseError, ProfileError};

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Sample data error: {0}")]
    Sample(#[from] SampleError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("loading sample data into the store failed with {0}")]
    Populate(Status),
}

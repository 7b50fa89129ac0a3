use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    FileSystemError(#[from] std::io::Error),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile '{profile}' lacks the '{field}' field")]
    MissingField {
        profile: String,
        field: &'static str,
    },

    #[error("profile '{profile}' contains no recognized operation (get, put)")]
    NoOperations { profile: String },

    #[error("unexpected opcode '{0}'")]
    UnexpectedOpcode(String),

    #[error("{what} declares size {declared} but holds {actual} entries")]
    SizeMismatch {
        what: String,
        declared: usize,
        actual: usize,
    },
}

/// Reasons a profile table cannot be used for selection as-is.
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("no transaction profiles")]
    Empty,

    #[error("profile '{profile}' has a negative weight")]
    NegativeWeight { profile: String },

    #[error("profile weights sum to {total}, draws up to {range} would find no profile")]
    WeightsBelowRange { total: f64, range: u32 },

    #[error("operation weights of profile '{profile}' sum to {total}, draws up to {range} would find no operation")]
    OperationWeightsBelowRange {
        profile: String,
        total: f64,
        range: u32,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum GenerateError {
    #[error("no tx profile for draw {draw}")]
    NoMatchingProfile { draw: u32 },

    #[error("no tx opcode in profile '{profile}' for draw {draw}")]
    NoMatchingOperation { profile: String, draw: u32 },

    #[error("cannot draw sample indices from an empty sample set")]
    EmptySampleSet,

    #[error("invalid transaction length bounds [{min}, {max}]")]
    InvalidLengthBounds { min: usize, max: usize },
}

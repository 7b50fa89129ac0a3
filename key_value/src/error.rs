use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("IO error: {0}")]
    FileSystemError(#[from] std::io::Error),

    #[error("missing delimiter (;) in line {line}")]
    MissingDelimiter { line: usize },

    #[error("key of pair {index} contains the delimiter (;)")]
    DelimiterInKey { index: usize },

    #[error("Invalid key size: {0}. Keys must not be empty")]
    InvalidKeySize(usize),
}

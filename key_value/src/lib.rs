pub mod error;
pub mod generate;
pub mod sample_set;

pub use error::SampleError;
pub use generate::SampleSetBuilder;
pub use sample_set::SampleSet;

/// A single sample pair. Keys and values are raw bytes; nothing downstream
/// interprets them.
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyValue {
    pub key: Box<[u8]>,
    pub value: Box<[u8]>,
}

impl KeyValue {
    pub fn new(key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().into(),
            value: value.as_ref().into(),
        }
    }
}

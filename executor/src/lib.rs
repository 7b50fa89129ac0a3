//! Replays generated workloads against a transactional store on pinned
//! worker threads and reduces what the workers observed.

pub mod baseline;
pub mod cpu;
pub mod error;
pub mod partition;
pub mod replay;
pub mod report;
pub mod scaling;
pub mod stats;
pub mod store;
pub mod time_unit;

pub use baseline::LatencyStats;
pub use cpu::CpuLayout;
pub use error::{ConfigError, ExecError};
pub use partition::{Partitioning, partition};
pub use report::Report;
pub use scaling::{ScalingConfig, ScalingExecutor};
pub use stats::{Counters, Summary, ThreadResult};
pub use store::{Status, Store};
pub use time_unit::TimeUnit;

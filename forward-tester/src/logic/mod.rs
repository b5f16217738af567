pub mod aggregate;
pub mod batch;
pub mod reports;
pub mod stats;

pub use aggregate::aggregate;
pub use batch::{DEFAULT_RUNS, run_batch_parallel};

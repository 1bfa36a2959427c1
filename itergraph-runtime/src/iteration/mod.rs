pub mod aggregators;
pub mod driver;
pub mod gsa;
pub mod scatter_gather;

pub use driver::{IterationStats, Termination};

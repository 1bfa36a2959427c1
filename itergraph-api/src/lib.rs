pub mod aggregator;
pub mod function;
pub mod graph;
pub mod iteration;

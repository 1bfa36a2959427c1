pub mod algorithms;
pub mod graph;
pub mod io;
pub mod iteration;
pub mod observability;
pub mod shuffle;

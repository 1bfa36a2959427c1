pub mod gsa_pagerank;
pub mod pagerank;

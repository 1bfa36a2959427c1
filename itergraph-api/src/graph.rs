use crate::function::{GatherSumApplyAlgorithm, MapFunction, ScatterGatherAlgorithm};
use itergraph_common::error::IterGraphResult;
pub use itergraph_common::types::{Edge, Vertex};

/// An algorithm packaged on top of one of the computation models, e.g.
/// PageRank over scatter-gather.
pub trait GraphAlgorithm<K, VV, EV, G> {
    fn run(&self, graph: G) -> IterGraphResult<G>;
}

/// Represents a partitioned graph snapshot
pub trait PGraph<K, VV, EV>: Sized {
    /// Vertex-centric iteration: messages produced from the previous snapshot
    /// are delivered and folded into new values once per superstep.
    fn run_scatter_gather<M, A>(self, algorithm: &A) -> IterGraphResult<Self>
    where
        A: ScatterGatherAlgorithm<K, VV, EV, M>,
        M: Send + Sync + 'static + Clone;

    /// Gather-sum-apply iteration over in-edges.
    fn run_gather_sum_apply<P, A>(self, algorithm: &A) -> IterGraphResult<Self>
    where
        A: GatherSumApplyAlgorithm<K, VV, EV, P>,
        P: Send + Sync + 'static;

    fn run<A>(self, algorithm: &A) -> IterGraphResult<Self>
    where
        A: GraphAlgorithm<K, VV, EV, Self>,
    {
        algorithm.run(self)
    }

    /// Replaces every edge value with `f((edge value, values[source]))`.
    /// Edges whose source has no entry in `values` are left untouched.
    fn join_with_edges_on_source<T, F>(self, values: Vec<(K, T)>, f: F) -> Self
    where
        T: Clone + Send + Sync + 'static,
        F: MapFunction<(EV, T), EV>;

    fn transform_vertices<F>(self, f: F) -> Self
    where
        F: MapFunction<(K, VV), VV>;

    fn out_degrees(&self) -> Vec<(K, u64)>;

    fn in_degrees(&self) -> Vec<(K, u64)>;

    fn number_of_vertices(&self) -> u64;

    fn number_of_edges(&self) -> u64;

    /// Get the vertices as a collection (order unspecified)
    fn vertices(&self) -> Vec<Vertex<K, VV>>;

    /// Get the edges as a collection
    fn edges(&self) -> Vec<Edge<K, EV>>;
}

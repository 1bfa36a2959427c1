use crate::iteration::IterationConfig;
use itergraph_common::error::IterGraphResult;
use itergraph_common::types::Edge;
use std::iter::Iterator;

pub trait Function: Send + Sync + 'static {}

impl<F> Function for F where F: Send + Sync + 'static {}

pub trait MapFunction<T, R>: Function {
    fn map(&self, value: T) -> R;
}

impl<T, R, F> MapFunction<T, R> for F
where
    F: Fn(T) -> R + Send + Sync + 'static,
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    fn map(&self, value: T) -> R {
        (self)(value)
    }
}

/// State every per-vertex function can see during a superstep.
pub trait SuperstepContext {
    /// 1-based number of the running superstep.
    fn iteration(&self) -> u64;

    fn number_of_vertices(&self) -> u64;

    /// Folds `value` into this superstep's partial of the named aggregator.
    fn aggregate(&mut self, name: &str, value: f64) -> IterGraphResult<()>;

    /// Frozen value of the named aggregator from the previous superstep.
    fn previous_aggregate(&self, name: &str) -> Option<f64>;
}

/// Context for the update phase of a scatter-gather superstep
pub trait VertexUpdateContext<VV>: SuperstepContext {
    fn set_new_vertex_value(&mut self, value: VV);
}

/// Context for the messaging phase of a scatter-gather superstep
pub trait MessagingContext<K, EV, M>: SuperstepContext {
    fn edges(&self) -> Box<dyn Iterator<Item = &Edge<K, EV>> + '_>;
    fn send_message(&mut self, target_id: K, message: M);
    fn send_message_to_all_neighbors(&mut self, message: M);
}

pub trait ApplyContext<VV>: SuperstepContext {
    fn set_result(&mut self, value: VV);
}

/// Folds the messages a vertex received into its new value. Vertices that do
/// not call `set_new_vertex_value` keep their previous value. Called for
/// every vertex in every superstep, with an empty iterator when nothing
/// arrived; message order is unspecified.
pub trait VertexUpdateFunction<K, VV, M>: Function {
    fn pre_superstep(&mut self, _iteration: u64) {}

    fn update_vertex(
        &mut self,
        vertex_id: &K,
        vertex_value: &VV,
        messages: &mut dyn Iterator<Item = M>,
        context: &mut dyn VertexUpdateContext<VV>,
    ) -> IterGraphResult<()>;

    fn post_superstep(&mut self, _iteration: u64) {}
}

/// Emits messages along the out-edges of a vertex, based on its value from
/// the previous snapshot.
pub trait MessagingFunction<K, VV, EV, M>: Function {
    fn pre_superstep(&mut self, _iteration: u64) {}

    fn send_messages(
        &mut self,
        vertex_id: &K,
        vertex_value: &VV,
        context: &mut dyn MessagingContext<K, EV, M>,
    ) -> IterGraphResult<()>;

    fn post_superstep(&mut self, _iteration: u64) {}
}

pub trait ScatterGatherAlgorithm<K, VV, EV, M>: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn iterations(&self) -> u64;

    fn configure(&self, _config: &mut IterationConfig) {}

    fn create_update_function(&self) -> Box<dyn VertexUpdateFunction<K, VV, M>>;
    fn create_messaging_function(&self) -> Box<dyn MessagingFunction<K, VV, EV, M>>;
}

/// The source side of an in-edge, as seen by a gather function.
#[derive(Debug)]
pub struct Neighbor<'a, VV, EV> {
    pub value: &'a VV,
    pub edge_value: &'a EV,
}

pub trait GatherFunction<VV, EV, P>: Function {
    fn gather(
        &mut self,
        neighbor: Neighbor<'_, VV, EV>,
        context: &mut dyn SuperstepContext,
    ) -> IterGraphResult<P>;
}

/// Must be associative and commutative: partials are combined per partition
/// first and across partitions afterwards, in no fixed order.
pub trait SumFunction<P>: Function {
    fn sum(&self, left: P, right: P) -> P;
}

impl<P, F> SumFunction<P> for F
where
    F: Fn(P, P) -> P + Send + Sync + 'static,
{
    fn sum(&self, left: P, right: P) -> P {
        (self)(left, right)
    }
}

/// `sum` is `None` for vertices without in-edges.
pub trait ApplyFunction<K, VV, P>: Function {
    fn apply(
        &mut self,
        vertex_id: &K,
        current: &VV,
        sum: Option<P>,
        context: &mut dyn ApplyContext<VV>,
    ) -> IterGraphResult<()>;
}

pub trait GatherSumApplyAlgorithm<K, VV, EV, P>: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn iterations(&self) -> u64;

    fn configure(&self, _config: &mut IterationConfig) {}

    fn create_gather_function(&self) -> Box<dyn GatherFunction<VV, EV, P>>;
    fn create_sum_function(&self) -> Box<dyn SumFunction<P>>;
    fn create_apply_function(&self) -> Box<dyn ApplyFunction<K, VV, P>>;
}

use crate::graph::partitioned_graph::PartitionedGraph;
use crate::iteration::IterationStats;
use itergraph_api::aggregator::SumAggregator;
use itergraph_api::function::{
    MessagingContext, MessagingFunction, ScatterGatherAlgorithm, VertexUpdateContext,
    VertexUpdateFunction,
};
use itergraph_api::graph::{GraphAlgorithm, PGraph};
use itergraph_api::iteration::{ConvergenceCriterion, IterationConfig};
use itergraph_common::error::{IterGraphError, IterGraphResult};
use std::hash::Hash;

/// Sum of `|new rank - old rank|` over all vertices of a superstep.
pub const RANK_DELTA_AGGREGATOR: &str = "rank-delta";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankParams {
    pub damping: f64,
    pub iterations: u64,
    /// Start every vertex at `1 / |V|` and restart with `(1 - d) / |V|`, so
    /// ranks form a distribution instead of summing to roughly `|V|`.
    pub normalized: bool,
    pub threshold: Option<f64>,
}

impl PageRankParams {
    pub fn new(damping: f64, iterations: u64) -> IterGraphResult<Self> {
        if !(damping > 0.0 && damping < 1.0) {
            return Err(IterGraphError::InvalidArgument(format!(
                "damping factor must lie in (0, 1), got {damping}"
            )));
        }
        Ok(Self {
            damping,
            iterations,
            normalized: false,
            threshold: None,
        })
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    pub fn with_convergence(mut self, threshold: f64) -> IterGraphResult<Self> {
        ConvergenceCriterion::new(RANK_DELTA_AGGREGATOR, threshold)?;
        self.threshold = Some(threshold);
        Ok(self)
    }

    /// Rank a vertex contributes from in superstep `iteration`. Normalised
    /// runs start every vertex at `1 / |V|` regardless of its stored value.
    pub(crate) fn effective_rank(
        &self,
        iteration: u64,
        number_of_vertices: u64,
        value: f64,
    ) -> f64 {
        if self.normalized && iteration == 1 {
            1.0 / number_of_vertices as f64
        } else {
            value
        }
    }

    pub(crate) fn configure(&self, config: &mut IterationConfig) {
        if let Some(threshold) = self.threshold {
            config.register_aggregator(RANK_DELTA_AGGREGATOR, SumAggregator);
            config.set_convergence(ConvergenceCriterion {
                aggregator: RANK_DELTA_AGGREGATOR.to_string(),
                threshold,
            });
        }
    }

    pub(crate) fn rank(&self, number_of_vertices: u64, rank_sum: f64) -> f64 {
        let teleport = if self.normalized {
            (1.0 - self.damping) / number_of_vertices as f64
        } else {
            1.0 - self.damping
        };
        teleport + self.damping * rank_sum
    }
}

/// PageRank over the scatter-gather model. Edge values must already hold the
/// transition weight `1 / out_degree(source)`.
#[derive(Debug, Clone)]
pub struct PageRank {
    params: PageRankParams,
}

impl PageRank {
    pub fn new(damping: f64, iterations: u64) -> IterGraphResult<Self> {
        Ok(Self::from_params(PageRankParams::new(damping, iterations)?))
    }

    pub fn from_params(params: PageRankParams) -> Self {
        Self { params }
    }

    pub fn normalized(self) -> Self {
        Self::from_params(self.params.normalized())
    }

    pub fn with_convergence(self, threshold: f64) -> IterGraphResult<Self> {
        Ok(Self::from_params(self.params.with_convergence(threshold)?))
    }

    pub fn params(&self) -> &PageRankParams {
        &self.params
    }

    pub fn run_with_stats<K>(
        &self,
        graph: PartitionedGraph<K, f64, f64>,
    ) -> IterGraphResult<(PartitionedGraph<K, f64, f64>, IterationStats)>
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
    {
        graph.run_scatter_gather_with_stats::<f64, _>(&PageRankAlgorithm::new(self.params))
    }
}

impl<K, G> GraphAlgorithm<K, f64, f64, G> for PageRank
where
    K: Clone + Send + Sync + 'static,
    G: PGraph<K, f64, f64>,
{
    fn run(&self, graph: G) -> IterGraphResult<G> {
        graph.run_scatter_gather::<f64, _>(&PageRankAlgorithm::new(self.params))
    }
}

#[derive(Debug, Clone)]
pub struct PageRankAlgorithm {
    params: PageRankParams,
}

impl PageRankAlgorithm {
    pub fn new(params: PageRankParams) -> Self {
        Self { params }
    }
}

impl<K> ScatterGatherAlgorithm<K, f64, f64, f64> for PageRankAlgorithm
where
    K: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "pagerank"
    }

    fn iterations(&self) -> u64 {
        self.params.iterations
    }

    fn configure(&self, config: &mut IterationConfig) {
        self.params.configure(config);
    }

    fn create_update_function(&self) -> Box<dyn VertexUpdateFunction<K, f64, f64>> {
        Box::new(RankUpdater {
            params: self.params,
        })
    }

    fn create_messaging_function(&self) -> Box<dyn MessagingFunction<K, f64, f64, f64>> {
        Box::new(RankMessenger {
            params: self.params,
        })
    }
}

struct RankUpdater {
    params: PageRankParams,
}

impl<K> VertexUpdateFunction<K, f64, f64> for RankUpdater {
    fn update_vertex(
        &mut self,
        _vertex_id: &K,
        vertex_value: &f64,
        messages: &mut dyn Iterator<Item = f64>,
        context: &mut dyn VertexUpdateContext<f64>,
    ) -> IterGraphResult<()> {
        let mut sum = 0.0;
        for m in messages {
            sum += m;
        }
        let n = context.number_of_vertices();
        let pr = self.params.rank(n, sum);
        if self.params.threshold.is_some() {
            let old = self.params.effective_rank(context.iteration(), n, *vertex_value);
            context.aggregate(RANK_DELTA_AGGREGATOR, (pr - old).abs())?;
        }
        context.set_new_vertex_value(pr);
        Ok(())
    }
}

struct RankMessenger {
    params: PageRankParams,
}

impl<K: Clone> MessagingFunction<K, f64, f64, f64> for RankMessenger {
    fn send_messages(
        &mut self,
        _vertex_id: &K,
        vertex_value: &f64,
        context: &mut dyn MessagingContext<K, f64, f64>,
    ) -> IterGraphResult<()> {
        let rank = self.params.effective_rank(
            context.iteration(),
            context.number_of_vertices(),
            *vertex_value,
        );
        let outgoing: Vec<(K, f64)> = context
            .edges()
            .map(|e| (e.target_id.clone(), rank * e.value))
            .collect();
        for (target, msg) in outgoing {
            context.send_message(target, msg);
        }
        Ok(())
    }
}

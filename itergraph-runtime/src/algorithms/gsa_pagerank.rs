use crate::algorithms::pagerank::{PageRankParams, RANK_DELTA_AGGREGATOR};
use crate::graph::partitioned_graph::PartitionedGraph;
use crate::iteration::IterationStats;
use itergraph_api::function::{
    ApplyContext, ApplyFunction, GatherFunction, GatherSumApplyAlgorithm, Neighbor, SumFunction,
    SuperstepContext,
};
use itergraph_api::graph::{GraphAlgorithm, PGraph};
use itergraph_api::iteration::IterationConfig;
use itergraph_common::error::IterGraphResult;
use std::hash::Hash;

/// PageRank over gather-sum-apply; computes the same recurrence as
/// [`crate::algorithms::pagerank::PageRank`].
#[derive(Debug, Clone)]
pub struct GsaPageRank {
    params: PageRankParams,
}

impl GsaPageRank {
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
        graph.run_gather_sum_apply_with_stats::<f64, _>(&GsaPageRankAlgorithm::new(self.params))
    }
}

impl<K, G> GraphAlgorithm<K, f64, f64, G> for GsaPageRank
where
    K: Send + Sync + 'static,
    G: PGraph<K, f64, f64>,
{
    fn run(&self, graph: G) -> IterGraphResult<G> {
        graph.run_gather_sum_apply::<f64, _>(&GsaPageRankAlgorithm::new(self.params))
    }
}

#[derive(Debug, Clone)]
pub struct GsaPageRankAlgorithm {
    params: PageRankParams,
}

impl GsaPageRankAlgorithm {
    pub fn new(params: PageRankParams) -> Self {
        Self { params }
    }
}

impl<K> GatherSumApplyAlgorithm<K, f64, f64, f64> for GsaPageRankAlgorithm
where
    K: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "gsa-pagerank"
    }

    fn iterations(&self) -> u64 {
        self.params.iterations
    }

    fn configure(&self, config: &mut IterationConfig) {
        self.params.configure(config);
    }

    fn create_gather_function(&self) -> Box<dyn GatherFunction<f64, f64, f64>> {
        Box::new(GatherRanks {
            params: self.params,
        })
    }

    fn create_sum_function(&self) -> Box<dyn SumFunction<f64>> {
        Box::new(|left: f64, right: f64| left + right)
    }

    fn create_apply_function(&self) -> Box<dyn ApplyFunction<K, f64, f64>> {
        Box::new(UpdateRanks {
            params: self.params,
        })
    }
}

struct GatherRanks {
    params: PageRankParams,
}

impl GatherFunction<f64, f64, f64> for GatherRanks {
    fn gather(
        &mut self,
        neighbor: Neighbor<'_, f64, f64>,
        context: &mut dyn SuperstepContext,
    ) -> IterGraphResult<f64> {
        let rank = self.params.effective_rank(
            context.iteration(),
            context.number_of_vertices(),
            *neighbor.value,
        );
        Ok(rank * neighbor.edge_value)
    }
}

struct UpdateRanks {
    params: PageRankParams,
}

impl<K> ApplyFunction<K, f64, f64> for UpdateRanks {
    fn apply(
        &mut self,
        _vertex_id: &K,
        current: &f64,
        sum: Option<f64>,
        context: &mut dyn ApplyContext<f64>,
    ) -> IterGraphResult<()> {
        let n = context.number_of_vertices();
        let pr = self.params.rank(n, sum.unwrap_or(0.0));
        if self.params.threshold.is_some() {
            let old = self.params.effective_rank(context.iteration(), n, *current);
            context.aggregate(RANK_DELTA_AGGREGATOR, (pr - old).abs())?;
        }
        context.set_result(pr);
        Ok(())
    }
}

use crate::graph::partitioned_graph::GraphPartition;
use crate::iteration::aggregators::PartialAggregates;
use crate::iteration::driver::{RoundState, StepReport, SuperstepScope, SuperstepStep};
use crate::shuffle::{combine_into, route_combined};
use itergraph_api::function::{
    ApplyContext, ApplyFunction, GatherFunction, GatherSumApplyAlgorithm, Neighbor, SumFunction,
    SuperstepContext,
};
use itergraph_common::error::IterGraphResult;
use rayon::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;

struct WorkerApplyContext<'a, VV> {
    scope: SuperstepScope<'a>,
    result: Option<VV>,
}

impl<VV> SuperstepContext for WorkerApplyContext<'_, VV> {
    fn iteration(&self) -> u64 {
        self.scope.iteration()
    }

    fn number_of_vertices(&self) -> u64 {
        self.scope.number_of_vertices()
    }

    fn aggregate(&mut self, name: &str, value: f64) -> IterGraphResult<()> {
        self.scope.aggregate(name, value)
    }

    fn previous_aggregate(&self, name: &str) -> Option<f64> {
        self.scope.previous_aggregate(name)
    }
}

impl<VV> ApplyContext<VV> for WorkerApplyContext<'_, VV> {
    fn set_result(&mut self, value: VV) {
        self.result = Some(value);
    }
}

struct GsaWorker<K, VV, EV, P> {
    gather: Box<dyn GatherFunction<VV, EV, P>>,
    sum: Box<dyn SumFunction<P>>,
    apply: Box<dyn ApplyFunction<K, VV, P>>,
}

/// Gather over every edge from the source's snapshot value, pre-combine the
/// partials inside the producing partition, combine again on the partition
/// owning the target, then apply once per vertex. Apply only starts after
/// every gather of the round has finished.
pub(crate) struct GatherSumApplyStep<K, VV, EV, P> {
    workers: Vec<GsaWorker<K, VV, EV, P>>,
    merge: Box<dyn SumFunction<P>>,
}

impl<K, VV, EV, P> GatherSumApplyStep<K, VV, EV, P> {
    pub(crate) fn new<A>(algorithm: &A, partitions: usize) -> Self
    where
        A: GatherSumApplyAlgorithm<K, VV, EV, P>,
    {
        let workers = (0..partitions)
            .map(|_| GsaWorker {
                gather: algorithm.create_gather_function(),
                sum: algorithm.create_sum_function(),
                apply: algorithm.create_apply_function(),
            })
            .collect();
        Self {
            workers,
            merge: algorithm.create_sum_function(),
        }
    }
}

impl<K, VV, EV, P> SuperstepStep<K, VV, EV> for GatherSumApplyStep<K, VV, EV, P>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    VV: Send + Sync + 'static,
    EV: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn superstep(
        &mut self,
        round: &RoundState,
        partitions: &mut [GraphPartition<K, VV, EV>],
        partials: &mut [PartialAggregates],
    ) -> IterGraphResult<StepReport> {
        let gathered: Vec<(HashMap<K, P>, u64)> = partitions
            .par_iter()
            .zip(self.workers.par_iter_mut())
            .zip(partials.par_iter_mut())
            .map(|((part, w), partial)| {
                let mut local: HashMap<K, P> = HashMap::new();
                let mut contributions = 0u64;
                let mut scope = SuperstepScope { round, partial };
                for (vertex_id, value) in &part.vertices {
                    for e in part.out_edges(vertex_id) {
                        let neighbor = Neighbor {
                            value,
                            edge_value: &e.value,
                        };
                        let p = w.gather.gather(neighbor, &mut scope)?;
                        combine_into(&mut local, e.target_id.clone(), p, &*w.sum);
                        contributions += 1;
                    }
                }
                Ok((local, contributions))
            })
            .collect::<IterGraphResult<Vec<_>>>()?;

        let mut sums: Vec<HashMap<K, P>> =
            (0..partitions.len()).map(|_| HashMap::new()).collect();
        let mut messages = 0u64;
        for (local, contributions) in gathered {
            route_combined(local, &*self.merge, &mut sums);
            messages += contributions;
        }

        let reports = partitions
            .par_iter_mut()
            .zip(self.workers.par_iter_mut())
            .zip(partials.par_iter_mut())
            .zip(sums.par_iter_mut())
            .map(|(((part, w), partial), inbox)| {
                let mut updated = 0u64;
                for (vertex_id, value) in part.vertices.iter_mut() {
                    let sum = inbox.remove(vertex_id);
                    let mut ctx = WorkerApplyContext {
                        scope: SuperstepScope {
                            round,
                            partial: &mut *partial,
                        },
                        result: None,
                    };
                    w.apply.apply(vertex_id, value, sum, &mut ctx)?;
                    if let Some(new_v) = ctx.result {
                        *value = new_v;
                        updated += 1;
                    }
                }
                Ok(StepReport {
                    updated_vertices: updated,
                    messages: 0,
                    dropped_messages: inbox.len() as u64,
                })
            })
            .collect::<IterGraphResult<Vec<StepReport>>>()?;

        let report = reports
            .into_iter()
            .fold(StepReport::default(), StepReport::merge);
        Ok(StepReport { messages, ..report })
    }
}

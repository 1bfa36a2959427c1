use crate::graph::partitioned_graph::GraphPartition;
use crate::iteration::aggregators::PartialAggregates;
use crate::iteration::driver::{RoundState, StepReport, SuperstepScope, SuperstepStep};
use crate::shuffle::{new_inboxes, DriverShuffle, Inbox, MessageShuffle, Outbox};
use itergraph_api::function::{
    MessagingContext, MessagingFunction, ScatterGatherAlgorithm, SuperstepContext,
    VertexUpdateContext, VertexUpdateFunction,
};
use itergraph_common::error::IterGraphResult;
use itergraph_common::types::Edge;
use rayon::prelude::*;
use std::hash::Hash;

struct WorkerMessagingContext<'a, K, EV, M> {
    scope: SuperstepScope<'a>,
    edges: &'a [Edge<K, EV>],
    outbox: &'a mut Outbox<K, M>,
}

impl<K, EV, M> SuperstepContext for WorkerMessagingContext<'_, K, EV, M> {
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

impl<K, EV, M> MessagingContext<K, EV, M> for WorkerMessagingContext<'_, K, EV, M>
where
    K: Clone,
    M: Clone,
{
    fn edges(&self) -> Box<dyn Iterator<Item = &Edge<K, EV>> + '_> {
        Box::new(self.edges.iter())
    }

    fn send_message(&mut self, target_id: K, message: M) {
        self.outbox.push((target_id, message));
    }

    fn send_message_to_all_neighbors(&mut self, message: M) {
        for e in self.edges {
            self.outbox.push((e.target_id.clone(), message.clone()));
        }
    }
}

struct WorkerUpdateContext<'a, VV> {
    scope: SuperstepScope<'a>,
    new_value: Option<VV>,
}

impl<VV> SuperstepContext for WorkerUpdateContext<'_, VV> {
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

impl<VV> VertexUpdateContext<VV> for WorkerUpdateContext<'_, VV> {
    fn set_new_vertex_value(&mut self, value: VV) {
        self.new_value = Some(value);
    }
}

struct LocalWorker<K, VV, EV, M> {
    update: Box<dyn VertexUpdateFunction<K, VV, M>>,
    messaging: Box<dyn MessagingFunction<K, VV, EV, M>>,
    outbox: Outbox<K, M>,
}

/// Superstep `t`: every vertex scatters along its out-edges from its
/// snapshot `t - 1` value, messages are shuffled to the owning partitions,
/// then every vertex folds its inbox into its snapshot `t` value.
pub(crate) struct ScatterGatherStep<K, VV, EV, M> {
    workers: Vec<LocalWorker<K, VV, EV, M>>,
    shuffle: DriverShuffle,
}

impl<K, VV, EV, M> ScatterGatherStep<K, VV, EV, M> {
    pub(crate) fn new<A>(algorithm: &A, partitions: usize) -> Self
    where
        A: ScatterGatherAlgorithm<K, VV, EV, M>,
    {
        let workers = (0..partitions)
            .map(|_| LocalWorker {
                update: algorithm.create_update_function(),
                messaging: algorithm.create_messaging_function(),
                outbox: Vec::new(),
            })
            .collect();
        Self {
            workers,
            shuffle: DriverShuffle,
        }
    }
}

impl<K, VV, EV, M> SuperstepStep<K, VV, EV> for ScatterGatherStep<K, VV, EV, M>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    VV: Send + Sync + 'static,
    EV: Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    fn superstep(
        &mut self,
        round: &RoundState,
        partitions: &mut [GraphPartition<K, VV, EV>],
        partials: &mut [PartialAggregates],
    ) -> IterGraphResult<StepReport> {
        let iteration = round.iteration;

        let sent: Vec<u64> = partitions
            .par_iter()
            .zip(self.workers.par_iter_mut())
            .zip(partials.par_iter_mut())
            .map(|((part, w), partial)| {
                w.outbox.clear();
                w.messaging.pre_superstep(iteration);
                for (vertex_id, value) in &part.vertices {
                    let mut ctx = WorkerMessagingContext {
                        scope: SuperstepScope {
                            round,
                            partial: &mut *partial,
                        },
                        edges: part.out_edges(vertex_id),
                        outbox: &mut w.outbox,
                    };
                    w.messaging.send_messages(vertex_id, value, &mut ctx)?;
                }
                w.messaging.post_superstep(iteration);
                Ok(w.outbox.len() as u64)
            })
            .collect::<IterGraphResult<Vec<u64>>>()?;

        let mut inboxes: Vec<Inbox<K, M>> = new_inboxes(partitions.len());
        for w in &mut self.workers {
            self.shuffle
                .route_outbox(std::mem::take(&mut w.outbox), &mut inboxes);
        }

        let reports = partitions
            .par_iter_mut()
            .zip(self.workers.par_iter_mut())
            .zip(partials.par_iter_mut())
            .zip(inboxes.par_iter_mut())
            .map(|(((part, w), partial), inbox)| {
                w.update.pre_superstep(iteration);
                let mut updated = 0u64;
                for (vertex_id, value) in part.vertices.iter_mut() {
                    let msgs = inbox.remove(vertex_id).unwrap_or_default();
                    let mut msg_iter = msgs.into_iter();
                    let mut ctx = WorkerUpdateContext {
                        scope: SuperstepScope {
                            round,
                            partial: &mut *partial,
                        },
                        new_value: None,
                    };
                    w.update
                        .update_vertex(vertex_id, value, &mut msg_iter, &mut ctx)?;
                    if let Some(new_v) = ctx.new_value {
                        *value = new_v;
                        updated += 1;
                    }
                }
                w.update.post_superstep(iteration);
                Ok(StepReport {
                    updated_vertices: updated,
                    messages: 0,
                    dropped_messages: inbox.values().map(|m| m.len() as u64).sum(),
                })
            })
            .collect::<IterGraphResult<Vec<StepReport>>>()?;

        let report = reports
            .into_iter()
            .fold(StepReport::default(), StepReport::merge);
        Ok(StepReport {
            messages: sent.iter().sum(),
            ..report
        })
    }
}

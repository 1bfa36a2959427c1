use crate::graph::partitioned_graph::GraphPartition;
use crate::iteration::aggregators::{AggregatorRegistry, PartialAggregates};
use itergraph_api::function::SuperstepContext;
use itergraph_api::iteration::IterationConfig;
use itergraph_common::error::{IterGraphError, IterGraphResult};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    MaxIterations,
    Converged,
    /// No vertex changed and nothing was sent in the last superstep.
    Quiescent,
}

#[derive(Debug, Clone, Serialize)]
pub struct IterationStats {
    pub executed_iterations: u64,
    pub termination: Termination,
    pub aggregates: HashMap<String, f64>,
}

/// Read-only view of the running superstep shared by all partitions.
pub(crate) struct RoundState {
    pub(crate) iteration: u64,
    pub(crate) number_of_vertices: u64,
    pub(crate) previous: HashMap<String, f64>,
}

/// Per-partition handle on the running superstep.
pub(crate) struct SuperstepScope<'a> {
    pub(crate) round: &'a RoundState,
    pub(crate) partial: &'a mut PartialAggregates,
}

impl SuperstepContext for SuperstepScope<'_> {
    fn iteration(&self) -> u64 {
        self.round.iteration
    }

    fn number_of_vertices(&self) -> u64 {
        self.round.number_of_vertices
    }

    fn aggregate(&mut self, name: &str, value: f64) -> IterGraphResult<()> {
        self.partial.aggregate(name, value)
    }

    fn previous_aggregate(&self, name: &str) -> Option<f64> {
        self.round.previous.get(name).copied()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StepReport {
    pub(crate) updated_vertices: u64,
    pub(crate) messages: u64,
    pub(crate) dropped_messages: u64,
}

impl StepReport {
    pub(crate) fn merge(self, other: StepReport) -> StepReport {
        StepReport {
            updated_vertices: self.updated_vertices + other.updated_vertices,
            messages: self.messages + other.messages,
            dropped_messages: self.dropped_messages + other.dropped_messages,
        }
    }

    fn is_quiescent(&self) -> bool {
        self.updated_vertices == 0 && self.messages == 0
    }
}

/// One superstep of a computation model. Implementations must not let a
/// vertex observe another vertex's value from the round in progress.
pub(crate) trait SuperstepStep<K, VV, EV> {
    fn superstep(
        &mut self,
        round: &RoundState,
        partitions: &mut [GraphPartition<K, VV, EV>],
        partials: &mut [PartialAggregates],
    ) -> IterGraphResult<StepReport>;
}

/// Every abort reports the superstep it happened in.
fn in_superstep(iteration: u64, error: IterGraphError) -> IterGraphError {
    match error {
        IterGraphError::Compute { .. } => error,
        other => IterGraphError::compute(iteration, other.to_string()),
    }
}

#[derive(Debug, Clone)]
enum State {
    Init,
    Running { iteration: u64 },
    Finished { executed: u64, termination: Termination },
}

/// Bulk-synchronous loop: every partition completes superstep `t` before any
/// partition starts `t + 1`. A failing superstep aborts the run.
pub(crate) fn run_iteration<K, VV, EV, S>(
    partitions: &mut [GraphPartition<K, VV, EV>],
    config: &IterationConfig,
    step: &mut S,
) -> IterGraphResult<IterationStats>
where
    S: SuperstepStep<K, VV, EV>,
{
    config.validate()?;
    let max_iterations = config.max_iterations();
    let number_of_vertices: u64 = partitions.iter().map(|p| p.vertices.len() as u64).sum();
    let mut registry = AggregatorRegistry::new(config);
    let mut state = State::Init;

    loop {
        state = match state {
            State::Init => {
                info!(
                    iteration = config.name(),
                    partitions = partitions.len(),
                    vertices = number_of_vertices,
                    max_iterations,
                    "starting iteration"
                );
                State::Running { iteration: 1 }
            }
            State::Running { iteration } => {
                if iteration > max_iterations {
                    State::Finished {
                        executed: iteration - 1,
                        termination: Termination::MaxIterations,
                    }
                } else {
                    let start = Instant::now();
                    let round = RoundState {
                        iteration,
                        number_of_vertices,
                        previous: registry.previous().clone(),
                    };
                    let mut partials: Vec<PartialAggregates> =
                        partitions.iter().map(|_| registry.new_partial()).collect();

                    let report = match step.superstep(&round, partitions, &mut partials) {
                        Ok(report) => report,
                        Err(e) => {
                            warn!(
                                iteration = config.name(),
                                superstep = iteration,
                                error = %e,
                                "superstep failed, aborting run"
                            );
                            return Err(in_superstep(iteration, e));
                        }
                    };
                    let frozen = registry.freeze(partials);

                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                    metrics::counter!("itergraph_superstep_updates_total")
                        .increment(report.updated_vertices);
                    metrics::counter!("itergraph_superstep_messages_total")
                        .increment(report.messages);
                    metrics::histogram!("itergraph_superstep_duration_ms").record(elapsed_ms);
                    debug!(
                        iteration = config.name(),
                        superstep = iteration,
                        updated = report.updated_vertices,
                        messages = report.messages,
                        dropped = report.dropped_messages,
                        elapsed_ms,
                        "superstep finished"
                    );

                    let converged = config.convergence().is_some_and(|criterion| {
                        frozen
                            .get(&criterion.aggregator)
                            .is_some_and(|value| criterion.is_converged(*value))
                    });

                    if converged {
                        State::Finished {
                            executed: iteration,
                            termination: Termination::Converged,
                        }
                    } else if report.is_quiescent() {
                        State::Finished {
                            executed: iteration,
                            termination: Termination::Quiescent,
                        }
                    } else {
                        State::Running {
                            iteration: iteration + 1,
                        }
                    }
                }
            }
            State::Finished {
                executed,
                termination,
            } => {
                info!(
                    iteration = config.name(),
                    executed,
                    ?termination,
                    "iteration finished"
                );
                return Ok(IterationStats {
                    executed_iterations: executed,
                    termination,
                    aggregates: registry.previous().clone(),
                });
            }
        };
    }
}

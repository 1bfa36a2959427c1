use crate::aggregator::Aggregator;
use itergraph_common::config::Configuration;
use itergraph_common::error::{IterGraphError, IterGraphResult};
use std::fmt;
use std::sync::Arc;

pub const NAME_KEY: &str = "iteration.name";
pub const MAX_ITERATIONS_KEY: &str = "iteration.max-iterations";
pub const PARALLELISM_KEY: &str = "iteration.parallelism";
pub const CONVERGENCE_AGGREGATOR_KEY: &str = "iteration.convergence.aggregator";
pub const CONVERGENCE_THRESHOLD_KEY: &str = "iteration.convergence.threshold";

/// Stop once the named aggregator's value for a finished superstep drops
/// strictly below `threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceCriterion {
    pub aggregator: String,
    pub threshold: f64,
}

impl ConvergenceCriterion {
    pub fn new(aggregator: impl Into<String>, threshold: f64) -> IterGraphResult<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(IterGraphError::InvalidArgument(format!(
                "convergence threshold must be a non-negative number, got {threshold}"
            )));
        }
        Ok(Self {
            aggregator: aggregator.into(),
            threshold,
        })
    }

    pub fn is_converged(&self, aggregate: f64) -> bool {
        aggregate < self.threshold
    }
}

#[derive(Clone)]
pub struct IterationConfig {
    name: String,
    max_iterations: u64,
    parallelism: Option<usize>,
    aggregators: Vec<(String, Arc<dyn Aggregator>)>,
    convergence: Option<ConvergenceCriterion>,
}

impl IterationConfig {
    pub fn new(name: impl Into<String>, max_iterations: u64) -> Self {
        Self {
            name: name.into(),
            max_iterations,
            parallelism: None,
            aggregators: Vec::new(),
            convergence: None,
        }
    }

    pub fn from_configuration(config: &Configuration) -> IterGraphResult<Self> {
        let max_iterations = config.get_u64(MAX_ITERATIONS_KEY)?.ok_or_else(|| {
            IterGraphError::InvalidArgument(format!("{MAX_ITERATIONS_KEY} is required"))
        })?;
        let mut iteration = Self::new(config.get_string(NAME_KEY, "iteration"), max_iterations);
        if let Some(parallelism) = config.get_usize(PARALLELISM_KEY)? {
            iteration.set_parallelism(parallelism);
        }
        match (
            config.get(CONVERGENCE_AGGREGATOR_KEY),
            config.get_f64(CONVERGENCE_THRESHOLD_KEY)?,
        ) {
            (Some(aggregator), Some(threshold)) => {
                iteration.set_convergence(ConvergenceCriterion::new(aggregator.clone(), threshold)?);
            }
            (None, None) => {}
            _ => {
                return Err(IterGraphError::InvalidArgument(format!(
                    "{CONVERGENCE_AGGREGATOR_KEY} and {CONVERGENCE_THRESHOLD_KEY} must be set together"
                )))
            }
        }
        Ok(iteration)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn set_max_iterations(&mut self, max_iterations: u64) {
        self.max_iterations = max_iterations;
    }

    pub fn parallelism(&self) -> Option<usize> {
        self.parallelism
    }

    pub fn set_parallelism(&mut self, parallelism: usize) {
        self.parallelism = Some(parallelism.max(1));
    }

    /// Registers an aggregator. Registering the same name twice replaces the
    /// earlier one.
    pub fn register_aggregator<A: Aggregator>(&mut self, name: impl Into<String>, aggregator: A) {
        let name = name.into();
        self.aggregators.retain(|(n, _)| *n != name);
        self.aggregators.push((name, Arc::new(aggregator)));
    }

    pub fn aggregators(&self) -> &[(String, Arc<dyn Aggregator>)] {
        &self.aggregators
    }

    pub fn set_convergence(&mut self, criterion: ConvergenceCriterion) {
        self.convergence = Some(criterion);
    }

    pub fn convergence(&self) -> Option<&ConvergenceCriterion> {
        self.convergence.as_ref()
    }

    /// Checks that the convergence criterion refers to a registered aggregator.
    pub fn validate(&self) -> IterGraphResult<()> {
        if let Some(criterion) = &self.convergence {
            if !self.aggregators.iter().any(|(n, _)| *n == criterion.aggregator) {
                return Err(IterGraphError::UnknownAggregator(criterion.aggregator.clone()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for IterationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterationConfig")
            .field("name", &self.name)
            .field("max_iterations", &self.max_iterations)
            .field("parallelism", &self.parallelism)
            .field(
                "aggregators",
                &self.aggregators.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("convergence", &self.convergence)
            .finish()
    }
}

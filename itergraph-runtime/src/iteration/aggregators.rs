use itergraph_api::aggregator::Aggregator;
use itergraph_api::iteration::IterationConfig;
use itergraph_common::error::{IterGraphError, IterGraphResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the registered aggregators and the values frozen at the last barrier.
pub(crate) struct AggregatorRegistry {
    aggregators: Vec<(String, Arc<dyn Aggregator>)>,
    previous: HashMap<String, f64>,
}

impl AggregatorRegistry {
    pub(crate) fn new(config: &IterationConfig) -> Self {
        Self {
            aggregators: config.aggregators().to_vec(),
            previous: HashMap::new(),
        }
    }

    /// A fresh partial per partition; this is the per-round reset.
    pub(crate) fn new_partial(&self) -> PartialAggregates {
        PartialAggregates {
            values: self
                .aggregators
                .iter()
                .map(|(name, agg)| (name.clone(), agg.clone(), agg.initial()))
                .collect(),
        }
    }

    /// Merges the partition partials of a finished round and freezes the
    /// result as the previous-round values.
    pub(crate) fn freeze(&mut self, partials: Vec<PartialAggregates>) -> &HashMap<String, f64> {
        let mut frozen: HashMap<String, f64> = self
            .aggregators
            .iter()
            .map(|(name, agg)| (name.clone(), agg.initial()))
            .collect();
        for partial in partials {
            for (name, agg, value) in partial.values {
                if let Some(total) = frozen.get_mut(&name) {
                    *total = agg.combine(*total, value);
                }
            }
        }
        self.previous = frozen;
        &self.previous
    }

    pub(crate) fn previous(&self) -> &HashMap<String, f64> {
        &self.previous
    }
}

pub(crate) struct PartialAggregates {
    values: Vec<(String, Arc<dyn Aggregator>, f64)>,
}

impl PartialAggregates {
    pub(crate) fn aggregate(&mut self, name: &str, value: f64) -> IterGraphResult<()> {
        let (_, agg, partial) = self
            .values
            .iter_mut()
            .find(|(n, _, _)| n == name)
            .ok_or_else(|| IterGraphError::UnknownAggregator(name.to_string()))?;
        *partial = agg.combine(*partial, agg.report(value));
        Ok(())
    }
}

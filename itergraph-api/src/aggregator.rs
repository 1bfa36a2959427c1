/// A commutative, associative reduction over `f64` values reported during a
/// superstep. Each partition keeps its own partial, partials are merged at
/// the barrier in arbitrary order.
pub trait Aggregator: Send + Sync + 'static {
    fn initial(&self) -> f64;
    fn combine(&self, left: f64, right: f64) -> f64;

    /// Maps a reported value before it is folded into the partial.
    fn report(&self, value: f64) -> f64 {
        value
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SumAggregator;

impl Aggregator for SumAggregator {
    fn initial(&self) -> f64 {
        0.0
    }

    fn combine(&self, left: f64, right: f64) -> f64 {
        left + right
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxAggregator;

impl Aggregator for MaxAggregator {
    fn initial(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn combine(&self, left: f64, right: f64) -> f64 {
        left.max(right)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinAggregator;

impl Aggregator for MinAggregator {
    fn initial(&self) -> f64 {
        f64::INFINITY
    }

    fn combine(&self, left: f64, right: f64) -> f64 {
        left.min(right)
    }
}

/// Counts reports; the reported value is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountAggregator;

impl Aggregator for CountAggregator {
    fn initial(&self) -> f64 {
        0.0
    }

    fn combine(&self, left: f64, right: f64) -> f64 {
        left + right
    }

    fn report(&self, _value: f64) -> f64 {
        1.0
    }
}

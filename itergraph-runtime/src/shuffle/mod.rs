pub mod partitioner;

use itergraph_api::function::SumFunction;
use std::collections::HashMap;
use std::hash::Hash;

pub type Outbox<K, M> = Vec<(K, M)>;
pub type Inbox<K, M> = HashMap<K, Vec<M>>;

/// Routes messages produced in one superstep to the partition that owns the
/// recipient.
pub trait MessageShuffle<K, M>: Send + Sync {
    fn route_outbox(&self, outbox: Outbox<K, M>, next_inboxes: &mut [Inbox<K, M>]);
}

pub struct DriverShuffle;

impl<K, M> MessageShuffle<K, M> for DriverShuffle
where
    K: Hash + Eq,
{
    fn route_outbox(&self, outbox: Outbox<K, M>, next_inboxes: &mut [Inbox<K, M>]) {
        let partitions = next_inboxes.len();
        for (target, msg) in outbox {
            let p = partitioner::partition_of(&target, partitions);
            next_inboxes[p].entry(target).or_default().push(msg);
        }
    }
}

pub fn new_inboxes<K, M>(partitions: usize) -> Vec<Inbox<K, M>> {
    (0..partitions).map(|_| HashMap::new()).collect()
}

/// Folds `value` into the partial kept for `key`.
pub fn combine_into<K, P>(partials: &mut HashMap<K, P>, key: K, value: P, sum: &dyn SumFunction<P>)
where
    K: Hash + Eq,
    P: 'static,
{
    let merged = match partials.remove(&key) {
        Some(previous) => sum.sum(previous, value),
        None => value,
    };
    partials.insert(key, merged);
}

/// Routes partition-local partial sums to the owning partitions, combining
/// partials for the same target on arrival.
pub fn route_combined<K, P>(
    partials: HashMap<K, P>,
    sum: &dyn SumFunction<P>,
    next: &mut [HashMap<K, P>],
) where
    K: Hash + Eq,
    P: 'static,
{
    let partitions = next.len();
    for (target, partial) in partials {
        let p = partitioner::partition_of(&target, partitions);
        combine_into(&mut next[p], target, partial, sum);
    }
}

use crate::iteration::driver::{run_iteration, IterationStats};
use crate::iteration::gsa::GatherSumApplyStep;
use crate::iteration::scatter_gather::ScatterGatherStep;
use crate::shuffle::partitioner::partition_of;
use itergraph_api::function::{GatherSumApplyAlgorithm, MapFunction, ScatterGatherAlgorithm};
use itergraph_api::graph::PGraph;
use itergraph_api::iteration::IterationConfig;
use itergraph_common::error::IterGraphResult;
use itergraph_common::types::{Edge, Vertex};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

pub struct PartitionedGraph<K, VV, EV> {
    partitions: Vec<GraphPartition<K, VV, EV>>,
}

/// Vertices hashed by id; out-edges live in the partition of their source.
pub(crate) struct GraphPartition<K, VV, EV> {
    pub(crate) vertices: HashMap<K, VV>,
    pub(crate) adjacency: HashMap<K, Vec<Edge<K, EV>>>,
}

impl<K, VV, EV> GraphPartition<K, VV, EV> {
    fn empty() -> Self {
        Self {
            vertices: HashMap::new(),
            adjacency: HashMap::new(),
        }
    }

    pub(crate) fn out_edges(&self, vertex_id: &K) -> &[Edge<K, EV>]
    where
        K: Hash + Eq,
    {
        self.adjacency
            .get(vertex_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl<K, VV, EV> PartitionedGraph<K, VV, EV>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    VV: Clone + Send + Sync + 'static,
    EV: Clone + Send + Sync + 'static,
{
    /// Edges may reference ids missing from `vertices`; they are kept but
    /// nothing is ever delivered along them to a missing target.
    pub fn new(vertices: Vec<Vertex<K, VV>>, edges: Vec<Edge<K, EV>>, partitions: usize) -> Self {
        let partitions = partitions.max(1);
        let mut parts: Vec<GraphPartition<K, VV, EV>> =
            (0..partitions).map(|_| GraphPartition::empty()).collect();

        for v in vertices {
            let p = partition_of(&v.id, partitions);
            parts[p].vertices.insert(v.id, v.value);
        }

        for e in edges {
            let p = partition_of(&e.src_id, partitions);
            parts[p]
                .adjacency
                .entry(e.src_id.clone())
                .or_default()
                .push(e);
        }

        Self { partitions: parts }
    }

    /// Builds the vertex set from the distinct endpoints of `edges`.
    pub fn from_edges<F>(edges: Vec<Edge<K, EV>>, initial_value: F, partitions: usize) -> Self
    where
        F: MapFunction<K, VV>,
    {
        let mut seen: HashSet<K> = HashSet::new();
        let mut vertices = Vec::new();
        for e in &edges {
            for id in [&e.src_id, &e.target_id] {
                if seen.insert(id.clone()) {
                    vertices.push(Vertex::new(id.clone(), initial_value.map(id.clone())));
                }
            }
        }
        Self::new(vertices, edges, partitions)
    }

    pub fn partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn repartition(self, partitions: usize) -> Self {
        if partitions.max(1) == self.partitions() {
            return self;
        }
        let vertices = self.vertices();
        let edges = self.edges();
        Self::new(vertices, edges, partitions)
    }

    pub fn map_vertices<NV, F>(self, f: F) -> PartitionedGraph<K, NV, EV>
    where
        F: MapFunction<(K, VV), NV>,
    {
        let partitions = self
            .partitions
            .into_iter()
            .map(|p| GraphPartition {
                vertices: p
                    .vertices
                    .into_iter()
                    .map(|(k, v)| (k.clone(), f.map((k, v))))
                    .collect(),
                adjacency: p.adjacency,
            })
            .collect();
        PartitionedGraph { partitions }
    }

    pub fn map_edges<NE, F>(self, f: F) -> PartitionedGraph<K, VV, NE>
    where
        F: MapFunction<Edge<K, EV>, NE>,
    {
        let partitions = self
            .partitions
            .into_iter()
            .map(|p| GraphPartition {
                vertices: p.vertices,
                adjacency: p
                    .adjacency
                    .into_iter()
                    .map(|(src, edges)| {
                        let edges = edges
                            .into_iter()
                            .map(|e| {
                                let (src_id, target_id) = (e.src_id.clone(), e.target_id.clone());
                                Edge::new(src_id, target_id, f.map(e))
                            })
                            .collect();
                        (src, edges)
                    })
                    .collect(),
            })
            .collect();
        PartitionedGraph { partitions }
    }

    pub fn run_scatter_gather_with_stats<M, A>(
        self,
        algorithm: &A,
    ) -> IterGraphResult<(Self, IterationStats)>
    where
        A: ScatterGatherAlgorithm<K, VV, EV, M>,
        M: Send + Sync + 'static + Clone,
    {
        let mut config = IterationConfig::new(algorithm.name(), algorithm.iterations());
        algorithm.configure(&mut config);
        let mut graph = self.with_parallelism(&config);
        let mut step = ScatterGatherStep::<K, VV, EV, M>::new(algorithm, graph.partitions());
        let stats = run_iteration(&mut graph.partitions, &config, &mut step)?;
        Ok((graph, stats))
    }

    pub fn run_gather_sum_apply_with_stats<P, A>(
        self,
        algorithm: &A,
    ) -> IterGraphResult<(Self, IterationStats)>
    where
        A: GatherSumApplyAlgorithm<K, VV, EV, P>,
        P: Send + Sync + 'static,
    {
        let mut config = IterationConfig::new(algorithm.name(), algorithm.iterations());
        algorithm.configure(&mut config);
        let mut graph = self.with_parallelism(&config);
        let mut step = GatherSumApplyStep::<K, VV, EV, P>::new(algorithm, graph.partitions());
        let stats = run_iteration(&mut graph.partitions, &config, &mut step)?;
        Ok((graph, stats))
    }

    fn with_parallelism(self, config: &IterationConfig) -> Self {
        match config.parallelism() {
            Some(parallelism) => self.repartition(parallelism),
            None => self,
        }
    }
}

impl<K, VV, EV> PGraph<K, VV, EV> for PartitionedGraph<K, VV, EV>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    VV: Clone + Send + Sync + 'static,
    EV: Clone + Send + Sync + 'static,
{
    fn run_scatter_gather<M, A>(self, algorithm: &A) -> IterGraphResult<Self>
    where
        A: ScatterGatherAlgorithm<K, VV, EV, M>,
        M: Send + Sync + 'static + Clone,
    {
        self.run_scatter_gather_with_stats(algorithm)
            .map(|(graph, _)| graph)
    }

    fn run_gather_sum_apply<P, A>(self, algorithm: &A) -> IterGraphResult<Self>
    where
        A: GatherSumApplyAlgorithm<K, VV, EV, P>,
        P: Send + Sync + 'static,
    {
        self.run_gather_sum_apply_with_stats(algorithm)
            .map(|(graph, _)| graph)
    }

    fn join_with_edges_on_source<T, F>(mut self, values: Vec<(K, T)>, f: F) -> Self
    where
        T: Clone + Send + Sync + 'static,
        F: MapFunction<(EV, T), EV>,
    {
        let values: HashMap<K, T> = values.into_iter().collect();
        for part in &mut self.partitions {
            for (src, edges) in part.adjacency.iter_mut() {
                let Some(value) = values.get(src) else {
                    continue;
                };
                for e in edges.iter_mut() {
                    e.value = f.map((e.value.clone(), value.clone()));
                }
            }
        }
        self
    }

    fn transform_vertices<F>(mut self, f: F) -> Self
    where
        F: MapFunction<(K, VV), VV>,
    {
        for part in &mut self.partitions {
            for (k, v) in part.vertices.iter_mut() {
                *v = f.map((k.clone(), v.clone()));
            }
        }
        self
    }

    fn out_degrees(&self) -> Vec<(K, u64)> {
        self.partitions
            .iter()
            .flat_map(|p| {
                p.vertices
                    .keys()
                    .map(|k| (k.clone(), p.out_edges(k).len() as u64))
            })
            .collect()
    }

    fn in_degrees(&self) -> Vec<(K, u64)> {
        let mut degrees: HashMap<K, u64> = self
            .partitions
            .iter()
            .flat_map(|p| p.vertices.keys().map(|k| (k.clone(), 0)))
            .collect();
        for part in &self.partitions {
            for e in part.adjacency.values().flatten() {
                if let Some(d) = degrees.get_mut(&e.target_id) {
                    *d += 1;
                }
            }
        }
        degrees.into_iter().collect()
    }

    fn number_of_vertices(&self) -> u64 {
        self.partitions
            .iter()
            .map(|p| p.vertices.len() as u64)
            .sum()
    }

    fn number_of_edges(&self) -> u64 {
        self.partitions
            .iter()
            .flat_map(|p| p.adjacency.values())
            .map(|edges| edges.len() as u64)
            .sum()
    }

    fn vertices(&self) -> Vec<Vertex<K, VV>> {
        self.partitions
            .iter()
            .flat_map(|p| {
                p.vertices.iter().map(|(k, v)| Vertex {
                    id: k.clone(),
                    value: v.clone(),
                })
            })
            .collect()
    }

    fn edges(&self) -> Vec<Edge<K, EV>> {
        self.partitions
            .iter()
            .flat_map(|p| p.adjacency.values().flatten().cloned())
            .collect()
    }
}

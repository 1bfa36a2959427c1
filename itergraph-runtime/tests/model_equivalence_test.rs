use itergraph_api::graph::PGraph;
use itergraph_common::types::{Edge, Vertex};
use itergraph_runtime::algorithms::gsa_pagerank::GsaPageRank;
use itergraph_runtime::algorithms::pagerank::PageRank;
use itergraph_runtime::graph::partitioned_graph::PartitionedGraph;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Vertices `0..n`, some of them isolated or dangling, plus random edges
/// including self-loops and parallel edges.
fn random_graph(rng: &mut StdRng, n: u64, m: usize) -> (Vec<Vertex<u64, f64>>, Vec<Edge<u64, f64>>) {
    let vertices = (0..n).map(|id| Vertex::new(id, 1.0)).collect();
    let edges = (0..m)
        .map(|_| Edge::new(rng.gen_range(0..n), rng.gen_range(0..n), 1.0))
        .collect();
    (vertices, edges)
}

fn weighted(
    vertices: Vec<Vertex<u64, f64>>,
    edges: Vec<Edge<u64, f64>>,
    partitions: usize,
) -> PartitionedGraph<u64, f64, f64> {
    let graph = PartitionedGraph::new(vertices, edges, partitions);
    let out_degrees = graph.out_degrees();
    graph.join_with_edges_on_source(out_degrees, |(w, d): (f64, u64)| w / d as f64)
}

fn ranks(graph: &PartitionedGraph<u64, f64, f64>) -> HashMap<u64, f64> {
    graph.vertices().into_iter().map(|v| (v.id, v.value)).collect()
}

fn assert_close(left: &HashMap<u64, f64>, right: &HashMap<u64, f64>, tol: f64) {
    assert_eq!(left.len(), right.len());
    for (id, l) in left {
        let r = right[id];
        assert!((l - r).abs() < tol, "vertex {id}: {l} vs {r}");
    }
}

#[test]
fn test_models_agree_on_random_graphs() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..20 {
        let n = rng.gen_range(1..40u64);
        let m = rng.gen_range(0..(n as usize * 4));
        let iterations = rng.gen_range(0..8u64);
        let partitions = rng.gen_range(1..6usize);
        let damping = rng.gen_range(0.05..0.95);
        let (vertices, edges) = random_graph(&mut rng, n, m);

        let vc = weighted(vertices.clone(), edges.clone(), partitions)
            .run(&PageRank::new(damping, iterations).unwrap())
            .unwrap();
        let gsa = weighted(vertices, edges, partitions)
            .run(&GsaPageRank::new(damping, iterations).unwrap())
            .unwrap();

        assert_eq!(vc.number_of_vertices(), n, "round {round}");
        assert_close(&ranks(&vc), &ranks(&gsa), 1e-9);
    }
}

#[test]
fn test_normalized_models_agree() {
    let mut rng = StdRng::seed_from_u64(7);
    let (vertices, edges) = random_graph(&mut rng, 25, 80);

    let vc = weighted(vertices.clone(), edges.clone(), 4)
        .run(&PageRank::new(0.85, 10).unwrap().normalized())
        .unwrap();
    let gsa = weighted(vertices, edges, 3)
        .run(&GsaPageRank::new(0.85, 10).unwrap().normalized())
        .unwrap();

    assert_close(&ranks(&vc), &ranks(&gsa), 1e-9);
}

#[test]
fn test_result_independent_of_edge_order_and_partitioning() {
    let mut rng = StdRng::seed_from_u64(1234);
    let (vertices, edges) = random_graph(&mut rng, 30, 120);
    let expected = ranks(
        &weighted(vertices.clone(), edges.clone(), 1)
            .run(&PageRank::new(0.85, 6).unwrap())
            .unwrap(),
    );

    for partitions in [2, 3, 8] {
        let mut shuffled_edges = edges.clone();
        shuffled_edges.shuffle(&mut rng);
        let mut shuffled_vertices = vertices.clone();
        shuffled_vertices.shuffle(&mut rng);

        let vc = weighted(shuffled_vertices.clone(), shuffled_edges.clone(), partitions)
            .run(&PageRank::new(0.85, 6).unwrap())
            .unwrap();
        let gsa = weighted(shuffled_vertices, shuffled_edges, partitions)
            .run(&GsaPageRank::new(0.85, 6).unwrap())
            .unwrap();

        assert_close(&expected, &ranks(&vc), 1e-9);
        assert_close(&expected, &ranks(&gsa), 1e-9);
    }
}

use itergraph_api::graph::PGraph;
use itergraph_common::error::IterGraphError;
use itergraph_common::types::{Edge, Vertex};
use itergraph_runtime::algorithms::gsa_pagerank::GsaPageRank;
use itergraph_runtime::algorithms::pagerank::PageRank;
use itergraph_runtime::graph::partitioned_graph::PartitionedGraph;

const RANKS_AFTER_3_ITERATIONS: [(u64, f64); 5] = [
    (1, 0.237),
    (2, 0.248),
    (3, 0.173),
    (4, 0.175),
    (5, 0.165),
];

fn default_edges() -> Vec<Edge<u64, f64>> {
    [
        (2u64, 1u64),
        (5, 2),
        (5, 4),
        (4, 3),
        (4, 2),
        (1, 4),
        (1, 2),
        (1, 3),
        (3, 5),
    ]
    .into_iter()
    .map(|(s, t)| Edge::new(s, t, 1.0))
    .collect()
}

fn weighted_graph(edges: Vec<Edge<u64, f64>>, partitions: usize) -> PartitionedGraph<u64, f64, f64> {
    let graph = PartitionedGraph::from_edges(edges, |_: u64| 1.0f64, partitions);
    let out_degrees = graph.out_degrees();
    graph.join_with_edges_on_source(out_degrees, |(weight, degree): (f64, u64)| {
        weight / degree as f64
    })
}

fn sorted(graph: &PartitionedGraph<u64, f64, f64>) -> Vec<Vertex<u64, f64>> {
    let mut vertices = graph.vertices();
    vertices.sort_by_key(|v| v.id);
    vertices
}

fn assert_ranks(result: &[Vertex<u64, f64>], scale: f64) {
    assert_eq!(result.len(), RANKS_AFTER_3_ITERATIONS.len());
    for (v, (id, expected)) in result.iter().zip(RANKS_AFTER_3_ITERATIONS) {
        assert_eq!(v.id, id);
        assert!(
            (v.value - expected * scale).abs() < 0.01 * scale,
            "vertex {id}: {} vs {}",
            v.value,
            expected * scale
        );
    }
}

#[test]
fn test_pagerank_with_three_iterations() {
    let graph = weighted_graph(default_edges(), 2);
    let algo = PageRank::new(0.85, 3).unwrap().normalized();
    let result = graph.run(&algo).unwrap();
    assert_ranks(&sorted(&result), 1.0);
}

#[test]
fn test_gsa_pagerank_with_three_iterations() {
    let graph = weighted_graph(default_edges(), 2);
    let algo = GsaPageRank::new(0.85, 3).unwrap().normalized();
    let result = graph.run(&algo).unwrap();
    assert_ranks(&sorted(&result), 1.0);
}

#[test]
fn test_unnormalized_ranks_scale_with_vertex_count() {
    let vc = weighted_graph(default_edges(), 3)
        .run(&PageRank::new(0.85, 3).unwrap())
        .unwrap();
    let gsa = weighted_graph(default_edges(), 3)
        .run(&GsaPageRank::new(0.85, 3).unwrap())
        .unwrap();

    let vc = sorted(&vc);
    assert_ranks(&vc, 5.0);
    assert!((vc[0].value - 1.18965625).abs() < 1e-9);
    for (a, b) in vc.iter().zip(sorted(&gsa)) {
        assert_eq!(a.id, b.id);
        assert!((a.value - b.value).abs() < 1e-9);
    }
}

#[test]
fn test_local_pagerank_two_cycle() {
    let vertices = vec![Vertex::new(1u64, 1.0f64), Vertex::new(2, 1.0)];
    let edges = vec![Edge::new(1u64, 2u64, 1.0f64), Edge::new(2u64, 1u64, 1.0)];

    let graph = PartitionedGraph::new(vertices, edges, 2);
    let result = graph.run(&PageRank::new(0.85, 3).unwrap()).unwrap();

    let vertices = sorted(&result);
    assert_eq!(vertices.len(), 2);
    assert!((vertices[0].value - 1.0).abs() < 1e-9);
    assert!((vertices[1].value - 1.0).abs() < 1e-9);
}

#[test]
fn test_zero_iterations_keep_initial_values() {
    let graph = PartitionedGraph::from_edges(default_edges(), |id: u64| id as f64, 2);
    let out_degrees = graph.out_degrees();
    let graph = graph.join_with_edges_on_source(out_degrees, |(w, d): (f64, u64)| w / d as f64);

    let result = graph.run(&PageRank::new(0.85, 0).unwrap()).unwrap();
    for v in result.vertices() {
        assert_eq!(v.value, v.id as f64);
    }

    let result = result.run(&GsaPageRank::new(0.85, 0).unwrap()).unwrap();
    for v in result.vertices() {
        assert_eq!(v.value, v.id as f64);
    }

    let result = result
        .run(&PageRank::new(0.85, 0).unwrap().normalized())
        .unwrap();
    for v in result.vertices() {
        assert_eq!(v.value, v.id as f64);
    }

    let result = result
        .run(&GsaPageRank::new(0.85, 0).unwrap().normalized())
        .unwrap();
    for v in result.vertices() {
        assert_eq!(v.value, v.id as f64);
    }
}

#[test]
fn test_normalized_start_ignores_stored_values() {
    let graph = PartitionedGraph::from_edges(default_edges(), |id: u64| id as f64 * 100.0, 2);
    let out_degrees = graph.out_degrees();
    let graph = graph.join_with_edges_on_source(out_degrees, |(w, d): (f64, u64)| w / d as f64);
    let result = graph
        .run(&PageRank::new(0.85, 3).unwrap().normalized())
        .unwrap();
    assert_ranks(&sorted(&result), 1.0);
}

#[test]
fn test_dangling_vertex_receives_but_never_sends() {
    let edges = vec![
        Edge::new(1u64, 2u64, 1.0f64),
        Edge::new(2, 3, 1.0),
        Edge::new(1, 3, 1.0),
    ];

    for gsa in [false, true] {
        let graph = weighted_graph(edges.clone(), 2);
        let result = if gsa {
            graph.run(&GsaPageRank::new(0.85, 1).unwrap()).unwrap()
        } else {
            graph.run(&PageRank::new(0.85, 1).unwrap()).unwrap()
        };
        let v = sorted(&result);
        // vertex 1 has no in-edges and vertex 3 sends nothing
        assert!((v[0].value - 0.15).abs() < 1e-12);
        assert!((v[1].value - 0.575).abs() < 1e-12);
        assert!((v[2].value - 1.425).abs() < 1e-12);
    }
}

#[test]
fn test_rank_mass_bound_without_dangling_vertices() {
    let damping = 0.85;
    let n = 5.0;
    let mut previous = n;
    for rounds in 1..=6 {
        let result = weighted_graph(default_edges(), 2)
            .run(&PageRank::new(damping, rounds).unwrap())
            .unwrap();
        let total: f64 = result.vertices().iter().map(|v| v.value).sum();
        assert!(total <= (1.0 - damping) * n + damping * previous + 1e-9);
        previous = total;
    }
}

#[test]
fn test_damping_outside_unit_interval_is_rejected() {
    for damping in [0.0, 1.0, -0.3, 1.5, f64::NAN] {
        assert!(matches!(
            PageRank::new(damping, 3),
            Err(IterGraphError::InvalidArgument(_))
        ));
        assert!(matches!(
            GsaPageRank::new(damping, 3),
            Err(IterGraphError::InvalidArgument(_))
        ));
    }
}

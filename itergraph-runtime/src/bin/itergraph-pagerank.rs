use clap::{Parser, ValueEnum};
use itergraph_api::graph::{PGraph, Vertex};
use itergraph_common::types::Edge;
use itergraph_runtime::algorithms::gsa_pagerank::GsaPageRank;
use itergraph_runtime::algorithms::pagerank::{PageRank, PageRankParams};
use itergraph_runtime::graph::partitioned_graph::PartitionedGraph;
use itergraph_runtime::io::file::read_edges;
use itergraph_runtime::observability::{init_prometheus, init_tracing};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Model {
    ScatterGather,
    Gsa,
}

#[derive(Debug, Parser)]
struct Args {
    /// Edge list, one `src,dst` pair per line; a third column is ignored
    #[arg(long)]
    edges: PathBuf,

    #[arg(long, default_value_t = ',')]
    delimiter: char,

    #[arg(long, value_enum, default_value_t = Model::ScatterGather)]
    model: Model,

    #[arg(long, default_value_t = 0.85)]
    damping: f64,

    #[arg(long, default_value_t = 10)]
    iterations: u64,

    /// Stop early once the summed rank change of a superstep drops below this
    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long, default_value_t = 4)]
    partitions: usize,

    #[arg(long)]
    normalize: bool,

    #[arg(long)]
    json: bool,

    /// Print the collected Prometheus metrics to stderr after the run
    #[arg(long)]
    metrics: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();
    let metrics = if args.metrics {
        Some(init_prometheus()?)
    } else {
        None
    };

    let delimiter = u8::try_from(args.delimiter)
        .map_err(|_| anyhow::anyhow!("delimiter must be a single ASCII character"))?;
    let edges: Vec<Edge<u64, f64>> = read_edges(&args.edges, delimiter, 1.0)?;
    info!(edges = edges.len(), path = %args.edges.display(), "loaded edge list");

    let graph = PartitionedGraph::from_edges(edges, |_: u64| 1.0f64, args.partitions);
    let out_degrees = graph.out_degrees();
    let graph = graph
        .join_with_edges_on_source(out_degrees, |(_, degree): (f64, u64)| 1.0 / degree as f64);

    let mut params = PageRankParams::new(args.damping, args.iterations)?;
    if args.normalize {
        params = params.normalized();
    }
    if let Some(threshold) = args.threshold {
        params = params.with_convergence(threshold)?;
    }

    let (result, stats) = match args.model {
        Model::ScatterGather => PageRank::from_params(params).run_with_stats(graph)?,
        Model::Gsa => GsaPageRank::from_params(params).run_with_stats(graph)?,
    };
    info!(
        executed = stats.executed_iterations,
        termination = ?stats.termination,
        "pagerank finished"
    );

    let mut ranks: Vec<Vertex<u64, f64>> = result.vertices();
    ranks.sort_by_key(|v| v.id);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for v in &ranks {
        if args.json {
            serde_json::to_writer(&mut out, v)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{},{}", v.id, v.value)?;
        }
    }

    if let Some(handle) = metrics {
        eprintln!("{}", handle.render());
    }
    Ok(())
}

use itergraph_common::error::{IterGraphError, IterGraphResult};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Installs a Prometheus recorder for the superstep metrics; render the
/// handle to read them back.
pub fn init_prometheus() -> IterGraphResult<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| IterGraphError::Internal(format!("prometheus init: {e}")))
}

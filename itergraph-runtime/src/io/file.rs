use itergraph_common::error::{IterGraphError, IterGraphResult};
use itergraph_common::types::{Edge, Vertex};
use std::path::Path;
use std::str::FromStr;

fn reader(path: impl AsRef<Path>, delimiter: u8) -> IterGraphResult<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(csv_error)
}

fn csv_error(e: csv::Error) -> IterGraphError {
    match e.into_kind() {
        csv::ErrorKind::Io(err) => IterGraphError::Io(err),
        other => IterGraphError::InvalidArgument(format!("csv read: {other:?}")),
    }
}

fn field<T>(rec: &csv::StringRecord, idx: usize, what: &str) -> IterGraphResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    rec.get(idx)
        .ok_or_else(|| IterGraphError::InvalidArgument(format!("{what} missing")))?
        .trim()
        .parse()
        .map_err(|e| IterGraphError::InvalidArgument(format!("{what} parse: {e}")))
}

fn optional_field<T>(rec: &csv::StringRecord, idx: usize, what: &str) -> IterGraphResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match rec.get(idx).map(str::trim) {
        Some(s) if !s.is_empty() => field(rec, idx, what).map(Some),
        _ => Ok(None),
    }
}

/// Reads `src<d>target[<d>value]` rows; a missing value falls back to
/// `default_value`. Lines starting with `#` are skipped.
pub fn read_edges<K, EV>(
    path: impl AsRef<Path>,
    delimiter: u8,
    default_value: EV,
) -> IterGraphResult<Vec<Edge<K, EV>>>
where
    K: FromStr,
    K::Err: std::fmt::Display,
    EV: FromStr + Clone,
    EV::Err: std::fmt::Display,
{
    let mut rdr = reader(path, delimiter)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(csv_error)?;
        let src: K = field(&rec, 0, "edge src")?;
        let target: K = field(&rec, 1, "edge target")?;
        let value = optional_field(&rec, 2, "edge value")?.unwrap_or_else(|| default_value.clone());
        out.push(Edge::new(src, target, value));
    }
    Ok(out)
}

pub fn read_vertices<K, VV>(
    path: impl AsRef<Path>,
    delimiter: u8,
    default_value: VV,
) -> IterGraphResult<Vec<Vertex<K, VV>>>
where
    K: FromStr,
    K::Err: std::fmt::Display,
    VV: FromStr + Clone,
    VV::Err: std::fmt::Display,
{
    let mut rdr = reader(path, delimiter)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(csv_error)?;
        let id: K = field(&rec, 0, "vertex id")?;
        let value = optional_field(&rec, 1, "vertex value")?.unwrap_or_else(|| default_value.clone());
        out.push(Vertex::new(id, value));
    }
    Ok(out)
}

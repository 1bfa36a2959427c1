use itergraph_common::error::IterGraphError;
use itergraph_common::types::{Edge, Vertex};
use itergraph_runtime::io::file::{read_edges, read_vertices};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_read_edges_with_default_values() {
    let file = write_file("# src,target,weight\n1,2\n2,3,0.5\n 3 , 1 ,\n");
    let edges: Vec<Edge<u64, f64>> = read_edges(file.path(), b',', 1.0).unwrap();
    assert_eq!(
        edges,
        vec![
            Edge::new(1, 2, 1.0),
            Edge::new(2, 3, 0.5),
            Edge::new(3, 1, 1.0),
        ]
    );
}

#[test]
fn test_read_tab_separated_edges() {
    let file = write_file("2\t1\n5\t2\n5\t4\n");
    let edges: Vec<Edge<u64, f64>> = read_edges(file.path(), b'\t', 1.0).unwrap();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[1], Edge::new(5, 2, 1.0));
}

#[test]
fn test_read_vertices() {
    let file = write_file("1,0.5\n2\n");
    let vertices: Vec<Vertex<u64, f64>> = read_vertices(file.path(), b',', 0.0).unwrap();
    assert_eq!(vertices, vec![Vertex::new(1, 0.5), Vertex::new(2, 0.0)]);
}

#[test]
fn test_malformed_rows_are_rejected() {
    let file = write_file("1,x\n");
    let result: Result<Vec<Edge<u64, f64>>, _> = read_edges(file.path(), b',', 1.0);
    assert!(matches!(result, Err(IterGraphError::InvalidArgument(_))));

    let file = write_file("1\n");
    let result: Result<Vec<Edge<u64, f64>>, _> = read_edges(file.path(), b',', 1.0);
    assert!(matches!(result, Err(IterGraphError::InvalidArgument(_))));
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"1,2\n3,\xff\xfe\n").unwrap();
    file.flush().unwrap();
    let result: Result<Vec<Edge<u64, f64>>, _> = read_edges(file.path(), b',', 1.0);
    assert!(matches!(result, Err(IterGraphError::InvalidArgument(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result: Result<Vec<Edge<u64, f64>>, _> =
        read_edges(dir.path().join("absent.csv"), b',', 1.0);
    assert!(matches!(result, Err(IterGraphError::Io(_))));
}

//! Port numbering.
//!
//! Each node numbers its distinct neighbours in the order they first transacted
//! with it. An edge `(u, v)` gets two ports: the in-port is `u`'s number among
//! `v`'s in-neighbours, the out-port is `v`'s number among `u`'s out-neighbours.

use crate::core::EdgeIndex;
use std::collections::HashMap;

/// Compute `(in_ports, out_ports)` for every edge, as `f32` attribute columns.
///
/// Neighbours are ordered by the earliest timestamp of their edges to the node;
/// edges with equal timestamps keep their position in `edges`.
pub fn port_numbers(
    edges: &EdgeIndex,
    timestamps: &[u64],
    num_nodes: usize,
) -> (Vec<f32>, Vec<f32>) {
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
    for (e, (u, v)) in edges.iter().enumerate() {
        outgoing[u as usize].push(e);
        incoming[v as usize].push(e);
    }

    let in_ports = number_neighbours(&mut incoming, &edges.src, timestamps, edges.len());
    let out_ports = number_neighbours(&mut outgoing, &edges.dst, timestamps, edges.len());
    (in_ports, out_ports)
}

/// For each node's edge list, assign every edge the port of the neighbour at
/// its far end (`neighbour[e]`).
fn number_neighbours(
    adjacency: &mut [Vec<usize>],
    neighbour: &[u64],
    timestamps: &[u64],
    num_edges: usize,
) -> Vec<f32> {
    let mut ports = vec![0.0; num_edges];
    let mut seen: HashMap<u64, usize> = HashMap::new();

    for node_edges in adjacency.iter_mut() {
        if node_edges.is_empty() {
            continue;
        }
        // stable: ties stay in edge order
        node_edges.sort_by_key(|&e| timestamps[e]);

        seen.clear();
        for &e in node_edges.iter() {
            let next = seen.len();
            let port = *seen.entry(neighbour[e]).or_insert(next);
            ports[e] = port as f32;
        }
    }

    ports
}

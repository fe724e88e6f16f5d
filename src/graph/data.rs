//! Homogeneous transaction graph.

use crate::core::{EdgeIndex, Error, Matrix, Result};
use crate::graph::norm::z_norm;
use crate::graph::ports::port_numbers;
use serde::{Deserialize, Serialize};

/// A directed transaction graph with per-edge labels and timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    /// Node feature matrix (`num_nodes x node_features`)
    pub x: Matrix,
    /// Per-edge illicit label
    pub y: Vec<u8>,
    /// Edge endpoints
    pub edge_index: EdgeIndex,
    /// Edge attribute matrix (`num_edges x edge_features`)
    pub edge_attr: Matrix,
    /// Per-edge timestamp in seconds since the ledger's first transaction
    pub timestamps: Vec<u64>,
}

impl GraphData {
    /// Create a graph, checking that all per-edge arrays agree.
    pub fn new(
        x: Matrix,
        y: Vec<u8>,
        edge_index: EdgeIndex,
        edge_attr: Matrix,
        timestamps: Vec<u64>,
    ) -> Result<Self> {
        let m = edge_index.len();
        if y.len() != m || edge_attr.rows() != m || timestamps.len() != m {
            return Err(Error::Shape(format!(
                "{} edges but {} labels, {} attribute rows, {} timestamps",
                m,
                y.len(),
                edge_attr.rows(),
                timestamps.len()
            )));
        }

        let num_nodes = x.rows() as u64;
        if let Some((u, v)) = edge_index.iter().find(|&(u, v)| u >= num_nodes || v >= num_nodes) {
            return Err(Error::Shape(format!(
                "edge ({}, {}) references a node outside [0, {})",
                u, v, num_nodes
            )));
        }

        Ok(Self {
            x,
            y,
            edge_index,
            edge_attr,
            timestamps,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.x.rows()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.len()
    }

    /// Number of edges labeled illicit.
    pub fn illicit_count(&self) -> usize {
        self.y.iter().filter(|&&l| l == 1).count()
    }

    /// Fraction of illicit edges, `None` for an edgeless graph.
    pub fn illicit_ratio(&self) -> Option<f64> {
        if self.y.is_empty() {
            None
        } else {
            Some(self.illicit_count() as f64 / self.y.len() as f64)
        }
    }

    /// Graph over the edges at `inds` (in that order) with all nodes kept.
    /// The result owns copies of the selected data.
    pub fn subset(&self, inds: &[usize]) -> Result<Self> {
        if let Some(&bad) = inds.iter().find(|&&i| i >= self.num_edges()) {
            return Err(Error::Shape(format!(
                "edge index {} out of range for {} edges",
                bad,
                self.num_edges()
            )));
        }

        Ok(Self {
            x: self.x.clone(),
            y: inds.iter().map(|&i| self.y[i]).collect(),
            edge_index: self.edge_index.select(inds),
            edge_attr: self.edge_attr.select_rows(inds),
            timestamps: inds.iter().map(|&i| self.timestamps[i]).collect(),
        })
    }

    /// Append in-port and out-port columns to the edge attributes.
    pub fn add_ports(&mut self) -> Result<()> {
        let (in_ports, out_ports) =
            port_numbers(&self.edge_index, &self.timestamps, self.num_nodes());
        self.edge_attr.append_columns(&[&in_ports, &out_ports])
    }

    /// Z-normalize node features and edge attributes independently.
    pub fn normalize(&mut self) {
        z_norm(&mut self.x);
        z_norm(&mut self.edge_attr);
    }
}

impl std::fmt::Display for GraphData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GraphData(x=[{}, {}], edge_index=[2, {}], edge_attr=[{}, {}], y=[{}], timestamps=[{}])",
            self.x.rows(),
            self.x.cols(),
            self.num_edges(),
            self.edge_attr.rows(),
            self.edge_attr.cols(),
            self.y.len(),
            self.timestamps.len()
        )
    }
}

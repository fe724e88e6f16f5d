//! Heterogeneous conversion for reverse message passing.
//!
//! Each directed edge is kept under the `to` relation and mirrored under
//! `rev_to` with flipped endpoints.

use crate::core::{EdgeIndex, Matrix};
use crate::graph::data::GraphData;
use serde::{Deserialize, Serialize};

/// Edges of one relation type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRelation {
    pub edge_index: EdgeIndex,
    pub edge_attr: Matrix,
    pub timestamps: Vec<u64>,
}

/// Graph with a forward (`to`) and a reverse (`rev_to`) relation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeteroGraph {
    /// Node feature matrix
    pub x: Matrix,
    /// Original edge direction
    pub to: EdgeRelation,
    /// Flipped edges
    pub rev_to: EdgeRelation,
    /// Labels of the `to` edges
    pub y: Vec<u8>,
}

impl HeteroGraph {
    pub fn num_nodes(&self) -> usize {
        self.x.rows()
    }

    /// Number of edges per relation.
    pub fn num_edges(&self) -> usize {
        self.to.edge_index.len()
    }
}

/// Reshape a homogeneous graph into the two-relation form.
///
/// With `ports` set, the last two attribute columns hold in/out ports and are
/// swapped on `rev_to`, since a reversed edge enters where it used to leave.
pub fn create_hetero_obj(graph: GraphData, ports: bool) -> HeteroGraph {
    let GraphData {
        x,
        y,
        edge_index,
        edge_attr,
        timestamps,
    } = graph;

    let mut rev_attr = edge_attr.clone();
    let cols = rev_attr.cols();
    if ports && cols >= 2 {
        rev_attr.swap_columns(cols - 2, cols - 1);
    }

    HeteroGraph {
        x,
        rev_to: EdgeRelation {
            edge_index: edge_index.flipped(),
            edge_attr: rev_attr,
            timestamps: timestamps.clone(),
        },
        to: EdgeRelation {
            edge_index,
            edge_attr,
            timestamps,
        },
        y,
    }
}

/// A prepared split graph, in whichever form the model consumes.
#[derive(Clone, Debug, PartialEq)]
pub enum PreparedGraph {
    Homogeneous(GraphData),
    Heterogeneous(HeteroGraph),
}

impl PreparedGraph {
    /// Wrap `graph`, converting it when reverse message passing is enabled.
    pub fn prepare(graph: GraphData, reverse_mp: bool, ports: bool) -> Self {
        if reverse_mp {
            PreparedGraph::Heterogeneous(create_hetero_obj(graph, ports))
        } else {
            PreparedGraph::Homogeneous(graph)
        }
    }

    pub fn num_nodes(&self) -> usize {
        match self {
            PreparedGraph::Homogeneous(g) => g.num_nodes(),
            PreparedGraph::Heterogeneous(g) => g.num_nodes(),
        }
    }

    pub fn num_edges(&self) -> usize {
        match self {
            PreparedGraph::Homogeneous(g) => g.num_edges(),
            PreparedGraph::Heterogeneous(g) => g.num_edges(),
        }
    }

    pub fn labels(&self) -> &[u8] {
        match self {
            PreparedGraph::Homogeneous(g) => &g.y,
            PreparedGraph::Heterogeneous(g) => &g.y,
        }
    }

    pub fn as_homogeneous(&self) -> Option<&GraphData> {
        match self {
            PreparedGraph::Homogeneous(g) => Some(g),
            PreparedGraph::Heterogeneous(_) => None,
        }
    }

    pub fn as_heterogeneous(&self) -> Option<&HeteroGraph> {
        match self {
            PreparedGraph::Homogeneous(_) => None,
            PreparedGraph::Heterogeneous(g) => Some(g),
        }
    }
}

//! Graph Module
//!
//! Split graph objects and the feature engineering applied to them:
//! - `GraphData` for directed transaction graphs
//! - Port numbering of edges by first-contact order
//! - Z-score normalization of feature matrices
//! - Heterogeneous conversion for reverse message passing

pub mod data;
pub mod hetero;
pub mod norm;
pub mod ports;

pub use data::GraphData;
pub use hetero::{create_hetero_obj, EdgeRelation, HeteroGraph, PreparedGraph};
pub use norm::{column_stats, z_norm, ColumnStats};
pub use ports::port_numbers;

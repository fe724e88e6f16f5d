//! Graph Materializer: builds, engineers and persists each split graph.

use crate::cache::DatasetCache;
use crate::core::{Result, SplitName};
use crate::graph::GraphData;
use crate::ledger::Ledger;
use crate::split::SplitPlan;
use crate::temporal::DayBins;
use tracing::info;

/// Global edge indices of each split's own days.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
    pub test: Vec<usize>,
}

impl SplitIndices {
    /// Gather the edges of each split's days, in day order.
    pub fn from_plan(bins: &DayBins, plan: &SplitPlan) -> Self {
        Self {
            train: bins.gather(&plan.train_days),
            val: bins.gather(&plan.val_days),
            test: bins.gather(&plan.test_days),
        }
    }

    pub fn get(&self, split: SplitName) -> &[usize] {
        match split {
            SplitName::Train => &self.train,
            SplitName::Val => &self.val,
            SplitName::Test => &self.test,
        }
    }

    /// Edges the split's graph is built from.
    ///
    /// Validation sees train and validation edges; test sees the whole ledger.
    /// `None` means every edge in ledger order.
    pub fn graph_edges(&self, split: SplitName) -> Option<Vec<usize>> {
        match split {
            SplitName::Train => Some(self.train.clone()),
            SplitName::Val => {
                let mut edges = Vec::with_capacity(self.train.len() + self.val.len());
                edges.extend_from_slice(&self.train);
                edges.extend_from_slice(&self.val);
                Some(edges)
            }
            SplitName::Test => None,
        }
    }
}

/// Construct one split graph: slice, add ports, normalize.
pub fn build_split_graph(
    ledger: &Ledger,
    inds: &SplitIndices,
    split: SplitName,
    ports: bool,
) -> Result<GraphData> {
    let mut graph = match inds.graph_edges(split) {
        Some(edges) => ledger.graph.subset(&edges)?,
        None => ledger.graph.clone(),
    };

    if ports {
        info!("Adding ports for {} data", split);
        graph.add_ports()?;
    }
    graph.normalize();
    Ok(graph)
}

/// Build and persist the three splits one at a time.
///
/// Each graph is dropped once written, so at most one split is held besides
/// the ledger.
pub fn materialize(
    ledger: &Ledger,
    inds: &SplitIndices,
    cache: &DatasetCache,
    ports: bool,
) -> Result<()> {
    for split in SplitName::ALL {
        info!("Creating {} data", split);
        let graph = build_split_graph(ledger, inds, split, ports)?;
        info!("{} data object: {}", split, graph);
        cache.store_split(split, &graph, inds.get(split))?;
    }
    Ok(())
}

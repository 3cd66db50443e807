//! Serializable form of a dependency graph.

use std::sync::Arc;

use bnd_ir::SharedPackageInterner;
use serde::{Deserialize, Serialize};

use crate::graph::RawVertex;
use crate::DependencyGraph;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageData {
    pub name: String,
    pub contained: bool,
    pub uses: Vec<String>,
    pub private_uses: Vec<String>,
}

/// A dependency graph with names instead of interner handles, so it can
/// be saved by one run and loaded by another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    /// In name order.
    pub packages: Vec<PackageData>,
    pub imports: Vec<String>,
}

impl GraphData {
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        let strings = |names: Vec<Arc<str>>| -> Vec<String> {
            names.iter().map(ToString::to_string).collect()
        };
        GraphData {
            packages: graph
                .to_raw()
                .into_iter()
                .map(|raw| PackageData {
                    name: raw.name.to_string(),
                    contained: raw.contained,
                    uses: strings(raw.uses),
                    private_uses: strings(raw.private_uses),
                })
                .collect(),
            imports: graph
                .import_candidates()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Rebuild the graph, interning names into `interner`.
    pub fn into_graph(self, interner: SharedPackageInterner) -> DependencyGraph {
        let arcs = |names: Vec<String>| -> Vec<Arc<str>> { names.into_iter().map(Arc::from).collect() };
        let raw: Vec<RawVertex> = self
            .packages
            .into_iter()
            .map(|package| RawVertex {
                name: Arc::from(package.name),
                contained: package.contained,
                uses: arcs(package.uses),
                private_uses: arcs(package.private_uses),
            })
            .collect();
        DependencyGraph::from_raw(interner, raw, arcs(self.imports))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

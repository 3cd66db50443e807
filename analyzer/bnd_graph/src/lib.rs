//! Package dependency analysis.
//!
//! ```text
//! ClassSpace ──> DependencyGraphBuilder ──> DependencyGraph ──> analyze_uses ──> UsesReport
//!                                            (API edges only)     (Tarjan SCC)    (sorted uses,
//!                                                                                  cycles, imports)
//! ```
//!
//! Edges come only from references exposed through the API of a class.
//! References from private members and method bodies are kept per package
//! but never turn into `uses` entries. Every list a caller sees is sorted
//! by package name, so two graphs built from the same classes in different
//! orders produce identical reports.

mod cycles;
mod graph;
mod options;

#[cfg(feature = "cache")]
mod data;

pub use cycles::{analyze_uses, tarjan_components, StronglyConnectedComponent, UsesReport};
pub use graph::{build_dependency_graph, DependencyGraph, DependencyGraphBuilder};
pub use options::GraphOptions;

#[cfg(feature = "cache")]
pub use data::{GraphData, PackageData};

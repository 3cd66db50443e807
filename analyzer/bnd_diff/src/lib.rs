//! API and manifest comparison.
//!
//! ```text
//! ClassSpace ──> api_tree ──┐
//!                           ├──> Tree ──> diff(newer, older) ──> Diff ──> Delta ──> Bump
//! UsesReport ──> ManifestModel
//! ```
//!
//! A [`Tree`] describes one version of a bundle as a hierarchy of typed,
//! named elements. [`diff`] matches two trees by `(Type, name)` and assigns
//! every node a [`Delta`] from the per-[`Type`] policy table; a parent is
//! always at least as severe as its children. The root delta maps to the
//! version bump a release needs; [`baseline`] checks that bump against the
//! declared package and bundle versions.

mod api;
mod baseline;
mod delta;
mod engine;
mod kind;
pub mod manifest;
mod tree;
mod version;

#[cfg(feature = "cache")]
mod data;

pub use api::{
    api_tree, bundle_tree, ApiOptions, ApiTreeBuilder, Exports, API_ROOT, VERSION_NODE,
};
pub use baseline::{baseline, Baseline, BundleBaseline, PackageBaseline};
pub use delta::{Bump, Delta};
pub use engine::{diff, Diff, DiffOptions, DiffRef, Presence};
pub use kind::{Policy, Type};
pub use manifest::ManifestModel;
pub use tree::{Element, Tree, TreeRef};
pub use version::Version;

#[cfg(feature = "cache")]
pub use data::{DiffData, TreeData, SNAPSHOT_MAGIC};

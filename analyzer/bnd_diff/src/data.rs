//! Serializable forms of trees and diffs.
//!
//! Children are written in stored order, which is sorted, so equal trees
//! always produce equal bytes. Trees are saved by `bndc snapshot`, diffs by
//! `bndc diff -o`.

use bnd_ir::ensure_sufficient_stack;
use serde::{Deserialize, Serialize};

use crate::engine::DiffNode;
use crate::tree::node_id;
use crate::{Delta, Diff, DiffRef, Element, Policy, Presence, Tree, TreeRef, Type};

/// Magic prefix of snapshot files.
pub const SNAPSHOT_MAGIC: &[u8; 8] = b"BNDSNAP1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeData {
    pub ty: Type,
    pub name: String,
    pub value: Option<String>,
    pub policy: Policy,
    pub children: Vec<TreeData>,
}

impl TreeData {
    pub fn from_tree(tree: &Tree) -> Self {
        Self::from_node(tree.root())
    }

    fn from_node(node: TreeRef<'_>) -> Self {
        ensure_sufficient_stack(|| TreeData {
            ty: node.ty(),
            name: node.name().to_owned(),
            value: node.value().map(str::to_owned),
            policy: node.policy(),
            children: node.children().map(Self::from_node).collect(),
        })
    }

    pub fn into_tree(self) -> Tree {
        Tree::from_element(self.into_element())
    }

    fn into_element(self) -> Element {
        ensure_sufficient_stack(|| Element {
            ty: self.ty,
            name: self.name,
            value: self.value,
            policy: self.policy,
            children: self.children.into_iter().map(Self::into_element).collect(),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// Snapshot file contents: the magic prefix followed by the tree.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, bincode::Error> {
        let mut out = SNAPSHOT_MAGIC.to_vec();
        bincode::serialize_into(&mut out, self)?;
        Ok(out)
    }

    /// `None` when `bytes` does not start with the snapshot magic.
    pub fn from_snapshot(bytes: &[u8]) -> Option<Result<Self, bincode::Error>> {
        bytes
            .strip_prefix(SNAPSHOT_MAGIC.as_slice())
            .map(Self::from_bytes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffData {
    pub ty: Type,
    pub name: String,
    pub presence: Presence,
    pub delta: Delta,
    pub newer: Option<String>,
    pub older: Option<String>,
    pub children: Vec<DiffData>,
}

impl DiffData {
    pub fn from_diff(diff: &Diff) -> Self {
        Self::from_node(diff.root())
    }

    fn from_node(node: DiffRef<'_>) -> Self {
        ensure_sufficient_stack(|| DiffData {
            ty: node.ty(),
            name: node.name().to_owned(),
            presence: node.presence(),
            delta: node.delta(),
            newer: node.newer_value().map(str::to_owned),
            older: node.older_value().map(str::to_owned),
            children: node.children().map(Self::from_node).collect(),
        })
    }

    /// Back to the arena form, nodes in the order [`crate::diff`] creates
    /// them.
    pub fn into_diff(self) -> Diff {
        let mut nodes = Vec::new();
        self.flatten(&mut nodes);
        Diff { nodes }
    }

    fn flatten(self, nodes: &mut Vec<DiffNode>) -> u32 {
        ensure_sufficient_stack(|| {
            let id = nodes.len();
            nodes.push(DiffNode {
                ty: self.ty,
                name: self.name.into_boxed_str(),
                presence: self.presence,
                delta: self.delta,
                newer: self.newer.map(String::into_boxed_str),
                older: self.older.map(String::into_boxed_str),
                children: Vec::new(),
            });
            let children: Vec<u32> = self
                .children
                .into_iter()
                .map(|child| child.flatten(nodes))
                .collect();
            nodes[id].children = children;
            node_id(id)
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

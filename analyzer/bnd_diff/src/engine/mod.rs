//! Structural diff of two trees.
//!
//! Children are matched by `(Type, name)`. Both sides are sorted by that
//! key, so matching is a single merge pass per node. A node's delta is its
//! own change escalated with the deltas of all its children. Below an added
//! or removed node with a structural delta every descendant carries that
//! delta; below a non-structural one each descendant applies its own policy.

use std::fmt;

use bnd_diagnostic::IncomparableTreeError;
use bnd_ir::ensure_sufficient_stack;

use crate::{Bump, Delta, Tree, TreeRef, Type};

/// Options for [`diff`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Node names to exclude. A trailing `*` matches any suffix.
    pub ignore: Vec<String>,
}

impl DiffOptions {
    fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|pattern| match pattern.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => name == pattern,
        })
    }
}

/// Which of the compared trees a node comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Presence {
    Both,
    Added,
    Removed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DiffNode {
    pub(crate) ty: Type,
    pub(crate) name: Box<str>,
    pub(crate) presence: Presence,
    pub(crate) delta: Delta,
    pub(crate) newer: Option<Box<str>>,
    pub(crate) older: Option<Box<str>>,
    pub(crate) children: Vec<u32>,
}

/// Result of comparing two trees. Node 0 is the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diff {
    pub(crate) nodes: Vec<DiffNode>,
}

/// Which sides a node exists on.
#[derive(Copy, Clone)]
enum Side<'t> {
    Both(TreeRef<'t>, TreeRef<'t>),
    Newer(TreeRef<'t>),
    Older(TreeRef<'t>),
}

impl<'t> Side<'t> {
    fn any(self) -> TreeRef<'t> {
        match self {
            Side::Both(newer, _) | Side::Newer(newer) => newer,
            Side::Older(older) => older,
        }
    }

    fn presence(self) -> Presence {
        match self {
            Side::Both(..) => Presence::Both,
            Side::Newer(_) => Presence::Added,
            Side::Older(_) => Presence::Removed,
        }
    }
}

/// The delta an added or removed node imposes on its descendants.
fn passed_down(delta: Delta) -> Option<Delta> {
    (delta == Delta::Ignored || delta.is_structural()).then_some(delta)
}

struct Differ<'o> {
    options: &'o DiffOptions,
    nodes: Vec<DiffNode>,
}

impl Differ<'_> {
    /// Compare one node. `inherited` is set inside ignored subtrees and
    /// below added or removed nodes with a structural delta.
    fn compare(&mut self, side: Side<'_>, inherited: Option<Delta>) -> (u32, Delta) {
        ensure_sufficient_stack(|| {
            let node = side.any();
            let inherited = inherited.or_else(|| {
                self.options
                    .is_ignored(node.name())
                    .then_some(Delta::Ignored)
            });

            let id = self.nodes.len();
            self.nodes.push(DiffNode {
                ty: node.ty(),
                name: node.name().into(),
                presence: side.presence(),
                delta: Delta::Unchanged,
                newer: None,
                older: None,
                children: Vec::new(),
            });

            let mut children = Vec::new();
            let delta = match side {
                Side::Newer(newer) => {
                    let own = inherited.unwrap_or(newer.policy().added);
                    self.nodes[id].newer = newer.value().map(Into::into);
                    let mut delta = own;
                    for child in newer.children() {
                        let (child, child_delta) =
                            self.compare(Side::Newer(child), passed_down(own));
                        children.push(child);
                        delta = delta.escalate(child_delta);
                    }
                    delta
                }
                Side::Older(older) => {
                    let own = inherited.unwrap_or(older.policy().removed);
                    self.nodes[id].older = older.value().map(Into::into);
                    let mut delta = own;
                    for child in older.children() {
                        let (child, child_delta) =
                            self.compare(Side::Older(child), passed_down(own));
                        children.push(child);
                        delta = delta.escalate(child_delta);
                    }
                    delta
                }
                Side::Both(newer, older) => {
                    self.nodes[id].newer = newer.value().map(Into::into);
                    self.nodes[id].older = older.value().map(Into::into);
                    let local = if newer.value() == older.value() {
                        Delta::Unchanged
                    } else {
                        newer.policy().changed
                    };
                    let mut delta = local;
                    for pair in merge(newer, older) {
                        let (child, child_delta) = self.compare(pair, inherited);
                        children.push(child);
                        delta = delta.escalate(child_delta);
                    }
                    inherited.unwrap_or(delta)
                }
            };
            self.nodes[id].delta = delta;
            self.nodes[id].children = children;
            (crate::tree::node_id(id), delta)
        })
    }
}

/// Pair up the children of two matched nodes.
fn merge<'t>(newer: TreeRef<'t>, older: TreeRef<'t>) -> Vec<Side<'t>> {
    let mut newer = newer.children().peekable();
    let mut older = older.children().peekable();
    let mut out = Vec::new();
    loop {
        let side = match (newer.peek(), older.peek()) {
            (None, None) => break,
            (Some(_), None) => newer.next().map(Side::Newer),
            (None, Some(_)) => older.next().map(Side::Older),
            (Some(n), Some(o)) => match (n.ty(), n.name()).cmp(&(o.ty(), o.name())) {
                std::cmp::Ordering::Less => newer.next().map(Side::Newer),
                std::cmp::Ordering::Greater => older.next().map(Side::Older),
                std::cmp::Ordering::Equal => newer.next().zip(older.next()).map(|(n, o)| Side::Both(n, o)),
            },
        };
        out.extend(side);
    }
    out
}

/// Compare `newer` against `older`.
///
/// Fails only when the roots have different types.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(newer = newer.len(), older = older.len())
)]
pub fn diff(newer: &Tree, older: &Tree, options: &DiffOptions) -> Result<Diff, IncomparableTreeError> {
    let (newer_root, older_root) = (newer.root(), older.root());
    if newer.is_empty() || older.is_empty() || newer_root.ty() != older_root.ty() {
        return Err(IncomparableTreeError {
            newer: type_label(newer),
            older: type_label(older),
        });
    }
    let mut differ = Differ {
        options,
        nodes: Vec::with_capacity(newer.len().max(older.len())),
    };
    let (_, delta) = differ.compare(Side::Both(newer_root, older_root), None);
    tracing::debug!(nodes = differ.nodes.len(), %delta, "diff computed");
    Ok(Diff {
        nodes: differ.nodes,
    })
}

fn type_label(tree: &Tree) -> String {
    if tree.is_empty() {
        "empty".to_owned()
    } else {
        tree.root().ty().to_string()
    }
}

impl Diff {
    pub fn root(&self) -> DiffRef<'_> {
        DiffRef { diff: self, id: 0 }
    }

    /// Delta of the whole comparison.
    pub fn delta(&self) -> Delta {
        self.root().delta()
    }

    pub fn required_bump(&self) -> Bump {
        self.delta().required_bump()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in depth-first order, with its depth.
    pub fn walk(&self) -> impl Iterator<Item = (usize, DiffRef<'_>)> + '_ {
        let mut stack = vec![(0, self.root())];
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            let children: Vec<DiffRef<'_>> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|c| (depth + 1, c)));
            Some((depth, node))
        })
    }

    /// Indented rendering. Unless `all` is set, only nodes with a delta
    /// other than `UNCHANGED` or `IGNORED` are shown; their ancestors are
    /// changed too, so the output stays a tree.
    pub fn render(&self, all: bool) -> String {
        use std::fmt::Write as _;
        let mut out = String::new();
        for (depth, node) in self.walk() {
            if !all && matches!(node.delta(), Delta::Unchanged | Delta::Ignored) {
                continue;
            }
            let _ = writeln!(out, "{:indent$}{node}", "", indent = depth * 2);
        }
        out
    }
}

/// A node of a [`Diff`].
#[derive(Copy, Clone)]
pub struct DiffRef<'d> {
    diff: &'d Diff,
    id: u32,
}

impl<'d> DiffRef<'d> {
    fn node(&self) -> &'d DiffNode {
        &self.diff.nodes[self.id as usize]
    }

    pub fn ty(&self) -> Type {
        self.node().ty
    }

    pub fn name(&self) -> &'d str {
        &self.node().name
    }

    pub fn delta(&self) -> Delta {
        self.node().delta
    }

    pub fn presence(&self) -> Presence {
        self.node().presence
    }

    pub fn newer_value(&self) -> Option<&'d str> {
        self.node().newer.as_deref()
    }

    pub fn older_value(&self) -> Option<&'d str> {
        self.node().older.as_deref()
    }

    /// Children in `(Type, name)` order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = DiffRef<'d>> + 'd {
        let diff = self.diff;
        self.node()
            .children
            .iter()
            .map(move |&id| DiffRef { diff, id })
    }

    pub fn child(&self, ty: Type, name: &str) -> Option<DiffRef<'d>> {
        self.children().find(|c| c.ty() == ty && c.name() == name)
    }

    pub fn find(&self, path: &[(Type, &str)]) -> Option<DiffRef<'d>> {
        path.iter()
            .try_fold(*self, |node, &(ty, name)| node.child(ty, name))
    }
}

impl fmt::Display for DiffRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.delta(), self.ty(), self.name())?;
        match (self.older_value(), self.newer_value()) {
            (Some(older), Some(newer)) if older != newer => write!(f, " ({older} -> {newer})"),
            (Some(value), _) | (None, Some(value)) => write!(f, " = {value}"),
            (None, None) => Ok(()),
        }
    }
}

impl fmt::Debug for DiffRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

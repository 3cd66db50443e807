//! Element trees.
//!
//! An [`Element`] is the mutable builder form: any child order, duplicates
//! allowed. [`Tree`] is the frozen form: nodes live in one vector, children
//! are sorted by `(Type, name)` and unique per key. A later duplicate
//! replaces an earlier one, which is how declared members override
//! inherited ones.

use std::fmt;

use bnd_ir::ensure_sufficient_stack;

use crate::{Policy, Type};

/// A node under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub ty: Type,
    pub name: String,
    /// Compared on match; a difference is a content change.
    pub value: Option<String>,
    pub policy: Policy,
    pub children: Vec<Element>,
}

impl Element {
    /// A node with the default policy of its type.
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        let name = name.into();
        let policy = ty.policy(&name, false);
        Element {
            ty,
            name,
            value: None,
            policy,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    fn key(&self) -> (Type, &str) {
        (self.ty, &self.name)
    }
}

/// Sort by key, keeping the last element of every run of equal keys.
fn normalize(mut children: Vec<Element>) -> Vec<Element> {
    children.sort_by(|a, b| a.key().cmp(&b.key()));
    let mut out: Vec<Element> = Vec::with_capacity(children.len());
    for child in children {
        match out.last_mut() {
            Some(last) if last.key() == child.key() => *last = child,
            _ => out.push(child),
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Node {
    ty: Type,
    name: Box<str>,
    value: Option<Box<str>>,
    policy: Policy,
    children: Vec<u32>,
}

/// Frozen element tree. Node 0 is the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn from_element(root: Element) -> Self {
        let mut nodes = Vec::new();
        flatten(&mut nodes, root);
        Tree { nodes }
    }

    pub fn root(&self) -> TreeRef<'_> {
        TreeRef { tree: self, id: 0 }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Back to builder form, children in stored order.
    pub fn to_element(&self) -> Element {
        self.root().to_element()
    }
}

impl From<Element> for Tree {
    fn from(root: Element) -> Self {
        Tree::from_element(root)
    }
}

fn flatten(nodes: &mut Vec<Node>, element: Element) -> u32 {
    ensure_sufficient_stack(|| {
        let id = nodes.len();
        nodes.push(Node {
            ty: element.ty,
            name: element.name.into_boxed_str(),
            value: element.value.map(String::into_boxed_str),
            policy: element.policy,
            children: Vec::new(),
        });
        let children: Vec<u32> = normalize(element.children)
            .into_iter()
            .map(|child| flatten(nodes, child))
            .collect();
        nodes[id].children = children;
        node_id(id)
    })
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "trees are built from one class space and stay far below u32::MAX nodes"
)]
pub(crate) fn node_id(index: usize) -> u32 {
    debug_assert!(u32::try_from(index).is_ok());
    index as u32
}

/// A node of a [`Tree`].
#[derive(Copy, Clone)]
pub struct TreeRef<'t> {
    tree: &'t Tree,
    id: u32,
}

impl<'t> TreeRef<'t> {
    fn node(&self) -> &'t Node {
        &self.tree.nodes[self.id as usize]
    }

    pub fn ty(&self) -> Type {
        self.node().ty
    }

    pub fn name(&self) -> &'t str {
        &self.node().name
    }

    pub fn value(&self) -> Option<&'t str> {
        self.node().value.as_deref()
    }

    pub fn policy(&self) -> Policy {
        self.node().policy
    }

    /// Children sorted by `(Type, name)`.
    pub fn children(&self) -> impl ExactSizeIterator<Item = TreeRef<'t>> + 't {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&id| TreeRef { tree, id })
    }

    pub fn child(&self, ty: Type, name: &str) -> Option<TreeRef<'t>> {
        let tree = self.tree;
        let children = &self.node().children;
        children
            .binary_search_by(|&id| {
                let node = &tree.nodes[id as usize];
                (node.ty, &*node.name).cmp(&(ty, name))
            })
            .ok()
            .map(|i| TreeRef {
                tree,
                id: children[i],
            })
    }

    /// Follow a path of `(Type, name)` keys down from this node.
    pub fn find(&self, path: &[(Type, &str)]) -> Option<TreeRef<'t>> {
        path.iter()
            .try_fold(*self, |node, &(ty, name)| node.child(ty, name))
    }

    pub fn to_element(&self) -> Element {
        ensure_sufficient_stack(|| Element {
            ty: self.ty(),
            name: self.name().to_owned(),
            value: self.value().map(str::to_owned),
            policy: self.policy(),
            children: self.children().map(|c| c.to_element()).collect(),
        })
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        ensure_sufficient_stack(|| {
            write!(f, "{:indent$}{} {}", "", self.ty(), self.name(), indent = depth * 2)?;
            if let Some(value) = self.value() {
                write!(f, " = {value}")?;
            }
            writeln!(f)?;
            for child in self.children() {
                child.render(f, depth + 1)?;
            }
            Ok(())
        })
    }
}

impl fmt::Debug for TreeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty(), self.name())
    }
}

/// One line per node, children indented by two spaces.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        self.root().render(f, 0)
    }
}

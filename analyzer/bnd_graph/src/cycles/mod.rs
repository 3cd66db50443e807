//! Strongly connected components and canonical `uses` lists.

use std::collections::BTreeMap;
use std::sync::Arc;

use bnd_diagnostic::{CyclicPackageWarning, Reporter};
use bnd_ir::PackageRef;

use crate::DependencyGraph;

/// Packages that can all reach each other. Members are in name order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StronglyConnectedComponent {
    members: Vec<PackageRef>,
    names: Vec<Arc<str>>,
}

impl StronglyConnectedComponent {
    pub fn members(&self) -> &[PackageRef] {
        &self.members
    }

    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The graph has no self edges, so only components with more than one
    /// member are cycles.
    pub fn is_cyclic(&self) -> bool {
        self.members.len() > 1
    }

    pub fn contains(&self, package: PackageRef) -> bool {
        self.members.contains(&package)
    }
}

const UNVISITED: usize = usize::MAX;

/// DFS frame: a vertex and the next successor to look at.
struct Frame {
    vertex: usize,
    next: usize,
}

struct Tarjan<'g> {
    graph: &'g DependencyGraph,
    counter: usize,
    index: Vec<usize>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        let n = graph.len();
        Tarjan {
            graph,
            counter: 0,
            index: vec![UNVISITED; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn enter(&mut self, vertex: usize, work: &mut Vec<Frame>) {
        self.index[vertex] = self.counter;
        self.lowlink[vertex] = self.counter;
        self.counter += 1;
        self.stack.push(vertex);
        self.on_stack[vertex] = true;
        work.push(Frame { vertex, next: 0 });
    }

    /// Explicit work stack instead of recursion: package graphs can be deep.
    fn run(mut self) -> Vec<Vec<usize>> {
        let mut work = Vec::new();
        for root in 0..self.graph.len() {
            if self.index[root] != UNVISITED {
                continue;
            }
            self.enter(root, &mut work);

            while let Some(frame) = work.last_mut() {
                let v = frame.vertex;
                let successor = self.graph.successors(v).get(frame.next).copied();
                if let Some(w) = successor {
                    frame.next += 1;
                    if self.index[w] == UNVISITED {
                        self.enter(w, &mut work);
                    } else if self.on_stack[w] {
                        self.lowlink[v] = self.lowlink[v].min(self.index[w]);
                    }
                    continue;
                }

                work.pop();
                if let Some(parent) = work.last() {
                    let p = parent.vertex;
                    self.lowlink[p] = self.lowlink[p].min(self.lowlink[v]);
                }
                if self.lowlink[v] == self.index[v] {
                    let mut component = Vec::new();
                    while let Some(w) = self.stack.pop() {
                        self.on_stack[w] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    component.sort_unstable();
                    self.components.push(component);
                }
            }
        }
        self.components
    }
}

fn components_by_position(graph: &DependencyGraph) -> Vec<Vec<usize>> {
    Tarjan::new(graph).run()
}

/// Partition the graph into strongly connected components.
///
/// Components come out in reverse topological order: a component is listed
/// after every component it uses. Vertices are visited in name order, so
/// the result is the same for every graph with the same edges.
pub fn tarjan_components(graph: &DependencyGraph) -> Vec<StronglyConnectedComponent> {
    components_by_position(graph)
        .into_iter()
        .map(|positions| to_component(graph, &positions))
        .collect()
}

fn to_component(graph: &DependencyGraph, positions: &[usize]) -> StronglyConnectedComponent {
    StronglyConnectedComponent {
        members: positions.iter().map(|&i| graph.package_at(i)).collect(),
        names: positions
            .iter()
            .map(|&i| Arc::clone(graph.name_at(i)))
            .collect(),
    }
}

/// Everything a manifest needs from the dependency analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsesReport {
    components: Vec<StronglyConnectedComponent>,
    /// Position of each vertex's component in `components`.
    component_of: Vec<usize>,
    uses: BTreeMap<Arc<str>, Vec<Arc<str>>>,
    exports: Vec<Arc<str>>,
    imports: Vec<Arc<str>>,
    cycles: Vec<CyclicPackageWarning>,
}

/// Canonical `uses` for every package.
///
/// A package uses everything it references directly and, when it sits in a
/// cycle, everything the rest of its component references plus the other
/// members themselves. Lists are sorted by name, never in discovery order.
#[tracing::instrument(level = "debug", skip_all, fields(packages = graph.len()))]
pub fn analyze_uses(graph: &DependencyGraph) -> UsesReport {
    let by_position = components_by_position(graph);

    let mut component_of = vec![0; graph.len()];
    for (c, members) in by_position.iter().enumerate() {
        for &v in members {
            component_of[v] = c;
        }
    }

    let mut uses = BTreeMap::new();
    for members in &by_position {
        let mut shared: Vec<usize> = members
            .iter()
            .flat_map(|&q| graph.successors(q).iter().copied())
            .chain(members.iter().copied())
            .collect();
        shared.sort_unstable();
        shared.dedup();

        for &p in members {
            let names = shared
                .iter()
                .filter(|&&q| q != p)
                .map(|&q| Arc::clone(graph.name_at(q)))
                .collect();
            uses.insert(Arc::clone(graph.name_at(p)), names);
        }
    }

    let components: Vec<StronglyConnectedComponent> = by_position
        .iter()
        .map(|positions| to_component(graph, positions))
        .collect();
    let cycles: Vec<CyclicPackageWarning> = components
        .iter()
        .filter(|c| c.is_cyclic())
        .map(|c| CyclicPackageWarning {
            packages: c.names().iter().map(ToString::to_string).collect(),
        })
        .collect();
    tracing::debug!(
        components = components.len(),
        cycles = cycles.len(),
        "uses canonicalized"
    );

    UsesReport {
        components,
        component_of,
        uses,
        exports: graph.export_candidates(),
        imports: graph.import_candidates().to_vec(),
        cycles,
    }
}

impl UsesReport {
    /// Components in reverse topological order.
    pub fn components(&self) -> &[StronglyConnectedComponent] {
        &self.components
    }

    /// The component holding `package`, if the graph has that vertex.
    pub fn component_of(
        &self,
        graph: &DependencyGraph,
        package: PackageRef,
    ) -> Option<&StronglyConnectedComponent> {
        let position = graph.position(package)?;
        self.component_of
            .get(position)
            .and_then(|&c| self.components.get(c))
    }

    /// Sorted `uses` of a package. Empty for unknown packages.
    pub fn uses(&self, package: &str) -> &[Arc<str>] {
        self.uses.get(package).map_or(&[][..], Vec::as_slice)
    }

    /// Every package with its `uses`, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<str>])> {
        self.uses
            .iter()
            .map(|(name, uses)| (&**name, uses.as_slice()))
    }

    /// Contained packages, sorted.
    pub fn exports(&self) -> &[Arc<str>] {
        &self.exports
    }

    /// Packages needed from outside, sorted.
    pub fn imports(&self) -> &[Arc<str>] {
        &self.imports
    }

    /// One warning per component with more than one member.
    pub fn cycles(&self) -> &[CyclicPackageWarning] {
        &self.cycles
    }

    /// Report every cycle as a `B1001` warning located at its first member.
    pub fn report_cycles(&self, reporter: &mut Reporter) {
        for cycle in &self.cycles {
            let location = cycle.packages.first().cloned().unwrap_or_default();
            reporter.report_error(cycle, location);
        }
    }
}

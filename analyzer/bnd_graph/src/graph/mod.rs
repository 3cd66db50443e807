//! Package dependency graph.
//!
//! Vertices are stored in package name order and addressed by their
//! position, so adjacency lists sorted by position are also sorted by name.
//! Vertices are created for every contained package and for every edge
//! target; an external target is a vertex with no outgoing edges.

use std::collections::BTreeMap;
use std::sync::Arc;

use bnd_diagnostic::{Diagnostic, ErrorCode, Reporter};
use bnd_ir::{
    is_java_package, ClassDescriptor, ClassSpace, PackageRef, SharedPackageInterner, Visibility,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::GraphOptions;

/// One package as the graph stores it before indexing.
#[derive(Clone, Debug)]
pub(crate) struct RawVertex {
    pub(crate) name: Arc<str>,
    pub(crate) contained: bool,
    pub(crate) uses: Vec<Arc<str>>,
    pub(crate) private_uses: Vec<Arc<str>>,
}

impl RawVertex {
    fn orphan(name: Arc<str>) -> Self {
        RawVertex {
            name,
            contained: false,
            uses: Vec::new(),
            private_uses: Vec::new(),
        }
    }
}

struct Vertex {
    package: PackageRef,
    name: Arc<str>,
    contained: bool,
    /// Positions of used vertices, ascending, never the vertex itself.
    uses: Vec<usize>,
    /// Packages referenced only from non-API code, sorted.
    private_uses: Vec<Arc<str>>,
}

/// Directed "uses" graph between packages. Read-only once built.
pub struct DependencyGraph {
    interner: SharedPackageInterner,
    vertices: Vec<Vertex>,
    index: FxHashMap<PackageRef, usize>,
    imports: Vec<Arc<str>>,
}

impl DependencyGraph {
    /// Index raw vertices. Missing edge targets are added as orphans, self
    /// edges and duplicates are dropped.
    pub(crate) fn from_raw(
        interner: SharedPackageInterner,
        raw: impl IntoIterator<Item = RawVertex>,
        mut imports: Vec<Arc<str>>,
    ) -> Self {
        let mut by_name: BTreeMap<Arc<str>, RawVertex> = BTreeMap::new();
        for vertex in raw {
            match by_name.get_mut(&vertex.name) {
                Some(existing) => {
                    existing.contained |= vertex.contained;
                    existing.uses.extend(vertex.uses);
                    existing.private_uses.extend(vertex.private_uses);
                }
                None => {
                    by_name.insert(Arc::clone(&vertex.name), vertex);
                }
            }
        }

        let targets: Vec<Arc<str>> = by_name
            .values()
            .flat_map(|v| v.uses.iter().cloned())
            .collect();
        for target in targets {
            by_name
                .entry(Arc::clone(&target))
                .or_insert_with(|| RawVertex::orphan(target));
        }

        let position: FxHashMap<Arc<str>, usize> = by_name
            .keys()
            .enumerate()
            .map(|(i, name)| (Arc::clone(name), i))
            .collect();

        let mut vertices = Vec::with_capacity(by_name.len());
        let mut index = FxHashMap::default();
        for (i, raw) in by_name.into_values().enumerate() {
            let mut uses: Vec<usize> = raw
                .uses
                .iter()
                .filter_map(|name| position.get(name).copied())
                .filter(|&j| j != i)
                .collect();
            uses.sort_unstable();
            uses.dedup();

            let mut private_uses = raw.private_uses;
            private_uses.retain(|name| *name != raw.name);
            private_uses.sort();
            private_uses.dedup();

            let package = interner.intern(&raw.name);
            index.insert(package, i);
            vertices.push(Vertex {
                package,
                name: raw.name,
                contained: raw.contained,
                uses,
                private_uses,
            });
        }

        imports.sort();
        imports.dedup();

        DependencyGraph {
            interner,
            vertices,
            index,
            imports,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.vertices.iter().map(|v| v.uses.len()).sum()
    }

    /// Every vertex, in name order.
    pub fn packages(&self) -> impl Iterator<Item = PackageRef> + '_ {
        self.vertices.iter().map(|v| v.package)
    }

    /// The vertex for a dotted package name, if the graph has one.
    pub fn lookup(&self, name: &str) -> Option<PackageRef> {
        self.interner
            .get(name)
            .filter(|package| self.index.contains_key(package))
    }

    pub fn name(&self, package: PackageRef) -> Option<&str> {
        self.vertex(package).map(|v| &*v.name)
    }

    pub fn contains(&self, package: PackageRef) -> bool {
        self.index.contains_key(&package)
    }

    /// Whether the package has classes in the analyzed space.
    pub fn is_contained(&self, package: PackageRef) -> bool {
        self.vertex(package).is_some_and(|v| v.contained)
    }

    /// Packages this package uses directly, in name order.
    pub fn direct_uses(&self, package: PackageRef) -> impl Iterator<Item = PackageRef> + '_ {
        self.vertex(package)
            .into_iter()
            .flat_map(|v| v.uses.iter().map(|&j| self.vertices[j].package))
    }

    /// Packages referenced only from private members or method bodies.
    pub fn private_uses(&self, package: PackageRef) -> &[Arc<str>] {
        match self.vertex(package) {
            Some(vertex) => &vertex.private_uses,
            None => &[],
        }
    }

    /// Contained packages, sorted. These are the packages a bundle could export.
    pub fn export_candidates(&self) -> Vec<Arc<str>> {
        self.vertices
            .iter()
            .filter(|v| v.contained)
            .map(|v| Arc::clone(&v.name))
            .collect()
    }

    /// Referenced packages outside the analyzed space, sorted. Includes
    /// packages referenced only privately, since the bundle needs them at
    /// runtime all the same.
    pub fn import_candidates(&self) -> &[Arc<str>] {
        &self.imports
    }

    fn vertex(&self, package: PackageRef) -> Option<&Vertex> {
        self.index.get(&package).map(|&i| &self.vertices[i])
    }

    pub(crate) fn successors(&self, position: usize) -> &[usize] {
        &self.vertices[position].uses
    }

    pub(crate) fn package_at(&self, position: usize) -> PackageRef {
        self.vertices[position].package
    }

    pub(crate) fn name_at(&self, position: usize) -> &Arc<str> {
        &self.vertices[position].name
    }

    pub(crate) fn position(&self, package: PackageRef) -> Option<usize> {
        self.index.get(&package).copied()
    }

    #[cfg(feature = "cache")]
    pub(crate) fn to_raw(&self) -> Vec<RawVertex> {
        self.vertices
            .iter()
            .map(|v| RawVertex {
                name: Arc::clone(&v.name),
                contained: v.contained,
                uses: v
                    .uses
                    .iter()
                    .map(|&j| Arc::clone(&self.vertices[j].name))
                    .collect(),
                private_uses: v.private_uses.clone(),
            })
            .collect()
    }
}

/// Accumulates package references, then freezes them into a graph.
///
/// Insertion order never matters: references are collected into sets and
/// the graph is indexed by name.
pub struct DependencyGraphBuilder {
    interner: SharedPackageInterner,
    options: GraphOptions,
    contained: FxHashSet<PackageRef>,
    api: FxHashMap<PackageRef, FxHashSet<PackageRef>>,
    private: FxHashMap<PackageRef, FxHashSet<PackageRef>>,
    default_package: Vec<String>,
}

impl DependencyGraphBuilder {
    pub fn new(interner: SharedPackageInterner, options: GraphOptions) -> Self {
        DependencyGraphBuilder {
            interner,
            options,
            contained: FxHashSet::default(),
            api: FxHashMap::default(),
            private: FxHashMap::default(),
            default_package: Vec::new(),
        }
    }

    /// Mark a package as part of the analyzed space.
    pub fn add_package(&mut self, name: &str) -> PackageRef {
        let package = self.interner.intern(name);
        self.contained.insert(package);
        package
    }

    /// Record every reference a class makes.
    ///
    /// Classes in the default package cannot take part in package
    /// dependencies; they are remembered for a warning and otherwise skipped.
    pub fn add_class(&mut self, class: &ClassDescriptor) {
        if class.name.in_default_package() {
            self.default_package.push(class.name.fqn());
            return;
        }
        let source = self.add_package(&class.package_fqn());
        for reference in class.symbolic_references() {
            if reference.target.in_default_package() {
                continue;
            }
            self.record(source, &reference.target.package_fqn(), reference.visibility);
        }
    }

    /// Record one package level reference. The source becomes a contained
    /// package.
    pub fn add_reference(&mut self, source: &str, target: &str, visibility: Visibility) {
        let source = self.add_package(source);
        self.record(source, target, visibility);
    }

    fn record(&mut self, source: PackageRef, target: &str, visibility: Visibility) {
        let target = self.interner.intern(target);
        if target == source {
            return;
        }
        let table = match visibility {
            Visibility::Api => &mut self.api,
            Visibility::Private => &mut self.private,
        };
        table.entry(source).or_default().insert(target);
    }

    /// Freeze into a graph. Default package classes are reported as
    /// `B1002` warnings.
    #[tracing::instrument(level = "debug", skip_all, fields(packages = self.contained.len()))]
    pub fn build(self, reporter: &mut Reporter) -> DependencyGraph {
        for class in &self.default_package {
            reporter.report(
                Diagnostic::new(ErrorCode::B1002)
                    .with_message(format!("class `{class}` is in the default package"))
                    .at(class.clone()),
            );
        }

        let interner = &self.interner;
        let options = self.options;
        let contained = &self.contained;
        let is_java = |package: PackageRef| is_java_package(&interner.lookup(package));
        let admit = |package: PackageRef| {
            (options.include_java || !is_java(package))
                && (options.include_external || contained.contains(&package))
        };

        let mut imports = Vec::new();
        for targets in self.api.values().chain(self.private.values()) {
            for &target in targets {
                if !contained.contains(&target) && !is_java(target) {
                    imports.push(interner.lookup(target));
                }
            }
        }

        let empty = FxHashSet::default();
        let sources: FxHashSet<PackageRef> = contained
            .iter()
            .chain(self.api.keys())
            .chain(self.private.keys())
            .copied()
            .collect();
        let raw: Vec<RawVertex> = sources
            .into_iter()
            .map(|source| {
                let api = self.api.get(&source).unwrap_or(&empty);
                let private = self.private.get(&source).unwrap_or(&empty);
                RawVertex {
                    name: interner.lookup(source),
                    contained: contained.contains(&source),
                    uses: api
                        .iter()
                        .copied()
                        .filter(|&t| admit(t))
                        .map(|t| interner.lookup(t))
                        .collect(),
                    private_uses: private
                        .iter()
                        .copied()
                        .filter(|&t| admit(t) && !api.contains(&t))
                        .map(|t| interner.lookup(t))
                        .collect(),
                }
            })
            .collect();

        let graph = DependencyGraph::from_raw(self.interner.clone(), raw, imports);
        tracing::debug!(
            vertices = graph.len(),
            edges = graph.edge_count(),
            imports = graph.import_candidates().len(),
            "dependency graph built"
        );
        graph
    }
}

/// Build the graph for a whole class space.
pub fn build_dependency_graph(
    space: &ClassSpace,
    interner: &SharedPackageInterner,
    options: GraphOptions,
    reporter: &mut Reporter,
) -> DependencyGraph {
    let mut builder = DependencyGraphBuilder::new(interner.clone(), options);
    for class in space {
        builder.add_class(class);
    }
    builder.build(reporter)
}

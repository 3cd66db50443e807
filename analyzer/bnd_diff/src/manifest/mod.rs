//! Manifest model and its tree.
//!
//! Headers are either plain values or lists of clauses with parameters.
//! Rendering header text is left to the caller; only the structure is
//! compared.

use std::collections::BTreeMap;

use bnd_graph::UsesReport;

use crate::{Delta, Element, Exports, Policy, Type};

/// Name of the `MANIFEST` root node.
pub const MANIFEST_ROOT: &str = "<manifest>";

/// Headers that change on every build.
const VOLATILE_HEADERS: [&str; 3] = ["Tool", "Bnd-LastModified", "Created-By"];

pub const BUNDLE_VERSION: &str = "Bundle-Version";
pub const EXPORT_PACKAGE: &str = "Export-Package";
pub const IMPORT_PACKAGE: &str = "Import-Package";
pub const USES_DIRECTIVE: &str = "uses:";
pub const VERSION_ATTRIBUTE: &str = "version";

/// One clause of a header: a name plus attributes and directives.
/// Directive keys end in `:`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    pub name: String,
    pub parameters: Vec<(String, String)>,
}

impl Clause {
    pub fn new(name: impl Into<String>) -> Self {
        Clause {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    Clauses(Vec<Clause>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManifestModel {
    headers: BTreeMap<String, HeaderValue>,
}

impl ManifestModel {
    pub fn new() -> Self {
        ManifestModel::default()
    }

    /// Set a plain header, replacing any previous value.
    pub fn set(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(header.into(), HeaderValue::Text(value.into()));
    }

    /// Append a clause. A plain value under the same header is replaced.
    pub fn add_clause(&mut self, header: impl Into<String>, clause: Clause) {
        let slot = self
            .headers
            .entry(header.into())
            .or_insert_with(|| HeaderValue::Clauses(Vec::new()));
        match slot {
            HeaderValue::Clauses(clauses) => clauses.push(clause),
            HeaderValue::Text(_) => *slot = HeaderValue::Clauses(vec![clause]),
        }
    }

    pub fn get(&self, header: &str) -> Option<&HeaderValue> {
        self.headers.get(header)
    }

    pub fn clauses(&self, header: &str) -> &[Clause] {
        match self.headers.get(header) {
            Some(HeaderValue::Clauses(clauses)) => clauses,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// `Export-Package` and `Import-Package` from a dependency analysis.
    ///
    /// Exports are restricted to `exports` unless it is empty, and carry the
    /// export version and the package's `uses:` directive when non-empty.
    pub fn from_uses(report: &UsesReport, exports: &Exports) -> Self {
        let mut model = ManifestModel::new();
        for package in report.exports() {
            if !exports.is_empty() && !exports.contains(package) {
                continue;
            }
            let mut clause = Clause::new(&**package);
            if let Some(version) = exports.version(package) {
                clause = clause.with(VERSION_ATTRIBUTE, version);
            }
            let uses = report.uses(package);
            if !uses.is_empty() {
                let joined: Vec<&str> = uses.iter().map(|u| &**u).collect();
                clause = clause.with(USES_DIRECTIVE, joined.join(","));
            }
            model.add_clause(EXPORT_PACKAGE, clause);
        }
        for package in report.imports() {
            model.add_clause(IMPORT_PACKAGE, Clause::new(&**package));
        }
        model
    }

    /// `MANIFEST → HEADER → CLAUSE → PARAMETER`, without volatile headers.
    ///
    /// Dropping a clause list drops every clause in it, so such a header is
    /// `REMOVED` when it disappears. A plain header is only `CHANGED`.
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(Type::Manifest, MANIFEST_ROOT);
        for (header, value) in &self.headers {
            if is_volatile(header) {
                continue;
            }
            let element = Element::new(Type::Header, header.as_str());
            root.push(match value {
                HeaderValue::Text(text) => element.with_value(text.trim()),
                HeaderValue::Clauses(clauses) => {
                    let policy = Policy {
                        removed: Delta::Removed,
                        ..element.policy
                    };
                    element
                        .with_policy(policy)
                        .with_children(clauses.iter().map(clause_element))
                }
            });
        }
        root
    }
}

fn is_volatile(header: &str) -> bool {
    VOLATILE_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(header))
}

fn clause_element(clause: &Clause) -> Element {
    Element::new(Type::Clause, clause.name.trim()).with_children(clause.parameters.iter().map(
        |(key, value)| {
            Element::new(Type::Parameter, key.trim()).with_value(normalize(key.trim(), value))
        },
    ))
}

/// `uses:` is a set: declaration order and repeats carry no meaning.
fn normalize(key: &str, value: &str) -> String {
    if key != USES_DIRECTIVE {
        return value.trim().to_owned();
    }
    let mut packages: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    packages.sort_unstable();
    packages.dedup();
    packages.join(",")
}

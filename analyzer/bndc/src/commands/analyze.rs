//! The `analyze` command: package uses, imports and cycles of a class
//! directory.

use std::fmt::Write as _;
use std::path::Path;

use bnd_diff::manifest::{Clause, EXPORT_PACKAGE, IMPORT_PACKAGE};
use bnd_diff::ManifestModel;
use bnd_graph::{analyze_uses, build_dependency_graph};
use bnd_ir::SharedPackageInterner;

use super::Outcome;
use crate::input::load_class_space;
use crate::CliOptions;

/// `name;key="value";...` in header syntax.
fn clause_text(clause: &Clause) -> String {
    let mut text = clause.name.clone();
    for (key, value) in &clause.parameters {
        let _ = write!(text, ";{key}=\"{value}\"");
    }
    text
}

/// Print the generated `Export-Package` and `Import-Package` clauses.
///
/// Cycles are reported as warnings; any error diagnostic fails the run.
pub fn analyze(dir: &Path, options: &CliOptions) -> Outcome {
    let mut reporter = options.reporter();
    let space = load_class_space(dir, options.jobs, &mut reporter);
    let interner = SharedPackageInterner::new();
    let graph = build_dependency_graph(&space, &interner, options.graph_options(), &mut reporter);
    let report = analyze_uses(&graph);
    report.report_cycles(&mut reporter);

    let manifest = ManifestModel::from_uses(&report, &options.exports);
    let mut out = String::new();
    for header in [EXPORT_PACKAGE, IMPORT_PACKAGE] {
        let clauses = manifest.clauses(header);
        if clauses.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{header}:");
        for clause in clauses {
            let _ = writeln!(out, "  {}", clause_text(clause));
        }
    }
    let _ = writeln!(
        out,
        "classes: {}, packages: {}, cycles: {}",
        space.len(),
        report.exports().len(),
        report.cycles().len()
    );
    Outcome::finish(out, reporter)
}

//! Command handlers for the `bndc` CLI.
//!
//! Each submodule implements one command. Handlers never print; they
//! return an [`Outcome`] that `main` writes out.

use std::path::Path;

use bnd_diagnostic::{Diagnostic, Reporter};
use bnd_diff::manifest::BUNDLE_VERSION;
use bnd_diff::{bundle_tree, ManifestModel, Tree};
use bnd_graph::{analyze_uses, build_dependency_graph};
use bnd_ir::SharedPackageInterner;

use crate::input::load_class_space;
use crate::CliOptions;

mod analyze;
mod diff;
mod dump;
mod explain;
mod snapshot;

pub use analyze::analyze;
pub use diff::diff;
pub use dump::{describe_class, dump};
pub use explain::explain;
pub use snapshot::snapshot;

/// What a command produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Text for standard output.
    pub stdout: String,
    /// Sorted diagnostics for standard error.
    pub diagnostics: Vec<Diagnostic>,
    /// Set when any diagnostic is an error.
    pub failed: bool,
}

impl Outcome {
    fn finish(stdout: String, mut reporter: Reporter) -> Self {
        let failed = reporter.has_errors();
        Outcome {
            stdout,
            diagnostics: reporter.flush(),
            failed,
        }
    }

    /// A command that failed before doing any work.
    pub fn rejected(diagnostic: Diagnostic) -> Self {
        let mut reporter = Reporter::new();
        reporter.report(diagnostic);
        Self::finish(String::new(), reporter)
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(self.failed)
    }
}

/// The `BUNDLE` tree of a class directory: its API plus the manifest a
/// dependency analysis would generate for it.
pub(crate) fn directory_tree(dir: &Path, options: &CliOptions, reporter: &mut Reporter) -> Tree {
    let space = load_class_space(dir, options.jobs, reporter);
    let interner = SharedPackageInterner::new();
    let graph = build_dependency_graph(&space, &interner, options.graph_options(), reporter);
    let report = analyze_uses(&graph);
    let mut manifest = ManifestModel::from_uses(&report, &options.exports);
    if let Some(version) = &options.bundle_version {
        manifest.set(BUNDLE_VERSION, version.as_str());
    }
    bundle_tree(&space, &options.api_options(), &manifest)
}

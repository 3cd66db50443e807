//! The `snapshot` command: save the tree of a class directory for later
//! comparison.

use std::fs;
use std::path::Path;

use bnd_diagnostic::{Diagnostic, ErrorCode};
use bnd_diff::TreeData;

use super::{directory_tree, Outcome};
use crate::CliOptions;

/// Write the `BUNDLE` tree of `dir` to `options.output`.
///
/// Nothing is written when reading the classes produced errors.
pub fn snapshot(dir: &Path, options: &CliOptions) -> Outcome {
    let Some(output) = &options.output else {
        return Outcome::rejected(
            Diagnostic::new(ErrorCode::B9001).with_message("`snapshot` needs `-o <file>`"),
        );
    };

    let mut reporter = options.reporter();
    let tree = directory_tree(dir, options, &mut reporter);
    if reporter.has_errors() {
        return Outcome::finish(String::new(), reporter);
    }

    let location = output.display().to_string();
    let written = match TreeData::from_tree(&tree).to_snapshot() {
        Ok(bytes) => fs::write(output, bytes).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let stdout = match written {
        Ok(()) => {
            tracing::debug!(nodes = tree.len(), %location, "snapshot written");
            format!("wrote {} nodes to {location}\n", tree.len())
        }
        Err(error) => {
            reporter.report(
                Diagnostic::new(ErrorCode::B9003)
                    .with_message(format!("cannot write snapshot: {error}"))
                    .at(location),
            );
            String::new()
        }
    };
    Outcome::finish(stdout, reporter)
}

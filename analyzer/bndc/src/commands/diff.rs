//! The `diff` command: baseline a newer bundle against an older one.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use bnd_diagnostic::{Diagnostic, ErrorCode, Reporter};
use bnd_diff::{Diff, DiffData, Tree, TreeData};

use super::{directory_tree, Outcome};
use crate::CliOptions;

/// A class directory, or a snapshot written by `snapshot`.
fn load_tree(path: &Path, options: &CliOptions, reporter: &mut Reporter) -> Option<Tree> {
    if !path.is_file() || path.extension().is_some_and(|e| e == "class") {
        return Some(directory_tree(path, options, reporter));
    }

    let location = path.display().to_string();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            reporter.report(
                Diagnostic::new(ErrorCode::B0010)
                    .with_message(format!("cannot read {location}: {error}"))
                    .at(location),
            );
            return None;
        }
    };
    match TreeData::from_snapshot(&bytes) {
        Some(Ok(data)) => Some(data.into_tree()),
        Some(Err(error)) => {
            reporter.report(
                Diagnostic::new(ErrorCode::B2002)
                    .with_message(format!("cannot decode snapshot: {error}"))
                    .at(location),
            );
            None
        }
        None => {
            reporter.report(
                Diagnostic::new(ErrorCode::B2002)
                    .with_message("not a snapshot file")
                    .at(location)
                    .with_note("pass a class directory or the output of `bndc snapshot`"),
            );
            None
        }
    }
}

/// Save the diff in its serialized form.
fn write_diff(diff: &Diff, output: &Path, reporter: &mut Reporter) {
    let location = output.display().to_string();
    let written = match DiffData::from_diff(diff).to_bytes() {
        Ok(bytes) => fs::write(output, bytes).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    match written {
        Ok(()) => tracing::debug!(nodes = diff.len(), %location, "diff written"),
        Err(error) => {
            reporter.report(
                Diagnostic::new(ErrorCode::B9003)
                    .with_message(format!("cannot write diff: {error}"))
                    .at(location),
            );
        }
    }
}

/// Print the changed part of the delta tree, the baseline of versioned
/// packages, the overall delta and the version bump it requires.
///
/// The older side is read with [`CliOptions::older`]. A declared version
/// too low for its changes fails the run.
pub fn diff(newer: &Path, older: &Path, options: &CliOptions) -> Outcome {
    let mut reporter = options.reporter();
    let newer_tree = load_tree(newer, options, &mut reporter);
    let older_tree = load_tree(older, &options.older(), &mut reporter);
    let (Some(newer_tree), Some(older_tree)) = (newer_tree, older_tree) else {
        return Outcome::finish(String::new(), reporter);
    };

    let mut out = String::new();
    match bnd_diff::diff(&newer_tree, &older_tree, &options.diff_options()) {
        Ok(diff) => {
            out.push_str(&diff.render(options.all));
            let baseline = bnd_diff::baseline(&diff);
            baseline.report(&mut reporter);
            out.push_str(&baseline.render());
            let _ = writeln!(out, "delta: {}", diff.delta());
            let _ = writeln!(out, "bump: {}", diff.required_bump());
            if let Some(output) = &options.output {
                write_diff(&diff, output, &mut reporter);
            }
        }
        Err(error) => {
            reporter.report_error(&error, format!("{} <> {}", newer.display(), older.display()));
        }
    }
    Outcome::finish(out, reporter)
}

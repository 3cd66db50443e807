//! Finding and reading class files.
//!
//! Files are read and parsed on a scoped rayon pool; the results are put
//! back in path order before the class space is assembled, so the output
//! never depends on scheduling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bnd_classfile::{assemble_class_space, read_class};
use bnd_diagnostic::{Diagnostic, ErrorCode, MalformedClassError, Reporter};
use bnd_ir::{ClassDescriptor, ClassSpace};
use rayon::prelude::*;

/// All `.class` files under `root`, sorted by path.
///
/// A `root` that is itself a class file yields just that file. Hidden
/// entries are skipped. Subdirectories that cannot be listed are skipped
/// with a warning; only a failure to list `root` is an error.
pub fn discover_class_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if is_class_file(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(root)?.flatten() {
        visit(entry.path(), &mut files);
    }
    files.sort();
    Ok(files)
}

fn visit(path: PathBuf, files: &mut Vec<PathBuf>) {
    if path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.'))
    {
        return;
    }

    if path.is_dir() {
        match fs::read_dir(&path) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    visit(entry.path(), files);
                }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable directory");
            }
        }
    } else if is_class_file(&path) {
        files.push(path);
    }
}

fn is_class_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "class")
}

/// How a file shows up in diagnostics: relative to the input root, with
/// `/` separators.
fn label(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        _ => path.display().to_string(),
    }
}

type ReadResult = (String, io::Result<Result<ClassDescriptor, MalformedClassError>>);

fn read_one(root: &Path, path: &Path) -> ReadResult {
    (
        label(root, path),
        fs::read(path).map(|bytes| read_class(&bytes)),
    )
}

/// Read and parse `files`, keeping their order.
fn read_files(root: &Path, files: &[PathBuf], jobs: Option<usize>) -> Vec<ReadResult> {
    let sequential = || -> Vec<ReadResult> {
        files.iter().map(|path| read_one(root, path)).collect()
    };
    if jobs == Some(1) || files.len() < 2 {
        return sequential();
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        builder = builder.num_threads(jobs);
    }
    builder
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| {
                files
                    .par_iter()
                    .map(|path| read_one(root, path))
                    .collect::<Vec<_>>()
            })
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), reading sequentially");
            sequential()
        })
}

/// Read every class file under `root` into one class space.
///
/// Unreadable files (`B0010`) and malformed classes are reported and left
/// out. An input without any class file is a `B9002` warning.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root.display(), jobs = ?jobs))]
pub fn load_class_space(root: &Path, jobs: Option<usize>, reporter: &mut Reporter) -> ClassSpace {
    let files = match discover_class_files(root) {
        Ok(files) => files,
        Err(error) => {
            reporter.report(
                Diagnostic::new(ErrorCode::B0010)
                    .with_message(format!("cannot list {}: {error}", root.display()))
                    .at(root.display().to_string()),
            );
            return ClassSpace::new();
        }
    };
    if files.is_empty() {
        reporter.report(
            Diagnostic::new(ErrorCode::B9002)
                .with_message(format!("no class files found in {}", root.display()))
                .at(root.display().to_string()),
        );
        return ClassSpace::new();
    }
    tracing::debug!(files = files.len(), "class files discovered");

    let mut parsed = Vec::with_capacity(files.len());
    for (label, result) in read_files(root, &files, jobs) {
        match result {
            Ok(result) => parsed.push((label, result)),
            Err(error) => {
                tracing::warn!(path = %label, %error, "skipping unreadable file");
                reporter.report(
                    Diagnostic::new(ErrorCode::B0010)
                        .with_message(format!("cannot read {label}: {error}"))
                        .at(label),
                );
            }
        }
    }
    assemble_class_space(parsed, reporter)
}

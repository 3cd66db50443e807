//! Reading many class files into one `ClassSpace`.

use std::collections::HashMap;

use bnd_diagnostic::{Diagnostic, ErrorCode, MalformedClassError, Reporter};
use bnd_ir::{ClassDescriptor, ClassSpace};

use crate::read_class;

/// Read every `(path, bytes)` input into a class space.
///
/// A malformed class is reported against its path and left out; the rest
/// of the space is still read.
pub fn read_class_space<I, P, B>(inputs: I, reporter: &mut Reporter) -> ClassSpace
where
    I: IntoIterator<Item = (P, B)>,
    P: AsRef<str>,
    B: AsRef<[u8]>,
{
    assemble_class_space(
        inputs
            .into_iter()
            .map(|(path, bytes)| (path.as_ref().to_owned(), read_class(bytes.as_ref()))),
        reporter,
    )
}

/// Collect already parsed results, in input order.
///
/// This is the sequential half of `read_class_space`, for callers that
/// parse in parallel. When two inputs define the same class the later one
/// wins and a duplicate warning names both paths.
#[tracing::instrument(level = "debug", skip_all)]
pub fn assemble_class_space<I>(results: I, reporter: &mut Reporter) -> ClassSpace
where
    I: IntoIterator<Item = (String, Result<ClassDescriptor, MalformedClassError>)>,
{
    let mut space = ClassSpace::new();
    let mut origins = HashMap::new();
    let mut failed = 0usize;

    for (path, result) in results {
        match result {
            Ok(class) => {
                let name = class.name.clone();
                if space.insert(class).is_some() {
                    let first = origins.get(&name).cloned().unwrap_or_default();
                    reporter.report(
                        Diagnostic::new(ErrorCode::B0009)
                            .with_message(format!("class `{name}` is defined more than once"))
                            .at(path.clone())
                            .with_note(format!("previous definition in {first}")),
                    );
                }
                origins.insert(name, path);
            }
            Err(error) => {
                failed += 1;
                tracing::warn!(%path, %error, "skipping malformed class");
                reporter.report_error(&error, path);
            }
        }
    }

    tracing::debug!(classes = space.len(), failed, "class space assembled");
    space
}

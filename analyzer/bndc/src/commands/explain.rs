//! The `explain` command: display documentation for diagnostic codes.

use bnd_diagnostic::{Diagnostic, ErrorCode, ErrorDocs};

use super::Outcome;

/// Long-form documentation when written, the one-line summary otherwise.
pub fn explain(code_str: &str) -> Outcome {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        return Outcome::rejected(
            Diagnostic::new(ErrorCode::B9001)
                .with_message(format!("unknown error code `{code_str}`"))
                .with_note("codes have the format BXXXX, for example B0001 or B1001"),
        );
    };

    let stdout = match ErrorDocs::get(code) {
        Some(doc) => doc.to_owned(),
        None => format!("# {code}: {}\n", code.summary()),
    };
    Outcome {
        stdout,
        ..Outcome::default()
    }
}

//! Embedded error documentation for `bndc explain`.
//!
//! Each documented code has a markdown file in this directory, embedded at
//! compile time.

use crate::ErrorCode;

/// Registry of embedded error documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Markdown documentation for a code, if any was written.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }

    pub fn has_docs(code: ErrorCode) -> bool {
        DOCS.iter().any(|(c, _)| *c == code)
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    // Reader
    (ErrorCode::B0001, include_str!("B0001.md")),
    (ErrorCode::B0002, include_str!("B0002.md")),
    (ErrorCode::B0003, include_str!("B0003.md")),
    (ErrorCode::B0009, include_str!("B0009.md")),
    // Graph
    (ErrorCode::B1001, include_str!("B1001.md")),
    (ErrorCode::B1002, include_str!("B1002.md")),
    // Diff
    (ErrorCode::B2001, include_str!("B2001.md")),
    (ErrorCode::B2002, include_str!("B2002.md")),
    (ErrorCode::B2003, include_str!("B2003.md")),
];

//! Diagnostics for the bundle analyzer.
//!
//! - `ErrorCode`: stable, searchable codes (`B0001`) grouped by stage
//! - `Diagnostic`: a rendered problem with severity and location
//! - `Reporter`: collects diagnostics with an error limit
//! - typed errors (`MalformedClassError`, `IncomparableTreeError`,
//!   `VersionMismatchError`, `CyclicPackageWarning`) that convert into
//!   diagnostics
//! - `ErrorDocs`: long-form explanations for `bndc explain`

mod diagnostic;
mod docs;
mod error_code;
mod errors;
pub mod reporter;

pub use diagnostic::{Diagnostic, Severity};
pub use docs::ErrorDocs;
pub use error_code::{ErrorCode, UnknownErrorCode};
pub use errors::{
    CyclicPackageWarning, HasErrorCode, IncomparableTreeError, InvalidVersionError,
    MalformedClassError, VersionMismatchError,
};
pub use reporter::{Reporter, ReporterConfig};

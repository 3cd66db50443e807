//! Diagnostic collection for one analyzer run.
//!
//! Features:
//! - Error limit to stop runaway reporting on a corrupt input
//! - Optional promotion of warnings to errors
//! - Exact-duplicate suppression (the same class reported twice)
//! - Deterministic output order regardless of worker scheduling

use crate::{Diagnostic, ErrorCode, HasErrorCode, Severity};

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ReporterConfig {
    /// Maximum number of errors before further errors are dropped (0 = unlimited).
    pub error_limit: usize,
    /// Report warnings as errors.
    pub warnings_as_errors: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        ReporterConfig {
            error_limit: 50,
            warnings_as_errors: false,
        }
    }
}

impl ReporterConfig {
    /// A config with no limits (for testing).
    pub fn unlimited() -> Self {
        ReporterConfig {
            error_limit: 0,
            warnings_as_errors: false,
        }
    }
}

/// Collects diagnostics.
///
/// Readers and analyzers report through `&mut Reporter`; the driver flushes
/// it once per command and decides the exit status from `has_errors`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    /// Errors dropped because the limit was reached.
    suppressed: usize,
    config: ReporterConfig,
}

impl Reporter {
    pub fn new() -> Self {
        Self::with_config(ReporterConfig::default())
    }

    pub fn with_config(config: ReporterConfig) -> Self {
        Reporter {
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
            suppressed: 0,
            config,
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if the diagnostic was kept, `false` if it was a
    /// duplicate or the error limit was reached.
    pub fn report(&mut self, mut diag: Diagnostic) -> bool {
        if self.config.warnings_as_errors && diag.severity == Severity::Warning {
            diag.severity = Severity::Error;
        }

        if diag.is_error() && self.limit_reached() {
            self.suppressed += 1;
            return false;
        }

        if self.diagnostics.contains(&diag) {
            return false;
        }

        match diag.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diag);
        true
    }

    /// Report a typed error, attaching `location`.
    pub fn report_error<E: HasErrorCode>(&mut self, error: &E, location: impl Into<String>) -> bool {
        self.report(error.to_diagnostic().at(location))
    }

    /// Shorthand for a diagnostic with a code and message.
    pub fn emit(&mut self, code: ErrorCode, message: impl Into<String>) -> bool {
        self.report(Diagnostic::new(code).with_message(message))
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Merge diagnostics collected by another reporter (e.g. a worker).
    pub fn absorb(&mut self, other: Reporter) {
        self.suppressed += other.suppressed;
        for diag in other.diagnostics {
            self.report(diag);
        }
    }

    /// Return diagnostics sorted by severity, location and code, and clear
    /// the reporter.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        out.sort_by(|a, b| {
            (a.severity, &a.location, a.code.as_str(), &a.message).cmp(&(
                b.severity,
                &b.location,
                b.code.as_str(),
                &b.message,
            ))
        });
        self.error_count = 0;
        self.warning_count = 0;
        self.suppressed = 0;
        out
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests;

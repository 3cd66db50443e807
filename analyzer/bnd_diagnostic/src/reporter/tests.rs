use super::*;
use pretty_assertions::assert_eq;

fn truncated(at: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::B0001).at(at)
}

#[test]
fn test_counts_by_severity() {
    let mut reporter = Reporter::with_config(ReporterConfig::unlimited());
    reporter.report(truncated("a.class"));
    reporter.report(Diagnostic::warning(ErrorCode::B1001));
    assert_eq!(reporter.error_count(), 1);
    assert_eq!(reporter.warning_count(), 1);
    assert!(reporter.has_errors());
}

#[test]
fn test_error_limit() {
    let mut reporter = Reporter::with_config(ReporterConfig {
        error_limit: 2,
        warnings_as_errors: false,
    });
    assert!(reporter.report(truncated("a.class")));
    assert!(reporter.report(truncated("b.class")));
    assert!(reporter.limit_reached());
    assert!(!reporter.report(truncated("c.class")));
    // Warnings still pass once the error limit is reached
    assert!(reporter.report(Diagnostic::warning(ErrorCode::B1002)));
    assert_eq!(reporter.error_count(), 2);
    assert_eq!(reporter.suppressed_count(), 1);
}

#[test]
fn test_duplicates_dropped() {
    let mut reporter = Reporter::with_config(ReporterConfig::unlimited());
    assert!(reporter.report(truncated("a.class")));
    assert!(!reporter.report(truncated("a.class")));
    assert_eq!(reporter.error_count(), 1);
}

#[test]
fn test_warnings_as_errors() {
    let mut reporter = Reporter::with_config(ReporterConfig {
        error_limit: 0,
        warnings_as_errors: true,
    });
    reporter.report(Diagnostic::warning(ErrorCode::B1001));
    assert!(reporter.has_errors());
    assert_eq!(reporter.warning_count(), 0);
}

#[test]
fn test_flush_is_sorted_and_clears() {
    let mut reporter = Reporter::with_config(ReporterConfig::unlimited());
    reporter.report(Diagnostic::warning(ErrorCode::B1001).at("a"));
    reporter.report(truncated("z.class"));
    reporter.report(truncated("m.class"));

    let flushed = reporter.flush();
    let order: Vec<_> = flushed
        .iter()
        .map(|d| d.location.clone().unwrap_or_default())
        .collect();
    assert_eq!(order, vec!["m.class", "z.class", "a"]);
    assert_eq!(reporter.error_count(), 0);
    assert_eq!(reporter.peek().count(), 0);
}

#[test]
fn test_absorb_worker_reporter() {
    let mut main = Reporter::with_config(ReporterConfig::unlimited());
    let mut worker = Reporter::with_config(ReporterConfig::unlimited());
    worker.report(truncated("w.class"));
    main.report(truncated("m.class"));
    main.absorb(worker);
    assert_eq!(main.error_count(), 2);
}

#[test]
fn test_emit_uses_default_severity() {
    let mut reporter = Reporter::with_config(ReporterConfig::unlimited());
    reporter.emit(ErrorCode::B9002, "no class files under lib");
    assert_eq!(reporter.warning_count(), 1);
    assert!(!reporter.has_errors());
}

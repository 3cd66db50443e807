//! Bundle analyzer driver.
//!
//! Library half of the `bndc` binary. Finds class files on disk, reads them
//! in parallel and hands the resulting `ClassSpace` to the analysis crates:
//!
//! ```text
//! dir ──> discover_class_files ──> (rayon) read_class ──> ClassSpace
//!                                                            │
//!          analyze: DependencyGraph ──> UsesReport ──> Export-Package / Import-Package
//!          diff:    bundle_tree(newer) vs bundle_tree(older) ──> Diff ──> Bump
//!          snapshot: bundle_tree ──> TreeData ──> file
//! ```
//!
//! Commands return an [`commands::Outcome`] instead of printing, so the
//! integration tests can run them against temporary directories.

use std::sync::Once;

pub mod commands;
pub mod input;
pub mod options;

pub use options::{parse_options, CliOptions};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// The filter comes from `BND_LOG`, then `RUST_LOG`, then `debug` when
/// `verbose` is set. With none of them nothing is installed. Safe to call
/// more than once.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let directives = std::env::var("BND_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .or_else(|| verbose.then(|| "debug".to_owned()));
        let Some(directives) = directives else {
            return;
        };

        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
            eprintln!("warning: ignoring log filter `{directives}`: {e}");
            EnvFilter::new("warn")
        });
        let layer = tracing_tree::HierarchicalLayer::new(2)
            .with_writer(std::io::stderr)
            .with_targets(true)
            .with_bracketed_fields(true);
        if let Err(e) = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
        {
            eprintln!("warning: tracing not initialized: {e}");
        }
    });
}

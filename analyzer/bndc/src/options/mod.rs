//! Command line options shared by all commands.
//!
//! Options are `--flag` or `--key=value`; `-o` takes the next argument.
//! Anything not starting with `-` is an input path.

use std::path::PathBuf;

use bnd_diagnostic::{Diagnostic, ErrorCode, Reporter, ReporterConfig};
use bnd_diff::{ApiOptions, DiffOptions, Exports};
use bnd_graph::GraphOptions;

/// Parsed options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Worker threads for reading (`None` = one per core).
    pub jobs: Option<usize>,
    /// Keep edges to packages outside the analyzed classes.
    pub external: bool,
    pub exports: Exports,
    /// Exports of the older side of `diff`; `exports` when unset.
    pub older_exports: Option<Exports>,
    /// `Bundle-Version` of the analyzed bundle, or the newer side of `diff`.
    pub bundle_version: Option<String>,
    pub older_bundle_version: Option<String>,
    pub ignore: Vec<String>,
    /// Show unchanged nodes in `diff` output.
    pub all: bool,
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub reporter: ReporterConfig,
    /// Positional arguments, in order.
    pub inputs: Vec<String>,
}

impl CliOptions {
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            include_external: self.external,
            include_java: false,
        }
    }

    pub fn api_options(&self) -> ApiOptions {
        ApiOptions {
            exports: self.exports.clone(),
            ..ApiOptions::default()
        }
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            ignore: self.ignore.clone(),
        }
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::with_config(self.reporter.clone())
    }

    /// Options for reading the older side of `diff`.
    #[must_use]
    pub fn older(&self) -> CliOptions {
        CliOptions {
            exports: self
                .older_exports
                .clone()
                .unwrap_or_else(|| self.exports.clone()),
            older_exports: None,
            bundle_version: self.older_bundle_version.clone(),
            older_bundle_version: None,
            ..self.clone()
        }
    }
}

fn invalid(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(ErrorCode::B9001).with_message(message)
}

/// Split a comma separated list, dropping empty entries.
fn list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// `pkg` or `pkg;version=1.2.0`.
fn parse_export(entry: &str) -> Result<(&str, Option<String>), Diagnostic> {
    let Some((package, attribute)) = entry.split_once(';') else {
        return Ok((entry, None));
    };
    match attribute.trim().strip_prefix("version=") {
        Some(version) if !version.is_empty() => {
            Ok((package.trim(), Some(version.trim_matches('"').to_owned())))
        }
        _ => Err(invalid(format!(
            "invalid export `{entry}`, expected `package` or `package;version=x.y.z`"
        ))),
    }
}

fn parse_count(flag: &str, value: &str) -> Result<usize, Diagnostic> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(format!("{flag} expects a positive number, got `{value}`"))),
    }
}

/// Parse everything after the command name.
pub fn parse_options(args: &[String]) -> Result<CliOptions, Diagnostic> {
    let mut options = CliOptions::default();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        if arg == "-o" {
            let Some(path) = args.next() else {
                return Err(invalid("`-o` needs a file name"));
            };
            options.output = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--output=") {
            options.output = Some(PathBuf::from(path));
        } else if let Some(jobs) = arg.strip_prefix("--jobs=") {
            options.jobs = Some(parse_count("--jobs", jobs)?);
        } else if let Some(limit) = arg.strip_prefix("--error-limit=") {
            options.reporter.error_limit = match limit.parse() {
                Ok(n) => n,
                Err(_) => return Err(invalid(format!("--error-limit expects a number, got `{limit}`"))),
            };
        } else if let Some(exports) = arg.strip_prefix("--exports=") {
            for entry in list(exports) {
                let (package, version) = parse_export(entry)?;
                options.exports.insert(package, version);
            }
        } else if let Some(exports) = arg.strip_prefix("--older-exports=") {
            let older = options.older_exports.get_or_insert_with(Exports::new);
            for entry in list(exports) {
                let (package, version) = parse_export(entry)?;
                older.insert(package, version);
            }
        } else if let Some(version) = arg.strip_prefix("--bundle-version=") {
            options.bundle_version = Some(version.trim().to_owned());
        } else if let Some(version) = arg.strip_prefix("--older-bundle-version=") {
            options.older_bundle_version = Some(version.trim().to_owned());
        } else if let Some(ignore) = arg.strip_prefix("--ignore=") {
            options.ignore.extend(list(ignore).map(str::to_owned));
        } else {
            match arg.as_str() {
                "--external" => options.external = true,
                "--all" => options.all = true,
                "--verbose" | "-v" => options.verbose = true,
                "--deny-warnings" => options.reporter.warnings_as_errors = true,
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(invalid(format!("unknown option `{flag}`")));
                }
                input => options.inputs.push(input.to_owned()),
            }
        }
    }

    Ok(options)
}

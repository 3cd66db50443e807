//! Version baselining.
//!
//! For every exported package the declared versions on both sides are
//! checked against the delta the diff found in it: the newer version must
//! be at least the older one bumped as far as the delta requires. The
//! bundle version is checked the same way against the most severe package
//! change. Versions with major `0` are reported but never mismatch.

use std::fmt::Write as _;

use bnd_diagnostic::{InvalidVersionError, Reporter, VersionMismatchError};

use crate::manifest::{BUNDLE_VERSION, MANIFEST_ROOT};
use crate::{Bump, Delta, Diff, DiffRef, Presence, Type, Version, API_ROOT, VERSION_NODE};

/// Baseline of one exported package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageBaseline {
    pub package: String,
    pub presence: Presence,
    pub delta: Delta,
    /// `None` when the newer side lacks the package; `0.0.0` when it has the
    /// package without declaring a version.
    pub newer_version: Option<Version>,
    pub older_version: Option<Version>,
    /// Lowest acceptable newer version. `None` for a removed package.
    pub suggested_version: Option<Version>,
    pub mismatch: bool,
    pub warning: Option<String>,
    /// Either side declared a version.
    pub versioned: bool,
}

impl PackageBaseline {
    pub fn required_bump(&self) -> Bump {
        self.delta.required_bump()
    }

    fn mismatch_error(&self) -> Option<VersionMismatchError> {
        if !self.mismatch {
            return None;
        }
        Some(VersionMismatchError {
            subject: self.package.clone(),
            delta: self.delta.to_string(),
            newer: display(self.newer_version.as_ref()),
            suggested: display(self.suggested_version.as_ref()),
        })
    }
}

/// Baseline of the bundle as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BundleBaseline {
    pub name: String,
    /// Most severe bump any package needs.
    pub bump: Bump,
    /// From the `Bundle-Version` header of each side.
    pub newer_version: Option<Version>,
    pub older_version: Option<Version>,
    pub suggested_version: Option<Version>,
    pub mismatch: bool,
}

/// Result of [`baseline`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Baseline {
    packages: Vec<PackageBaseline>,
    bundle: BundleBaseline,
    /// Unparsable versions, with the package or bundle they belong to.
    invalid: Vec<(String, InvalidVersionError)>,
}

impl Baseline {
    /// Packages in name order. Ignored packages and packages with an
    /// invalid version are left out.
    pub fn packages(&self) -> &[PackageBaseline] {
        &self.packages
    }

    pub fn package(&self, name: &str) -> Option<&PackageBaseline> {
        self.packages.iter().find(|p| p.package == name)
    }

    pub fn bundle(&self) -> &BundleBaseline {
        &self.bundle
    }

    pub fn invalid_versions(&self) -> &[(String, InvalidVersionError)] {
        &self.invalid
    }

    /// One error per package, and for the bundle, whose version is too low.
    pub fn mismatches(&self) -> Vec<VersionMismatchError> {
        let mut out: Vec<VersionMismatchError> = self
            .packages
            .iter()
            .filter_map(PackageBaseline::mismatch_error)
            .collect();
        if self.bundle.mismatch {
            out.push(VersionMismatchError {
                subject: self.bundle.name.clone(),
                delta: self.bundle.bump.to_string(),
                newer: display(self.bundle.newer_version.as_ref()),
                suggested: display(self.bundle.suggested_version.as_ref()),
            });
        }
        out
    }

    /// Report `B2004` for every invalid version and `B2003` for every
    /// mismatch, located at the package or bundle.
    pub fn report(&self, reporter: &mut Reporter) {
        for (location, error) in &self.invalid {
            reporter.report_error(error, location.as_str());
        }
        for mismatch in self.mismatches() {
            let location = mismatch.subject.clone();
            reporter.report_error(&mismatch, location);
        }
    }

    /// Table of versioned packages, then the bundle line when the bundle
    /// has a version. Mismatches are marked with `*`; a suggestion the
    /// newer version already meets shows as `ok`. Empty when nothing is
    /// versioned.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let versioned: Vec<&PackageBaseline> =
            self.packages.iter().filter(|p| p.versioned).collect();
        let bundle = &self.bundle;
        let bundle_versioned = bundle.newer_version.is_some() || bundle.older_version.is_some();
        if versioned.is_empty() && !bundle_versioned {
            return out;
        }

        let _ = writeln!(
            out,
            "  {:<40} {:<10} {:<10} {:<10} suggested",
            "package", "delta", "newer", "older"
        );
        for package in versioned {
            let _ = writeln!(
                out,
                "{} {:<40} {:<10} {:<10} {:<10} {}",
                marker(package.mismatch),
                package.package,
                package.delta.as_str(),
                display(package.newer_version.as_ref()),
                display(package.older_version.as_ref()),
                suggestion(package.suggested_version.as_ref(), package.newer_version.as_ref()),
            );
        }
        if bundle_versioned {
            let _ = writeln!(
                out,
                "{} {:<40} {:<10} {:<10} {:<10} {}",
                marker(bundle.mismatch),
                bundle.name,
                bundle.bump.as_str(),
                display(bundle.newer_version.as_ref()),
                display(bundle.older_version.as_ref()),
                suggestion(bundle.suggested_version.as_ref(), bundle.newer_version.as_ref()),
            );
        }
        out
    }
}

fn marker(mismatch: bool) -> char {
    if mismatch {
        '*'
    } else {
        ' '
    }
}

fn display(version: Option<&Version>) -> String {
    version.map_or_else(|| "-".to_owned(), ToString::to_string)
}

fn suggestion(suggested: Option<&Version>, newer: Option<&Version>) -> String {
    match (suggested, newer) {
        (Some(suggested), Some(newer)) if suggested <= newer => "ok".to_owned(),
        (suggested, _) => display(suggested),
    }
}

/// The version a side declares: `None` when the side lacks the node's
/// parent, `0.0.0` when it declares nothing.
fn declared(value: Option<&str>, present: bool) -> Result<Option<Version>, InvalidVersionError> {
    if !present {
        return Ok(None);
    }
    value.map_or(Ok(Version::default()), str::parse).map(Some)
}

fn package_baseline(package: DiffRef<'_>) -> Result<PackageBaseline, InvalidVersionError> {
    let presence = package.presence();
    let delta = package.delta();
    let version = package.child(Type::Version, VERSION_NODE);
    let newer_version = declared(
        version.and_then(|v| v.newer_value()),
        presence != Presence::Removed,
    )?;
    let older_version = declared(
        version.and_then(|v| v.older_value()),
        presence != Presence::Added,
    )?;

    let mut warning = None;
    let (suggested_version, mismatch) = match (&newer_version, &older_version) {
        (Some(newer), Some(older)) => {
            let bump = delta.required_bump();
            let suggested = older.bump(bump);
            if bump == Bump::None && newer > older {
                warning = Some("version increased without API changes".to_owned());
            }
            let mismatch = *newer < suggested && !older.is_unstable();
            (Some(suggested), mismatch)
        }
        // A new package may start at any version.
        (Some(newer), None) => (Some(newer.clone()), false),
        (None, _) => (None, false),
    };

    Ok(PackageBaseline {
        package: package.name().to_owned(),
        presence,
        delta,
        newer_version,
        older_version,
        suggested_version,
        mismatch,
        warning,
        versioned: version.is_some(),
    })
}

/// The `API` node of an `API` or `BUNDLE` diff.
fn api_node(diff: &Diff) -> Option<DiffRef<'_>> {
    let root = diff.root();
    match root.ty() {
        Type::Api => Some(root),
        Type::Bundle => root.child(Type::Api, API_ROOT),
        _ => None,
    }
}

/// Check declared versions against the changes in `diff`.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = diff.len()))]
pub fn baseline(diff: &Diff) -> Baseline {
    let mut result = Baseline::default();
    if diff.is_empty() {
        return result;
    }

    let packages = api_node(diff)
        .into_iter()
        .flat_map(|api| api.children())
        .filter(|node| node.ty() == Type::Package && node.delta() != Delta::Ignored);
    for package in packages {
        match package_baseline(package) {
            Ok(info) => result.packages.push(info),
            Err(error) => result.invalid.push((package.name().to_owned(), error)),
        }
    }

    let root = diff.root();
    let bump = result
        .packages
        .iter()
        .map(PackageBaseline::required_bump)
        .max()
        .unwrap_or(Bump::None);
    let header = root.find(&[(Type::Manifest, MANIFEST_ROOT), (Type::Header, BUNDLE_VERSION)]);
    let mut bundle = BundleBaseline {
        name: root.name().to_owned(),
        bump,
        ..BundleBaseline::default()
    };
    let versions: Result<(Option<Version>, Option<Version>), InvalidVersionError> =
        header.map_or(Ok((None, None)), |header| {
            let newer = header.newer_value().map(str::parse::<Version>).transpose()?;
            let older = header.older_value().map(str::parse::<Version>).transpose()?;
            Ok((newer, older))
        });
    match versions {
        Ok((newer, older)) => {
            bundle.suggested_version = older.as_ref().map(|v| v.bump(bump));
            bundle.mismatch = match (&newer, &older, &bundle.suggested_version) {
                (Some(newer), Some(older), Some(suggested)) => {
                    newer < suggested && !older.is_unstable()
                }
                _ => false,
            };
            bundle.newer_version = newer;
            bundle.older_version = older;
        }
        Err(error) => result.invalid.push((bundle.name.clone(), error)),
    }
    result.bundle = bundle;

    tracing::debug!(
        packages = result.packages.len(),
        mismatches = result.mismatches().len(),
        %bump,
        "baseline computed"
    );
    result
}

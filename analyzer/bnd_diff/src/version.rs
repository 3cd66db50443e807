//! OSGi versions: `major[.minor[.micro[.qualifier]]]`.

use std::fmt;
use std::str::FromStr;

use bnd_diagnostic::InvalidVersionError;

use crate::Bump;

/// A package or bundle version. Ordering compares the numeric parts, then
/// the qualifier as a string.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl Version {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Version {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    /// The lowest version that satisfies `bump` relative to `self`.
    /// Lower parts reset to zero and the qualifier is dropped.
    #[must_use]
    pub fn bump(&self, bump: Bump) -> Version {
        match bump {
            Bump::None => Version::new(self.major, self.minor, self.micro),
            Bump::Micro => Version::new(self.major, self.minor, self.micro.saturating_add(1)),
            Bump::Minor => Version::new(self.major, self.minor.saturating_add(1), 0),
            Bump::Major => Version::new(self.major.saturating_add(1), 0, 0),
        }
    }

    /// Versions below `1.0.0` make no compatibility promise.
    pub fn is_unstable(&self) -> bool {
        self.major == 0
    }
}

fn component(part: &str, version: &str, reason: &'static str) -> Result<u32, InvalidVersionError> {
    part.parse().map_err(|_| InvalidVersionError {
        version: version.to_owned(),
        reason,
    })
}

impl FromStr for Version {
    type Err = InvalidVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let mut parts = text.splitn(4, '.');
        let major = component(parts.next().unwrap_or_default(), text, "major is not a number")?;
        let minor = parts
            .next()
            .map_or(Ok(0), |p| component(p, text, "minor is not a number"))?;
        let micro = parts
            .next()
            .map_or(Ok(0), |p| component(p, text, "micro is not a number"))?;
        let qualifier = parts.next().unwrap_or_default();
        if !qualifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(InvalidVersionError {
                version: text.to_owned(),
                reason: "qualifier may only contain letters, digits, `_` and `-`",
            });
        }
        Ok(Version {
            major,
            minor,
            micro,
            qualifier: qualifier.to_owned(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn version(s: &str) -> Version {
        s.parse().unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_parse_short_forms() {
        assert_eq!(version("1"), Version::new(1, 0, 0));
        assert_eq!(version("1.2"), Version::new(1, 2, 0));
        assert_eq!(version(" 1.2.3 "), Version::new(1, 2, 3));
        assert_eq!(version("1.2.3.SNAPSHOT").qualifier, "SNAPSHOT");
        assert_eq!(version("1.2.3.SNAPSHOT").to_string(), "1.2.3.SNAPSHOT");
        assert_eq!(version("2").to_string(), "2.0.0");
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "x", "1.x", "1.2.-3", "1.2.3.a.b", "1.2.3.a b"] {
            let err = bad.parse::<Version>().err();
            assert!(err.is_some(), "{bad:?} parsed");
        }
        let err = "1.x".parse::<Version>().err().unwrap_or_else(|| panic!("parsed"));
        assert_eq!(err.to_string(), "invalid version `1.x`: minor is not a number");
    }

    #[test]
    fn test_ordering() {
        assert!(version("1.10.0") > version("1.9.9"));
        assert!(version("2.0.0") > version("1.99.0"));
        assert!(version("1.0.0.b") > version("1.0.0.a"));
        assert!(version("1.0.0.a") > version("1.0.0"));
    }

    #[test]
    fn test_bump() {
        let base = version("1.2.3.qualifier");
        assert_eq!(base.bump(Bump::None), version("1.2.3"));
        assert_eq!(base.bump(Bump::Micro), version("1.2.4"));
        assert_eq!(base.bump(Bump::Minor), version("1.3.0"));
        assert_eq!(base.bump(Bump::Major), version("2.0.0"));
    }
}

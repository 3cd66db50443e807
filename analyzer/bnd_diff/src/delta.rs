//! Change severity.

use std::fmt;

/// How much a node changed between two versions.
///
/// Variants are declared in ordinal order. `Ord` follows that order;
/// severity comparisons go through [`Delta::rank`] instead, because an
/// addition must never outweigh a breaking change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Delta {
    /// Excluded from comparison. Neutral when combining.
    Ignored,
    Unchanged,
    /// Content changed without semantic weight.
    Changed,
    Micro,
    Minor,
    Major,
    Removed,
    AddMinor,
    AddMajor,
}

impl Delta {
    pub const ALL: [Delta; 9] = [
        Delta::Ignored,
        Delta::Unchanged,
        Delta::Changed,
        Delta::Micro,
        Delta::Minor,
        Delta::Major,
        Delta::Removed,
        Delta::AddMinor,
        Delta::AddMajor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Delta::Ignored => "IGNORED",
            Delta::Unchanged => "UNCHANGED",
            Delta::Changed => "CHANGED",
            Delta::Micro => "MICRO",
            Delta::Minor => "MINOR",
            Delta::Major => "MAJOR",
            Delta::Removed => "REMOVED",
            Delta::AddMinor => "ADD_MINOR",
            Delta::AddMajor => "ADD_MAJOR",
        }
    }

    /// A change to the shape of the API rather than its content.
    #[inline]
    pub fn is_structural(self) -> bool {
        self >= Delta::Removed
    }

    /// Severity rank used by [`Delta::escalate`].
    pub fn rank(self) -> u8 {
        match self {
            Delta::Ignored => 0,
            Delta::Unchanged => 1,
            Delta::Changed => 2,
            Delta::Micro => 3,
            Delta::Minor => 4,
            Delta::AddMinor => 5,
            Delta::Major => 6,
            Delta::AddMajor => 7,
            Delta::Removed => 8,
        }
    }

    /// The more severe of two deltas. `Ignored` never wins against
    /// anything else.
    #[must_use]
    pub fn escalate(self, other: Delta) -> Delta {
        if self == Delta::Ignored {
            return other;
        }
        if other == Delta::Ignored || self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    /// The smallest version bump that covers this delta.
    pub fn required_bump(self) -> Bump {
        match self {
            Delta::Ignored | Delta::Unchanged => Bump::None,
            Delta::Changed | Delta::Micro => Bump::Micro,
            Delta::Minor | Delta::AddMinor => Bump::Minor,
            Delta::Major | Delta::Removed | Delta::AddMajor => Bump::Major,
        }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of a `major.minor.micro` version must increase.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bump {
    #[default]
    None,
    Micro,
    Minor,
    Major,
}

impl Bump {
    pub fn as_str(self) -> &'static str {
        match self {
            Bump::None => "none",
            Bump::Micro => "micro",
            Bump::Minor => "minor",
            Bump::Major => "major",
        }
    }
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

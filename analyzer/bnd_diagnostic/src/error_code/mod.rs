use std::fmt;
use std::str::FromStr;

use crate::Severity;

/// Error codes for all analyzer diagnostics.
///
/// Format: B#### where the first digit indicates the stage:
/// - B0xxx: Class file reading
/// - B1xxx: Dependency graph
/// - B2xxx: API comparison
/// - B9xxx: Driver
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Reader (B0xxx)
    /// Class file ends before a structure is complete
    B0001,
    /// Class file does not start with 0xCAFEBABE
    B0002,
    /// Class file version outside the supported range
    B0003,
    /// Constant pool index out of range or pointing at a gap slot
    B0004,
    /// Constant pool entry of the wrong kind
    B0005,
    /// Unknown constant pool or element value tag
    B0006,
    /// Invalid modified UTF-8 in a constant
    B0007,
    /// Invalid field or method descriptor
    B0008,
    /// Same class found twice in one input (warning)
    B0009,
    /// Input file could not be read
    B0010,

    // Graph (B1xxx)
    /// Packages form a reference cycle (warning)
    B1001,
    /// Class in the default package (warning)
    B1002,

    // Diff (B2xxx)
    /// Trees with different root types cannot be compared
    B2001,
    /// Snapshot file could not be decoded
    B2002,
    /// Declared version too low for the API change
    B2003,
    /// Declared version is not a valid version
    B2004,

    // Driver (B9xxx)
    /// Invalid command line
    B9001,
    /// Input contains no class files (warning)
    B9002,
    /// Output file could not be written
    B9003,
}

impl ErrorCode {
    /// All codes, for exhaustive testing and `explain` listings.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::B0001,
        ErrorCode::B0002,
        ErrorCode::B0003,
        ErrorCode::B0004,
        ErrorCode::B0005,
        ErrorCode::B0006,
        ErrorCode::B0007,
        ErrorCode::B0008,
        ErrorCode::B0009,
        ErrorCode::B0010,
        ErrorCode::B1001,
        ErrorCode::B1002,
        ErrorCode::B2001,
        ErrorCode::B2002,
        ErrorCode::B2003,
        ErrorCode::B2004,
        ErrorCode::B9001,
        ErrorCode::B9002,
        ErrorCode::B9003,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::B0001 => "B0001",
            ErrorCode::B0002 => "B0002",
            ErrorCode::B0003 => "B0003",
            ErrorCode::B0004 => "B0004",
            ErrorCode::B0005 => "B0005",
            ErrorCode::B0006 => "B0006",
            ErrorCode::B0007 => "B0007",
            ErrorCode::B0008 => "B0008",
            ErrorCode::B0009 => "B0009",
            ErrorCode::B0010 => "B0010",
            ErrorCode::B1001 => "B1001",
            ErrorCode::B1002 => "B1002",
            ErrorCode::B2001 => "B2001",
            ErrorCode::B2002 => "B2002",
            ErrorCode::B2003 => "B2003",
            ErrorCode::B2004 => "B2004",
            ErrorCode::B9001 => "B9001",
            ErrorCode::B9002 => "B9002",
            ErrorCode::B9003 => "B9003",
        }
    }

    /// One-line summary, used when no message is supplied.
    pub fn summary(&self) -> &'static str {
        match self {
            ErrorCode::B0001 => "truncated class file",
            ErrorCode::B0002 => "not a class file",
            ErrorCode::B0003 => "unsupported class file version",
            ErrorCode::B0004 => "bad constant pool index",
            ErrorCode::B0005 => "unexpected constant pool entry",
            ErrorCode::B0006 => "unknown tag",
            ErrorCode::B0007 => "invalid modified UTF-8",
            ErrorCode::B0008 => "invalid descriptor",
            ErrorCode::B0009 => "duplicate class",
            ErrorCode::B0010 => "cannot read input",
            ErrorCode::B1001 => "package cycle",
            ErrorCode::B1002 => "class in default package",
            ErrorCode::B2001 => "incomparable trees",
            ErrorCode::B2002 => "invalid snapshot",
            ErrorCode::B2003 => "version too low",
            ErrorCode::B2004 => "invalid version",
            ErrorCode::B9001 => "invalid command line",
            ErrorCode::B9002 => "no class files",
            ErrorCode::B9003 => "cannot write output",
        }
    }

    pub fn is_reader_error(&self) -> bool {
        self.as_str().starts_with("B0")
    }

    pub fn is_graph_error(&self) -> bool {
        self.as_str().starts_with("B1")
    }

    pub fn is_diff_error(&self) -> bool {
        self.as_str().starts_with("B2")
    }

    /// Codes reported as warnings unless warnings are promoted.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ErrorCode::B0009 | ErrorCode::B1001 | ErrorCode::B1002 | ErrorCode::B9002
        )
    }

    pub fn default_severity(&self) -> Severity {
        if self.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that names no known code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownErrorCode(pub String);

impl fmt::Display for UnknownErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code `{}`", self.0)
    }
}

impl std::error::Error for UnknownErrorCode {}

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    /// Parses `B0001` or `b0001`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownErrorCode(s.to_owned()))
    }
}

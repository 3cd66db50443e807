//! Typed errors raised by analysis stages.

use bnd_ir::DescriptorError;

use crate::{Diagnostic, ErrorCode};

/// Errors that map onto a stable diagnostic code.
pub trait HasErrorCode: std::fmt::Display {
    fn code(&self) -> ErrorCode;

    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code()).with_message(self.to_string())
    }
}

/// A class file that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedClassError {
    #[error("truncated class file: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("bad magic number 0x{found:08X}, expected 0xCAFEBABE")]
    BadMagic { found: u32 },

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("constant pool index {index} is out of range or unusable (pool size {size})")]
    BadConstantPoolIndex { index: u16, size: u16 },

    #[error("constant pool entry {index} is a {found}, expected {expected}")]
    UnexpectedConstant {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown constant pool tag {tag} at entry {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("unknown annotation element value tag {tag:#04x}")]
    UnknownElementTag { tag: u8 },

    #[error("invalid modified UTF-8 in constant pool entry {index}")]
    InvalidUtf8 { index: u16 },

    #[error(transparent)]
    InvalidDescriptor(#[from] DescriptorError),
}

impl HasErrorCode for MalformedClassError {
    fn code(&self) -> ErrorCode {
        match self {
            MalformedClassError::Truncated { .. } => ErrorCode::B0001,
            MalformedClassError::BadMagic { .. } => ErrorCode::B0002,
            MalformedClassError::UnsupportedVersion { .. } => ErrorCode::B0003,
            MalformedClassError::BadConstantPoolIndex { .. } => ErrorCode::B0004,
            MalformedClassError::UnexpectedConstant { .. } => ErrorCode::B0005,
            MalformedClassError::UnknownConstantTag { .. }
            | MalformedClassError::UnknownElementTag { .. } => ErrorCode::B0006,
            MalformedClassError::InvalidUtf8 { .. } => ErrorCode::B0007,
            MalformedClassError::InvalidDescriptor(_) => ErrorCode::B0008,
        }
    }
}

/// Two trees whose roots have different types were handed to the differ.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot compare {newer} tree with {older} tree")]
pub struct IncomparableTreeError {
    pub newer: String,
    pub older: String,
}

impl HasErrorCode for IncomparableTreeError {
    fn code(&self) -> ErrorCode {
        ErrorCode::B2001
    }
}

/// A declared version that does not cover the changes made since the
/// baseline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{subject} has {delta} changes: version {newer} must be at least {suggested}")]
pub struct VersionMismatchError {
    /// Package or bundle name.
    pub subject: String,
    pub delta: String,
    pub newer: String,
    pub suggested: String,
}

impl HasErrorCode for VersionMismatchError {
    fn code(&self) -> ErrorCode {
        ErrorCode::B2003
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version `{version}`: {reason}")]
pub struct InvalidVersionError {
    pub version: String,
    pub reason: &'static str,
}

impl HasErrorCode for InvalidVersionError {
    fn code(&self) -> ErrorCode {
        ErrorCode::B2004
    }
}

/// Packages that reference each other in a cycle.
///
/// Not fatal: cycles are legal, but every package in the cycle ends up
/// using every other one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("packages form a reference cycle: {}", .packages.join(", "))]
pub struct CyclicPackageWarning {
    /// Members of the cycle, sorted.
    pub packages: Vec<String>,
}

impl HasErrorCode for CyclicPackageWarning {
    fn code(&self) -> ErrorCode {
        ErrorCode::B1001
    }
}

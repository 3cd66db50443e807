//! Element kinds and their severity policy.

use std::fmt;

use crate::Delta;

/// Kind of a tree node.
///
/// Declaration order is the order children are stored in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Bundle,
    Api,
    Manifest,
    Header,
    Clause,
    Parameter,
    ClassVersion,
    Package,
    Version,
    Class,
    Interface,
    Annotation,
    Enum,
    Access,
    Extends,
    Implements,
    Annotated,
    Property,
    Field,
    Method,
    Return,
    Throws,
    Constant,
    Default,
}

impl Type {
    pub const ALL: [Type; 24] = [
        Type::Bundle,
        Type::Api,
        Type::Manifest,
        Type::Header,
        Type::Clause,
        Type::Parameter,
        Type::ClassVersion,
        Type::Package,
        Type::Version,
        Type::Class,
        Type::Interface,
        Type::Annotation,
        Type::Enum,
        Type::Access,
        Type::Extends,
        Type::Implements,
        Type::Annotated,
        Type::Property,
        Type::Field,
        Type::Method,
        Type::Return,
        Type::Throws,
        Type::Constant,
        Type::Default,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Type::Bundle => "BUNDLE",
            Type::Api => "API",
            Type::Manifest => "MANIFEST",
            Type::Header => "HEADER",
            Type::Clause => "CLAUSE",
            Type::Parameter => "PARAMETER",
            Type::ClassVersion => "CLASS_VERSION",
            Type::Package => "PACKAGE",
            Type::Version => "VERSION",
            Type::Class => "CLASS",
            Type::Interface => "INTERFACE",
            Type::Annotation => "ANNOTATION",
            Type::Enum => "ENUM",
            Type::Access => "ACCESS",
            Type::Extends => "EXTENDS",
            Type::Implements => "IMPLEMENTS",
            Type::Annotated => "ANNOTATED",
            Type::Property => "PROPERTY",
            Type::Field => "FIELD",
            Type::Method => "METHOD",
            Type::Return => "RETURN",
            Type::Throws => "THROWS",
            Type::Constant => "CONSTANT",
            Type::Default => "DEFAULT",
        }
    }

    /// Class-like kinds: the children of a package.
    pub fn is_type_kind(self) -> bool {
        matches!(
            self,
            Type::Class | Type::Interface | Type::Annotation | Type::Enum
        )
    }

    /// Severity of adding, removing or changing a node of this kind.
    ///
    /// `name` selects between the `static` and other `ACCESS` modifiers.
    /// `mandatory` marks a method every implementer or user would have to
    /// supply; it only affects `METHOD`.
    pub fn policy(self, name: &str, mandatory: bool) -> Policy {
        use Delta::{AddMajor, AddMinor, Changed, Ignored, Major, Micro, Minor, Removed};
        let (added, removed, changed) = match self {
            Type::Package
            | Type::Class
            | Type::Interface
            | Type::Annotation
            | Type::Enum
            | Type::Field
            | Type::Clause => (AddMinor, Removed, Changed),
            Type::Method if mandatory => (AddMajor, Removed, Changed),
            Type::Method => (AddMinor, Removed, Changed),
            Type::Extends => (Micro, Major, Changed),
            Type::Implements | Type::Return => (Minor, Major, Changed),
            Type::Throws => (Minor, Minor, Changed),
            Type::Access if name == "static" => (Major, Major, Changed),
            Type::Access => (Major, Minor, Changed),
            Type::Constant => (Micro, Minor, Minor),
            Type::Default => (Minor, Major, Micro),
            Type::Annotated => (Micro, Micro, Changed),
            Type::Version => (Ignored, Ignored, Ignored),
            Type::Property
            | Type::Parameter
            | Type::Header
            | Type::ClassVersion
            | Type::Bundle
            | Type::Api
            | Type::Manifest => (Changed, Changed, Changed),
        };
        Policy {
            added,
            removed,
            changed,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deltas a node reports when it appears, disappears or changes value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Policy {
    pub added: Delta,
    pub removed: Delta,
    pub changed: Delta,
}

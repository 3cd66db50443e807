//! Bnd IR - shared data model for bundle analysis.
//!
//! This crate holds the types every analysis stage agrees on:
//! - `TypeName` for binary class names and their package
//! - `PackageRef` handles produced by the `PackageInterner`
//! - `AccessFlags` as read from class files
//! - `ClassDescriptor` and friends, the format-independent view of one class
//! - `ClassSpace`, the set of classes that make up a bundle
//! - JVM descriptor parsing (`FieldType`, `MethodType`)
//! - `ensure_sufficient_stack` for the recursive walks downstream
//!
//! Nothing here performs I/O. Reading class files lives in `bnd_classfile`,
//! graph construction in `bnd_graph`, API comparison in `bnd_diff`.

mod access;
mod class_space;
mod descriptor;
mod interner;
mod java_type;
mod stack;
mod type_name;

pub use access::AccessFlags;
pub use class_space::ClassSpace;
pub use descriptor::{
    AnnotationDescriptor, ClassDescriptor, ClassVersion, ConstantValue, ElementTarget,
    ElementValue, InnerClassEntry, MemberDescriptor, MemberKind, RetentionPolicy,
    SymbolicReference, Visibility,
};
pub use interner::{InternError, PackageInterner, PackageRef, SharedPackageInterner};
pub use java_type::{BaseType, DescriptorError, FieldType, MethodType};
pub use stack::ensure_sufficient_stack;
pub use type_name::{is_java_package, TypeName};

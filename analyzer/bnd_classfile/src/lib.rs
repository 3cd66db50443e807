//! Class file reader.
//!
//! Turns the bytes of one compiled class into a `ClassDescriptor`. The
//! reader is a pure function over its input: it never resolves referenced
//! classes and never touches the filesystem.
//!
//! ```text
//! bytes ──> ByteCursor ──> ConstantPool ──> members + attributes ──> ClassDescriptor
//! ```
//!
//! Unknown attributes are skipped by length, so class files from newer
//! compilers still read as long as their major version is accepted.
//! `read_class_space` reads many inputs at once, reports failures to a
//! `Reporter` and keeps going.

mod constant_pool;
mod cursor;
mod mutf8;
mod reader;
mod signature;
mod space;
pub mod testing;

pub use reader::{read_class, MAGIC};
pub use signature::signature_references;
pub use space::{assemble_class_space, read_class_space};

//! Format-independent description of a single class.
//!
//! A `ClassDescriptor` is what the class file reader produces and what the
//! graph and API stages consume. It keeps only what bundle analysis needs:
//! identity, hierarchy, member signatures, annotations, constants and the
//! set of classes the class refers to.

use std::collections::BTreeSet;
use std::fmt;

use crate::{AccessFlags, TypeName};

/// Class file format version.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassVersion {
    /// Lowest major version the reader accepts (JDK 1.1).
    pub const MIN_MAJOR: u16 = 45;
    /// Highest major version the reader accepts (Java 25).
    pub const MAX_MAJOR: u16 = 69;

    pub const fn new(major: u16, minor: u16) -> Self {
        ClassVersion { major, minor }
    }

    /// Name of the minimum execution environment for this version.
    pub fn execution_environment(self) -> String {
        match self.major {
            0..=45 => "JRE-1.1".to_owned(),
            46..=49 => format!("J2SE-1.{}", self.major - 44),
            50..=52 => format!("JavaSE-1.{}", self.major - 44),
            major => format!("JavaSE-{}", major - 44),
        }
    }
}

impl fmt::Display for ClassVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Annotation retention as determined by which attribute carried it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RetentionPolicy {
    Source,
    Class,
    Runtime,
}

/// What an annotation was attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementTarget {
    Type,
    AnnotationType,
    Package,
    Module,
    Field,
    Method,
    Constructor,
    Parameter,
}

/// An annotation element value.
///
/// Floating point values are stored as raw bits so descriptors stay `Eq`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementValue {
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    Boolean(bool),
    String(String),
    Enum { ty: TypeName, constant: String },
    /// A class literal; the descriptor is kept as written (`Ljava/lang/Object;`, `I`, `V`).
    Class(String),
    Annotation(Box<AnnotationDescriptor>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    /// Classes named by this value, recursively.
    pub fn collect_references(&self, out: &mut Vec<TypeName>) {
        match self {
            ElementValue::Enum { ty, .. } => out.push(ty.clone()),
            ElementValue::Class(descriptor) => {
                if let Some(name) = crate::FieldType::parse(descriptor)
                    .ok()
                    .and_then(|ty| ty.object_type().cloned())
                {
                    out.push(name);
                }
            }
            ElementValue::Annotation(annotation) => annotation.collect_references(out),
            ElementValue::Array(values) => {
                for value in values {
                    value.collect_references(out);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Byte(v) => write!(f, "{v}"),
            ElementValue::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "\\u{v:04x}"),
            },
            ElementValue::Short(v) => write!(f, "{v}"),
            ElementValue::Int(v) => write!(f, "{v}"),
            ElementValue::Long(v) => write!(f, "{v}"),
            ElementValue::Float(bits) => write!(f, "{}", f32::from_bits(*bits)),
            ElementValue::Double(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ElementValue::Boolean(v) => write!(f, "{v}"),
            ElementValue::String(v) => f.write_str(v),
            ElementValue::Enum { constant, .. } => f.write_str(constant),
            ElementValue::Class(descriptor) => match crate::FieldType::parse(descriptor) {
                Ok(ty) => write!(f, "{}.class", ty.java_name()),
                Err(_) => f.write_str(descriptor),
            },
            ElementValue::Annotation(annotation) => write!(f, "{annotation}"),
            ElementValue::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One annotation instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationDescriptor {
    pub name: TypeName,
    pub retention: RetentionPolicy,
    pub target: ElementTarget,
    /// Explicitly written element values, in class file order.
    pub values: Vec<(String, ElementValue)>,
}

impl AnnotationDescriptor {
    pub fn get(&self, key: &str) -> Option<&ElementValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the annotation type has the given fully qualified name.
    pub fn is(&self, fqn: &str) -> bool {
        self.name.binary().len() == fqn.len()
            && self
                .name
                .binary()
                .bytes()
                .zip(fqn.bytes())
                .all(|(a, b)| a == b || (a == b'/' && b == b'.'))
    }

    pub fn collect_references(&self, out: &mut Vec<TypeName>) {
        out.push(self.name.clone());
        for (_, value) in &self.values {
            value.collect_references(out);
        }
    }
}

impl fmt::Display for AnnotationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.values.is_empty() {
            f.write_str("(")?;
            for (i, (key, value)) in self.values.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Compile-time constant of a static final field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    String(String),
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Long(v) => write!(f, "{v}"),
            ConstantValue::Float(bits) => write!(f, "{}", f32::from_bits(*bits)),
            ConstantValue::Double(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ConstantValue::String(v) => f.write_str(v),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
}

/// A field, method or constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub kind: MemberKind,
    pub name: String,
    /// Raw JVM descriptor.
    pub descriptor: String,
    /// Generic signature, when present.
    pub signature: Option<String>,
    pub access: AccessFlags,
    pub annotations: Vec<AnnotationDescriptor>,
    /// Annotations per declared parameter.
    pub parameter_annotations: Vec<Vec<AnnotationDescriptor>>,
    pub constant: Option<ConstantValue>,
    pub exceptions: Vec<TypeName>,
    /// Default value of an annotation type element.
    pub annotation_default: Option<ElementValue>,
    pub deprecated: bool,
    /// Classes named by the descriptor, generic signature, exceptions and
    /// annotations of this member. Sorted, no duplicates.
    pub references: Vec<TypeName>,
}

impl MemberDescriptor {
    /// Members that form part of the API of their class.
    pub fn is_api_visible(&self) -> bool {
        self.access.is_api_visible() && !self.access.is_synthetic()
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == "<clinit>"
    }
}

/// One `InnerClasses` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerClassEntry {
    pub inner: TypeName,
    pub outer: Option<TypeName>,
    pub simple_name: Option<String>,
    pub access: AccessFlags,
}

/// Whether a reference is exposed through the API of the referring class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    Api,
    Private,
}

/// A reference from one class to another.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolicReference {
    pub target: TypeName,
    pub visibility: Visibility,
}

/// Everything the analyzer knows about one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: TypeName,
    pub version: ClassVersion,
    pub access: AccessFlags,
    /// `None` only for `java.lang.Object` and `module-info`.
    pub super_class: Option<TypeName>,
    pub interfaces: Vec<TypeName>,
    pub signature: Option<String>,
    pub annotations: Vec<AnnotationDescriptor>,
    pub members: Vec<MemberDescriptor>,
    pub inner_classes: Vec<InnerClassEntry>,
    pub deprecated: bool,
    /// Classes named by the class header: super class, interfaces, generic
    /// signature and class annotations. Sorted, no duplicates.
    pub header_references: Vec<TypeName>,
    /// Classes referenced only from the constant pool (method bodies,
    /// field accesses, casts). Sorted, no duplicates.
    pub code_references: Vec<TypeName>,
}

impl ClassDescriptor {
    pub fn package_fqn(&self) -> String {
        self.name.package_fqn()
    }

    pub fn is_interface(&self) -> bool {
        self.access.contains(AccessFlags::INTERFACE)
    }

    pub fn is_annotation(&self) -> bool {
        self.access.contains(AccessFlags::ANNOTATION)
    }

    pub fn is_enum(&self) -> bool {
        self.access.contains(AccessFlags::ENUM)
    }

    pub fn is_abstract(&self) -> bool {
        self.access.contains(AccessFlags::ABSTRACT)
    }

    /// Public classes (and nested classes compiled as public) form the API.
    pub fn is_public(&self) -> bool {
        self.access.contains(AccessFlags::PUBLIC)
    }

    /// The `InnerClasses` entry describing this class itself, if nested.
    pub fn own_inner_entry(&self) -> Option<&InnerClassEntry> {
        self.inner_classes.iter().find(|e| e.inner == self.name)
    }

    pub fn find_annotation(&self, fqn: &str) -> Option<&AnnotationDescriptor> {
        self.annotations.iter().find(|a| a.is(fqn))
    }

    pub fn fields(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| m.kind == MemberKind::Field)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| m.kind != MemberKind::Field)
    }

    /// All references made by this class, classified by visibility.
    ///
    /// Header and member references of a public class are API references
    /// when the member is public or protected. Everything else, including
    /// references from a non-public class, is private. A target may appear
    /// once with each visibility. Self references are dropped.
    pub fn symbolic_references(&self) -> BTreeSet<SymbolicReference> {
        let public = self.is_public();
        let mut out = BTreeSet::new();
        let mut add = |target: &TypeName, visibility: Visibility| {
            if *target != self.name {
                out.insert(SymbolicReference {
                    target: target.clone(),
                    visibility,
                });
            }
        };

        let header = if public {
            Visibility::Api
        } else {
            Visibility::Private
        };
        for target in &self.header_references {
            add(target, header);
        }

        for member in &self.members {
            let visibility = if public && member.is_api_visible() {
                Visibility::Api
            } else {
                Visibility::Private
            };
            for target in &member.references {
                add(target, visibility);
            }
        }

        for target in &self.code_references {
            add(target, Visibility::Private);
        }
        out
    }
}

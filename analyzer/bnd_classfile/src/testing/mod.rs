//! Class file assembly for tests.
//!
//! `ClassFileWriter` produces real class file bytes from the same
//! descriptor types the reader returns, so tests across the workspace can
//! exercise the reader end to end without checked-in binaries.
//!
//! ```text
//! let bytes = ClassFileWriter::new("com/acme/Widget")
//!     .member(method(AccessFlags::PUBLIC, "run", "()V"))
//!     .to_bytes();
//! let class = read_class(&bytes)?;
//! ```

use std::collections::HashMap;

use bnd_ir::{
    AccessFlags, AnnotationDescriptor, ClassVersion, ConstantValue, ElementValue,
    InnerClassEntry, MemberDescriptor, MemberKind, RetentionPolicy,
};

use crate::MAGIC;

/// A method with no attributes.
pub fn method(access: AccessFlags, name: &str, descriptor: &str) -> MemberDescriptor {
    member(
        if name == "<init>" {
            MemberKind::Constructor
        } else {
            MemberKind::Method
        },
        access,
        name,
        descriptor,
    )
}

/// A field with no attributes.
pub fn field(access: AccessFlags, name: &str, descriptor: &str) -> MemberDescriptor {
    member(MemberKind::Field, access, name, descriptor)
}

fn member(kind: MemberKind, access: AccessFlags, name: &str, descriptor: &str) -> MemberDescriptor {
    MemberDescriptor {
        kind,
        name: name.to_owned(),
        descriptor: descriptor.to_owned(),
        signature: None,
        access,
        annotations: Vec::new(),
        parameter_annotations: Vec::new(),
        constant: None,
        exceptions: Vec::new(),
        annotation_default: None,
        deprecated: false,
        references: Vec::new(),
    }
}

/// An annotation with the given binary type name and retention.
pub fn annotation(
    name: &str,
    retention: RetentionPolicy,
    values: Vec<(&str, ElementValue)>,
) -> AnnotationDescriptor {
    AnnotationDescriptor {
        name: bnd_ir::TypeName::new(name),
        retention,
        target: bnd_ir::ElementTarget::Type,
        values: values
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
    }
}

/// Builder for class file bytes.
///
/// Members are written as fields or methods according to their `kind`.
/// Member `references` are ignored; the reader recomputes them.
#[derive(Clone, Debug)]
pub struct ClassFileWriter {
    version: ClassVersion,
    access: AccessFlags,
    name: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    annotations: Vec<AnnotationDescriptor>,
    members: Vec<MemberDescriptor>,
    inner_classes: Vec<InnerClassEntry>,
    deprecated: bool,
    code_references: Vec<String>,
    raw_attributes: Vec<(String, Vec<u8>)>,
}

impl ClassFileWriter {
    /// A public class extending `java/lang/Object`, version 52.0.
    pub fn new(name: &str) -> Self {
        ClassFileWriter {
            version: ClassVersion::new(52, 0),
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            name: name.to_owned(),
            super_class: Some("java/lang/Object".to_owned()),
            interfaces: Vec::new(),
            signature: None,
            annotations: Vec::new(),
            members: Vec::new(),
            inner_classes: Vec::new(),
            deprecated: false,
            code_references: Vec::new(),
            raw_attributes: Vec::new(),
        }
    }

    /// A public interface.
    pub fn interface(name: &str) -> Self {
        Self::new(name).access(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
    }

    #[must_use]
    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.version = ClassVersion::new(major, minor);
        self
    }

    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn super_class(mut self, name: Option<&str>) -> Self {
        self.super_class = name.map(str::to_owned);
        self
    }

    #[must_use]
    pub fn implements(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_owned());
        self
    }

    #[must_use]
    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_owned());
        self
    }

    #[must_use]
    pub fn annotation(mut self, annotation: AnnotationDescriptor) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn inner_class(mut self, entry: InnerClassEntry) -> Self {
        self.inner_classes.push(entry);
        self
    }

    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Add a `Class` constant, as a method body referencing `name` would.
    #[must_use]
    pub fn code_reference(mut self, name: &str) -> Self {
        self.code_references.push(name.to_owned());
        self
    }

    /// Add an arbitrary class attribute.
    #[must_use]
    pub fn raw_attribute(mut self, name: &str, payload: Vec<u8>) -> Self {
        self.raw_attributes.push((name.to_owned(), payload));
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        let mut body = Vec::new();

        put_u16(&mut body, self.access.bits());
        put_u16(&mut body, pool.class(&self.name));
        put_u16(&mut body, self.super_class.as_deref().map_or(0, |s| pool.class(s)));
        put_len(&mut body, self.interfaces.len());
        for interface in &self.interfaces {
            put_u16(&mut body, pool.class(interface));
        }

        for kind_is_field in [true, false] {
            let members: Vec<_> = self
                .members
                .iter()
                .filter(|m| (m.kind == MemberKind::Field) == kind_is_field)
                .collect();
            put_len(&mut body, members.len());
            for member in members {
                write_member(&mut body, &mut pool, member);
            }
        }

        let mut attributes = Vec::new();
        if let Some(signature) = &self.signature {
            attributes.push(("Signature", pool.utf8(signature).to_be_bytes().to_vec()));
        }
        annotation_attributes(&mut attributes, &mut pool, &self.annotations);
        if !self.inner_classes.is_empty() {
            let mut payload = Vec::new();
            put_len(&mut payload, self.inner_classes.len());
            for entry in &self.inner_classes {
                put_u16(&mut payload, pool.class(entry.inner.binary()));
                put_u16(&mut payload, entry.outer.as_ref().map_or(0, |o| pool.class(o.binary())));
                put_u16(&mut payload, entry.simple_name.as_deref().map_or(0, |n| pool.utf8(n)));
                put_u16(&mut payload, entry.access.bits());
            }
            attributes.push(("InnerClasses", payload));
        }
        if self.deprecated {
            attributes.push(("Deprecated", Vec::new()));
        }
        let raw: Vec<(&str, Vec<u8>)> = self
            .raw_attributes
            .iter()
            .map(|(name, payload)| (name.as_str(), payload.clone()))
            .collect();
        attributes.extend(raw);
        write_attributes(&mut body, &mut pool, attributes);

        for name in &self.code_references {
            pool.class(name);
        }

        let mut out = Vec::with_capacity(body.len() + pool.bytes.len() + 10);
        out.extend_from_slice(&MAGIC.to_be_bytes());
        put_u16(&mut out, self.version.minor);
        put_u16(&mut out, self.version.major);
        put_u16(&mut out, pool.next);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

fn write_member(body: &mut Vec<u8>, pool: &mut PoolWriter, member: &MemberDescriptor) {
    put_u16(body, member.access.bits());
    put_u16(body, pool.utf8(&member.name));
    put_u16(body, pool.utf8(&member.descriptor));

    let mut attributes = Vec::new();
    if let Some(constant) = &member.constant {
        let index = match constant {
            ConstantValue::Int(v) => pool.integer(*v),
            ConstantValue::Long(v) => pool.long(*v),
            ConstantValue::Float(bits) => pool.float(*bits),
            ConstantValue::Double(bits) => pool.double(*bits),
            ConstantValue::String(v) => pool.string(v),
        };
        attributes.push(("ConstantValue", index.to_be_bytes().to_vec()));
    }
    if let Some(signature) = &member.signature {
        attributes.push(("Signature", pool.utf8(signature).to_be_bytes().to_vec()));
    }
    if !member.exceptions.is_empty() {
        let mut payload = Vec::new();
        put_len(&mut payload, member.exceptions.len());
        for exception in &member.exceptions {
            put_u16(&mut payload, pool.class(exception.binary()));
        }
        attributes.push(("Exceptions", payload));
    }
    annotation_attributes(&mut attributes, pool, &member.annotations);
    for (visible, name) in [
        (true, "RuntimeVisibleParameterAnnotations"),
        (false, "RuntimeInvisibleParameterAnnotations"),
    ] {
        let selected: Vec<Vec<&AnnotationDescriptor>> = member
            .parameter_annotations
            .iter()
            .map(|params| params.iter().filter(|a| is_visible(a) == Some(visible)).collect())
            .collect();
        if selected.iter().any(|p| !p.is_empty()) {
            let mut payload = vec![u8::try_from(selected.len()).unwrap_or(u8::MAX)];
            for params in selected {
                put_len(&mut payload, params.len());
                for a in params {
                    write_annotation(&mut payload, pool, a);
                }
            }
            attributes.push((name, payload));
        }
    }
    if let Some(value) = &member.annotation_default {
        let mut payload = Vec::new();
        write_element_value(&mut payload, pool, value);
        attributes.push(("AnnotationDefault", payload));
    }
    if member.deprecated {
        attributes.push(("Deprecated", Vec::new()));
    }
    write_attributes(body, pool, attributes);
}

/// `Some(true)` for runtime visible, `Some(false)` for class retention,
/// `None` for source retention (not written at all).
fn is_visible(annotation: &AnnotationDescriptor) -> Option<bool> {
    match annotation.retention {
        RetentionPolicy::Runtime => Some(true),
        RetentionPolicy::Class => Some(false),
        RetentionPolicy::Source => None,
    }
}

fn annotation_attributes<'a>(
    attributes: &mut Vec<(&'a str, Vec<u8>)>,
    pool: &mut PoolWriter,
    annotations: &[AnnotationDescriptor],
) {
    for (visible, name) in [
        (true, "RuntimeVisibleAnnotations"),
        (false, "RuntimeInvisibleAnnotations"),
    ] {
        let selected: Vec<_> = annotations
            .iter()
            .filter(|a| is_visible(a) == Some(visible))
            .collect();
        if !selected.is_empty() {
            let mut payload = Vec::new();
            put_len(&mut payload, selected.len());
            for a in selected {
                write_annotation(&mut payload, pool, a);
            }
            attributes.push((name, payload));
        }
    }
}

fn write_annotation(out: &mut Vec<u8>, pool: &mut PoolWriter, annotation: &AnnotationDescriptor) {
    put_u16(out, pool.utf8(&format!("L{};", annotation.name.binary())));
    put_len(out, annotation.values.len());
    for (key, value) in &annotation.values {
        put_u16(out, pool.utf8(key));
        write_element_value(out, pool, value);
    }
}

fn write_element_value(out: &mut Vec<u8>, pool: &mut PoolWriter, value: &ElementValue) {
    match value {
        ElementValue::Byte(v) => tagged(out, b'B', pool.integer(i32::from(*v))),
        ElementValue::Char(v) => tagged(out, b'C', pool.integer(i32::from(*v))),
        ElementValue::Short(v) => tagged(out, b'S', pool.integer(i32::from(*v))),
        ElementValue::Int(v) => tagged(out, b'I', pool.integer(*v)),
        ElementValue::Long(v) => tagged(out, b'J', pool.long(*v)),
        ElementValue::Float(bits) => tagged(out, b'F', pool.float(*bits)),
        ElementValue::Double(bits) => tagged(out, b'D', pool.double(*bits)),
        ElementValue::Boolean(v) => tagged(out, b'Z', pool.integer(i32::from(*v))),
        ElementValue::String(v) => tagged(out, b's', pool.utf8(v)),
        ElementValue::Enum { ty, constant } => {
            tagged(out, b'e', pool.utf8(&format!("L{};", ty.binary())));
            put_u16(out, pool.utf8(constant));
        }
        ElementValue::Class(descriptor) => tagged(out, b'c', pool.utf8(descriptor)),
        ElementValue::Annotation(nested) => {
            out.push(b'@');
            write_annotation(out, pool, nested);
        }
        ElementValue::Array(values) => {
            out.push(b'[');
            put_len(out, values.len());
            for v in values {
                write_element_value(out, pool, v);
            }
        }
    }
}

fn tagged(out: &mut Vec<u8>, tag: u8, index: u16) {
    out.push(tag);
    put_u16(out, index);
}

fn write_attributes(out: &mut Vec<u8>, pool: &mut PoolWriter, attributes: Vec<(&str, Vec<u8>)>) {
    put_len(out, attributes.len());
    for (name, payload) in attributes {
        put_u16(out, pool.utf8(name));
        out.extend_from_slice(&u32::try_from(payload.len()).unwrap_or(u32::MAX).to_be_bytes());
        out.extend_from_slice(&payload);
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_len(out: &mut Vec<u8>, len: usize) {
    put_u16(out, u16::try_from(len).unwrap_or(u16::MAX));
}

/// Constant pool under construction. Equal entries are shared.
struct PoolWriter {
    bytes: Vec<u8>,
    next: u16,
    index: HashMap<Vec<u8>, u16>,
}

impl Default for PoolWriter {
    fn default() -> Self {
        PoolWriter {
            bytes: Vec::new(),
            next: 1,
            index: HashMap::new(),
        }
    }
}

impl PoolWriter {
    fn add(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        if let Some(&index) = self.index.get(&entry) {
            return index;
        }
        let index = self.next;
        self.bytes.extend_from_slice(&entry);
        self.index.insert(entry, index);
        self.next += slots;
        index
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let encoded = encode_mutf8(s);
        let mut entry = vec![1];
        put_len(&mut entry, encoded.len());
        entry.extend_from_slice(&encoded);
        self.add(entry, 1)
    }

    fn class(&mut self, binary: &str) -> u16 {
        let name = self.utf8(binary);
        let mut entry = vec![7];
        put_u16(&mut entry, name);
        self.add(entry, 1)
    }

    fn string(&mut self, s: &str) -> u16 {
        let value = self.utf8(s);
        let mut entry = vec![8];
        put_u16(&mut entry, value);
        self.add(entry, 1)
    }

    fn integer(&mut self, v: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&v.to_be_bytes());
        self.add(entry, 1)
    }

    fn float(&mut self, bits: u32) -> u16 {
        let mut entry = vec![4];
        entry.extend_from_slice(&bits.to_be_bytes());
        self.add(entry, 1)
    }

    fn long(&mut self, v: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&v.to_be_bytes());
        self.add(entry, 2)
    }

    fn double(&mut self, bits: u64) -> u16 {
        let mut entry = vec![6];
        entry.extend_from_slice(&bits.to_be_bytes());
        self.add(entry, 2)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "each arm masks the UTF-16 unit to the bits that fit the output byte"
)]
fn encode_mutf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

//! Class file to `ClassDescriptor`.

use bnd_diagnostic::MalformedClassError;
use bnd_ir::{
    ensure_sufficient_stack, AccessFlags, AnnotationDescriptor, ClassDescriptor, ClassVersion,
    ConstantValue, DescriptorError, ElementTarget, ElementValue, FieldType, InnerClassEntry,
    MemberDescriptor, MemberKind, RetentionPolicy, TypeName,
};

use crate::constant_pool::{descriptor_references, Constant, ConstantPool};
use crate::cursor::ByteCursor;
use crate::signature::signature_references;

/// First four bytes of every class file.
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Parse one class file.
///
/// Fails on truncated input, a bad magic number, an unsupported major
/// version or a structurally invalid constant pool. Unknown attributes are
/// skipped. Referenced classes are recorded but never resolved.
pub fn read_class(bytes: &[u8]) -> Result<ClassDescriptor, MalformedClassError> {
    let mut cursor = ByteCursor::new(bytes);

    let magic = cursor.u32()?;
    if magic != MAGIC {
        return Err(MalformedClassError::BadMagic { found: magic });
    }
    let minor = cursor.u16()?;
    let major = cursor.u16()?;
    if !(ClassVersion::MIN_MAJOR..=ClassVersion::MAX_MAJOR).contains(&major) {
        return Err(MalformedClassError::UnsupportedVersion { major, minor });
    }

    let pool = ConstantPool::parse(&mut cursor)?;

    let mut access = AccessFlags::from_bits_retain(cursor.u16()?);
    let name = pool.class_name(cursor.u16()?)?;
    let super_class = pool.optional_class_name(cursor.u16()?)?;
    let interface_count = cursor.u16()?;
    let mut interfaces = Vec::new();
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(cursor.u16()?)?);
    }

    let mut members = Vec::new();
    for is_field in [true, false] {
        let count = cursor.u16()?;
        for _ in 0..count {
            members.push(read_member(&mut cursor, &pool, is_field)?);
        }
    }

    let class_target = if access.contains(AccessFlags::ANNOTATION) {
        ElementTarget::AnnotationType
    } else if name.is_package_info() {
        ElementTarget::Package
    } else if name.is_module_info() {
        ElementTarget::Module
    } else {
        ElementTarget::Type
    };
    let attributes = read_attributes(&mut cursor, &pool, class_target)?;
    if cursor.remaining() > 0 {
        tracing::trace!(
            class = %name,
            trailing = cursor.remaining(),
            "ignoring bytes after class attributes"
        );
    }
    if attributes.synthetic {
        access |= AccessFlags::SYNTHETIC;
    }

    let mut header_references = Vec::new();
    header_references.extend(super_class.iter().cloned());
    header_references.extend(interfaces.iter().cloned());
    if let Some(signature) = &attributes.signature {
        header_references.extend(lenient_signature_references(signature));
    }
    for annotation in &attributes.annotations {
        annotation.collect_references(&mut header_references);
    }
    normalize(&mut header_references);

    let mut code_references = pool.references()?;
    normalize(&mut code_references);

    Ok(ClassDescriptor {
        name,
        version: ClassVersion::new(major, minor),
        access,
        super_class,
        interfaces,
        signature: attributes.signature,
        annotations: attributes.annotations,
        members,
        inner_classes: attributes.inner_classes,
        deprecated: attributes.deprecated,
        header_references,
        code_references,
    })
}

fn read_member(
    cursor: &mut ByteCursor<'_>,
    pool: &ConstantPool<'_>,
    is_field: bool,
) -> Result<MemberDescriptor, MalformedClassError> {
    let mut access = AccessFlags::from_bits_retain(cursor.u16()?);
    let name = pool.utf8(cursor.u16()?)?;
    let descriptor = pool.utf8(cursor.u16()?)?;

    let (kind, target) = if is_field {
        (MemberKind::Field, ElementTarget::Field)
    } else if name == "<init>" {
        (MemberKind::Constructor, ElementTarget::Constructor)
    } else {
        (MemberKind::Method, ElementTarget::Method)
    };

    let attributes = read_attributes(cursor, pool, target)?;
    if attributes.synthetic {
        access |= AccessFlags::SYNTHETIC;
    }

    let mut references = Vec::new();
    descriptor_references(&descriptor, &mut references)?;
    if let Some(signature) = &attributes.signature {
        references.extend(lenient_signature_references(signature));
    }
    references.extend(attributes.exceptions.iter().cloned());
    for annotation in attributes
        .annotations
        .iter()
        .chain(attributes.parameter_annotations.iter().flatten())
    {
        annotation.collect_references(&mut references);
    }
    if let Some(value) = &attributes.annotation_default {
        value.collect_references(&mut references);
    }
    normalize(&mut references);

    Ok(MemberDescriptor {
        kind,
        name,
        descriptor,
        signature: attributes.signature,
        access,
        annotations: attributes.annotations,
        parameter_annotations: attributes.parameter_annotations,
        constant: attributes.constant,
        exceptions: attributes.exceptions,
        annotation_default: attributes.annotation_default,
        deprecated: attributes.deprecated,
        references,
    })
}

/// Signatures are advisory: a malformed one costs its references, not the class.
fn lenient_signature_references(signature: &str) -> Vec<TypeName> {
    signature_references(signature).unwrap_or_else(|error| {
        tracing::debug!(%error, "ignoring malformed generic signature");
        Vec::new()
    })
}

fn normalize(references: &mut Vec<TypeName>) {
    references.sort();
    references.dedup();
}

/// Attributes shared by classes, fields and methods. Each reader only
/// looks at the ones that apply to it.
#[derive(Default)]
struct Attributes {
    signature: Option<String>,
    constant: Option<ConstantValue>,
    exceptions: Vec<TypeName>,
    annotations: Vec<AnnotationDescriptor>,
    parameter_annotations: Vec<Vec<AnnotationDescriptor>>,
    annotation_default: Option<ElementValue>,
    inner_classes: Vec<InnerClassEntry>,
    deprecated: bool,
    synthetic: bool,
}

fn read_attributes(
    cursor: &mut ByteCursor<'_>,
    pool: &ConstantPool<'_>,
    target: ElementTarget,
) -> Result<Attributes, MalformedClassError> {
    let mut out = Attributes::default();
    let count = cursor.u16()?;
    for _ in 0..count {
        let name = pool.utf8(cursor.u16()?)?;
        let len = usize::try_from(cursor.u32()?).unwrap_or(usize::MAX);
        let mut data = cursor.sub(len)?;

        match name.as_str() {
            "Signature" => out.signature = Some(pool.utf8(data.u16()?)?),
            "ConstantValue" => out.constant = Some(read_constant_value(pool, data.u16()?)?),
            "Exceptions" => {
                let n = data.u16()?;
                for _ in 0..n {
                    out.exceptions.push(pool.class_name(data.u16()?)?);
                }
            }
            "RuntimeVisibleAnnotations" => {
                read_annotations(&mut data, pool, RetentionPolicy::Runtime, target, &mut out.annotations)?;
            }
            "RuntimeInvisibleAnnotations" => {
                read_annotations(&mut data, pool, RetentionPolicy::Class, target, &mut out.annotations)?;
            }
            "RuntimeVisibleParameterAnnotations" => {
                read_parameter_annotations(&mut data, pool, RetentionPolicy::Runtime, &mut out)?;
            }
            "RuntimeInvisibleParameterAnnotations" => {
                read_parameter_annotations(&mut data, pool, RetentionPolicy::Class, &mut out)?;
            }
            "AnnotationDefault" => {
                out.annotation_default = Some(read_element_value(
                    &mut data,
                    pool,
                    RetentionPolicy::Class,
                    target,
                )?);
            }
            "InnerClasses" => {
                let n = data.u16()?;
                for _ in 0..n {
                    let inner = pool.class_name(data.u16()?)?;
                    let outer = pool.optional_class_name(data.u16()?)?;
                    let simple_name = pool.optional_utf8(data.u16()?)?;
                    let access = AccessFlags::from_bits_retain(data.u16()?);
                    out.inner_classes.push(InnerClassEntry {
                        inner,
                        outer,
                        simple_name,
                        access,
                    });
                }
            }
            "Deprecated" => out.deprecated = true,
            "Synthetic" => out.synthetic = true,
            other => tracing::trace!(attribute = other, len, "skipping attribute"),
        }
    }
    Ok(out)
}

fn read_constant_value(
    pool: &ConstantPool<'_>,
    index: u16,
) -> Result<ConstantValue, MalformedClassError> {
    Ok(match *pool.get(index)? {
        Constant::Integer(v) => ConstantValue::Int(v),
        Constant::Long(v) => ConstantValue::Long(v),
        Constant::Float(bits) => ConstantValue::Float(bits),
        Constant::Double(bits) => ConstantValue::Double(bits),
        Constant::String { value } => ConstantValue::String(pool.utf8(value)?),
        other => {
            return Err(MalformedClassError::UnexpectedConstant {
                index,
                expected: "constant value",
                found: other.kind(),
            })
        }
    })
}

fn read_annotations(
    data: &mut ByteCursor<'_>,
    pool: &ConstantPool<'_>,
    retention: RetentionPolicy,
    target: ElementTarget,
    out: &mut Vec<AnnotationDescriptor>,
) -> Result<(), MalformedClassError> {
    let n = data.u16()?;
    for _ in 0..n {
        out.push(read_annotation(data, pool, retention, target)?);
    }
    Ok(())
}

fn read_parameter_annotations(
    data: &mut ByteCursor<'_>,
    pool: &ConstantPool<'_>,
    retention: RetentionPolicy,
    out: &mut Attributes,
) -> Result<(), MalformedClassError> {
    let parameters = usize::from(data.u8()?);
    if out.parameter_annotations.len() < parameters {
        out.parameter_annotations.resize_with(parameters, Vec::new);
    }
    for slot in out.parameter_annotations.iter_mut().take(parameters) {
        read_annotations(data, pool, retention, ElementTarget::Parameter, slot)?;
    }
    Ok(())
}

/// The class named by an `Lname;` descriptor.
fn object_descriptor(descriptor: &str) -> Result<TypeName, MalformedClassError> {
    match FieldType::parse(descriptor)? {
        FieldType::Object(name) => Ok(name),
        _ => Err(MalformedClassError::InvalidDescriptor(DescriptorError {
            descriptor: descriptor.to_owned(),
            position: 0,
        })),
    }
}

fn read_annotation(
    data: &mut ByteCursor<'_>,
    pool: &ConstantPool<'_>,
    retention: RetentionPolicy,
    target: ElementTarget,
) -> Result<AnnotationDescriptor, MalformedClassError> {
    let name = object_descriptor(&pool.utf8(data.u16()?)?)?;
    let pairs = data.u16()?;
    let mut values = Vec::new();
    for _ in 0..pairs {
        let key = pool.utf8(data.u16()?)?;
        let value = read_element_value(data, pool, retention, target)?;
        values.push((key, value));
    }
    Ok(AnnotationDescriptor {
        name,
        retention,
        target,
        values,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "byte, char and short element values are stored as int constants"
)]
fn read_element_value(
    data: &mut ByteCursor<'_>,
    pool: &ConstantPool<'_>,
    retention: RetentionPolicy,
    target: ElementTarget,
) -> Result<ElementValue, MalformedClassError> {
    ensure_sufficient_stack(|| {
        let tag = data.u8()?;
        Ok(match tag {
            b'B' => ElementValue::Byte(pool.integer(data.u16()?)? as i8),
            b'C' => ElementValue::Char(pool.integer(data.u16()?)? as u16),
            b'S' => ElementValue::Short(pool.integer(data.u16()?)? as i16),
            b'I' => ElementValue::Int(pool.integer(data.u16()?)?),
            b'Z' => ElementValue::Boolean(pool.integer(data.u16()?)? != 0),
            b'J' => ElementValue::Long(pool.long(data.u16()?)?),
            b'F' => ElementValue::Float(pool.float(data.u16()?)?),
            b'D' => ElementValue::Double(pool.double(data.u16()?)?),
            b's' => ElementValue::String(pool.utf8(data.u16()?)?),
            b'e' => {
                let ty = object_descriptor(&pool.utf8(data.u16()?)?)?;
                let constant = pool.utf8(data.u16()?)?;
                ElementValue::Enum { ty, constant }
            }
            b'c' => ElementValue::Class(pool.utf8(data.u16()?)?),
            b'@' => ElementValue::Annotation(Box::new(read_annotation(
                data, pool, retention, target,
            )?)),
            b'[' => {
                let n = data.u16()?;
                let mut values = Vec::new();
                for _ in 0..n {
                    values.push(read_element_value(data, pool, retention, target)?);
                }
                ElementValue::Array(values)
            }
            tag => return Err(MalformedClassError::UnknownElementTag { tag }),
        })
    })
}

#[cfg(test)]
mod tests;

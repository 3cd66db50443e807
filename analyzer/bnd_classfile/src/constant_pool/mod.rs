//! Constant pool decoding.
//!
//! Entries borrow from the class file bytes; strings are decoded from
//! modified UTF-8 only when asked for. Index 0 and the slot after every
//! `Long`/`Double` are unusable.

use bnd_diagnostic::MalformedClassError;
use bnd_ir::{FieldType, MethodType, TypeName};

use crate::cursor::ByteCursor;
use crate::mutf8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Constant<'a> {
    Unusable,
    Utf8(&'a [u8]),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class { name: u16 },
    String { value: u16 },
    NameAndType { descriptor: u16 },
    MethodType { descriptor: u16 },
    /// Entries the analyzer never dereferences (member refs, method
    /// handles, dynamic call sites, module and package names).
    Other(&'static str),
}

impl Constant<'_> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Constant::Unusable => "unusable slot",
            Constant::Utf8(_) => "Utf8",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long(_) => "Long",
            Constant::Double(_) => "Double",
            Constant::Class { .. } => "Class",
            Constant::String { .. } => "String",
            Constant::NameAndType { .. } => "NameAndType",
            Constant::MethodType { .. } => "MethodType",
            Constant::Other(kind) => *kind,
        }
    }
}

pub(crate) struct ConstantPool<'a> {
    entries: Vec<Constant<'a>>,
    /// `constant_pool_count` as declared.
    count: u16,
}

impl<'a> ConstantPool<'a> {
    pub(crate) fn parse(cursor: &mut ByteCursor<'a>) -> Result<Self, MalformedClassError> {
        let count = cursor.u16()?;
        let mut entries = Vec::with_capacity(usize::from(count).min(cursor.remaining() / 3 + 1));
        entries.push(Constant::Unusable);

        let mut index = 1u16;
        while index < count {
            let tag = cursor.u8()?;
            let constant = match tag {
                1 => {
                    let len = cursor.u16()?;
                    Constant::Utf8(cursor.take(usize::from(len))?)
                }
                3 => Constant::Integer(i32::from_be_bytes(cursor.u32()?.to_be_bytes())),
                4 => Constant::Float(cursor.u32()?),
                5 => Constant::Long(i64::from_be_bytes(cursor.u64()?.to_be_bytes())),
                6 => Constant::Double(cursor.u64()?),
                7 => Constant::Class { name: cursor.u16()? },
                8 => Constant::String {
                    value: cursor.u16()?,
                },
                9 => skip(cursor, 4, "Fieldref")?,
                10 => skip(cursor, 4, "Methodref")?,
                11 => skip(cursor, 4, "InterfaceMethodref")?,
                12 => {
                    cursor.u16()?;
                    Constant::NameAndType {
                        descriptor: cursor.u16()?,
                    }
                }
                15 => skip(cursor, 3, "MethodHandle")?,
                16 => Constant::MethodType {
                    descriptor: cursor.u16()?,
                },
                17 => skip(cursor, 4, "Dynamic")?,
                18 => skip(cursor, 4, "InvokeDynamic")?,
                19 => skip(cursor, 2, "Module")?,
                20 => skip(cursor, 2, "Package")?,
                _ => return Err(MalformedClassError::UnknownConstantTag { tag, index }),
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            if wide {
                entries.push(Constant::Unusable);
                index = index.saturating_add(2);
            } else {
                index += 1;
            }
        }

        Ok(ConstantPool { entries, count })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&Constant<'a>, MalformedClassError> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Unusable) | None => Err(MalformedClassError::BadConstantPoolIndex {
                index,
                size: self.count,
            }),
            Some(constant) => Ok(constant),
        }
    }

    fn unexpected(&self, index: u16, expected: &'static str) -> MalformedClassError {
        MalformedClassError::UnexpectedConstant {
            index,
            expected,
            found: self
                .entries
                .get(usize::from(index))
                .map_or("nothing", Constant::kind),
        }
    }

    pub(crate) fn utf8(&self, index: u16) -> Result<String, MalformedClassError> {
        match self.get(index)? {
            Constant::Utf8(bytes) => {
                mutf8::decode(bytes).ok_or(MalformedClassError::InvalidUtf8 { index })
            }
            _ => Err(self.unexpected(index, "Utf8")),
        }
    }

    /// Name of a `Class` entry in binary form (array classes keep their descriptor).
    pub(crate) fn class_name(&self, index: u16) -> Result<TypeName, MalformedClassError> {
        match self.get(index)? {
            Constant::Class { name } => Ok(TypeName::new(self.utf8(*name)?)),
            _ => Err(self.unexpected(index, "Class")),
        }
    }

    /// Like `class_name`, with index 0 meaning "none".
    pub(crate) fn optional_class_name(
        &self,
        index: u16,
    ) -> Result<Option<TypeName>, MalformedClassError> {
        if index == 0 {
            Ok(None)
        } else {
            self.class_name(index).map(Some)
        }
    }

    pub(crate) fn optional_utf8(&self, index: u16) -> Result<Option<String>, MalformedClassError> {
        if index == 0 {
            Ok(None)
        } else {
            self.utf8(index).map(Some)
        }
    }

    pub(crate) fn integer(&self, index: u16) -> Result<i32, MalformedClassError> {
        match self.get(index)? {
            Constant::Integer(v) => Ok(*v),
            _ => Err(self.unexpected(index, "Integer")),
        }
    }

    pub(crate) fn float(&self, index: u16) -> Result<u32, MalformedClassError> {
        match self.get(index)? {
            Constant::Float(v) => Ok(*v),
            _ => Err(self.unexpected(index, "Float")),
        }
    }

    pub(crate) fn long(&self, index: u16) -> Result<i64, MalformedClassError> {
        match self.get(index)? {
            Constant::Long(v) => Ok(*v),
            _ => Err(self.unexpected(index, "Long")),
        }
    }

    pub(crate) fn double(&self, index: u16) -> Result<u64, MalformedClassError> {
        match self.get(index)? {
            Constant::Double(v) => Ok(*v),
            _ => Err(self.unexpected(index, "Double")),
        }
    }

    /// Every class the pool names: `Class` entries (array classes reduced
    /// to their element class) plus classes in name-and-type and
    /// method-type descriptors. Unsorted, may contain duplicates.
    pub(crate) fn references(&self) -> Result<Vec<TypeName>, MalformedClassError> {
        let mut out = Vec::new();
        for constant in &self.entries {
            match *constant {
                Constant::Class { name } => {
                    let binary = self.utf8(name)?;
                    if binary.starts_with('[') {
                        if let Some(element) = FieldType::parse(&binary)?.object_type() {
                            out.push(element.clone());
                        }
                    } else {
                        out.push(TypeName::new(binary));
                    }
                }
                Constant::NameAndType { descriptor } => {
                    descriptor_references(&self.utf8(descriptor)?, &mut out)?;
                }
                Constant::MethodType { descriptor } => {
                    let descriptor = self.utf8(descriptor)?;
                    out.extend(MethodType::parse(&descriptor)?.referenced_types().cloned());
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

fn skip<'a>(
    cursor: &mut ByteCursor<'a>,
    len: usize,
    kind: &'static str,
) -> Result<Constant<'a>, MalformedClassError> {
    cursor.take(len)?;
    Ok(Constant::Other(kind))
}

/// Classes named by a field or method descriptor.
pub(crate) fn descriptor_references(
    descriptor: &str,
    out: &mut Vec<TypeName>,
) -> Result<(), MalformedClassError> {
    if descriptor.starts_with('(') {
        out.extend(MethodType::parse(descriptor)?.referenced_types().cloned());
    } else if let Some(name) = FieldType::parse(descriptor)?.object_type() {
        out.push(name.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests;

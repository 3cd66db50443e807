//! JVM field and method descriptors.
//!
//! Descriptors (`I`, `[Ljava/lang/String;`, `(IJ)V`) are kept as raw strings
//! on members; these types parse them on demand for rendering Java names and
//! extracting referenced classes.

use smallvec::SmallVec;
use std::fmt;

use crate::TypeName;

/// Maximum array dimensions the class file format allows.
const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn from_descriptor_char(c: u8) -> Option<Self> {
        Some(match c {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    /// The Java keyword for this type.
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

/// A parsed field descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    Object(TypeName),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut parser = Parser::new(descriptor);
        let ty = parser.field_type()?;
        parser.expect_end()?;
        Ok(ty)
    }

    /// Java source rendering: `int`, `java.lang.String`, `byte[][]`.
    pub fn java_name(&self) -> String {
        match self {
            FieldType::Base(base) => base.keyword().to_owned(),
            FieldType::Object(name) => name.fqn(),
            FieldType::Array(element) => {
                let mut name = element.java_name();
                name.push_str("[]");
                name
            }
        }
    }

    /// The class at the bottom of any array nesting, if there is one.
    pub fn object_type(&self) -> Option<&TypeName> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Object(name) => Some(name),
            FieldType::Array(element) => element.object_type(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Base(_))
    }
}

/// A parsed method descriptor. `return_type` is `None` for `void`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodType {
    pub parameters: SmallVec<[FieldType; 4]>,
    pub return_type: Option<FieldType>,
}

impl MethodType {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut parser = Parser::new(descriptor);
        parser.expect(b'(')?;
        let mut parameters = SmallVec::new();
        while parser.peek() != Some(b')') {
            parameters.push(parser.field_type()?);
        }
        parser.expect(b')')?;
        let return_type = if parser.peek() == Some(b'V') {
            parser.pos += 1;
            None
        } else {
            Some(parser.field_type()?)
        };
        parser.expect_end()?;
        Ok(MethodType {
            parameters,
            return_type,
        })
    }

    /// Comma separated Java names of the parameters, without parentheses.
    pub fn java_parameters(&self) -> String {
        let mut out = String::new();
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&param.java_name());
        }
        out
    }

    /// Every class named by a parameter or the return type.
    pub fn referenced_types(&self) -> impl Iterator<Item = &TypeName> {
        self.parameters
            .iter()
            .chain(self.return_type.iter())
            .filter_map(FieldType::object_type)
    }
}

/// A descriptor string that does not follow the JVM grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    pub descriptor: String,
    pub position: usize,
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid descriptor `{}` at byte {}",
            self.descriptor, self.position
        )
    }
}

impl std::error::Error for DescriptorError {}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Parser { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn error(&self) -> DescriptorError {
        DescriptorError {
            descriptor: self.text.to_owned(),
            position: self.pos,
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), DescriptorError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn expect_end(&self) -> Result<(), DescriptorError> {
        if self.pos == self.text.len() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn field_type(&mut self) -> Result<FieldType, DescriptorError> {
        let mut dimensions = 0;
        while self.peek() == Some(b'[') {
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(self.error());
            }
            self.pos += 1;
        }

        let mut ty = match self.peek() {
            Some(b'L') => {
                self.pos += 1;
                let rest = &self.text[self.pos..];
                let end = rest.find(';').ok_or_else(|| self.error())?;
                if end == 0 {
                    return Err(self.error());
                }
                let name = TypeName::new(&rest[..end]);
                self.pos += end + 1;
                FieldType::Object(name)
            }
            Some(c) => {
                let base = BaseType::from_descriptor_char(c).ok_or_else(|| self.error())?;
                self.pos += 1;
                FieldType::Base(base)
            }
            None => return Err(self.error()),
        };

        for _ in 0..dimensions {
            ty = FieldType::Array(Box::new(ty));
        }
        Ok(ty)
    }
}

#[cfg(test)]
mod tests;

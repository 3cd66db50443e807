//! Generic signature scanning.
//!
//! Signatures (`Signature` attribute) mention classes that the erased
//! descriptor does not, such as type arguments and bounds. Only the set of
//! classes is extracted; the generic structure itself is not modelled.

use bnd_ir::{ensure_sufficient_stack, DescriptorError, TypeName};

/// Classes named by a class, method or field signature. Unsorted, may
/// contain duplicates. Nested classes (`Lcom/acme/Outer<TT;>.Inner;`) are reported
/// by their binary name (`com/acme/Outer$Inner`).
pub fn signature_references(signature: &str) -> Result<Vec<TypeName>, DescriptorError> {
    let mut scanner = Scanner {
        text: signature,
        pos: 0,
        out: Vec::new(),
    };
    scanner.signature()?;
    Ok(scanner.out)
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    out: Vec<TypeName>,
}

impl<'a> Scanner<'a> {
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

    /// Identifier up to (not including) any of `stops`.
    fn identifier(&mut self, stops: &[u8]) -> Result<&'a str, DescriptorError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if stops.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start || self.peek().is_none() {
            return Err(self.error());
        }
        let text = self.text;
        Ok(&text[start..self.pos])
    }

    fn signature(&mut self) -> Result<(), DescriptorError> {
        if self.peek() == Some(b'<') {
            self.type_parameters()?;
        }

        if self.peek() == Some(b'(') {
            self.pos += 1;
            while self.peek() != Some(b')') {
                self.java_type()?;
            }
            self.pos += 1;
            if self.peek() == Some(b'V') {
                self.pos += 1;
            } else {
                self.java_type()?;
            }
            while self.peek() == Some(b'^') {
                self.pos += 1;
                self.reference_type()?;
            }
        } else {
            // Class signature (super class + interfaces) or field signature
            self.reference_type()?;
            while self.peek().is_some() {
                self.reference_type()?;
            }
        }

        if self.peek().is_some() {
            return Err(self.error());
        }
        Ok(())
    }

    fn type_parameters(&mut self) -> Result<(), DescriptorError> {
        self.expect(b'<')?;
        loop {
            self.identifier(b":>;")?;
            self.expect(b':')?;
            // Class bound may be empty (`T::Ljava/lang/Runnable;`)
            if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                self.reference_type()?;
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                self.reference_type()?;
            }
            if self.peek() == Some(b'>') {
                self.pos += 1;
                return Ok(());
            }
        }
    }

    fn java_type(&mut self) -> Result<(), DescriptorError> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.pos += 1;
                Ok(())
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<(), DescriptorError> {
        ensure_sufficient_stack(|| match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => {
                self.pos += 1;
                self.identifier(b";")?;
                self.expect(b';')
            }
            Some(b'[') => {
                self.pos += 1;
                self.java_type()
            }
            _ => Err(self.error()),
        })
    }

    fn class_type(&mut self) -> Result<(), DescriptorError> {
        self.expect(b'L')?;
        let mut name = self.identifier(b"<.;")?.to_owned();
        if self.peek() == Some(b'<') {
            self.type_arguments()?;
        }
        while self.peek() == Some(b'.') {
            self.pos += 1;
            let inner = self.identifier(b"<.;")?;
            name.push('$');
            name.push_str(inner);
            if self.peek() == Some(b'<') {
                self.type_arguments()?;
            }
        }
        self.expect(b';')?;
        self.out.push(TypeName::new(name));
        Ok(())
    }

    fn type_arguments(&mut self) -> Result<(), DescriptorError> {
        self.expect(b'<')?;
        while self.peek() != Some(b'>') {
            match self.peek() {
                Some(b'*') => self.pos += 1,
                Some(b'+' | b'-') => {
                    self.pos += 1;
                    self.reference_type()?;
                }
                _ => self.reference_type()?,
            }
        }
        self.pos += 1;
        Ok(())
    }
}

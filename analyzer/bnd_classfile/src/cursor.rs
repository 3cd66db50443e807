//! Big-endian byte cursor with bounds-checked reads.

use bnd_diagnostic::MalformedClassError;

pub(crate) struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Absolute offset of `bytes[0]` in the class file, for error messages.
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        ByteCursor {
            bytes,
            pos: 0,
            base: 0,
        }
    }

    /// Absolute offset of the next byte.
    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], MalformedClassError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(MalformedClassError::Truncated {
                offset: self.offset(),
                needed: n,
            })?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], MalformedClassError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, MalformedClassError> {
        Ok(self.array::<1>()?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, MalformedClassError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, MalformedClassError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, MalformedClassError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    /// Split off the next `n` bytes as their own cursor.
    pub(crate) fn sub(&mut self, n: usize) -> Result<ByteCursor<'a>, MalformedClassError> {
        let base = self.offset();
        let bytes = self.take(n)?;
        Ok(ByteCursor { bytes, pos: 0, base })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_big_endian() {
        let mut cursor = ByteCursor::new(&[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34]);
        assert_eq!(cursor.u32(), Ok(0xCAFE_BABE));
        assert_eq!(cursor.u16(), Ok(52));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn truncation_reports_offset() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        assert_eq!(cursor.u16(), Ok(0x0102));
        assert_eq!(
            cursor.u32(),
            Err(MalformedClassError::Truncated {
                offset: 2,
                needed: 4
            })
        );
    }

    #[test]
    fn sub_cursor_keeps_absolute_offsets() {
        let mut cursor = ByteCursor::new(&[0, 0, 7, 8]);
        cursor.u16().unwrap_or_else(|e| panic!("{e}"));
        let mut sub = cursor.sub(1).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(sub.u8(), Ok(7));
        assert_eq!(
            sub.u8(),
            Err(MalformedClassError::Truncated {
                offset: 3,
                needed: 1
            })
        );
        assert_eq!(cursor.u8(), Ok(8));
    }

    #[test]
    fn huge_lengths_do_not_overflow() {
        let mut cursor = ByteCursor::new(&[0]);
        cursor.u8().unwrap_or_else(|e| panic!("{e}"));
        assert!(cursor.take(usize::MAX).is_err());
    }
}

//! Modified UTF-8 as used by class file constants.
//!
//! Differs from standard UTF-8 in two ways: U+0000 is written as `C0 80`,
//! and supplementary characters are written as two three-byte surrogates.

/// Decode modified UTF-8. Returns `None` for malformed input. Unpaired
/// surrogates decode to U+FFFD.
pub(crate) fn decode(bytes: &[u8]) -> Option<String> {
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        return std::str::from_utf8(bytes).ok().map(str::to_owned);
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == 0 {
            return None;
        }
        if b < 0x80 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = continuation(bytes.get(i + 1))?;
            units.push((u16::from(b & 0x1F) << 6) | b2);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = continuation(bytes.get(i + 1))?;
            let b3 = continuation(bytes.get(i + 2))?;
            units.push((u16::from(b & 0x0F) << 12) | (b2 << 6) | b3);
            i += 3;
        } else {
            return None;
        }
    }

    Some(
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}

fn continuation(byte: Option<&u8>) -> Option<u16> {
    let b = *byte?;
    (b & 0xC0 == 0x80).then_some(u16::from(b & 0x3F))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ascii() {
        assert_eq!(decode(b"java/lang/Object").as_deref(), Some("java/lang/Object"));
    }

    #[test]
    fn embedded_null() {
        assert_eq!(decode(&[b'a', 0xC0, 0x80, b'b']).as_deref(), Some("a\0b"));
        assert_eq!(decode(&[b'a', 0, b'b']), None);
    }

    #[test]
    fn two_and_three_byte_forms() {
        // é, €
        assert_eq!(decode(&[0xC3, 0xA9, 0xE2, 0x82, 0xAC]).as_deref(), Some("é€"));
    }

    #[test]
    fn supplementary_as_surrogate_pair() {
        // U+1F600 as D83D DE00
        let bytes = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode(&bytes).as_deref(), Some("\u{1F600}"));
    }

    #[test]
    fn lone_surrogate_is_replaced() {
        let bytes = [0xED, 0xA0, 0xBD];
        assert_eq!(decode(&bytes).as_deref(), Some("\u{FFFD}"));
    }

    #[test]
    fn malformed() {
        assert_eq!(decode(&[0xC3]), None);
        assert_eq!(decode(&[0xE2, 0x82]), None);
        assert_eq!(decode(&[0xF0, 0x9F, 0x98, 0x80]), None);
        assert_eq!(decode(&[0xC3, 0x29]), None);
    }
}

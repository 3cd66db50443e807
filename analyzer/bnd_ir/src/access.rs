//! Class, field and method access flags.
//!
//! Bit values follow the class file format. Some bits mean different things
//! depending on where they appear (`0x0020` is `ACC_SUPER` on a class and
//! `ACC_SYNCHRONIZED` on a method); aliases are provided for both readings.

use bitflags::bitflags;

bitflags! {
    /// Raw access flags of a class or member.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        /// `ACC_SUPER` on classes, `ACC_SYNCHRONIZED` on methods.
        const SUPER = 0x0020;
        /// `ACC_VOLATILE` on fields, `ACC_BRIDGE` on methods.
        const VOLATILE = 0x0040;
        /// `ACC_TRANSIENT` on fields, `ACC_VARARGS` on methods.
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;

        const SYNCHRONIZED = Self::SUPER.bits();
        const BRIDGE = Self::VOLATILE.bits();
        const VARARGS = Self::TRANSIENT.bits();
    }
}

impl AccessFlags {
    /// Public or protected: reachable by code outside the package.
    #[inline]
    pub fn is_api_visible(self) -> bool {
        self.intersects(AccessFlags::PUBLIC | AccessFlags::PROTECTED)
    }

    #[inline]
    pub fn is_synthetic(self) -> bool {
        self.contains(AccessFlags::SYNTHETIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_visibility() {
        assert!(AccessFlags::PUBLIC.is_api_visible());
        assert!(AccessFlags::PROTECTED.is_api_visible());
        assert!(!AccessFlags::PRIVATE.is_api_visible());
        assert!(!AccessFlags::empty().is_api_visible());
    }

    #[test]
    fn aliases_share_bits() {
        let flags = AccessFlags::from_bits_retain(0x0040);
        assert!(flags.contains(AccessFlags::BRIDGE));
        assert!(flags.contains(AccessFlags::VOLATILE));
    }

    #[test]
    fn synthetic_bridge_method() {
        let flags = AccessFlags::from_bits_retain(0x1041);
        assert!(flags.is_synthetic());
        assert!(flags.contains(AccessFlags::BRIDGE | AccessFlags::PUBLIC));
    }
}

//! Binary class names.

use std::fmt;

/// A class name in binary (internal) form, e.g. `java/util/Map$Entry`.
///
/// Ordering and equality follow the binary string, so collections keyed by
/// `TypeName` iterate in a stable order independent of discovery order.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeName(Box<str>);

impl TypeName {
    /// Create from a binary name (`/` separated).
    pub fn new(binary: impl Into<Box<str>>) -> Self {
        TypeName(binary.into())
    }

    /// Create from a fully qualified Java name (`.` separated).
    pub fn from_fqn(fqn: &str) -> Self {
        TypeName(fqn.replace('.', "/").into_boxed_str())
    }

    /// The binary form, `/` separated.
    #[inline]
    pub fn binary(&self) -> &str {
        &self.0
    }

    /// The fully qualified Java name, `.` separated. Nested class markers
    /// (`$`) are kept as they appear in the binary name.
    pub fn fqn(&self) -> String {
        self.0.replace('/', ".")
    }

    /// The binary package prefix, or `""` for the default package.
    pub fn package_binary(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// The dotted package name, or `""` for the default package.
    pub fn package_fqn(&self) -> String {
        self.package_binary().replace('/', ".")
    }

    /// Whether this type lives in the default (unnamed) package.
    pub fn in_default_package(&self) -> bool {
        !self.0.contains('/')
    }

    /// The name after the last package separator, including any `$` parts.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Whether this type belongs to a `java.*` package.
    pub fn is_java(&self) -> bool {
        self.0.starts_with("java/")
    }

    pub fn is_object(&self) -> bool {
        &*self.0 == "java/lang/Object"
    }

    /// `package-info` classes carry package level annotations only.
    pub fn is_package_info(&self) -> bool {
        self.simple_name() == "package-info"
    }

    pub fn is_module_info(&self) -> bool {
        &*self.0 == "module-info"
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn())
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({})", self.0)
    }
}

/// Whether a dotted package name is `java` or one of its subpackages.
///
/// These packages are always provided by the platform and never become
/// imports or dependency graph vertices.
pub fn is_java_package(name: &str) -> bool {
    name == "java" || name.starts_with("java.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn package_of_nested_class() {
        let name = TypeName::new("com/acme/Outer$Inner");
        assert_eq!(name.package_fqn(), "com.acme");
        assert_eq!(name.simple_name(), "Outer$Inner");
        assert_eq!(name.fqn(), "com.acme.Outer$Inner");
    }

    #[test]
    fn default_package() {
        let name = TypeName::new("Main");
        assert!(name.in_default_package());
        assert_eq!(name.package_fqn(), "");
        assert_eq!(name.simple_name(), "Main");
    }

    #[test]
    fn from_fqn_roundtrips_display() {
        let name = TypeName::from_fqn("java.lang.String");
        assert_eq!(name.binary(), "java/lang/String");
        assert_eq!(name.to_string(), "java.lang.String");
        assert!(name.is_java());
    }

    #[test]
    fn java_packages() {
        assert!(is_java_package("java"));
        assert!(is_java_package("java.util.concurrent"));
        assert!(!is_java_package("javax.net"));
        assert!(!is_java_package("javafx"));
    }

    #[test]
    fn info_classes() {
        assert!(TypeName::new("com/acme/package-info").is_package_info());
        assert!(TypeName::new("module-info").is_module_info());
        assert!(!TypeName::new("com/acme/module-info").is_module_info());
    }
}

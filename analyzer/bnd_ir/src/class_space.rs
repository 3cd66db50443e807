//! The set of classes that make up a bundle.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use crate::{ClassDescriptor, TypeName};

/// Classes of one bundle, keyed and iterated by binary name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassSpace {
    classes: BTreeMap<TypeName, ClassDescriptor>,
}

impl ClassSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, returning the one it replaced, if any.
    pub fn insert(&mut self, class: ClassDescriptor) -> Option<ClassDescriptor> {
        self.classes.insert(class.name.clone(), class)
    }

    pub fn get(&self, name: &TypeName) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.classes.contains_key(name)
    }

    pub fn iter(&self) -> btree_map::Values<'_, TypeName, ClassDescriptor> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Dotted names of all packages with at least one class, sorted.
    pub fn packages(&self) -> BTreeSet<String> {
        self.classes.keys().map(TypeName::package_fqn).collect()
    }

    /// Classes of one package, in name order.
    pub fn classes_in<'a>(
        &'a self,
        package: &'a str,
    ) -> impl Iterator<Item = &'a ClassDescriptor> + 'a {
        self.classes
            .values()
            .filter(move |c| c.name.package_fqn() == package)
    }
}

impl<'a> IntoIterator for &'a ClassSpace {
    type Item = &'a ClassDescriptor;
    type IntoIter = btree_map::Values<'a, TypeName, ClassDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ClassDescriptor> for ClassSpace {
    fn from_iter<I: IntoIterator<Item = ClassDescriptor>>(iter: I) -> Self {
        let mut space = ClassSpace::new();
        for class in iter {
            space.insert(class);
        }
        space
    }
}

//! API tree construction.
//!
//! ```text
//! API <api>
//!   CLASS_VERSION JavaSE-1.8
//!   PACKAGE com.acme
//!     VERSION <version> = 1.2.0
//!     INTERFACE com.acme.Service
//!       ACCESS abstract
//!       ANNOTATED org.osgi.annotation.versioning.ProviderType
//!       IMPLEMENTS com.acme.Base
//!       METHOD lookup(java.lang.String)
//!         ACCESS abstract
//!         RETURN com.acme.Value
//!         THROWS java.io.IOException
//!       FIELD int LIMIT
//!         CONSTANT <constant> = 10
//! ```
//!
//! Only what a consumer of the package can observe makes it into the tree:
//! public classes of exported packages and their public or protected
//! members. Members inherited from classes in the same space are folded
//! into each subclass.

use std::collections::{BTreeMap, BTreeSet};

use bnd_ir::{
    ensure_sufficient_stack, AccessFlags, AnnotationDescriptor, ClassDescriptor, ClassSpace,
    FieldType, MemberDescriptor, MethodType, TypeName,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::manifest::ManifestModel;
use crate::{Element, Tree, Type};

/// Name of the `API` root node.
pub const API_ROOT: &str = "<api>";

/// Name of the `VERSION` node under an exported package.
pub const VERSION_NODE: &str = "<version>";

const PROVIDER_TYPES: [&str; 2] = [
    "org.osgi.annotation.versioning.ProviderType",
    "aQute.bnd.annotation.ProviderType",
];

const CONSUMER_TYPES: [&str; 2] = [
    "org.osgi.annotation.versioning.ConsumerType",
    "aQute.bnd.annotation.ConsumerType",
];

/// Exported packages and their versions.
///
/// An empty set exports every package of the class space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Exports {
    packages: BTreeMap<String, Option<String>>,
}

impl Exports {
    pub fn new() -> Self {
        Exports::default()
    }

    pub fn insert(&mut self, package: impl Into<String>, version: Option<String>) {
        self.packages.insert(package.into(), version);
    }

    #[must_use]
    pub fn with(mut self, package: impl Into<String>, version: Option<&str>) -> Self {
        self.insert(package, version.map(str::to_owned));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn version(&self, package: &str) -> Option<&str> {
        self.packages.get(package).and_then(Option::as_deref)
    }

    /// Exported packages in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.packages
            .iter()
            .map(|(package, version)| (package.as_str(), version.as_deref()))
    }
}

impl<'a> FromIterator<&'a str> for Exports {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut exports = Exports::new();
        for package in iter {
            exports.insert(package, None);
        }
        exports
    }
}

/// Options for [`api_tree`] and [`bundle_tree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiOptions {
    /// Name of the `BUNDLE` root.
    pub bundle_name: String,
    pub exports: Exports,
}

impl Default for ApiOptions {
    fn default() -> Self {
        ApiOptions {
            bundle_name: "<bundle>".to_owned(),
            exports: Exports::new(),
        }
    }
}

/// Builds the `API` element of one class space.
///
/// Class elements are memoized: a class inherited by many subclasses is
/// described once.
pub struct ApiTreeBuilder<'s> {
    space: &'s ClassSpace,
    options: &'s ApiOptions,
    /// Nested classes whose `InnerClasses` access hides them.
    hidden: FxHashSet<&'s TypeName>,
    classes: FxHashMap<&'s TypeName, Element>,
    in_progress: FxHashSet<&'s TypeName>,
    returns: FxHashMap<TypeName, Vec<Element>>,
    returns_in_progress: FxHashSet<TypeName>,
}

impl<'s> ApiTreeBuilder<'s> {
    pub fn new(space: &'s ClassSpace, options: &'s ApiOptions) -> Self {
        let hidden = space
            .iter()
            .flat_map(|class| &class.inner_classes)
            .filter(|entry| !entry.access.is_api_visible())
            .map(|entry| &entry.inner)
            .collect();
        ApiTreeBuilder {
            space,
            options,
            hidden,
            classes: FxHashMap::default(),
            in_progress: FxHashSet::default(),
            returns: FxHashMap::default(),
            returns_in_progress: FxHashSet::default(),
        }
    }

    fn is_exported(&self, package: &str) -> bool {
        !package.is_empty()
            && (self.options.exports.is_empty() || self.options.exports.contains(package))
    }

    fn is_api_class(&self, class: &ClassDescriptor) -> bool {
        class.is_public()
            && !class.access.is_synthetic()
            && !class.name.is_package_info()
            && !class.name.is_module_info()
            && !self.hidden.contains(&class.name)
            && self.is_exported(&class.package_fqn())
    }

    pub fn build(mut self) -> Element {
        let space = self.space;
        let mut packages: BTreeMap<String, Vec<Element>> = space
            .packages()
            .into_iter()
            .filter(|package| self.is_exported(package))
            .map(|package| (package, Vec::new()))
            .collect();
        let mut environments = BTreeSet::new();

        for class in space {
            if !self.is_api_class(class) {
                continue;
            }
            environments.insert(class.version.execution_environment());
            let element = self.class_element(class);
            packages
                .entry(class.package_fqn())
                .or_default()
                .push(element);
        }

        let mut root = Element::new(Type::Api, API_ROOT);
        for environment in environments {
            root.push(Element::new(Type::ClassVersion, environment));
        }
        for (package, classes) in packages {
            let mut element = Element::new(Type::Package, package.as_str()).with_children(classes);
            if let Some(version) = self.options.exports.version(&package) {
                element.push(Element::new(Type::Version, VERSION_NODE).with_value(version));
            }
            root.push(element);
        }
        tracing::debug!(classes = self.classes.len(), "api tree built");
        root
    }

    fn class_element(&mut self, class: &'s ClassDescriptor) -> Element {
        if let Some(done) = self.classes.get(&class.name) {
            return done.clone();
        }
        if !self.in_progress.insert(&class.name) {
            // Inheritance cycle in malformed input.
            return Element::new(class_kind(class), class.name.fqn());
        }
        let element = ensure_sufficient_stack(|| self.describe(class));
        self.in_progress.remove(&class.name);
        self.classes.insert(&class.name, element.clone());
        element
    }

    /// Members of `parent` that a subclass inherits.
    fn inherited(&mut self, parent: &'s ClassDescriptor) -> Vec<Element> {
        self.class_element(parent)
            .children
            .into_iter()
            .filter(|child| {
                matches!(
                    child.ty,
                    Type::Field | Type::Method | Type::Extends | Type::Implements
                ) && !child.name.starts_with('<')
            })
            .collect()
    }

    fn describe(&mut self, class: &'s ClassDescriptor) -> Element {
        let space = self.space;
        let kind = class_kind(class);
        let provider = is_provider(class);
        let is_final = class.access.contains(AccessFlags::FINAL);
        let mut members = Vec::new();

        if !class.is_interface() {
            if let Some(super_class) = class.super_class.as_ref().filter(|s| !s.is_object()) {
                let parent = space.get(super_class);
                if let Some(parent) = parent {
                    members.extend(self.inherited(parent));
                }
                if parent.map_or(true, ClassDescriptor::is_public) {
                    members.push(Element::new(Type::Extends, super_class.fqn()));
                }
            }
        }

        for interface in &class.interfaces {
            if class.is_interface() || class.is_abstract() {
                if let Some(parent) = space.get(interface) {
                    members.extend(self.inherited(parent));
                }
            }
            members.push(Element::new(Type::Implements, interface.fqn()));
        }

        members.extend(annotated(&class.annotations));
        let access = class.own_inner_entry().map_or(class.access, |e| e.access);
        members.extend(access_elements(access, false));

        let (bridges, declared): (Vec<&MemberDescriptor>, Vec<&MemberDescriptor>) = class
            .methods()
            .filter(|m| m.access.is_api_visible())
            .partition(|m| m.access.is_synthetic());
        let mut bridges: Vec<Option<(&MemberDescriptor, MethodType)>> = bridges
            .into_iter()
            .filter_map(|m| MethodType::parse(&m.descriptor).ok().map(|ty| Some((m, ty))))
            .collect();

        for method in declared {
            let Ok(ty) = MethodType::parse(&method.descriptor) else {
                tracing::debug!(class = %class.name, method = %method.name, "unparsable descriptor");
                continue;
            };
            let mut element = self.method_element(method, &ty, kind, provider, is_final);
            for slot in &mut bridges {
                let matches = slot.as_ref().is_some_and(|(bridge, bridge_ty)| {
                    bridge.name == method.name && bridge_ty.parameters == ty.parameters
                });
                if matches {
                    if let Some((_, bridge_ty)) = slot.take() {
                        element
                            .children
                            .extend(self.returns(bridge_ty.return_type.as_ref()));
                    }
                }
            }
            members.push(element);
        }
        for (bridge, ty) in bridges.into_iter().flatten() {
            members.push(self.method_element(bridge, &ty, kind, provider, is_final));
        }

        for field in class.fields().filter(|f| f.is_api_visible()) {
            let Ok(ty) = FieldType::parse(&field.descriptor) else {
                continue;
            };
            let mut children = annotated(&field.annotations);
            children.extend(access_elements(field.access, false));
            if let Some(constant) = &field.constant {
                children.push(Element::new(Type::Constant, "<constant>").with_value(constant.to_string()));
            }
            members.push(
                Element::new(Type::Field, format!("{} {}", ty.java_name(), field.name))
                    .with_children(children),
            );
        }

        Element::new(kind, class.name.fqn()).with_children(members)
    }

    fn method_element(
        &mut self,
        method: &MemberDescriptor,
        ty: &MethodType,
        kind: Type,
        provider: bool,
        in_final_class: bool,
    ) -> Element {
        let name = format!("{}({})", method.name, ty.java_parameters());
        let mandatory = match kind {
            Type::Interface => !provider && method.access.contains(AccessFlags::ABSTRACT),
            Type::Annotation => method.annotation_default.is_none(),
            _ => false,
        };

        let mut children = annotated(&method.annotations);
        children.extend(access_elements(method.access, in_final_class));
        children.extend(self.returns(ty.return_type.as_ref()));
        children.extend(
            method
                .exceptions
                .iter()
                .map(|exception| Element::new(Type::Throws, exception.fqn())),
        );
        if let Some(default) = &method.annotation_default {
            children.push(Element::new(Type::Default, "<default>").with_value(default.to_string()));
        }

        let policy = Type::Method.policy(&name, mandatory);
        Element::new(Type::Method, name)
            .with_policy(policy)
            .with_children(children)
    }

    /// `RETURN` elements for a return type and, for classes in the space,
    /// every supertype it can be assigned to.
    fn returns(&mut self, ty: Option<&FieldType>) -> Vec<Element> {
        match ty {
            None => Vec::new(),
            Some(FieldType::Object(name)) if name.is_object() => Vec::new(),
            Some(FieldType::Object(name)) => self.covariant(name),
            Some(other) => vec![Element::new(Type::Return, other.java_name())],
        }
    }

    fn covariant(&mut self, name: &TypeName) -> Vec<Element> {
        if let Some(done) = self.returns.get(name) {
            return done.clone();
        }
        let space = self.space;
        let mut out = vec![Element::new(Type::Return, name.fqn())];
        if self.returns_in_progress.insert(name.clone()) {
            if let Some(class) = space.get(name) {
                let supers = class
                    .super_class
                    .iter()
                    .filter(|s| !s.is_object())
                    .chain(&class.interfaces);
                for super_type in supers {
                    out.extend(ensure_sufficient_stack(|| self.covariant(super_type)));
                }
            }
            self.returns_in_progress.remove(name);
        }
        self.returns.insert(name.clone(), out.clone());
        out
    }
}

fn class_kind(class: &ClassDescriptor) -> Type {
    if class.is_annotation() {
        Type::Annotation
    } else if class.is_interface() {
        Type::Interface
    } else if class.is_enum() {
        Type::Enum
    } else {
        Type::Class
    }
}

/// Provider types are implemented only by their provider, so adding a
/// method does not break consumers. Interfaces default to consumer types.
fn is_provider(class: &ClassDescriptor) -> bool {
    let marked = |names: &[&str]| names.iter().any(|n| class.find_annotation(n).is_some());
    marked(&PROVIDER_TYPES) && !marked(&CONSUMER_TYPES)
}

fn access_elements(access: AccessFlags, drop_final: bool) -> Vec<Element> {
    [
        (AccessFlags::PROTECTED, "protected"),
        (AccessFlags::ABSTRACT, "abstract"),
        (AccessFlags::FINAL, "final"),
        (AccessFlags::STATIC, "static"),
    ]
    .into_iter()
    .filter(|&(flag, name)| access.contains(flag) && !(drop_final && name == "final"))
    .map(|(_, name)| Element::new(Type::Access, name))
    .collect()
}

fn annotated(annotations: &[AnnotationDescriptor]) -> Vec<Element> {
    annotations
        .iter()
        .filter(|a| !a.is("java.lang.Deprecated"))
        .map(|annotation| {
            Element::new(Type::Annotated, annotation.name.fqn()).with_children(
                annotation.values.iter().map(|(key, value)| {
                    Element::new(Type::Property, key.as_str()).with_value(value.to_string())
                }),
            )
        })
        .collect()
}

/// API tree of a class space.
#[tracing::instrument(level = "debug", skip_all, fields(classes = space.len()))]
pub fn api_tree(space: &ClassSpace, options: &ApiOptions) -> Tree {
    Tree::from_element(ApiTreeBuilder::new(space, options).build())
}

/// `BUNDLE` tree holding the API of a class space and a manifest.
#[tracing::instrument(level = "debug", skip_all, fields(classes = space.len()))]
pub fn bundle_tree(space: &ClassSpace, options: &ApiOptions, manifest: &ManifestModel) -> Tree {
    let api = ApiTreeBuilder::new(space, options).build();
    Tree::from_element(
        Element::new(Type::Bundle, options.bundle_name.as_str())
            .with_children([api, manifest.to_element()]),
    )
}

#[cfg(test)]
mod tests;

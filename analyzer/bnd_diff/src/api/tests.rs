use super::*;
use crate::Delta;
use bnd_classfile::read_class;
use bnd_classfile::testing::{annotation, field, method, ClassFileWriter};
use bnd_ir::{ConstantValue, ElementValue, InnerClassEntry, RetentionPolicy};
use pretty_assertions::assert_eq;

fn space(writers: &[ClassFileWriter]) -> ClassSpace {
    writers
        .iter()
        .map(|w| read_class(&w.to_bytes()).unwrap_or_else(|e| panic!("{e}")))
        .collect()
}

fn tree(writers: &[ClassFileWriter]) -> Tree {
    api_tree(&space(writers), &ApiOptions::default())
}

fn keys(node: crate::TreeRef<'_>) -> Vec<String> {
    node.children()
        .map(|c| format!("{} {}", c.ty(), c.name()))
        .collect()
}

fn class_node<'t>(tree: &'t Tree, package: &str, class: &str) -> crate::TreeRef<'t> {
    let package_node = tree
        .root()
        .child(Type::Package, package)
        .unwrap_or_else(|| panic!("no package {package}"));
    package_node
        .children()
        .find(|c| c.name() == class)
        .unwrap_or_else(|| panic!("no class {class}"))
}

fn constant(mut member: MemberDescriptor, value: ConstantValue) -> MemberDescriptor {
    member.constant = Some(value);
    member
}

#[test]
fn test_class_with_members() {
    let tree = tree(&[ClassFileWriter::new("com/acme/Widget")
        .member(method(AccessFlags::PUBLIC, "<init>", "()V"))
        .member(method(AccessFlags::PUBLIC, "run", "()V"))
        .member(method(AccessFlags::PRIVATE, "secret", "()V"))
        .member(field(AccessFlags::PROTECTED, "size", "I"))
        .member(constant(
            field(
                AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
                "LIMIT",
                "I",
            ),
            ConstantValue::Int(10),
        ))]);

    assert_eq!(
        tree.to_string(),
        "\
API <api>
  CLASS_VERSION JavaSE-1.8
  PACKAGE com.acme
    CLASS com.acme.Widget
      FIELD int LIMIT
        ACCESS final
        ACCESS static
        CONSTANT <constant> = 10
      FIELD int size
        ACCESS protected
      METHOD <init>()
      METHOD run()
"
    );
}

#[test]
fn test_type_kinds() {
    let tree = tree(&[
        ClassFileWriter::interface("p/Service"),
        ClassFileWriter::new("p/Marker").access(
            AccessFlags::PUBLIC
                | AccessFlags::INTERFACE
                | AccessFlags::ABSTRACT
                | AccessFlags::ANNOTATION,
        ),
        ClassFileWriter::new("p/Color")
            .access(AccessFlags::PUBLIC | AccessFlags::FINAL | AccessFlags::SUPER | AccessFlags::ENUM)
            .super_class(Some("java/lang/Enum")),
        ClassFileWriter::new("p/Plain"),
    ]);
    let package = tree
        .root()
        .child(Type::Package, "p")
        .unwrap_or_else(|| panic!("no package"));
    assert_eq!(
        keys(package),
        vec![
            "CLASS p.Plain",
            "INTERFACE p.Service",
            "ANNOTATION p.Marker",
            "ENUM p.Color",
        ]
    );
    assert_eq!(
        keys(class_node(&tree, "p", "p.Color")),
        vec!["ACCESS final", "EXTENDS java.lang.Enum"]
    );
}

#[test]
fn test_inherited_members_fold_into_subclass() {
    let tree = tree(&[
        ClassFileWriter::new("p/Base")
            .member(method(AccessFlags::PUBLIC, "<init>", "()V"))
            .member(method(AccessFlags::PUBLIC, "base", "()V"))
            .member(field(AccessFlags::PUBLIC, "count", "J")),
        ClassFileWriter::new("p/Sub")
            .super_class(Some("p/Base"))
            .member(method(AccessFlags::PUBLIC, "own", "()V")),
    ]);
    assert_eq!(
        keys(class_node(&tree, "p", "p.Sub")),
        vec![
            "EXTENDS p.Base",
            "FIELD long count",
            "METHOD base()",
            "METHOD own()",
        ]
    );
}

#[test]
fn test_declared_member_overrides_inherited() {
    let tree = tree(&[
        ClassFileWriter::new("p/Base").member(method(
            AccessFlags::PUBLIC | AccessFlags::FINAL,
            "run",
            "()V",
        )),
        ClassFileWriter::new("p/Sub")
            .super_class(Some("p/Base"))
            .member(method(AccessFlags::PUBLIC, "run", "()V")),
    ]);
    let sub = class_node(&tree, "p", "p.Sub");
    let run = sub
        .child(Type::Method, "run()")
        .unwrap_or_else(|| panic!("no run()"));
    assert_eq!(run.children().len(), 0);
}

#[test]
fn test_interfaces_inherit_from_super_interfaces() {
    let tree = tree(&[
        ClassFileWriter::interface("p/Base").member(method(
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
            "close",
            "()V",
        )),
        ClassFileWriter::interface("p/Resource").implements("p/Base"),
        // Concrete classes do not inherit interface methods.
        ClassFileWriter::new("p/Impl").implements("p/Base"),
    ]);
    assert_eq!(
        keys(class_node(&tree, "p", "p.Resource")),
        vec!["ACCESS abstract", "IMPLEMENTS p.Base", "METHOD close()"]
    );
    assert_eq!(
        keys(class_node(&tree, "p", "p.Impl")),
        vec!["IMPLEMENTS p.Base"]
    );
}

#[test]
fn test_non_public_nested_classes_hidden() {
    let entry = |inner: &str, access: AccessFlags| InnerClassEntry {
        inner: TypeName::new(inner),
        outer: Some(TypeName::new("p/Outer")),
        simple_name: Some(inner.rsplit('$').next().unwrap_or(inner).to_owned()),
        access,
    };
    let tree = tree(&[
        ClassFileWriter::new("p/Outer")
            .inner_class(entry("p/Outer$Hidden", AccessFlags::PRIVATE | AccessFlags::STATIC))
            .inner_class(entry("p/Outer$Open", AccessFlags::PUBLIC | AccessFlags::STATIC)),
        ClassFileWriter::new("p/Outer$Hidden"),
        ClassFileWriter::new("p/Outer$Open")
            .inner_class(entry("p/Outer$Open", AccessFlags::PUBLIC | AccessFlags::STATIC)),
        ClassFileWriter::new("p/Internal").access(AccessFlags::SUPER),
    ]);
    let package = tree
        .root()
        .child(Type::Package, "p")
        .unwrap_or_else(|| panic!("no package"));
    assert_eq!(keys(package), vec!["CLASS p.Outer", "CLASS p.Outer$Open"]);
    assert_eq!(
        keys(class_node(&tree, "p", "p.Outer$Open")),
        vec!["ACCESS static"]
    );
}

#[test]
fn test_exports_select_packages() {
    let space = space(&[
        ClassFileWriter::new("com/acme/api/Service"),
        ClassFileWriter::new("com/acme/impl/ServiceImpl"),
    ]);
    let options = ApiOptions {
        exports: Exports::new().with("com.acme.api", Some("1.2.0")),
        ..ApiOptions::default()
    };
    let tree = api_tree(&space, &options);
    assert_eq!(
        keys(tree.root()),
        vec!["CLASS_VERSION JavaSE-1.8", "PACKAGE com.acme.api"]
    );
    let version = tree
        .root()
        .find(&[(Type::Package, "com.acme.api"), (Type::Version, "<version>")])
        .unwrap_or_else(|| panic!("no version"));
    assert_eq!(version.value(), Some("1.2.0"));
    assert_eq!(version.policy().changed, Delta::Ignored);
}

#[test]
fn test_exported_package_without_public_classes() {
    let space = space(&[ClassFileWriter::new("p/Internal").access(AccessFlags::SUPER)]);
    let tree = api_tree(&space, &ApiOptions::default());
    assert_eq!(keys(tree.root()), vec!["PACKAGE p"]);
}

#[test]
fn test_covariant_returns() {
    let tree = tree(&[
        ClassFileWriter::interface("p/Shape"),
        ClassFileWriter::new("p/Base").implements("p/Shape"),
        ClassFileWriter::new("p/Circle").super_class(Some("p/Base")),
        ClassFileWriter::new("p/Factory")
            .member(method(AccessFlags::PUBLIC, "circle", "()Lp/Circle;"))
            .member(method(AccessFlags::PUBLIC, "count", "()I"))
            .member(method(AccessFlags::PUBLIC, "any", "()Ljava/lang/Object;"))
            .member(method(AccessFlags::PUBLIC, "names", "()[Ljava/lang/String;")),
    ]);
    let factory = class_node(&tree, "p", "p.Factory");
    let returns = |name: &str| {
        keys(
            factory
                .child(Type::Method, name)
                .unwrap_or_else(|| panic!("no {name}")),
        )
    };
    assert_eq!(
        returns("circle()"),
        vec!["RETURN p.Base", "RETURN p.Circle", "RETURN p.Shape"]
    );
    assert_eq!(returns("count()"), vec!["RETURN int"]);
    assert!(returns("any()").is_empty());
    assert_eq!(returns("names()"), vec!["RETURN java.lang.String[]"]);
}

#[test]
fn test_bridge_methods_fold_into_covariant_returns() {
    let bridge = AccessFlags::PUBLIC | AccessFlags::SYNTHETIC | AccessFlags::BRIDGE;
    let tree = tree(&[
        ClassFileWriter::interface("p/Shape"),
        ClassFileWriter::new("p/Circle")
            .implements("p/Shape")
            .member(method(AccessFlags::PUBLIC, "copy", "()Lp/Circle;"))
            .member(method(bridge, "copy", "()Lp/Shape;"))
            .member(method(AccessFlags::PUBLIC, "compareTo", "(Lp/Circle;)I"))
            .member(method(bridge, "compareTo", "(Ljava/lang/Object;)I")),
    ]);
    let circle = class_node(&tree, "p", "p.Circle");
    assert_eq!(
        keys(circle),
        vec![
            "IMPLEMENTS p.Shape",
            "METHOD compareTo(java.lang.Object)",
            "METHOD compareTo(p.Circle)",
            "METHOD copy()",
        ]
    );
    assert_eq!(
        keys(
            circle
                .child(Type::Method, "copy()")
                .unwrap_or_else(|| panic!("no copy()"))
        ),
        vec!["RETURN p.Circle", "RETURN p.Shape"]
    );
}

#[test]
fn test_final_class_methods_drop_final() {
    let tree = tree(&[ClassFileWriter::new("p/Value")
        .access(AccessFlags::PUBLIC | AccessFlags::FINAL | AccessFlags::SUPER)
        .member(method(
            AccessFlags::PUBLIC | AccessFlags::FINAL | AccessFlags::STATIC,
            "of",
            "(I)Lp/Value;",
        ))]);
    let value = class_node(&tree, "p", "p.Value");
    assert_eq!(keys(value), vec!["ACCESS final", "METHOD of(int)"]);
    assert_eq!(
        keys(
            value
                .child(Type::Method, "of(int)")
                .unwrap_or_else(|| panic!("no of(int)"))
        ),
        vec!["ACCESS static", "RETURN p.Value"]
    );
}

#[test]
fn test_method_addition_policy() {
    let abstract_method = || {
        method(
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
            "run",
            "()V",
        )
    };
    let mut with_default = method(
        AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
        "timeout",
        "()I",
    );
    with_default.annotation_default = Some(ElementValue::Int(30));
    let provider = annotation(
        "org/osgi/annotation/versioning/ProviderType",
        RetentionPolicy::Class,
        vec![],
    );

    let tree = tree(&[
        ClassFileWriter::interface("p/Consumer")
            .member(abstract_method())
            .member(method(AccessFlags::PUBLIC, "helper", "()V")),
        ClassFileWriter::interface("p/Provider")
            .annotation(provider)
            .member(abstract_method()),
        ClassFileWriter::new("p/Config")
            .access(
                AccessFlags::PUBLIC
                    | AccessFlags::INTERFACE
                    | AccessFlags::ABSTRACT
                    | AccessFlags::ANNOTATION,
            )
            .member(method(
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
                "name",
                "()Ljava/lang/String;",
            ))
            .member(with_default),
        ClassFileWriter::new("p/Plain").member(method(AccessFlags::PUBLIC, "run", "()V")),
    ]);
    let added = |class: &str, method: &str| {
        class_node(&tree, "p", class)
            .child(Type::Method, method)
            .unwrap_or_else(|| panic!("no {class}.{method}"))
            .policy()
            .added
    };
    assert_eq!(added("p.Consumer", "run()"), Delta::AddMajor);
    assert_eq!(added("p.Consumer", "helper()"), Delta::AddMinor);
    assert_eq!(added("p.Provider", "run()"), Delta::AddMinor);
    assert_eq!(added("p.Config", "name()"), Delta::AddMajor);
    assert_eq!(added("p.Config", "timeout()"), Delta::AddMinor);
    assert_eq!(added("p.Plain", "run()"), Delta::AddMinor);

    let default = tree
        .root()
        .find(&[
            (Type::Package, "p"),
            (Type::Annotation, "p.Config"),
            (Type::Method, "timeout()"),
            (Type::Default, "<default>"),
        ])
        .unwrap_or_else(|| panic!("no default"));
    assert_eq!(default.value(), Some("30"));
}

#[test]
fn test_annotation_usage() {
    let tree = tree(&[ClassFileWriter::new("p/Widget")
        .annotation(annotation(
            "java/lang/Deprecated",
            RetentionPolicy::Runtime,
            vec![],
        ))
        .annotation(annotation(
            "p/Marker",
            RetentionPolicy::Class,
            vec![("value", ElementValue::String("fast".to_owned()))],
        ))]);
    let widget = class_node(&tree, "p", "p.Widget");
    assert_eq!(keys(widget), vec!["ANNOTATED p.Marker"]);
    let property = widget
        .find(&[(Type::Annotated, "p.Marker"), (Type::Property, "value")])
        .unwrap_or_else(|| panic!("no property"));
    assert_eq!(property.value(), Some("fast"));
}

#[test]
fn test_inheritance_cycle_terminates() {
    let tree = tree(&[
        ClassFileWriter::new("p/A").super_class(Some("p/B")),
        ClassFileWriter::new("p/B").super_class(Some("p/A")),
    ]);
    assert!(keys(class_node(&tree, "p", "p.A")).contains(&"EXTENDS p.B".to_owned()));
    assert!(keys(class_node(&tree, "p", "p.B")).contains(&"EXTENDS p.A".to_owned()));
}

#[test]
fn test_bundle_tree_holds_api_and_manifest() {
    let space = space(&[ClassFileWriter::new("p/Widget")]);
    let mut manifest = ManifestModel::new();
    manifest.set("Bundle-SymbolicName", "demo");
    let options = ApiOptions {
        bundle_name: "demo".to_owned(),
        ..ApiOptions::default()
    };
    let tree = bundle_tree(&space, &options, &manifest);
    assert_eq!(tree.root().ty(), Type::Bundle);
    assert_eq!(tree.root().name(), "demo");
    assert_eq!(keys(tree.root()), vec!["API <api>", "MANIFEST <manifest>"]);
}

use super::*;
use crate::testing::{annotation, field, method, ClassFileWriter};
use pretty_assertions::assert_eq;

fn read(writer: &ClassFileWriter) -> ClassDescriptor {
    read_class(&writer.to_bytes()).unwrap_or_else(|e| panic!("{e}"))
}

fn binaries(names: &[TypeName]) -> Vec<&str> {
    names.iter().map(TypeName::binary).collect()
}

#[test]
fn test_minimal_class() {
    let class = read(&ClassFileWriter::new("com/acme/Widget"));
    assert_eq!(class.name.binary(), "com/acme/Widget");
    assert_eq!(class.version, ClassVersion::new(52, 0));
    assert!(class.is_public());
    assert_eq!(
        class.super_class.as_ref().map(TypeName::binary),
        Some("java/lang/Object")
    );
    assert!(class.members.is_empty());
    assert_eq!(binaries(&class.header_references), vec!["java/lang/Object"]);
    assert_eq!(
        binaries(&class.code_references),
        vec!["com/acme/Widget", "java/lang/Object"]
    );
}

#[test]
fn test_bad_magic() {
    let mut bytes = ClassFileWriter::new("A").to_bytes();
    bytes[0] = 0;
    assert_eq!(
        read_class(&bytes),
        Err(MalformedClassError::BadMagic { found: 0x00FE_BABE })
    );
}

#[test]
fn test_unsupported_version() {
    let bytes = ClassFileWriter::new("A").version(44, 3).to_bytes();
    assert_eq!(
        read_class(&bytes),
        Err(MalformedClassError::UnsupportedVersion { major: 44, minor: 3 })
    );
    let bytes = ClassFileWriter::new("A").version(70, 0).to_bytes();
    assert!(matches!(
        read_class(&bytes),
        Err(MalformedClassError::UnsupportedVersion { major: 70, .. })
    ));
}

#[test]
fn test_every_truncation_fails_cleanly() {
    let bytes = ClassFileWriter::new("com/acme/Widget")
        .member(method(AccessFlags::PUBLIC, "run", "(Lcom/acme/Arg;)V"))
        .to_bytes();
    for len in 0..bytes.len() {
        assert!(
            read_class(&bytes[..len]).is_err(),
            "prefix of {len} bytes was accepted"
        );
    }
}

#[test]
fn test_members_and_references() {
    let mut run = method(
        AccessFlags::PUBLIC,
        "run",
        "(Lcom/acme/api/Arg;[Lcom/acme/api/Elem;)Lcom/acme/api/Ret;",
    );
    run.exceptions = vec![TypeName::new("com/acme/api/Failure")];
    run.signature = Some("(Lcom/acme/api/Arg;[Lcom/acme/api/Elem;)Lcom/acme/api/Ret;".to_owned());

    let class = read(
        &ClassFileWriter::new("com/acme/Widget")
            .member(field(AccessFlags::PRIVATE, "count", "I"))
            .member(method(AccessFlags::PUBLIC, "<init>", "()V"))
            .member(run),
    );

    let kinds: Vec<(MemberKind, &str)> = class
        .members
        .iter()
        .map(|m| (m.kind, m.name.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (MemberKind::Field, "count"),
            (MemberKind::Constructor, "<init>"),
            (MemberKind::Method, "run"),
        ]
    );

    let run = &class.members[2];
    assert_eq!(binaries(&run.exceptions), vec!["com/acme/api/Failure"]);
    assert_eq!(
        binaries(&run.references),
        vec![
            "com/acme/api/Arg",
            "com/acme/api/Elem",
            "com/acme/api/Failure",
            "com/acme/api/Ret"
        ]
    );
    assert!(class.members[0].references.is_empty());
}

#[test]
fn test_constant_values() {
    let mut answer = field(
        AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
        "ANSWER",
        "J",
    );
    answer.constant = Some(ConstantValue::Long(42));
    let mut name = field(
        AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
        "NAME",
        "Ljava/lang/String;",
    );
    name.constant = Some(ConstantValue::String("widget".to_owned()));

    let class = read(&ClassFileWriter::new("A").member(answer).member(name));
    assert_eq!(class.members[0].constant, Some(ConstantValue::Long(42)));
    assert_eq!(
        class.members[1].constant,
        Some(ConstantValue::String("widget".to_owned()))
    );
}

#[test]
fn test_annotations_keep_retention_and_target() {
    let mut run = method(AccessFlags::PUBLIC, "run", "(I)V");
    run.annotations = vec![annotation(
        "com/acme/Marker",
        RetentionPolicy::Class,
        Vec::new(),
    )];
    run.parameter_annotations = vec![vec![annotation(
        "com/acme/NotNull",
        RetentionPolicy::Runtime,
        Vec::new(),
    )]];

    let class = read(
        &ClassFileWriter::new("com/acme/Widget")
            .annotation(annotation(
                "org/osgi/annotation/versioning/ProviderType",
                RetentionPolicy::Class,
                Vec::new(),
            ))
            .annotation(annotation(
                "com/acme/Config",
                RetentionPolicy::Runtime,
                vec![
                    ("size", ElementValue::Int(3)),
                    ("flag", ElementValue::Boolean(true)),
                    ("tag", ElementValue::Char(u16::from(b'x'))),
                    (
                        "mode",
                        ElementValue::Enum {
                            ty: TypeName::new("com/acme/Mode"),
                            constant: "FAST".to_owned(),
                        },
                    ),
                    (
                        "types",
                        ElementValue::Array(vec![ElementValue::Class(
                            "Lcom/acme/Plugin;".to_owned(),
                        )]),
                    ),
                ],
            ))
            .annotation(annotation(
                "com/acme/SourceOnly",
                RetentionPolicy::Source,
                Vec::new(),
            ))
            .member(run),
    );

    // Visible annotations are written first.
    let names: Vec<&str> = class.annotations.iter().map(|a| a.name.binary()).collect();
    assert_eq!(
        names,
        vec!["com/acme/Config", "org/osgi/annotation/versioning/ProviderType"]
    );
    assert!(class
        .find_annotation("org.osgi.annotation.versioning.ProviderType")
        .is_some_and(|a| a.retention == RetentionPolicy::Class));
    let config = &class.annotations[0];
    assert_eq!(config.target, ElementTarget::Type);
    assert_eq!(
        config.to_string(),
        "@com.acme.Config(size=3,flag=true,tag=x,mode=FAST,types=[com.acme.Plugin.class])"
    );
    assert_eq!(
        binaries(&class.header_references),
        vec![
            "com/acme/Config",
            "com/acme/Mode",
            "com/acme/Plugin",
            "java/lang/Object",
            "org/osgi/annotation/versioning/ProviderType"
        ]
    );

    let run = &class.members[0];
    assert_eq!(run.annotations[0].target, ElementTarget::Method);
    assert_eq!(run.parameter_annotations.len(), 1);
    assert_eq!(run.parameter_annotations[0][0].target, ElementTarget::Parameter);
    assert_eq!(
        binaries(&run.references),
        vec!["com/acme/Marker", "com/acme/NotNull"]
    );
}

#[test]
fn test_annotation_type_default_and_target() {
    let mut value = method(
        AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
        "value",
        "()Ljava/lang/String;",
    );
    value.annotation_default = Some(ElementValue::String("none".to_owned()));

    let class = read(
        &ClassFileWriter::interface("com/acme/Tag")
            .access(
                AccessFlags::PUBLIC
                    | AccessFlags::INTERFACE
                    | AccessFlags::ABSTRACT
                    | AccessFlags::ANNOTATION,
            )
            .annotation(annotation(
                "java/lang/annotation/Documented",
                RetentionPolicy::Runtime,
                Vec::new(),
            ))
            .member(value),
    );
    assert!(class.is_annotation());
    assert_eq!(class.annotations[0].target, ElementTarget::AnnotationType);
    assert_eq!(
        class.members[0].annotation_default,
        Some(ElementValue::String("none".to_owned()))
    );
}

#[test]
fn test_package_info_target() {
    let class = read(
        &ClassFileWriter::interface("com/acme/package-info")
            .access(AccessFlags::INTERFACE | AccessFlags::ABSTRACT | AccessFlags::SYNTHETIC)
            .annotation(annotation(
                "org/osgi/annotation/versioning/Version",
                RetentionPolicy::Class,
                vec![("value", ElementValue::String("1.2.0".to_owned()))],
            )),
    );
    assert_eq!(class.annotations[0].target, ElementTarget::Package);
}

#[test]
fn test_signature_inner_classes_and_deprecation() {
    let class = read(
        &ClassFileWriter::new("com/acme/Outer$Inner")
            .signature("Ljava/util/AbstractList<Lcom/acme/Item;>;")
            .inner_class(InnerClassEntry {
                inner: TypeName::new("com/acme/Outer$Inner"),
                outer: Some(TypeName::new("com/acme/Outer")),
                simple_name: Some("Inner".to_owned()),
                access: AccessFlags::PUBLIC | AccessFlags::STATIC,
            })
            .deprecated(),
    );
    assert!(class.deprecated);
    assert_eq!(
        class.signature.as_deref(),
        Some("Ljava/util/AbstractList<Lcom/acme/Item;>;")
    );
    assert!(class
        .own_inner_entry()
        .is_some_and(|e| e.access.contains(AccessFlags::STATIC)));
    assert_eq!(
        binaries(&class.header_references),
        vec!["com/acme/Item", "java/lang/Object", "java/util/AbstractList"]
    );
}

#[test]
fn test_malformed_signature_is_ignored() {
    let class = read(&ClassFileWriter::new("A").signature("L<broken"));
    assert_eq!(class.signature.as_deref(), Some("L<broken"));
    assert_eq!(binaries(&class.header_references), vec!["java/lang/Object"]);
}

#[test]
fn test_invalid_member_descriptor_fails() {
    let bytes = ClassFileWriter::new("A")
        .member(method(AccessFlags::PUBLIC, "run", "(Q)V"))
        .to_bytes();
    assert!(matches!(
        read_class(&bytes),
        Err(MalformedClassError::InvalidDescriptor(_))
    ));
}

#[test]
fn test_unknown_attribute_skipped() {
    let class = read(
        &ClassFileWriter::new("A")
            .raw_attribute("SourceFile", vec![0, 1])
            .raw_attribute("com.acme.Custom", vec![1, 2, 3, 4, 5]),
    );
    assert_eq!(class.name.binary(), "A");
}

#[test]
fn test_synthetic_attribute_sets_flag() {
    let class = read(&ClassFileWriter::new("A").raw_attribute("Synthetic", Vec::new()));
    assert!(class.access.is_synthetic());
}

#[test]
fn test_code_references_from_pool() {
    let class = read(
        &ClassFileWriter::new("com/acme/impl/Engine")
            .code_reference("com/acme/util/Helper")
            .code_reference("[Lcom/acme/util/Cell;"),
    );
    assert_eq!(
        binaries(&class.code_references),
        vec![
            "com/acme/impl/Engine",
            "com/acme/util/Cell",
            "com/acme/util/Helper",
            "java/lang/Object"
        ]
    );
}

mod proptest_reader {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = read_class(&bytes);
        }

        #[test]
        fn corrupted_class_never_panics(index in 0usize..256, value in any::<u8>()) {
            let mut bytes = ClassFileWriter::new("com/acme/Widget")
                .member(method(AccessFlags::PUBLIC, "run", "(Ljava/lang/String;)V"))
                .annotation(annotation("com/acme/Tag", RetentionPolicy::Runtime, Vec::new()))
                .to_bytes();
            let index = index % bytes.len();
            bytes[index] = value;
            let _ = read_class(&bytes);
        }
    }
}

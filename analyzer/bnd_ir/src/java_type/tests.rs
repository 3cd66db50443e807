use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_primitive_field() {
    let ty = FieldType::parse("J").unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ty, FieldType::Base(BaseType::Long));
    assert_eq!(ty.java_name(), "long");
    assert!(ty.is_primitive());
    assert_eq!(ty.object_type(), None);
}

#[test]
fn test_object_array_field() {
    let ty = FieldType::parse("[[Ljava/lang/String;").unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ty.java_name(), "java.lang.String[][]");
    assert_eq!(
        ty.object_type().map(TypeName::binary),
        Some("java/lang/String")
    );
}

#[test]
fn test_method_descriptor() {
    let ty = MethodType::parse("(I[JLcom/acme/Foo;)Ljava/util/List;")
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ty.java_parameters(), "int,long[],com.acme.Foo");
    assert_eq!(
        ty.return_type.as_ref().map(FieldType::java_name),
        Some("java.util.List".to_owned())
    );
    let refs: Vec<_> = ty.referenced_types().map(TypeName::binary).collect();
    assert_eq!(refs, vec!["com/acme/Foo", "java/util/List"]);
}

#[test]
fn test_void_method() {
    let ty = MethodType::parse("()V").unwrap_or_else(|e| panic!("{e}"));
    assert!(ty.parameters.is_empty());
    assert_eq!(ty.return_type, None);
    assert_eq!(ty.java_parameters(), "");
}

#[test]
fn test_rejects_malformed() {
    for bad in ["", "Q", "Ljava/lang/String", "L;", "[", "(I", "()", "()VV", "II"] {
        assert!(FieldType::parse(bad).is_err() || MethodType::parse(bad).is_err(), "{bad}");
    }
    let err = MethodType::parse("(X)V").err();
    assert_eq!(err.map(|e| e.position), Some(1));
}

#[test]
fn test_void_is_not_a_field_type() {
    assert!(FieldType::parse("V").is_err());
    assert!(MethodType::parse("(V)V").is_err());
}

use super::*;
use pretty_assertions::assert_eq;

/// Encode a pool: `count` followed by raw entry bytes.
fn pool_bytes(count: u16, entries: &[&[u8]]) -> Vec<u8> {
    let mut out = count.to_be_bytes().to_vec();
    for entry in entries {
        out.extend_from_slice(entry);
    }
    out
}

fn utf8(s: &str) -> Vec<u8> {
    let mut out = vec![1];
    out.extend_from_slice(&u16::try_from(s.len()).unwrap_or(0).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
    out
}

fn parse(bytes: &[u8]) -> Result<ConstantPool<'_>, MalformedClassError> {
    ConstantPool::parse(&mut ByteCursor::new(bytes))
}

#[test]
fn test_class_and_utf8() {
    let bytes = pool_bytes(3, &[&utf8("com/acme/Foo"), &[7, 0, 1]]);
    let pool = parse(&bytes).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(pool.utf8(1), Ok("com/acme/Foo".to_owned()));
    assert_eq!(
        pool.class_name(2).map(|n| n.binary().to_owned()),
        Ok("com/acme/Foo".to_owned())
    );
}

#[test]
fn test_long_takes_two_slots() {
    let long = [5, 0, 0, 0, 0, 0, 0, 0, 42];
    let bytes = pool_bytes(4, &[&long, &utf8("x")]);
    let pool = parse(&bytes).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(pool.long(1), Ok(42));
    assert_eq!(
        pool.get(2).err(),
        Some(MalformedClassError::BadConstantPoolIndex { index: 2, size: 4 })
    );
    assert_eq!(pool.utf8(3), Ok("x".to_owned()));
}

#[test]
fn test_index_zero_and_out_of_range() {
    let bytes = pool_bytes(2, &[&utf8("x")]);
    let pool = parse(&bytes).unwrap_or_else(|e| panic!("{e}"));
    assert!(pool.get(0).is_err());
    assert!(pool.get(2).is_err());
    assert_eq!(pool.optional_class_name(0), Ok(None));
    assert_eq!(pool.optional_utf8(0), Ok(None));
}

#[test]
fn test_wrong_kind() {
    let bytes = pool_bytes(2, &[&[3, 0, 0, 0, 9]]);
    let pool = parse(&bytes).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(pool.integer(1), Ok(9));
    assert_eq!(
        pool.utf8(1),
        Err(MalformedClassError::UnexpectedConstant {
            index: 1,
            expected: "Utf8",
            found: "Integer",
        })
    );
}

#[test]
fn test_unknown_tag() {
    let bytes = pool_bytes(2, &[&[2, 0, 0]]);
    assert_eq!(
        parse(&bytes).err(),
        Some(MalformedClassError::UnknownConstantTag { tag: 2, index: 1 })
    );
}

#[test]
fn test_invalid_utf8() {
    let bytes = pool_bytes(2, &[&[1, 0, 1, 0xFF]]);
    let pool = parse(&bytes).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(pool.utf8(1), Err(MalformedClassError::InvalidUtf8 { index: 1 }));
}

#[test]
fn test_references_from_pool() {
    // 1: Utf8 "[Lcom/acme/Elem;"   2: Class #1
    // 3: Utf8 "run"                4: Utf8 "(Lcom/acme/Arg;)Lcom/acme/Ret;"
    // 5: NameAndType #3 #4         6: Utf8 "(Lcom/acme/Mt;)V"
    // 7: MethodType #6             8: Methodref #2 #5
    let bytes = pool_bytes(
        9,
        &[
            &utf8("[Lcom/acme/Elem;"),
            &[7, 0, 1],
            &utf8("run"),
            &utf8("(Lcom/acme/Arg;)Lcom/acme/Ret;"),
            &[12, 0, 3, 0, 4],
            &utf8("(Lcom/acme/Mt;)V"),
            &[16, 0, 6],
            &[10, 0, 2, 0, 5],
        ],
    );
    let pool = parse(&bytes).unwrap_or_else(|e| panic!("{e}"));
    let refs: Vec<String> = pool
        .references()
        .unwrap_or_else(|e| panic!("{e}"))
        .iter()
        .map(|r| r.binary().to_owned())
        .collect();
    assert_eq!(
        refs,
        vec!["com/acme/Elem", "com/acme/Arg", "com/acme/Ret", "com/acme/Mt"]
    );
    assert_eq!(pool.get(8).map(Constant::kind), Ok("Methodref"));
}

#[test]
fn test_truncated_pool() {
    let bytes = pool_bytes(3, &[&utf8("x")]);
    assert!(matches!(
        parse(&bytes),
        Err(MalformedClassError::Truncated { .. })
    ));
}

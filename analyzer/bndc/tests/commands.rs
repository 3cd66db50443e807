//! End-to-end runs of the `bndc` commands against class files written to
//! temporary directories.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::fs;
use std::path::Path;

use bnd_classfile::testing::{method, ClassFileWriter};
use bnd_diagnostic::ErrorCode;
use bnd_ir::AccessFlags;
use bndc::commands::{analyze, diff, dump, snapshot};
use bndc::{parse_options, CliOptions};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn write_classes(dir: &Path, classes: &[(&str, ClassFileWriter)]) {
    for (name, writer) in classes {
        let path = dir.join(format!("{name}.class"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, writer.to_bytes()).unwrap();
    }
}

fn options(args: &[&str]) -> CliOptions {
    let args: Vec<String> = args.iter().map(|s| (*s).to_owned()).collect();
    parse_options(&args).unwrap()
}

fn abstract_method(name: &str, descriptor: &str) -> bnd_ir::MemberDescriptor {
    method(AccessFlags::PUBLIC | AccessFlags::ABSTRACT, name, descriptor)
}

/// `com.acme.api` and `com.acme.model` reference each other; the API also
/// exposes a logger type from outside the bundle.
fn cyclic_bundle(dir: &Path) {
    write_classes(
        dir,
        &[
            (
                "com/acme/api/Service",
                ClassFileWriter::interface("com/acme/api/Service")
                    .member(abstract_method("lookup", "()Lcom/acme/model/Value;"))
                    .member(abstract_method("log", "(Lorg/slf4j/Logger;)V")),
            ),
            (
                "com/acme/model/Value",
                ClassFileWriter::new("com/acme/model/Value").member(method(
                    AccessFlags::PUBLIC,
                    "owner",
                    "()Lcom/acme/api/Service;",
                )),
            ),
        ],
    );
}

fn service(methods: &[&str]) -> (&'static str, ClassFileWriter) {
    let mut writer = ClassFileWriter::interface("com/acme/api/Service");
    for name in methods {
        writer = writer.member(abstract_method(name, "()V"));
    }
    ("com/acme/api/Service", writer)
}

#[test]
fn test_analyze_prints_uses_and_imports() {
    let dir = tempdir().unwrap();
    cyclic_bundle(dir.path());

    let outcome = analyze(dir.path(), &options(&[]));

    assert_eq!(
        outcome.stdout,
        "Export-Package:\n\
         \x20 com.acme.api;uses:=\"com.acme.model\"\n\
         \x20 com.acme.model;uses:=\"com.acme.api\"\n\
         Import-Package:\n\
         \x20 org.slf4j\n\
         classes: 2, packages: 2, cycles: 1\n"
    );
    assert!(!outcome.failed);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].code, ErrorCode::B1001);
    assert!(outcome.diagnostics[0].is_warning());
}

#[test]
fn test_analyze_external_edges_and_versions() {
    let dir = tempdir().unwrap();
    cyclic_bundle(dir.path());

    let outcome = analyze(
        dir.path(),
        &options(&["--external", "--exports=com.acme.api;version=2.1.0", "--jobs=2"]),
    );

    assert!(outcome.stdout.starts_with(
        "Export-Package:\n\
         \x20 com.acme.api;version=\"2.1.0\";uses:=\"com.acme.model,org.slf4j\"\n\
         Import-Package:\n"
    ));
    assert!(!outcome.stdout.contains("  com.acme.model"));
}

#[test]
fn test_analyze_fails_on_malformed_class() {
    let dir = tempdir().unwrap();
    cyclic_bundle(dir.path());
    fs::write(dir.path().join("com/acme/Junk.class"), b"not a class").unwrap();

    let outcome = analyze(dir.path(), &options(&[]));

    assert!(outcome.failed);
    assert_eq!(outcome.exit_code(), 1);
    let junk = outcome
        .diagnostics
        .iter()
        .find(|d| d.is_error())
        .unwrap();
    assert_eq!(junk.code, ErrorCode::B0002);
    assert_eq!(junk.location.as_deref(), Some("com/acme/Junk.class"));
    // The rest of the bundle is still analyzed.
    assert!(outcome.stdout.contains("com.acme.api;uses:=\"com.acme.model\""));
}

#[test]
fn test_deny_warnings_fails_on_cycles() {
    let dir = tempdir().unwrap();
    cyclic_bundle(dir.path());
    let outcome = analyze(dir.path(), &options(&["--deny-warnings"]));
    assert!(outcome.failed);
    assert_eq!(outcome.diagnostics[0].code, ErrorCode::B1001);
}

#[test]
fn test_diff_interface_method_addition() {
    let older = tempdir().unwrap();
    let newer = tempdir().unwrap();
    write_classes(older.path(), &[service(&["lookup"])]);
    write_classes(newer.path(), &[service(&["lookup", "close"])]);

    let outcome = diff(newer.path(), older.path(), &options(&[]));

    assert!(!outcome.failed, "{:?}", outcome.diagnostics);
    assert!(outcome.stdout.contains("ADD_MAJOR METHOD close()"));
    assert!(!outcome.stdout.contains("lookup()"));
    assert!(outcome.stdout.ends_with("delta: ADD_MAJOR\nbump: major\n"));

    let all = diff(newer.path(), older.path(), &options(&["--all"]));
    assert!(all.stdout.contains("UNCHANGED METHOD lookup()"));
}

#[test]
fn test_diff_removed_class() {
    let older = tempdir().unwrap();
    let newer = tempdir().unwrap();
    write_classes(
        older.path(),
        &[
            service(&["lookup"]),
            ("com/acme/api/Extra", ClassFileWriter::new("com/acme/api/Extra")),
        ],
    );
    write_classes(newer.path(), &[service(&["lookup"])]);

    let outcome = diff(newer.path(), older.path(), &options(&[]));
    assert!(outcome.stdout.contains("REMOVED CLASS com.acme.api.Extra"));
    assert!(outcome.stdout.ends_with("delta: REMOVED\nbump: major\n"));
}

#[test]
fn test_diff_ignored_names() {
    let older = tempdir().unwrap();
    let newer = tempdir().unwrap();
    write_classes(older.path(), &[service(&["lookup"])]);
    write_classes(newer.path(), &[service(&["lookup", "close"])]);

    let outcome = diff(
        newer.path(),
        older.path(),
        &options(&["--ignore=com.acme.api.Serv*"]),
    );
    assert_eq!(outcome.stdout, "delta: UNCHANGED\nbump: none\n");
}

#[test]
fn test_diff_baselines_package_versions() {
    let older = tempdir().unwrap();
    let newer = tempdir().unwrap();
    write_classes(older.path(), &[service(&["lookup"])]);
    write_classes(newer.path(), &[service(&["lookup", "close"])]);

    let under = diff(
        newer.path(),
        older.path(),
        &options(&[
            "--exports=com.acme.api;version=1.1.0",
            "--older-exports=com.acme.api;version=1.0.0",
        ]),
    );
    assert!(under.failed);
    let error = under.diagnostics.iter().find(|d| d.is_error()).unwrap();
    assert_eq!(error.code, ErrorCode::B2003);
    assert_eq!(error.location.as_deref(), Some("com.acme.api"));
    let row = under
        .stdout
        .lines()
        .find(|l| l.contains("com.acme.api") && l.starts_with('*'))
        .unwrap();
    assert_eq!(
        row.split_whitespace().collect::<Vec<_>>(),
        vec!["*", "com.acme.api", "ADD_MAJOR", "1.1.0", "1.0.0", "2.0.0"]
    );
    assert!(under.stdout.ends_with("delta: ADD_MAJOR\nbump: major\n"));

    let enough = diff(
        newer.path(),
        older.path(),
        &options(&[
            "--exports=com.acme.api;version=2.0.0",
            "--older-exports=com.acme.api;version=1.0.0",
            "--bundle-version=3.0.0",
            "--older-bundle-version=2.4.1",
        ]),
    );
    assert!(!enough.failed, "{:?}", enough.diagnostics);
    assert!(enough.stdout.lines().all(|l| !l.starts_with('*')));
    assert!(enough.stdout.contains("ok"));
}

#[test]
fn test_diff_writes_serialized_diff() {
    let older = tempdir().unwrap();
    let newer = tempdir().unwrap();
    let out = tempdir().unwrap();
    let file = out.path().join("api.diff");
    write_classes(older.path(), &[service(&["lookup"])]);
    write_classes(newer.path(), &[service(&["lookup", "close"])]);

    let outcome = diff(
        newer.path(),
        older.path(),
        &options(&["-o", file.to_str().unwrap()]),
    );
    assert!(!outcome.failed, "{:?}", outcome.diagnostics);
    let data = bnd_diff::DiffData::from_bytes(&fs::read(&file).unwrap()).unwrap();
    assert_eq!(data.delta, bnd_diff::Delta::AddMajor);
    let restored = data.into_diff();
    assert!(outcome.stdout.starts_with(&restored.render(false)));
}

#[test]
fn test_snapshot_then_diff() {
    let older = tempdir().unwrap();
    let newer = tempdir().unwrap();
    let out = tempdir().unwrap();
    let snap = out.path().join("older.snap");
    write_classes(older.path(), &[service(&["lookup"])]);
    write_classes(newer.path(), &[service(&["lookup", "close"])]);

    let written = snapshot(older.path(), &options(&["-o", snap.to_str().unwrap()]));
    assert!(!written.failed, "{:?}", written.diagnostics);
    assert!(written.stdout.starts_with("wrote "));
    assert!(fs::read(&snap).unwrap().starts_with(bnd_diff::SNAPSHOT_MAGIC));

    let from_snapshot = diff(newer.path(), &snap, &options(&[]));
    let from_directory = diff(newer.path(), older.path(), &options(&[]));
    assert_eq!(from_snapshot, from_directory);

    let same = diff(older.path(), &snap, &options(&[]));
    assert_eq!(same.stdout, "delta: UNCHANGED\nbump: none\n");
}

#[test]
fn test_snapshot_requires_output() {
    let dir = tempdir().unwrap();
    write_classes(dir.path(), &[service(&["lookup"])]);
    let outcome = snapshot(dir.path(), &options(&[]));
    assert!(outcome.failed);
    assert_eq!(outcome.diagnostics[0].code, ErrorCode::B9001);
}

#[test]
fn test_diff_rejects_non_snapshot_file() {
    let dir = tempdir().unwrap();
    write_classes(dir.path(), &[service(&["lookup"])]);
    let bogus = dir.path().join("notes.txt");
    fs::write(&bogus, "hello").unwrap();

    let outcome = diff(dir.path(), &bogus, &options(&[]));
    assert!(outcome.failed);
    assert!(outcome.stdout.is_empty());
    let error = outcome.diagnostics.iter().find(|d| d.is_error()).unwrap();
    assert_eq!(error.code, ErrorCode::B2002);
}

#[test]
fn test_dump_class_file() {
    let dir = tempdir().unwrap();
    write_classes(dir.path(), &[service(&["lookup"])]);

    let outcome = dump(&dir.path().join("com/acme/api/Service.class"));
    assert!(!outcome.failed);
    assert!(outcome
        .stdout
        .starts_with("public abstract interface com.acme.api.Service\n"));
    assert!(outcome
        .stdout
        .contains("  method public abstract lookup ()V\n"));

    let missing = dump(&dir.path().join("Missing.class"));
    assert!(missing.failed);
    assert_eq!(missing.diagnostics[0].code, ErrorCode::B0010);
}

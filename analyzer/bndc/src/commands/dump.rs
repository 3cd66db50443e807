//! The `dump` command: show what the reader extracted from one class file.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use bnd_classfile::read_class;
use bnd_diagnostic::{Diagnostic, ErrorCode, Reporter};
use bnd_ir::{AccessFlags, ClassDescriptor, MemberDescriptor, MemberKind, TypeName};

use super::Outcome;

const CLASS_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::SYNTHETIC, "synthetic"),
];

const FIELD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::VOLATILE, "volatile"),
    (AccessFlags::TRANSIENT, "transient"),
    (AccessFlags::SYNTHETIC, "synthetic"),
];

const METHOD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::SYNCHRONIZED, "synchronized"),
    (AccessFlags::BRIDGE, "bridge"),
    (AccessFlags::VARARGS, "varargs"),
    (AccessFlags::NATIVE, "native"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::SYNTHETIC, "synthetic"),
];

fn modifiers(access: AccessFlags, table: &[(AccessFlags, &str)]) -> String {
    let mut out = String::new();
    for &(flag, word) in table {
        if access.contains(flag) {
            out.push_str(word);
            out.push(' ');
        }
    }
    out
}

fn class_keyword(class: &ClassDescriptor) -> &'static str {
    if class.is_annotation() {
        "@interface"
    } else if class.is_interface() {
        "interface"
    } else if class.is_enum() {
        "enum"
    } else {
        "class"
    }
}

fn join(names: &[TypeName]) -> String {
    names
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_member(out: &mut String, member: &MemberDescriptor) {
    let (keyword, table) = match member.kind {
        MemberKind::Field => ("field", FIELD_MODIFIERS),
        MemberKind::Method => ("method", METHOD_MODIFIERS),
        MemberKind::Constructor => ("constructor", METHOD_MODIFIERS),
    };
    let _ = write!(
        out,
        "  {keyword} {}{} {}",
        modifiers(member.access, table),
        member.name,
        member.descriptor
    );
    if let Some(constant) = &member.constant {
        let _ = write!(out, " = {constant}");
    }
    if let Some(default) = &member.annotation_default {
        let _ = write!(out, " default {default}");
    }
    if !member.exceptions.is_empty() {
        let _ = write!(out, " throws {}", join(&member.exceptions));
    }
    if member.deprecated {
        out.push_str(" (deprecated)");
    }
    out.push('\n');
    if let Some(signature) = &member.signature {
        let _ = writeln!(out, "    signature {signature}");
    }
    for annotation in &member.annotations {
        let _ = writeln!(out, "    {annotation}");
    }
}

/// Human readable rendering of a descriptor.
pub fn describe_class(class: &ClassDescriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}{} {}",
        modifiers(class.access, CLASS_MODIFIERS),
        class_keyword(class),
        class.name
    );
    let _ = writeln!(
        out,
        "  version {} ({})",
        class.version,
        class.version.execution_environment()
    );
    if let Some(super_class) = &class.super_class {
        let _ = writeln!(out, "  extends {super_class}");
    }
    if !class.interfaces.is_empty() {
        let _ = writeln!(out, "  implements {}", join(&class.interfaces));
    }
    if let Some(signature) = &class.signature {
        let _ = writeln!(out, "  signature {signature}");
    }
    if class.deprecated {
        out.push_str("  deprecated\n");
    }
    for annotation in &class.annotations {
        let _ = writeln!(out, "  {annotation}");
    }
    for entry in &class.inner_classes {
        let _ = writeln!(
            out,
            "  inner {}{}",
            modifiers(entry.access, CLASS_MODIFIERS),
            entry.inner
        );
    }
    for member in &class.members {
        describe_member(&mut out, member);
    }
    if !class.header_references.is_empty() {
        let _ = writeln!(out, "  header references {}", join(&class.header_references));
    }
    if !class.code_references.is_empty() {
        let _ = writeln!(out, "  code references {}", join(&class.code_references));
    }
    out
}

/// Read one class file and describe it.
pub fn dump(file: &Path) -> Outcome {
    let mut reporter = Reporter::new();
    let location = file.display().to_string();
    let stdout = match fs::read(file) {
        Ok(bytes) => match read_class(&bytes) {
            Ok(class) => describe_class(&class),
            Err(error) => {
                reporter.report_error(&error, location);
                String::new()
            }
        },
        Err(error) => {
            reporter.report(
                Diagnostic::new(ErrorCode::B0010)
                    .with_message(format!("cannot read {location}: {error}"))
                    .at(location),
            );
            String::new()
        }
    };
    Outcome::finish(stdout, reporter)
}

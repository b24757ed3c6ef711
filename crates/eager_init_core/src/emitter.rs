//! Generated unit construction and Rust source rendering.
//!
//! # Responsibility
//! - Build the `GeneratedUnit` for one run.
//! - Render it as a Rust source file holding one aggregating lazy static.
//!
//! # Invariants
//! - One `let _ = &*<path>;` statement per init-list entry, in list order.
//! - Rendering is pure: identical units render to identical bytes.
//! - No validation happens here; inputs are already validated.
//!
//! Marked statics must initialize on first deref (`std::sync::LazyLock`,
//! `once_cell::sync::Lazy`). Forcing the generated static therefore runs each
//! listed initializer in order, once per process.

use crate::model::unit::{GeneratedUnit, OrderedInitList};
use heck::ToShoutySnakeCase;
use log::debug;
use std::fmt::Write as _;

const GENERATED_HEADER: &str = "// @generated by eager_init. Do not edit.";
const INDENT: &str = "    ";

/// Builds the generated unit for one run.
pub fn emit(
    package_name: impl Into<String>,
    type_name: impl Into<String>,
    init_order: OrderedInitList,
) -> GeneratedUnit {
    let unit = GeneratedUnit {
        package_name: package_name.into(),
        type_name: type_name.into(),
        init_order,
    };
    debug!(
        "event=emit module=emitter status=ok package={} type={} statements={}",
        unit.package_name,
        unit.type_name,
        unit.init_order.len()
    );
    unit
}

/// Name of the aggregating static rendered for `type_name`.
pub fn static_name(type_name: &str) -> String {
    type_name.to_shouty_snake_case()
}

/// Renders `unit` as Rust source text.
pub fn render_source(unit: &GeneratedUnit) -> String {
    let type_name = unit.type_name.as_str();
    let static_ident = static_name(type_name);
    let mut out = String::new();

    // `write!` into a `String` cannot fail.
    let _ = writeln!(out, "{GENERATED_HEADER}");
    let _ = writeln!(out, "// package: {}", unit.package_name);
    out.push('\n');

    let _ = writeln!(
        out,
        "/// Eagerly initializes every `#[eager_initialize]` static in priority order."
    );
    let _ = writeln!(out, "pub struct {type_name} {{");
    let _ = writeln!(out, "{INDENT}_priv: (),");
    out.push_str("}\n\n");

    let _ = writeln!(
        out,
        "pub static {static_ident}: ::std::sync::LazyLock<{type_name}> ="
    );
    let _ = writeln!(out, "{INDENT}::std::sync::LazyLock::new(|| {{");
    for qualified_name in &unit.init_order {
        let _ = writeln!(out, "{INDENT}{INDENT}let _ = &*{qualified_name};");
    }
    let _ = writeln!(out, "{INDENT}{INDENT}{type_name} {{ _priv: () }}");
    let _ = writeln!(out, "{INDENT}}});");
    out.push('\n');

    let _ = writeln!(out, "impl {type_name} {{");
    let _ = writeln!(
        out,
        "{INDENT}/// Forces every listed static, once per process."
    );
    let _ = writeln!(out, "{INDENT}pub fn initialize() {{");
    let _ = writeln!(out, "{INDENT}{INDENT}let _ = &*{static_ident};");
    let _ = writeln!(out, "{INDENT}}}");
    out.push_str("}\n");
    out
}

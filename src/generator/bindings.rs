//! HTTP request-binding glue.
//!
//! Structures whose members carry http bindings get a
//! `from_request_parts` constructor that pulls labels, query parameters,
//! headers and the payload out of a framework-neutral [`RequestParts`]
//! value, parses scalars, and funnels everything through the validating
//! constructor. The actual HTTP server wiring stays outside the generated
//! crate.

use super::context::RunContext;
use super::structs::boxed_ctor_arg;
use crate::emit::SourceWriter;
use crate::errors::StructuralError;
use crate::member::StructureMember;
use crate::model::{HttpBinding, Shape, ShapeKind};

/// Emit the binding impl for a structure, or `None` when no member carries
/// an http binding.
pub fn generate_request_bindings<'m>(
    ctx: &RunContext<'m>,
    shape: &'m Shape,
) -> Result<Option<String>, StructuralError> {
    let members = ctx.members_of(shape)?;
    if members.iter().all(|sm| sm.http_binding().is_none()) {
        return Ok(None);
    }
    let type_name = ctx.namer().type_name(&shape.id);
    let error_type = ctx.failures().error_type().to_string();
    let mut w = SourceWriter::new();
    w.open(format!("impl {type_name}"));
    w.doc("Bind an incoming request onto the validating constructor.");
    w.open(format!(
        "pub fn from_request_parts(parts: &RequestParts) -> Result<Self, {error_type}>"
    ));
    for sm in members.iter() {
        emit_member_binding(ctx, &mut w, sm, &error_type)?;
    }
    let args = members
        .iter()
        .map(|sm| sm.arg().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    w.line(format!("Self::new({args})"));
    w.close();
    w.close();
    Ok(Some(w.finish()))
}

fn emit_member_binding(
    ctx: &RunContext<'_>,
    w: &mut SourceWriter,
    sm: &StructureMember<'_>,
    error_type: &str,
) -> Result<(), StructuralError> {
    let arg = sm.arg();
    let boxed = boxed_ctor_arg(sm);
    match sm.http_binding() {
        Some(HttpBinding::Label) => {
            // Path labels are always required by construction of the route.
            w.open(format!(
                "let {arg} = match parts.path.get({:?})",
                sm.name()
            ));
            w.line(format!("Some(raw) => {},", parse_expr(ctx, sm, "raw", error_type)));
            w.line(format!(
                "None => return Err({error_type}::new(\"missing path parameter {}\")),",
                sm.name()
            ));
            w.close_with(";");
            if boxed {
                w.line(format!("let {arg} = Some({arg});"));
            }
        }
        Some(HttpBinding::Query { name }) => {
            let key = name.clone().unwrap_or_else(|| sm.name().to_string());
            emit_optional_source(ctx, w, sm, &format!("parts.query.get({key:?})"), error_type, boxed);
        }
        Some(HttpBinding::Header { name }) => {
            emit_optional_source(
                ctx,
                w,
                sm,
                &format!("parts.headers.get({:?})", name.to_ascii_lowercase()),
                error_type,
                boxed,
            );
        }
        Some(HttpBinding::Payload) => {
            let ty = &sm.rust_type().qualified;
            w.open(format!("let {arg} = match parts.body.as_ref()"));
            w.line(format!(
                "Some(body) => serde_json::from_value::<{ty}>(body.clone()).map_err(|e| {error_type}::new(format!(\"malformed {} payload: {{e}}\", {:?})))?,",
                sm.name(),
                sm.name()
            ));
            w.line(format!(
                "None => return Err({error_type}::new(\"missing request payload for {}\")),",
                sm.name()
            ));
            w.close_with(";");
            if boxed {
                w.line(format!("let {arg} = Some({arg});"));
            }
        }
        None => {
            // Unbound members of an http-bound structure come from the body
            // document by json name.
            let ty = &sm.rust_type().qualified;
            w.open(format!(
                "let {arg} = match parts.body.as_ref().and_then(|b| b.get({:?}))",
                sm.json_name()
            ));
            w.line(format!(
                "Some(v) => Some(serde_json::from_value::<{ty}>(v.clone()).map_err(|e| {error_type}::new(format!(\"malformed field {}: {{e}}\", {:?})))?),",
                sm.json_name(),
                sm.json_name()
            ));
            w.line("None => None,");
            w.close_with(";");
            if !boxed {
                w.open(format!("let {arg} = match {arg}"));
                w.line("Some(v) => v,");
                w.line(format!(
                    "None => return Err({error_type}::new(\"missing required field {}\")),",
                    sm.json_name()
                ));
                w.close_with(";");
            }
        }
    }
    Ok(())
}

/// Query and header sources may legitimately be absent; requiredness decides
/// whether absence is an error or a `None`.
fn emit_optional_source(
    ctx: &RunContext<'_>,
    w: &mut SourceWriter,
    sm: &StructureMember<'_>,
    source: &str,
    error_type: &str,
    boxed: bool,
) {
    let arg = sm.arg();
    w.open(format!("let {arg} = match {source}"));
    w.line(format!("Some(raw) => Some({}),", parse_expr(ctx, sm, "raw", error_type)));
    w.line("None => None,");
    w.close_with(";");
    if !boxed {
        w.open(format!("let {arg} = match {arg}"));
        w.line("Some(v) => v,");
        w.line(format!(
            "None => return Err({error_type}::new(\"missing required parameter {}\")),",
            sm.name()
        ));
        w.close_with(";");
    }
}

/// Expression converting a raw `&String` source value into the member's
/// representation, failing through the configured error type.
fn parse_expr(
    ctx: &RunContext<'_>,
    sm: &StructureMember<'_>,
    raw: &str,
    error_type: &str,
) -> String {
    let name = sm.name();
    match &sm.target().kind {
        ShapeKind::String => format!("{raw}.clone()"),
        ShapeKind::Boolean
        | ShapeKind::Byte
        | ShapeKind::Short
        | ShapeKind::Integer
        | ShapeKind::Long
        | ShapeKind::Float
        | ShapeKind::Double
        | ShapeKind::BigInteger
        | ShapeKind::BigDecimal => {
            let ty = &sm.rust_type().qualified;
            format!(
                "{raw}.parse::<{ty}>().map_err(|_| {error_type}::new(format!(\"unparseable {name}: {{:?}}\", {raw})))?"
            )
        }
        ShapeKind::Timestamp => format!(
            "time::OffsetDateTime::parse({raw}, &time::format_description::well_known::Rfc3339).map_err(|_| {error_type}::new(format!(\"unparseable {name}: {{:?}}\", {raw})))?"
        ),
        ShapeKind::Enum { .. } => {
            let ty = ctx.namer().type_name(&sm.target().id);
            format!(
                "{ty}::from_value({raw}).ok_or_else(|| {error_type}::new(format!(\"unknown {name} value {{:?}}\", {raw})))?"
            )
        }
        ShapeKind::IntEnum { .. } => {
            let ty = ctx.namer().type_name(&sm.target().id);
            format!(
                "{raw}.parse::<i32>().ok().and_then({ty}::from_value).ok_or_else(|| {error_type}::new(format!(\"unknown {name} value {{:?}}\", {raw})))?"
            )
        }
        _ => format!(
            "serde_json::from_str({raw}).map_err(|e| {error_type}::new(format!(\"malformed {name}: {{e}}\")))?"
        ),
    }
}

/// The framework-neutral support types every generated crate carries:
/// the validation failure and the request-parts carrier.
pub fn emit_support_types() -> String {
    let mut w = SourceWriter::new();
    w.doc("A constructor argument rejected by a declared constraint, or a\nrequest that could not be bound.");
    w.line("#[derive(Debug, Clone, PartialEq, Eq)]");
    w.open("pub struct InvalidInput");
    w.line("message: String,");
    w.close();
    w.blank();
    w.open("impl InvalidInput");
    w.open("pub fn new(message: impl Into<String>) -> Self");
    w.line("InvalidInput { message: message.into() }");
    w.close();
    w.blank();
    w.open("pub fn message(&self) -> &str");
    w.line("&self.message");
    w.close();
    w.close();
    w.blank();
    w.open("impl std::fmt::Display for InvalidInput");
    w.open("fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result");
    w.line("f.write_str(&self.message)");
    w.close();
    w.close();
    w.blank();
    w.line("impl std::error::Error for InvalidInput {}");
    w.blank();
    w.doc("The pieces of an HTTP request the binding glue consumes. Header\nnames are expected lowercased.");
    w.line("#[derive(Debug, Clone, Default)]");
    w.open("pub struct RequestParts");
    w.line("pub path: std::collections::BTreeMap<String, String>,");
    w.line("pub query: std::collections::BTreeMap<String, String>,");
    w.line("pub headers: std::collections::BTreeMap<String, String>,");
    w.line("pub body: Option<serde_json::Value>,");
    w.close();
    w.finish()
}

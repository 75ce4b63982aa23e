//! Structure (data class) generation: fields, shared default constants, the
//! validating constructor, the widened convenience constructor, getters, and
//! the equality/hash contract.

use tracing::debug;

use super::context::RunContext;
use super::defaults::{resolve_default, DefaultConst};
use super::equality::emit_equality_impls;
use super::validation::emit_member_checks;
use crate::constraints::ConstraintChecker;
use crate::emit::SourceWriter;
use crate::errors::StructuralError;
use crate::member::{NumberKind, StructureMember};
use crate::model::{Shape, ShapeKind};

/// Generate all items for one structure shape. Constraint checking runs
/// first; on violation nothing at all is emitted for the structure.
pub fn generate_structure<'m>(
    ctx: &RunContext<'m>,
    shape: &'m Shape,
) -> Result<String, StructuralError> {
    ConstraintChecker::new(ctx.model()).check_structure(shape)?;
    let members = ctx.members_of(shape)?;
    let type_name = ctx.namer().type_name(&shape.id);
    debug!(shape = %shape.id, members = members.len(), "generating structure");

    // Defaults resolve before any text is produced; an unsupported default
    // kind aborts the structure with zero emission.
    let mut defaults: Vec<Option<DefaultConst>> = Vec::with_capacity(members.len());
    for sm in members.iter() {
        defaults.push(resolve_default(ctx, shape, sm)?);
    }

    let mut w = SourceWriter::new();
    emit_struct_decl(&mut w, shape, &members, &type_name);
    w.blank();

    let mut body = SourceWriter::new();
    let statics = emit_ctor(ctx, &mut body, &members, &defaults, &type_name)?;
    for item in &statics {
        w.line(item.trim_end());
    }
    for default in defaults.iter().flatten() {
        w.line(default.decl.trim_end());
    }
    if !statics.is_empty() || defaults.iter().any(Option::is_some) {
        w.blank();
    }

    w.open(format!("impl {type_name}"));
    for line in body.finish().lines() {
        w.line(line);
    }
    emit_convenience_ctor(ctx, &mut w, &members);
    emit_getters(&mut w, &members);
    w.close();
    w.blank();

    let mut sorted: Vec<&StructureMember<'_>> = members.iter().collect();
    sorted.sort_by(|a, b| a.weight().total_cmp(&b.weight()));
    emit_equality_impls(&mut w, ctx.model(), &type_name, &sorted);
    Ok(w.finish())
}

fn emit_struct_decl(
    w: &mut SourceWriter,
    shape: &Shape,
    members: &[StructureMember<'_>],
    type_name: &str,
) {
    w.doc(format!("Data type generated from the `{}` shape.", shape.id));
    if shape.traits.deprecated {
        w.line("#[deprecated]");
    }
    w.line("#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]");
    w.line("#[serde(deny_unknown_fields)]");
    w.open(format!("pub struct {type_name}"));
    for sm in members {
        if sm.json_name() != sm.field().trim_start_matches("r#") {
            w.line(format!("#[serde(rename = {:?})]", sm.json_name()));
        }
        if sm.rust_type().nullable {
            w.line("#[serde(skip_serializing_if = \"Option::is_none\")]");
        }
        w.line(format!("{}: {},", sm.field(), sm.rust_type().field_type()));
    }
    w.close();
}

/// The primary validating constructor. Argument order is declaration order;
/// defaulted members take `Option<T>` with `None` meaning the default.
fn emit_ctor(
    ctx: &RunContext<'_>,
    w: &mut SourceWriter,
    members: &[StructureMember<'_>],
    defaults: &[Option<DefaultConst>],
    type_name: &str,
) -> Result<Vec<String>, StructuralError> {
    let error_type = ctx.failures().error_type().to_string();
    let args = members
        .iter()
        .map(|sm| format!("{}: {}", sm.arg(), ctor_arg_type(sm)))
        .collect::<Vec<_>>()
        .join(", ");

    let constrained = members.iter().any(|sm| sm.is_constrained());
    if constrained {
        w.doc(format!(
            "Validating constructor; returns `{error_type}` when an argument\nviolates a declared constraint."
        ));
    }
    w.open(format!("pub fn new({args}) -> Result<Self, {error_type}>"));

    let mut statics = Vec::new();
    for (sm, default) in members.iter().zip(defaults) {
        if let Some(default) = default {
            w.line(format!(
                "let {} = {}.unwrap_or_else(|| {});",
                sm.arg(),
                sm.arg(),
                default.expr
            ));
        }
    }
    for sm in members {
        if !sm.is_constrained() {
            continue;
        }
        if sm.rust_type().nullable {
            // Null guard: required and defaulted members skip it; everything
            // else wraps its remaining checks in presence.
            let binding = format!("{}_value", sm.arg().trim_start_matches("r#"));
            let (pattern, by_ref) = if is_copy_kind(&sm.target().kind) {
                (format!("Some({binding})"), false)
            } else {
                (format!("Some(ref {binding})"), true)
            };
            w.open(format!("if let {pattern} = {}", sm.arg()));
            statics.extend(emit_member_checks(w, ctx.failures(), sm, &binding, by_ref)?);
            w.close();
        } else {
            statics.extend(emit_member_checks(w, ctx.failures(), sm, sm.arg(), false)?);
        }
    }

    let fields = members
        .iter()
        .map(|sm| {
            if sm.field() == sm.arg() {
                sm.field().to_string()
            } else {
                format!("{}: {}", sm.field(), sm.arg())
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    w.line(format!("Ok({type_name} {{ {fields} }})"));
    w.close();
    Ok(statics)
}

/// Secondary convenience constructor: accepts int where the stored field is
/// byte/short and double where it is float, narrowing with a checked cast.
fn emit_convenience_ctor(
    ctx: &RunContext<'_>,
    w: &mut SourceWriter,
    members: &[StructureMember<'_>],
) {
    if !members.iter().any(|sm| sm.convenience_kind().is_some()) {
        return;
    }
    let error_type = ctx.failures().error_type().to_string();
    let args = members
        .iter()
        .map(|sm| {
            let ty = match sm.convenience_kind() {
                Some(wide) => wrap_optionality(sm, wide.rust_name()),
                None => ctor_arg_type(sm),
            };
            format!("{}: {ty}", sm.arg())
        })
        .collect::<Vec<_>>()
        .join(", ");
    w.blank();
    w.doc("Convenience constructor accepting widened numeric inputs.");
    w.open(format!("pub fn of({args}) -> Result<Self, {error_type}>"));
    for sm in members {
        let Some(wide) = sm.convenience_kind() else {
            continue;
        };
        let Some(narrow) = sm.number_kind() else {
            continue;
        };
        let arg = sm.arg();
        let check = narrowing_check(narrow, wide, "v");
        let cast = format!("v as {}", narrow.rust_name());
        let fail = format!(
            "return Err({error_type}::new(format!(\"{} does not fit {}: {{}}\", v)));",
            sm.name(),
            narrow.rust_name()
        );
        if boxed_ctor_arg(sm) {
            w.open(format!("let {arg} = match {arg}"));
            w.open("Some(v) =>");
            w.guard(&check, |w| {
                w.line(&fail);
            });
            w.line(format!("Some({cast})"));
            w.close();
            w.line("None => None,");
            w.close_with(";");
        } else {
            w.line(format!("let v = {arg};"));
            w.guard(&check, |w| {
                w.line(&fail);
            });
            w.line(format!("let {arg} = {cast};"));
        }
    }
    let pass = members
        .iter()
        .map(|sm| sm.arg().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    w.line(format!("Self::new({pass})"));
    w.close();
}

fn narrowing_check(narrow: NumberKind, wide: NumberKind, v: &str) -> String {
    let narrow_ty = narrow.rust_name();
    let wide_ty = wide.rust_name();
    format!(
        "{v} < {wide_ty}::from({narrow_ty}::MIN) || {v} > {wide_ty}::from({narrow_ty}::MAX)"
    )
}

fn emit_getters(w: &mut SourceWriter, members: &[StructureMember<'_>]) {
    for sm in members {
        w.blank();
        if sm.deprecated() {
            w.line("#[deprecated]");
        }
        let field = sm.field();
        let getter = sm.getter();
        let nullable = sm.rust_type().nullable;
        let qualified = &sm.rust_type().qualified;
        if is_copy_kind(&sm.target().kind) {
            let ret = if nullable {
                format!("Option<{qualified}>")
            } else {
                qualified.clone()
            };
            w.open(format!("pub fn {getter}(&self) -> {ret}"));
            w.line(format!("self.{field}"));
            w.close();
        } else if matches!(sm.target().kind, ShapeKind::String) {
            if nullable {
                w.open(format!("pub fn {getter}(&self) -> Option<&str>"));
                w.line(format!("self.{field}.as_deref()"));
            } else {
                w.open(format!("pub fn {getter}(&self) -> &str"));
                w.line(format!("self.{field}.as_str()"));
            }
            w.close();
        } else if nullable {
            w.open(format!("pub fn {getter}(&self) -> Option<&{qualified}>"));
            w.line(format!("self.{field}.as_ref()"));
            w.close();
        } else {
            w.open(format!("pub fn {getter}(&self) -> &{qualified}"));
            w.line(format!("&self.{field}"));
            w.close();
        }
    }
}

/// Constructor argument type: `Option<T>` for nullable AND defaulted members
/// (for the latter, `None` selects the default).
pub(crate) fn ctor_arg_type(sm: &StructureMember<'_>) -> String {
    if boxed_ctor_arg(sm) {
        format!("Option<{}>", sm.rust_type().qualified)
    } else {
        sm.rust_type().qualified.clone()
    }
}

pub(crate) fn boxed_ctor_arg(sm: &StructureMember<'_>) -> bool {
    sm.rust_type().nullable || sm.has_default()
}

fn wrap_optionality(sm: &StructureMember<'_>, base: &str) -> String {
    if boxed_ctor_arg(sm) {
        format!("Option<{base}>")
    } else {
        base.to_string()
    }
}

pub(crate) fn is_copy_kind(kind: &ShapeKind) -> bool {
    matches!(
        kind,
        ShapeKind::Boolean
            | ShapeKind::Byte
            | ShapeKind::Short
            | ShapeKind::Integer
            | ShapeKind::Long
            | ShapeKind::Float
            | ShapeKind::Double
            | ShapeKind::Timestamp
            | ShapeKind::Enum { .. }
            | ShapeKind::IntEnum { .. }
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::model::{
        LengthBounds, Member, Model, RangeBounds, ShapeId, TraitSet,
    };

    fn pet_model() -> Model {
        let name_member = {
            let mut m = Member::new("name", ShapeId::prelude("String"));
            m.traits = TraitSet {
                required: true,
                length: Some(LengthBounds::new(Some(3), Some(10))),
                ..TraitSet::default()
            };
            m
        };
        let age_member = {
            let mut m = Member::new("age", ShapeId::prelude("Integer"));
            m.traits = TraitSet {
                range: Some(RangeBounds::new(Some(0), Some(40))),
                ..TraitSet::default()
            };
            m
        };
        let weight_member = {
            let mut m = Member::new("weight", ShapeId::prelude("Byte"));
            m.traits = TraitSet {
                default: Some(serde_json::json!(5)),
                ..TraitSet::default()
            };
            m
        };
        Model::from_shapes([Shape::new(
            ShapeId::new("example#Pet"),
            ShapeKind::Structure {
                members: vec![name_member, age_member, weight_member],
            },
        )])
    }

    #[test]
    fn constructor_signature_reflects_presence_policy() {
        let model = pet_model();
        let ctx = RunContext::new(&model);
        let shape = model.get(&"example#Pet".into()).unwrap();
        let text = generate_structure(&ctx, shape).unwrap();
        assert!(
            text.contains("pub fn new(name: String, age: Option<i32>, weight: Option<i8>) -> Result<Self, InvalidInput>"),
            "emitted:\n{text}"
        );
        // Defaulted member resolves through the shared constant.
        assert!(text.contains("pub const DEFAULT_WEIGHT: i8 = 5;"));
        assert!(text.contains("weight.unwrap_or_else(|| DEFAULT_WEIGHT)"));
    }

    #[test]
    fn null_guard_only_for_optional_members() {
        let model = pet_model();
        let ctx = RunContext::new(&model);
        let shape = model.get(&"example#Pet".into()).unwrap();
        let text = generate_structure(&ctx, shape).unwrap();
        // Optional age wraps its range check in a presence guard.
        assert!(text.contains("if let Some(age_value) = age"), "emitted:\n{text}");
        // Required name checks run unguarded.
        assert!(text.contains("if name.chars().count() < 3"), "emitted:\n{text}");
    }

    #[test]
    fn convenience_ctor_widens_byte_to_int() {
        let model = pet_model();
        let ctx = RunContext::new(&model);
        let shape = model.get(&"example#Pet".into()).unwrap();
        let text = generate_structure(&ctx, shape).unwrap();
        assert!(
            text.contains("pub fn of(name: String, age: Option<i32>, weight: Option<i32>) -> Result<Self, InvalidInput>"),
            "emitted:\n{text}"
        );
        assert!(text.contains("i32::from(i8::MIN)"), "emitted:\n{text}");
    }

    #[test]
    fn invalid_structure_emits_nothing() {
        let mut bad_member = Member::new("name", ShapeId::prelude("String"));
        bad_member.traits = TraitSet {
            required: true,
            length: Some(LengthBounds::new(Some(5), Some(4))),
            ..TraitSet::default()
        };
        let model = Model::from_shapes([Shape::new(
            ShapeId::new("example#Broken"),
            ShapeKind::Structure {
                members: vec![bad_member],
            },
        )]);
        let ctx = RunContext::new(&model);
        let shape = model.get(&"example#Broken".into()).unwrap();
        let err = generate_structure(&ctx, shape).unwrap_err();
        assert!(matches!(err, StructuralError::InvertedBounds { .. }));
    }

    #[test]
    fn getters_match_representation() {
        let model = pet_model();
        let ctx = RunContext::new(&model);
        let shape = model.get(&"example#Pet".into()).unwrap();
        let text = generate_structure(&ctx, shape).unwrap();
        assert!(text.contains("pub fn name(&self) -> &str"));
        assert!(text.contains("pub fn age(&self) -> Option<i32>"));
        assert!(text.contains("pub fn weight(&self) -> i8"));
    }
}

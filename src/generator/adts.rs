//! Enum, int-enum and union type emission.

use super::context::RunContext;
use super::equality::is_hashable;
use crate::emit::SourceWriter;
use crate::errors::StructuralError;
use crate::member::naming::enum_variant_name;
use crate::member::resolve::base_type_name;
use crate::model::{EnumConstant, IntEnumConstant, Member, Shape, ShapeKind};

/// Emit the type definition for an enum, int-enum, or union shape.
pub fn generate_adt(ctx: &RunContext<'_>, shape: &Shape) -> Result<String, StructuralError> {
    crate::constraints::ConstraintChecker::new(ctx.model()).check_shape(shape)?;
    let mut w = SourceWriter::new();
    match &shape.kind {
        ShapeKind::Enum { constants } => emit_enum(ctx, &mut w, shape, constants),
        ShapeKind::IntEnum { constants } => emit_int_enum(ctx, &mut w, shape, constants),
        ShapeKind::Union { variants } => emit_union(ctx, &mut w, shape, variants)?,
        _ => {}
    }
    Ok(w.finish())
}

fn emit_enum(ctx: &RunContext<'_>, w: &mut SourceWriter, shape: &Shape, constants: &[EnumConstant]) {
    let type_name = ctx.namer().type_name(&shape.id);
    w.doc(format!("Values of the `{}` enum shape.", shape.id));
    if shape.traits.deprecated {
        w.line("#[deprecated]");
    }
    w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]");
    w.open(format!("pub enum {type_name}"));
    for constant in constants {
        w.line(format!("#[serde(rename = {:?})]", constant.value));
        w.line(format!("{},", enum_variant_name(&constant.name)));
    }
    w.close();
    w.blank();
    w.open(format!("impl {type_name}"));
    w.doc("The wire value of this constant.");
    w.open("pub fn value(self) -> &'static str");
    w.open("match self");
    for constant in constants {
        w.line(format!(
            "{type_name}::{} => {:?},",
            enum_variant_name(&constant.name),
            constant.value
        ));
    }
    w.close();
    w.close();
    w.blank();
    w.doc("Look a constant up by its wire value.");
    w.open("pub fn from_value(value: &str) -> Option<Self>");
    w.open("match value");
    for constant in constants {
        w.line(format!(
            "{:?} => Some({type_name}::{}),",
            constant.value,
            enum_variant_name(&constant.name)
        ));
    }
    w.line("_ => None,");
    w.close();
    w.close();
    w.close();
}

fn emit_int_enum(
    ctx: &RunContext<'_>,
    w: &mut SourceWriter,
    shape: &Shape,
    constants: &[IntEnumConstant],
) {
    let type_name = ctx.namer().type_name(&shape.id);
    w.doc(format!("Values of the `{}` int-enum shape.", shape.id));
    if shape.traits.deprecated {
        w.line("#[deprecated]");
    }
    w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]");
    w.open(format!("pub enum {type_name}"));
    for constant in constants {
        w.line(format!("{},", enum_variant_name(&constant.name)));
    }
    w.close();
    w.blank();
    w.open(format!("impl {type_name}"));
    w.open("pub fn value(self) -> i32");
    w.open("match self");
    for constant in constants {
        w.line(format!(
            "{type_name}::{} => {},",
            enum_variant_name(&constant.name),
            constant.value
        ));
    }
    w.close();
    w.close();
    w.blank();
    w.open("pub fn from_value(value: i32) -> Option<Self>");
    w.open("match value");
    for constant in constants {
        w.line(format!(
            "{} => Some({type_name}::{}),",
            constant.value,
            enum_variant_name(&constant.name)
        ));
    }
    w.line("_ => None,");
    w.close();
    w.close();
    w.close();
}

fn emit_union(
    ctx: &RunContext<'_>,
    w: &mut SourceWriter,
    shape: &Shape,
    variants: &[Member],
) -> Result<(), StructuralError> {
    let type_name = ctx.namer().type_name(&shape.id);
    let hashable = variants.iter().all(|v| {
        ctx.model()
            .get(&v.target)
            .map(|t| is_hashable(ctx.model(), t))
            .unwrap_or(false)
    });
    w.doc(format!(
        "One of the `{}` union's variants; exactly one is ever present.",
        shape.id
    ));
    if shape.traits.deprecated {
        w.line("#[deprecated]");
    }
    let mut derives = vec!["Debug", "Clone", "PartialEq"];
    if hashable {
        derives.push("Eq");
        derives.push("Hash");
    }
    derives.push("serde::Serialize");
    derives.push("serde::Deserialize");
    w.line(format!("#[derive({})]", derives.join(", ")));
    w.open(format!("pub enum {type_name}"));
    for variant in variants {
        let target = ctx.model().expect_shape(&variant.name, &variant.target)?;
        let inner = base_type_name(ctx.model(), ctx.namer(), target)?;
        if ctx.namer().json_name(variant) != enum_variant_name(&variant.name) {
            w.line(format!("#[serde(rename = {:?})]", ctx.namer().json_name(variant)));
        }
        w.line(format!("{}({inner}),", enum_variant_name(&variant.name)));
    }
    w.close();
    Ok(())
}

//! Equality and hash contribution fragments.
//!
//! Members are compared cheapest-first, ordered by their weight, so a
//! mismatch on a boolean short-circuits before a blob is ever touched.
//! Floating-point members compare and hash through `to_bits()`, which is
//! total and reflexive, so the generated types can honestly claim `Eq`.

use crate::emit::SourceWriter;
use crate::member::{NumberKind, StructureMember};
use crate::model::{Model, Shape, ShapeKind};

/// Emit `PartialEq`, `Eq` and `Hash` impls for a generated struct.
/// `members` must already be sorted ascending by weight.
pub fn emit_equality_impls(
    w: &mut SourceWriter,
    model: &Model,
    type_name: &str,
    members: &[&StructureMember<'_>],
) {
    w.open(format!("impl PartialEq for {type_name}"));
    w.open("fn eq(&self, other: &Self) -> bool");
    if members.is_empty() {
        w.line("true");
    } else {
        for (i, sm) in members.iter().enumerate() {
            let fragment = eq_fragment(model, sm);
            let lead = if i == 0 { "" } else { "    && " };
            w.line(format!("{lead}{fragment}"));
        }
    }
    w.close();
    w.close();
    w.blank();
    w.line(format!("impl Eq for {type_name} {{}}"));
    w.blank();
    w.open(format!("impl std::hash::Hash for {type_name}"));
    w.open("fn hash<H: std::hash::Hasher>(&self, state: &mut H)");
    if members.is_empty() {
        w.line("let _ = state;");
    }
    for sm in members {
        for line in hash_lines(model, sm) {
            w.line(line);
        }
    }
    w.close();
    w.close();
}

/// What kind of comparison a member's value needs.
enum CompareKind {
    /// Scalar f32/f64.
    FloatScalar(NumberKind),
    /// Vec of f32/f64.
    FloatList(NumberKind),
    /// BTreeMap whose values are f32/f64.
    FloatValuedMap(NumberKind),
    /// Contains `serde_json::Value` somewhere un-hashable.
    Documentish,
    Plain,
}

fn classify(model: &Model, shape: &Shape) -> CompareKind {
    match &shape.kind {
        ShapeKind::Float => CompareKind::FloatScalar(NumberKind::Float),
        ShapeKind::Double => CompareKind::FloatScalar(NumberKind::Double),
        ShapeKind::List { member } => match element_kind(model, &member.target) {
            Some(ShapeKind::Float) => CompareKind::FloatList(NumberKind::Float),
            Some(ShapeKind::Double) => CompareKind::FloatList(NumberKind::Double),
            _ if is_hashable(model, shape) => CompareKind::Plain,
            _ => CompareKind::Documentish,
        },
        ShapeKind::Map { value, .. } => match element_kind(model, &value.target) {
            Some(ShapeKind::Float) => CompareKind::FloatValuedMap(NumberKind::Float),
            Some(ShapeKind::Double) => CompareKind::FloatValuedMap(NumberKind::Double),
            _ if is_hashable(model, shape) => CompareKind::Plain,
            _ => CompareKind::Documentish,
        },
        // Anything a `hash()` call cannot reach (documents, unions with
        // float variants) hashes through its canonical json form.
        _ if !is_hashable(model, shape) => CompareKind::Documentish,
        _ => CompareKind::Plain,
    }
}

fn element_kind(model: &Model, target: &crate::model::ShapeId) -> Option<ShapeKind> {
    model.get(target).map(|s| s.kind.clone())
}

fn eq_fragment(model: &Model, sm: &StructureMember<'_>) -> String {
    let field = sm.field();
    let nullable = sm.rust_type().nullable;
    match classify(model, sm.target()) {
        CompareKind::FloatScalar(kind) => {
            let ty = kind.rust_name();
            if nullable {
                format!("self.{field}.map({ty}::to_bits) == other.{field}.map({ty}::to_bits)")
            } else {
                format!("self.{field}.to_bits() == other.{field}.to_bits()")
            }
        }
        CompareKind::FloatList(_) => {
            let cmp = "a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())".to_string();
            if nullable {
                format!(
                    "match (&self.{field}, &other.{field}) {{ (Some(a), Some(b)) => {cmp}, (None, None) => true, _ => false }}"
                )
            } else {
                format!(
                    "{{ let (a, b) = (&self.{field}, &other.{field}); {cmp} }}"
                )
            }
        }
        CompareKind::FloatValuedMap(_) => {
            let cmp = "a.len() == b.len() && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| ka == kb && va.to_bits() == vb.to_bits())".to_string();
            if nullable {
                format!(
                    "match (&self.{field}, &other.{field}) {{ (Some(a), Some(b)) => {cmp}, (None, None) => true, _ => false }}"
                )
            } else {
                format!("{{ let (a, b) = (&self.{field}, &other.{field}); {cmp} }}")
            }
        }
        CompareKind::Documentish | CompareKind::Plain => {
            format!("self.{field} == other.{field}")
        }
    }
}

fn hash_lines(model: &Model, sm: &StructureMember<'_>) -> Vec<String> {
    let field = sm.field();
    let nullable = sm.rust_type().nullable;
    match classify(model, sm.target()) {
        CompareKind::FloatScalar(kind) => {
            let ty = kind.rust_name();
            vec![format!(
                "{}.hash(state);",
                if nullable {
                    format!("self.{field}.map({ty}::to_bits)")
                } else {
                    format!("self.{field}.to_bits()")
                }
            )]
        }
        CompareKind::FloatList(_) => {
            let body = "for v in items { v.to_bits().hash(state); }".to_string();
            if nullable {
                vec![
                    format!("self.{field}.is_some().hash(state);"),
                    format!("if let Some(items) = &self.{field} {{ {body} }}"),
                ]
            } else {
                vec![format!("{{ let items = &self.{field}; {body} }}")]
            }
        }
        CompareKind::FloatValuedMap(_) => {
            let body =
                "for (k, v) in entries { k.hash(state); v.to_bits().hash(state); }".to_string();
            if nullable {
                vec![
                    format!("self.{field}.is_some().hash(state);"),
                    format!("if let Some(entries) = &self.{field} {{ {body} }}"),
                ]
            } else {
                vec![format!("{{ let entries = &self.{field}; {body} }}")]
            }
        }
        CompareKind::Documentish => {
            // serde_json::Value carries no Hash impl; its canonical string
            // form stands in.
            vec![format!(
                "serde_json::to_string(&self.{field}).unwrap_or_default().hash(state);"
            )]
        }
        CompareKind::Plain => vec![format!("self.{field}.hash(state);")],
    }
}

/// Whether a value of this shape can feed `std::hash::Hash` directly; used
/// by union generation to decide which impls to emit.
pub fn is_hashable(model: &Model, shape: &Shape) -> bool {
    is_hashable_bounded(model, shape, 8)
}

fn is_hashable_bounded(model: &Model, shape: &Shape, depth: usize) -> bool {
    if depth == 0 {
        return false;
    }
    match &shape.kind {
        ShapeKind::Float | ShapeKind::Double | ShapeKind::Document => false,
        ShapeKind::List { member } | ShapeKind::Map { value: member, .. } => model
            .get(&member.target)
            .map(|s| is_hashable_bounded(model, s, depth - 1))
            .unwrap_or(true),
        ShapeKind::Union { variants } => variants.iter().all(|v| {
            model
                .get(&v.target)
                .map(|s| is_hashable_bounded(model, s, depth - 1))
                .unwrap_or(true)
        }),
        // Generated structures always carry a Hash impl of their own.
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::generator::context::RunContext;
    use crate::model::{Member, Model, Shape, ShapeId, ShapeKind, TraitSet};

    fn emit_for(members: Vec<Member>) -> String {
        let holder = Shape::new(
            ShapeId::new("example#Holder"),
            ShapeKind::Structure { members },
        );
        let model = Model::from_shapes([holder.clone()]);
        let holder = model.get(&"example#Holder".into()).unwrap();
        let ctx = RunContext::new(&model);
        let members = ctx.members_of(holder).unwrap();
        let mut sorted: Vec<&StructureMember<'_>> = members.iter().collect();
        sorted.sort_by(|a, b| a.weight().total_cmp(&b.weight()));
        let mut w = SourceWriter::new();
        emit_equality_impls(&mut w, &model, "Holder", &sorted);
        w.finish()
    }

    #[test]
    fn cheap_members_compare_first() {
        let text = emit_for(vec![
            {
                let mut m = Member::new("payload", ShapeId::prelude("Blob"));
                m.traits = TraitSet::required();
                m
            },
            {
                let mut m = Member::new("flag", ShapeId::prelude("Boolean"));
                m.traits = TraitSet::required();
                m
            },
        ]);
        let flag_at = text.find("self.flag == other.flag").unwrap();
        let payload_at = text.find("self.payload == other.payload").unwrap();
        assert!(flag_at < payload_at, "emitted:\n{text}");
    }

    #[test]
    fn floats_compare_and_hash_by_bits() {
        let text = emit_for(vec![{
            let mut m = Member::new("ratio", ShapeId::prelude("Double"));
            m.traits = TraitSet::required();
            m
        }]);
        assert!(text.contains("self.ratio.to_bits() == other.ratio.to_bits()"));
        assert!(text.contains("self.ratio.to_bits().hash(state);"));
        assert!(text.contains("impl Eq for Holder {}"));
    }

    #[test]
    fn optional_floats_map_to_bits() {
        let text = emit_for(vec![Member::new("ratio", ShapeId::prelude("Float"))]);
        assert!(
            text.contains("self.ratio.map(f32::to_bits) == other.ratio.map(f32::to_bits)"),
            "emitted:\n{text}"
        );
    }

    #[test]
    fn documents_hash_through_their_string_form() {
        let text = emit_for(vec![{
            let mut m = Member::new("extra", ShapeId::prelude("Document"));
            m.traits = TraitSet::required();
            m
        }]);
        assert!(text.contains("serde_json::to_string(&self.extra)"));
        assert!(text.contains("self.extra == other.extra"));
    }
}

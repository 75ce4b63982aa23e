use crate::model::{LengthBounds, Member, Model, Shape, ShapeKind};

/// Length range assumed for collections with no `length` trait.
pub const DEFAULT_LENGTH_RANGE: f64 = 16.0;

/// Unconstrained-string baseline weight.
const STRING_BASE_WEIGHT: f64 = 10.0;

/// Divisor used to scale a string's weight by its declared length range.
const STRING_RANGE_SCALE: f64 = 512.0;

/// Estimate the cost of comparing one value of this shape for equality.
///
/// Ascending weight order is cheapest-to-compare-first; equality generation
/// sorts members by it so cheap mismatches short-circuit early. Order affects
/// only performance, never correctness.
pub fn weight_of(model: &Model, shape: &Shape) -> f64 {
    match &shape.kind {
        ShapeKind::Boolean => 1.0,
        ShapeKind::Byte
        | ShapeKind::Short
        | ShapeKind::Integer
        | ShapeKind::Float
        | ShapeKind::Enum { .. }
        | ShapeKind::IntEnum { .. } => 2.0,
        ShapeKind::Double | ShapeKind::Long => 3.0,
        ShapeKind::BigDecimal | ShapeKind::BigInteger => 6.0,
        ShapeKind::String => weigh_string(shape),
        ShapeKind::Timestamp => 9.0,
        ShapeKind::Document => 128.0,
        ShapeKind::Blob => 256.0,
        ShapeKind::List { member } => {
            bounded_length_range(shape.traits.length.as_ref(), DEFAULT_LENGTH_RANGE)
                * weight_of_member(model, member)
        }
        ShapeKind::Map { key, value } => {
            bounded_length_range(shape.traits.length.as_ref(), DEFAULT_LENGTH_RANGE)
                * (weight_of_member(model, key) + weight_of_member(model, value))
        }
        ShapeKind::Union { variants } => variants
            .iter()
            .map(|v| weight_of_member(model, v))
            .fold(f64::MIN, f64::max)
            .max(0.0),
        ShapeKind::Structure { .. } => 10.0,
    }
}

/// A member weighs whatever its target weighs.
pub fn weight_of_member(model: &Model, member: &Member) -> f64 {
    match model.get(&member.target) {
        Some(target) => weight_of(model, target),
        None => 10.0,
    }
}

fn weigh_string(shape: &Shape) -> f64 {
    match shape.traits.length.as_ref() {
        None => STRING_BASE_WEIGHT,
        Some(len) => {
            STRING_BASE_WEIGHT * (bounded_length_range(Some(len), 0.0) / STRING_RANGE_SCALE)
        }
    }
}

/// The declared (max − min) clamped into [1, 32]; `fallback` when no trait.
fn bounded_length_range(length: Option<&LengthBounds>, fallback: f64) -> f64 {
    match length {
        None => fallback,
        Some(len) => {
            let min = len.min.unwrap_or(0);
            let max = len.max.unwrap_or(u32::MAX as u64);
            (max.saturating_sub(min) as f64).clamp(1.0, 32.0)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::model::{Member, Model, Shape, ShapeId, ShapeKind, TraitSet};

    fn prelude_weight(name: &str) -> f64 {
        let model = Model::with_prelude();
        let shape = model.get(&ShapeId::prelude(name)).unwrap();
        weight_of(&model, shape)
    }

    #[test]
    fn scalar_weights_are_ordered() {
        assert!(prelude_weight("Boolean") < prelude_weight("Integer"));
        assert!(prelude_weight("Integer") < prelude_weight("Long"));
        assert!(prelude_weight("Long") < prelude_weight("BigDecimal"));
        assert!(prelude_weight("BigDecimal") < prelude_weight("Document"));
        assert!(prelude_weight("Document") < prelude_weight("Blob"));
    }

    #[test]
    fn list_weight_scales_with_element_weight() {
        let of_bools = Shape::new(
            ShapeId::new("example#Bools"),
            ShapeKind::List {
                member: Box::new(Member::new("member", ShapeId::prelude("Boolean"))),
            },
        );
        let of_blobs = Shape::new(
            ShapeId::new("example#Blobs"),
            ShapeKind::List {
                member: Box::new(Member::new("member", ShapeId::prelude("Blob"))),
            },
        );
        let model = Model::from_shapes([of_bools, of_blobs]);
        let light = weight_of(&model, model.get(&"example#Bools".into()).unwrap());
        let heavy = weight_of(&model, model.get(&"example#Blobs".into()).unwrap());
        assert!(light < heavy);
    }

    #[test]
    fn constrained_string_is_cheaper_than_unconstrained() {
        let mut short = Shape::new(ShapeId::new("example#Code"), ShapeKind::String);
        short.traits = TraitSet {
            length: Some(crate::model::LengthBounds::new(Some(2), Some(4))),
            ..TraitSet::default()
        };
        let model = Model::from_shapes([short]);
        let constrained = weight_of(&model, model.get(&"example#Code".into()).unwrap());
        assert!(constrained < prelude_weight("String"));
    }

    #[test]
    fn union_weighs_its_heaviest_variant() {
        let union = Shape::new(
            ShapeId::new("example#Either"),
            ShapeKind::Union {
                variants: vec![
                    Member::new("flag", ShapeId::prelude("Boolean")),
                    Member::new("raw", ShapeId::prelude("Blob")),
                ],
            },
        );
        let model = Model::from_shapes([union]);
        let w = weight_of(&model, model.get(&"example#Either".into()).unwrap());
        assert_eq!(w, 256.0);
    }

    #[test]
    fn length_range_clamps_to_32() {
        let len = crate::model::LengthBounds::new(Some(0), Some(4096));
        assert_eq!(bounded_length_range(Some(&len), 16.0), 32.0);
        assert_eq!(bounded_length_range(None, 16.0), 16.0);
        let degenerate = crate::model::LengthBounds::new(Some(5), Some(5));
        assert_eq!(bounded_length_range(Some(&degenerate), 16.0), 1.0);
    }
}

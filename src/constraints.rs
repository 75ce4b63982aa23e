//! Constraint compatibility checking.
//!
//! Runs once per structure, before any emission, and fails fast: the first
//! violation aborts generation of that structure. Violations are structural
//! model errors — the schema itself is wrong — so they are never retried.

use serde_json::Number;

use crate::errors::StructuralError;
use crate::member::NumberKind;
use crate::model::{
    number_as_i128, LengthBounds, Member, Model, RangeBounds, Shape, ShapeId, ShapeKind,
};

pub struct ConstraintChecker<'m> {
    model: &'m Model,
}

impl<'m> ConstraintChecker<'m> {
    pub fn new(model: &'m Model) -> Self {
        ConstraintChecker { model }
    }

    /// Validate every member of a structure against its target shape, plus
    /// the target shapes' own declared bounds.
    pub fn check_structure(&self, structure: &Shape) -> Result<(), StructuralError> {
        let members = match &structure.kind {
            ShapeKind::Structure { members } => members,
            _ => return Ok(()),
        };
        for member in members {
            self.check_member(structure, member)?;
        }
        if let Some(span) = &structure.traits.span {
            for named in [&span.lesser, &span.greater] {
                if !members.iter().any(|m| &m.name == named) {
                    return Err(StructuralError::UnknownSpanMember {
                        shape: structure.id.clone(),
                        member: named.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate a shape's own declared bounds without reference to a member.
    pub fn check_shape(&self, shape: &Shape) -> Result<(), StructuralError> {
        let location = shape.id.to_string();
        if let Some(length) = &shape.traits.length {
            check_length_sane(&location, length)?;
        }
        if let Some(range) = &shape.traits.range {
            check_range_sane(&location, range)?;
            if let Some(kind) = NumberKind::for_kind(&shape.kind) {
                check_range_in_domain(&location, kind, range)?;
            }
        }
        if let Some(pattern) = &shape.traits.pattern {
            check_pattern(&location, pattern)?;
        }
        let empty = match &shape.kind {
            ShapeKind::Union { variants } => variants.is_empty(),
            ShapeKind::Enum { constants } => constants.is_empty(),
            ShapeKind::IntEnum { constants } => constants.is_empty(),
            _ => false,
        };
        if empty {
            return Err(StructuralError::EmptyVariantSet {
                shape: shape.id.clone(),
            });
        }
        self.check_enum_cardinality(shape)?;
        Ok(())
    }

    fn check_member(&self, structure: &Shape, member: &Member) -> Result<(), StructuralError> {
        let member_id = format!("{}${}", structure.id, member.name);
        let target = self.model.expect_shape(&member.name, &member.target)?;

        self.check_shape(target)?;
        if let Some(length) = &member.traits.length {
            check_length_sane(&member_id, length)?;
        }
        if let Some(range) = &member.traits.range {
            check_range_sane(&member_id, range)?;
            if let Some(kind) = NumberKind::for_kind(&target.kind) {
                check_range_in_domain(&member_id, kind, range)?;
            }
        }
        if let Some(pattern) = &member.traits.pattern {
            check_pattern(&member_id, pattern)?;
        }

        if let (Some(member_len), Some(target_len)) =
            (&member.traits.length, &target.traits.length)
        {
            check_length_subset(&member_id, &target.id, member_len, target_len)?;
        }
        if let (Some(member_range), Some(target_range)) =
            (&member.traits.range, &target.traits.range)
        {
            check_range_subset(&member_id, &target.id, member_range, target_range)?;
        }
        Ok(())
    }

    /// A set (or map) of an enumerated type with a length minimum above the
    /// number of declared constants can never be instantiated.
    fn check_enum_cardinality(&self, shape: &Shape) -> Result<(), StructuralError> {
        let (element, min) = match (&shape.kind, &shape.traits.length) {
            (ShapeKind::List { member }, Some(len)) if shape.is_set() => {
                (member, len.min.unwrap_or(0))
            }
            (ShapeKind::Map { key, .. }, Some(len)) => (key, len.min.unwrap_or(0)),
            _ => return Ok(()),
        };
        let target = self.model.expect_shape(&element.name, &element.target)?;
        let count = match &target.kind {
            ShapeKind::Enum { constants } => constants.len(),
            ShapeKind::IntEnum { constants } => constants.len(),
            _ => return Ok(()),
        };
        if min > count as u64 {
            return Err(StructuralError::UnsatisfiableEnumLength {
                shape: shape.id.clone(),
                target: target.id.clone(),
                min,
                count,
            });
        }
        Ok(())
    }
}

fn check_length_sane(location: &str, length: &LengthBounds) -> Result<(), StructuralError> {
    if let (Some(min), Some(max)) = (length.min, length.max) {
        if min > max {
            return Err(StructuralError::InvertedBounds {
                location: location.to_string(),
                trait_name: "length",
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }
    Ok(())
}

fn check_range_sane(location: &str, range: &RangeBounds) -> Result<(), StructuralError> {
    if let (Some(min), Some(max)) = (range.min_f64(), range.max_f64()) {
        if min > max {
            return Err(StructuralError::InvertedBounds {
                location: location.to_string(),
                trait_name: "range",
                min: fmt_bound(range.min.as_ref()),
                max: fmt_bound(range.max.as_ref()),
            });
        }
    }
    Ok(())
}

/// A declared numeric range must lie within the representable domain of the
/// concrete scalar kind the trait is attached to.
fn check_range_in_domain(
    location: &str,
    kind: NumberKind,
    range: &RangeBounds,
) -> Result<(), StructuralError> {
    if let Some((lo, hi)) = kind.integer_domain() {
        for bound in [range.min.as_ref(), range.max.as_ref()].into_iter().flatten() {
            let v = number_as_i128(bound).unwrap_or(0);
            if v < lo || v > hi {
                return Err(out_of_domain(location, kind, bound, lo.to_string(), hi.to_string()));
            }
        }
    } else if let Some((lo, hi)) = kind.float_domain() {
        for bound in [range.min.as_ref(), range.max.as_ref()].into_iter().flatten() {
            let v = bound.as_f64().unwrap_or(0.0);
            if v < lo || v > hi {
                return Err(out_of_domain(location, kind, bound, lo.to_string(), hi.to_string()));
            }
        }
    }
    Ok(())
}

fn out_of_domain(
    location: &str,
    kind: NumberKind,
    bound: &Number,
    kind_min: String,
    kind_max: String,
) -> StructuralError {
    StructuralError::OutOfDomain {
        location: location.to_string(),
        kind: kind.rust_name(),
        bound: bound.to_string(),
        kind_min,
        kind_max,
    }
}

/// Member bounds may only narrow type bounds: memberMin ≥ typeMin and
/// memberMax ≤ typeMax, and the member maximum must not fall below the
/// type minimum (provably unsatisfiable).
fn check_length_subset(
    member_id: &str,
    target: &ShapeId,
    member_len: &LengthBounds,
    target_len: &LengthBounds,
) -> Result<(), StructuralError> {
    let (m_min, m_max) = (member_len.min.unwrap_or(0), member_len.max.unwrap_or(u64::MAX));
    let (t_min, t_max) = (target_len.min.unwrap_or(0), target_len.max.unwrap_or(u64::MAX));
    if m_max < t_min {
        return Err(StructuralError::UnsatisfiableBounds {
            member: member_id.to_string(),
            target: target.clone(),
            trait_name: "length",
            member_max: m_max.to_string(),
            target_min: t_min.to_string(),
        });
    }
    if m_min < t_min || m_max > t_max {
        return Err(StructuralError::IncompatibleBounds {
            member: member_id.to_string(),
            target: target.clone(),
            trait_name: "length",
            member_bounds: fmt_length(member_len),
            target_bounds: fmt_length(target_len),
        });
    }
    Ok(())
}

fn check_range_subset(
    member_id: &str,
    target: &ShapeId,
    member_range: &RangeBounds,
    target_range: &RangeBounds,
) -> Result<(), StructuralError> {
    let m_min = member_range.min_f64().unwrap_or(f64::NEG_INFINITY);
    let m_max = member_range.max_f64().unwrap_or(f64::INFINITY);
    let t_min = target_range.min_f64().unwrap_or(f64::NEG_INFINITY);
    let t_max = target_range.max_f64().unwrap_or(f64::INFINITY);
    if m_max < t_min {
        return Err(StructuralError::UnsatisfiableBounds {
            member: member_id.to_string(),
            target: target.clone(),
            trait_name: "range",
            member_max: fmt_bound(member_range.max.as_ref()),
            target_min: fmt_bound(target_range.min.as_ref()),
        });
    }
    if m_min < t_min || m_max > t_max {
        return Err(StructuralError::IncompatibleBounds {
            member: member_id.to_string(),
            target: target.clone(),
            trait_name: "range",
            member_bounds: fmt_range(member_range),
            target_bounds: fmt_range(target_range),
        });
    }
    Ok(())
}

fn check_pattern(location: &str, pattern: &str) -> Result<(), StructuralError> {
    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| StructuralError::MalformedPattern {
            location: location.to_string(),
            detail: e.to_string(),
        })
}

fn fmt_bound(n: Option<&Number>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| "*".to_string())
}

fn fmt_range(r: &RangeBounds) -> String {
    format!("{}..={}", fmt_bound(r.min.as_ref()), fmt_bound(r.max.as_ref()))
}

fn fmt_length(l: &LengthBounds) -> String {
    let min = l.min.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string());
    let max = l.max.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string());
    format!("{min}..={max}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::model::{
        EnumConstant, LengthBounds, Member, Model, RangeBounds, Shape, ShapeId, ShapeKind,
        TraitSet,
    };

    fn int_shape(id: &str, min: Option<i64>, max: Option<i64>) -> Shape {
        let mut shape = Shape::new(ShapeId::new(id), ShapeKind::Integer);
        shape.traits.range = Some(RangeBounds::new(min, max));
        shape
    }

    fn structure_with(member: Member) -> Shape {
        Shape::new(
            ShapeId::new("example#Holder"),
            ShapeKind::Structure {
                members: vec![member],
            },
        )
    }

    #[test]
    fn accepts_narrowing_member_bounds() {
        let model = Model::from_shapes([int_shape("example#Age", Some(0), Some(150))]);
        let mut member = Member::new("age", ShapeId::new("example#Age"));
        member.traits.range = Some(RangeBounds::new(Some(18), Some(99)));
        let holder = structure_with(member);
        assert!(ConstraintChecker::new(&model).check_structure(&holder).is_ok());
    }

    #[test]
    fn rejects_member_min_below_type_min() {
        let model = Model::from_shapes([int_shape("example#Age", Some(10), Some(150))]);
        let mut member = Member::new("age", ShapeId::new("example#Age"));
        member.traits.range = Some(RangeBounds::new(Some(5), Some(99)));
        let holder = structure_with(member);
        let err = ConstraintChecker::new(&model)
            .check_structure(&holder)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("example#Holder$age"), "message was: {msg}");
        assert!(msg.contains("example#Age"), "message was: {msg}");
    }

    #[test]
    fn rejects_member_max_below_type_min() {
        let model = Model::from_shapes([int_shape("example#Age", Some(10), Some(150))]);
        let mut member = Member::new("age", ShapeId::new("example#Age"));
        member.traits.range = Some(RangeBounds::new(None, Some(5)));
        let holder = structure_with(member);
        let err = ConstraintChecker::new(&model)
            .check_structure(&holder)
            .unwrap_err();
        assert!(matches!(err, StructuralError::UnsatisfiableBounds { .. }));
    }

    #[test]
    fn rejects_inverted_length_with_both_values() {
        let mut shape = Shape::new(ShapeId::new("example#Name"), ShapeKind::String);
        shape.traits.length = Some(LengthBounds::new(Some(5), Some(4)));
        let model = Model::from_shapes([shape]);
        let shape = model.get(&"example#Name".into()).unwrap();
        let err = ConstraintChecker::new(&model).check_shape(shape).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains('5') && msg.contains('4') && msg.contains("example#Name"));
    }

    #[test]
    fn rejects_range_outside_byte_domain() {
        let mut shape = Shape::new(ShapeId::new("example#Tiny"), ShapeKind::Byte);
        shape.traits.range = Some(RangeBounds::new(Some(-300), Some(10)));
        let model = Model::from_shapes([shape]);
        let shape = model.get(&"example#Tiny".into()).unwrap();
        let err = ConstraintChecker::new(&model).check_shape(shape).unwrap_err();
        assert!(matches!(err, StructuralError::OutOfDomain { kind: "i8", .. }));
    }

    #[test]
    fn rejects_set_of_enum_smaller_than_length_min() {
        let status = Shape::new(
            ShapeId::new("example#Status"),
            ShapeKind::Enum {
                constants: vec![
                    EnumConstant {
                        name: "ACTIVE".to_string(),
                        value: "active".to_string(),
                    },
                    EnumConstant {
                        name: "RETIRED".to_string(),
                        value: "retired".to_string(),
                    },
                ],
            },
        );
        let mut set = Shape::new(
            ShapeId::new("example#Statuses"),
            ShapeKind::List {
                member: Box::new(Member::new("member", ShapeId::new("example#Status"))),
            },
        );
        set.traits = TraitSet {
            unique_items: true,
            length: Some(LengthBounds::new(Some(3), None)),
            ..TraitSet::default()
        };
        let model = Model::from_shapes([status, set]);
        let set = model.get(&"example#Statuses".into()).unwrap();
        let err = ConstraintChecker::new(&model).check_shape(set).unwrap_err();
        assert!(matches!(
            err,
            StructuralError::UnsatisfiableEnumLength { min: 3, count: 2, .. }
        ));
    }

    #[test]
    fn rejects_span_naming_unknown_member() {
        let model = Model::with_prelude();
        let mut holder = structure_with(Member::new("start", ShapeId::prelude("Integer")));
        holder.traits.span = Some(crate::model::SpanTrait {
            lesser: "start".to_string(),
            greater: "finish".to_string(),
        });
        let err = ConstraintChecker::new(&model)
            .check_structure(&holder)
            .unwrap_err();
        assert!(matches!(err, StructuralError::UnknownSpanMember { .. }));
    }
}

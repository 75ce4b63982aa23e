use serde_json::Number;

use super::naming::Namer;
use crate::errors::StructuralError;
use crate::model::{Member, Model, Shape, ShapeKind};

/// The concrete numeric kinds that can carry a `range` trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
}

impl NumberKind {
    pub fn for_kind(kind: &ShapeKind) -> Option<NumberKind> {
        match kind {
            ShapeKind::Byte => Some(NumberKind::Byte),
            ShapeKind::Short => Some(NumberKind::Short),
            ShapeKind::Integer => Some(NumberKind::Integer),
            ShapeKind::Long => Some(NumberKind::Long),
            ShapeKind::Float => Some(NumberKind::Float),
            ShapeKind::Double => Some(NumberKind::Double),
            _ => None,
        }
    }

    pub fn rust_name(self) -> &'static str {
        match self {
            NumberKind::Byte => "i8",
            NumberKind::Short => "i16",
            NumberKind::Integer => "i32",
            NumberKind::Long => "i64",
            NumberKind::Float => "f32",
            NumberKind::Double => "f64",
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, NumberKind::Float | NumberKind::Double)
    }

    /// The representable domain for the integer kinds. Float kinds have no
    /// useful exact integral domain and return `None`.
    pub fn integer_domain(self) -> Option<(i128, i128)> {
        match self {
            NumberKind::Byte => Some((i8::MIN as i128, i8::MAX as i128)),
            NumberKind::Short => Some((i16::MIN as i128, i16::MAX as i128)),
            NumberKind::Integer => Some((i32::MIN as i128, i32::MAX as i128)),
            NumberKind::Long => Some((i64::MIN as i128, i64::MAX as i128)),
            NumberKind::Float | NumberKind::Double => None,
        }
    }

    pub fn float_domain(self) -> Option<(f64, f64)> {
        match self {
            NumberKind::Float => Some((f32::MIN as f64, f32::MAX as f64)),
            NumberKind::Double => Some((f64::MIN, f64::MAX)),
            _ => None,
        }
    }

    /// Render a bound as a suffixed Rust literal of this kind.
    pub fn format_literal(self, n: &Number) -> String {
        if self.is_floating_point() {
            let v = n.as_f64().unwrap_or(0.0);
            let body = if v.fract() == 0.0 && v.abs() < 1e15 {
                format!("{v:.1}")
            } else {
                format!("{v}")
            };
            format!("{}{}", body, self.rust_name())
        } else {
            let v = crate::model::number_as_i128(n).unwrap_or(0);
            format!("{}{}", v, self.rust_name())
        }
    }

    /// The convenience ("widened") input kind accepted by secondary
    /// constructors, where one exists.
    pub fn widened(self) -> Option<NumberKind> {
        match self {
            NumberKind::Byte | NumberKind::Short => Some(NumberKind::Integer),
            NumberKind::Float => Some(NumberKind::Double),
            _ => None,
        }
    }
}

/// A member's resolved representation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RustType {
    /// Qualified type name as it appears in generated code, e.g. `i32`,
    /// `Vec<String>`, `bigdecimal::BigDecimal`, `Pet`.
    pub qualified: String,
    /// Whether the kind has an unboxed primitive form at all.
    pub primitive_capable: bool,
    /// Whether this usage wraps the type in `Option` (neither required nor
    /// defaulted).
    pub nullable: bool,
}

impl RustType {
    /// The type as declared on a field: `Option<T>` when nullable.
    pub fn field_type(&self) -> String {
        if self.nullable {
            format!("Option<{}>", self.qualified)
        } else {
            self.qualified.clone()
        }
    }
}

/// Resolve a shape (plus an optional member usage) to its representation.
///
/// A member may use an unboxed representation only when it is guaranteed
/// non-null — required or defaulted — and its kind supports a primitive form.
/// Big-integer and big-decimal are never primitive-capable.
pub fn resolve(
    model: &Model,
    namer: &dyn Namer,
    shape: &Shape,
    member: Option<&Member>,
) -> Result<RustType, StructuralError> {
    let qualified = base_type_name(model, namer, shape)?;
    let primitive_capable = matches!(
        shape.kind,
        ShapeKind::Boolean
            | ShapeKind::Byte
            | ShapeKind::Short
            | ShapeKind::Integer
            | ShapeKind::Long
            | ShapeKind::Float
            | ShapeKind::Double
    );
    let guaranteed_present = member
        .map(|m| m.traits.required || m.traits.default.is_some() || shape.traits.default.is_some())
        .unwrap_or(true);
    Ok(RustType {
        qualified,
        primitive_capable,
        nullable: !guaranteed_present,
    })
}

/// The unqualified-of-Option Rust type for a shape, recursing into
/// collection element types.
pub fn base_type_name(
    model: &Model,
    namer: &dyn Namer,
    shape: &Shape,
) -> Result<String, StructuralError> {
    let name = match &shape.kind {
        ShapeKind::Boolean => "bool".to_string(),
        ShapeKind::Byte => "i8".to_string(),
        ShapeKind::Short => "i16".to_string(),
        ShapeKind::Integer => "i32".to_string(),
        ShapeKind::Long => "i64".to_string(),
        ShapeKind::Float => "f32".to_string(),
        ShapeKind::Double => "f64".to_string(),
        ShapeKind::BigInteger => "num_bigint::BigInt".to_string(),
        ShapeKind::BigDecimal => "bigdecimal::BigDecimal".to_string(),
        ShapeKind::String => "String".to_string(),
        ShapeKind::Timestamp => "time::OffsetDateTime".to_string(),
        ShapeKind::Blob => "Vec<u8>".to_string(),
        ShapeKind::Document => "serde_json::Value".to_string(),
        ShapeKind::List { member } => {
            let target = model.expect_shape(&member.name, &member.target)?;
            let element = base_type_name(model, namer, target)?;
            if shape.is_set() {
                format!("std::collections::BTreeSet<{element}>")
            } else {
                format!("Vec<{element}>")
            }
        }
        ShapeKind::Map { key, value } => {
            let key_shape = model.expect_shape(&key.name, &key.target)?;
            let value_shape = model.expect_shape(&value.name, &value.target)?;
            format!(
                "std::collections::BTreeMap<{}, {}>",
                base_type_name(model, namer, key_shape)?,
                base_type_name(model, namer, value_shape)?
            )
        }
        ShapeKind::Structure { .. }
        | ShapeKind::Union { .. }
        | ShapeKind::Enum { .. }
        | ShapeKind::IntEnum { .. } => namer.type_name(&shape.id),
    };
    Ok(name)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::member::naming::DefaultNamer;
    use crate::model::{Member, Shape, ShapeId, ShapeKind, TraitSet};

    fn model_with(shape: Shape) -> Model {
        Model::from_shapes([shape])
    }

    #[test]
    fn required_integer_is_unboxed() {
        let model = Model::with_prelude();
        let shape = model.get(&ShapeId::prelude("Integer")).unwrap();
        let mut member = Member::new("age", shape.id.clone());
        member.traits = TraitSet::required();
        let ty = resolve(&model, &DefaultNamer, shape, Some(&member)).unwrap();
        assert_eq!(ty.qualified, "i32");
        assert!(ty.primitive_capable);
        assert!(!ty.nullable);
        assert_eq!(ty.field_type(), "i32");
    }

    #[test]
    fn optional_integer_is_boxed() {
        let model = Model::with_prelude();
        let shape = model.get(&ShapeId::prelude("Integer")).unwrap();
        let member = Member::new("age", shape.id.clone());
        let ty = resolve(&model, &DefaultNamer, shape, Some(&member)).unwrap();
        assert!(ty.nullable);
        assert_eq!(ty.field_type(), "Option<i32>");
    }

    #[test]
    fn big_decimal_is_never_primitive() {
        let model = Model::with_prelude();
        let shape = model.get(&ShapeId::prelude("BigDecimal")).unwrap();
        let mut member = Member::new("price", shape.id.clone());
        member.traits = TraitSet::required();
        let ty = resolve(&model, &DefaultNamer, shape, Some(&member)).unwrap();
        assert!(!ty.primitive_capable);
        assert_eq!(ty.qualified, "bigdecimal::BigDecimal");
    }

    #[test]
    fn unique_list_resolves_to_btree_set() {
        let mut shape = Shape::new(
            ShapeId::new("example#Tags"),
            ShapeKind::List {
                member: Box::new(Member::new("member", ShapeId::prelude("String"))),
            },
        );
        shape.traits.unique_items = true;
        let model = model_with(shape);
        let shape = model.get(&"example#Tags".into()).unwrap();
        let name = base_type_name(&model, &DefaultNamer, shape).unwrap();
        assert_eq!(name, "std::collections::BTreeSet<String>");
    }

    #[test]
    fn widening_targets() {
        assert_eq!(NumberKind::Byte.widened(), Some(NumberKind::Integer));
        assert_eq!(NumberKind::Short.widened(), Some(NumberKind::Integer));
        assert_eq!(NumberKind::Float.widened(), Some(NumberKind::Double));
        assert_eq!(NumberKind::Long.widened(), None);
        assert_eq!(NumberKind::Double.widened(), None);
    }
}

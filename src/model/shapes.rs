use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::traits::TraitSet;
use crate::errors::StructuralError;

/// Identity of a shape: `namespace#Name`, e.g. `example.pets#Pet`.
///
/// Shapes in the `shapegen.api` namespace are the built-in prelude scalars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

/// Namespace of the built-in prelude shapes.
pub const PRELUDE_NAMESPACE: &str = "shapegen.api";

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        ShapeId(id.into())
    }

    pub fn prelude(name: &str) -> Self {
        ShapeId(format!("{PRELUDE_NAMESPACE}#{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after `#`, or the whole id when no namespace is present.
    pub fn name(&self) -> &str {
        match self.0.split_once('#') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    pub fn namespace(&self) -> &str {
        match self.0.split_once('#') {
            Some((ns, _)) => ns,
            None => "",
        }
    }

    pub fn is_prelude(&self) -> bool {
        self.namespace() == PRELUDE_NAMESPACE
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(s: &str) -> Self {
        ShapeId(s.to_string())
    }
}

/// A named constant of an enum shape.
///
/// `name` is the declared constant name; `value` is the wire value. Default
/// traits store the *value*, so lookups against this table must search by
/// value, not name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntEnumConstant {
    pub name: String,
    pub value: i32,
}

/// A named, typed slot within a structure, union, list or map shape,
/// referencing its target shape by id. Traits on the member override traits
/// on the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub target: ShapeId,
    #[serde(default, skip_serializing_if = "TraitSet::is_empty")]
    pub traits: TraitSet,
}

impl Member {
    pub fn new(name: impl Into<String>, target: ShapeId) -> Self {
        Member {
            name: name.into(),
            target,
            traits: TraitSet::default(),
        }
    }
}

/// The closed set of shape kinds.
///
/// Every dispatch over this enum (type resolution, weighting, default
/// resolution, random synthesis) matches exhaustively, so adding a kind
/// without updating all four sites is a compile-time error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    String,
    Timestamp,
    Blob,
    Document,
    /// A list; carries the `uniqueItems` trait when it models a set.
    List { member: Box<Member> },
    Map {
        key: Box<Member>,
        value: Box<Member>,
    },
    Structure { members: Vec<Member> },
    Union { variants: Vec<Member> },
    Enum { constants: Vec<EnumConstant> },
    IntEnum { constants: Vec<IntEnumConstant> },
}

impl ShapeKind {
    /// Stable lowercase label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Boolean => "boolean",
            ShapeKind::Byte => "byte",
            ShapeKind::Short => "short",
            ShapeKind::Integer => "integer",
            ShapeKind::Long => "long",
            ShapeKind::Float => "float",
            ShapeKind::Double => "double",
            ShapeKind::BigInteger => "bigInteger",
            ShapeKind::BigDecimal => "bigDecimal",
            ShapeKind::String => "string",
            ShapeKind::Timestamp => "timestamp",
            ShapeKind::Blob => "blob",
            ShapeKind::Document => "document",
            ShapeKind::List { .. } => "list",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Structure { .. } => "structure",
            ShapeKind::Union { .. } => "union",
            ShapeKind::Enum { .. } => "enum",
            ShapeKind::IntEnum { .. } => "intEnum",
        }
    }
}

/// A schema-model node: identity, kind, and attached traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    #[serde(flatten)]
    pub kind: ShapeKind,
    #[serde(default, skip_serializing_if = "TraitSet::is_empty")]
    pub traits: TraitSet,
}

impl Shape {
    pub fn new(id: ShapeId, kind: ShapeKind) -> Self {
        Shape {
            id,
            kind,
            traits: TraitSet::default(),
        }
    }

    pub fn with_traits(id: ShapeId, kind: ShapeKind, traits: TraitSet) -> Self {
        Shape { id, kind, traits }
    }

    /// A list shape carrying `uniqueItems` (on itself) models a set.
    pub fn is_set(&self) -> bool {
        matches!(self.kind, ShapeKind::List { .. }) && self.traits.unique_items
    }
}

/// Read-only shape graph. Loaded once per generation run, immutable after.
#[derive(Debug, Clone, Default)]
pub struct Model {
    shapes: BTreeMap<ShapeId, Shape>,
}

impl Model {
    /// An empty model pre-seeded with the prelude scalar shapes.
    pub fn with_prelude() -> Self {
        let mut model = Model::default();
        for (name, kind) in [
            ("Boolean", ShapeKind::Boolean),
            ("Byte", ShapeKind::Byte),
            ("Short", ShapeKind::Short),
            ("Integer", ShapeKind::Integer),
            ("Long", ShapeKind::Long),
            ("Float", ShapeKind::Float),
            ("Double", ShapeKind::Double),
            ("BigInteger", ShapeKind::BigInteger),
            ("BigDecimal", ShapeKind::BigDecimal),
            ("String", ShapeKind::String),
            ("Timestamp", ShapeKind::Timestamp),
            ("Blob", ShapeKind::Blob),
            ("Document", ShapeKind::Document),
        ] {
            model.insert(Shape::new(ShapeId::prelude(name), kind));
        }
        model
    }

    pub fn from_shapes(shapes: impl IntoIterator<Item = Shape>) -> Self {
        let mut model = Model::with_prelude();
        for shape in shapes {
            model.insert(shape);
        }
        model
    }

    pub(crate) fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.id.clone(), shape);
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Look up a shape that a member must reference.
    pub fn expect_shape(&self, member_name: &str, id: &ShapeId) -> Result<&Shape, StructuralError> {
        self.get(id).ok_or_else(|| StructuralError::UnknownShape {
            member: member_name.to_string(),
            target: id.clone(),
        })
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    /// All non-prelude structure shapes, in id order.
    pub fn structures(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .values()
            .filter(|s| matches!(s.kind, ShapeKind::Structure { .. }))
    }

    /// All non-prelude shapes that generate a standalone type definition.
    pub fn named_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values().filter(|s| {
            !s.id.is_prelude()
                && matches!(
                    s.kind,
                    ShapeKind::Structure { .. }
                        | ShapeKind::Union { .. }
                        | ShapeKind::Enum { .. }
                        | ShapeKind::IntEnum { .. }
                )
        })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

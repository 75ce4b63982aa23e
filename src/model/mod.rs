//! The shape graph: shapes, traits, members, and model loading.
//!
//! A model is a read-only graph of [`Shape`]s, each with a [`ShapeKind`] and a
//! [`TraitSet`]. Structure shapes own [`Member`]s that reference other shapes
//! by [`ShapeId`]; traits on a member override the same trait on its target.
//! Models load once per generation run and are immutable afterwards.

mod load;
mod shapes;
mod traits;

pub use load::load_model;
pub use shapes::{
    EnumConstant, IntEnumConstant, Member, Model, Shape, ShapeId, ShapeKind, PRELUDE_NAMESPACE,
};
pub use traits::{HttpBinding, LengthBounds, RangeBounds, Samples, SpanTrait, TraitSet};

pub(crate) use traits::number_as_i128;

/// The one trait-resolution priority chain: a member-level trait overrides
/// the same trait on the member's target shape. Every lookup in the crate
/// funnels through here.
pub fn resolve_trait<'a, T: ?Sized>(
    member: Option<&'a Member>,
    target: &'a Shape,
    pick: impl Fn(&'a TraitSet) -> Option<&'a T>,
) -> Option<&'a T> {
    member
        .and_then(|m| pick(&m.traits))
        .or_else(|| pick(&target.traits))
}

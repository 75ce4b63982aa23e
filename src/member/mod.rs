//! The per-run structure member model.
//!
//! [`StructureMember`] wraps one member of a structure together with its
//! resolved target shape and everything generation needs to know about it:
//! names from the [`Namer`], required/default flags, representation policy,
//! and comparison-cost weight. Instances are built lazily per structure and
//! cached in the run context; they are never shared across runs.

pub mod naming;
pub mod resolve;
pub mod weight;

pub use naming::{DefaultNamer, Namer};
pub use resolve::{NumberKind, RustType};

use serde_json::Value;

use crate::errors::StructuralError;
use crate::model::{HttpBinding, LengthBounds, Member, Model, RangeBounds, Samples, Shape};

/// One member of a structure, resolved for a generation run.
#[derive(Debug, Clone)]
pub struct StructureMember<'m> {
    member: &'m Member,
    target: &'m Shape,
    field: String,
    getter: String,
    arg: String,
    json: String,
    required: bool,
    has_default: bool,
    rust: RustType,
    weight: f64,
}

impl<'m> StructureMember<'m> {
    pub fn build(
        model: &'m Model,
        namer: &dyn Namer,
        member: &'m Member,
    ) -> Result<Self, StructuralError> {
        let target = model.expect_shape(&member.name, &member.target)?;
        let rust = resolve::resolve(model, namer, target, Some(member))?;
        Ok(StructureMember {
            field: namer.field_name(member),
            getter: namer.getter_name(member),
            arg: namer.ctor_arg_name(member),
            json: namer.json_name(member),
            required: member.traits.required,
            has_default: member.traits.default.is_some() || target.traits.default.is_some(),
            weight: weight::weight_of(model, target),
            member,
            target,
            rust,
        })
    }

    pub fn member(&self) -> &'m Member {
        self.member
    }

    pub fn target(&self) -> &'m Shape {
        self.target
    }

    pub fn name(&self) -> &str {
        &self.member.name
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn getter(&self) -> &str {
        &self.getter
    }

    pub fn arg(&self) -> &str {
        &self.arg
    }

    pub fn json_name(&self) -> &str {
        &self.json
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// Guaranteed non-null, so an unboxed representation is allowed.
    pub fn is_guaranteed_present(&self) -> bool {
        self.required || self.has_default
    }

    pub fn is_primitive(&self) -> bool {
        self.is_guaranteed_present() && self.rust.primitive_capable
    }

    pub fn rust_type(&self) -> &RustType {
        &self.rust
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn number_kind(&self) -> Option<NumberKind> {
        NumberKind::for_kind(&self.target.kind)
    }

    /// The widened convenience-constructor input kind, where the target kind
    /// has one (byte/short → int, float → double).
    pub fn convenience_kind(&self) -> Option<NumberKind> {
        self.number_kind().and_then(NumberKind::widened)
    }

    // Trait accessors delegate to `model::resolve_trait`, the one
    // member-overrides-target priority chain; callers never consult the raw
    // trait sets directly.

    pub fn range(&self) -> Option<&'m RangeBounds> {
        crate::model::resolve_trait(Some(self.member), self.target, |t| t.range.as_ref())
    }

    pub fn length(&self) -> Option<&'m LengthBounds> {
        crate::model::resolve_trait(Some(self.member), self.target, |t| t.length.as_ref())
    }

    pub fn pattern(&self) -> Option<&'m str> {
        crate::model::resolve_trait(Some(self.member), self.target, |t| t.pattern.as_deref())
    }

    pub fn samples(&self) -> Option<&'m Samples> {
        crate::model::resolve_trait(Some(self.member), self.target, |t| t.samples.as_ref())
    }

    pub fn default_value(&self) -> Option<&'m Value> {
        crate::model::resolve_trait(Some(self.member), self.target, |t| t.default.as_ref())
    }

    pub fn unique_items(&self) -> bool {
        self.member.traits.unique_items || self.target.traits.unique_items
    }

    pub fn deprecated(&self) -> bool {
        self.member.traits.deprecated || self.target.traits.deprecated
    }

    pub fn http_binding(&self) -> Option<&'m HttpBinding> {
        self.member.traits.http.as_ref()
    }

    /// Whether the constructor needs any check at all for this member.
    pub fn is_constrained(&self) -> bool {
        self.pattern().is_some() || self.length().is_some() || self.range().is_some()
    }
}

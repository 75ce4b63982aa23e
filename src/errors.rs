use thiserror::Error;

use crate::model::ShapeId;

/// Model-authoring errors detected before any code is emitted.
///
/// These denote an invalid schema, not a transient condition: generation of
/// the affected structure aborts on the first one and is never retried. Each
/// variant carries enough context to name both declaring locations involved
/// in the conflict.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("{trait_name} bounds on member {member} ({member_bounds}) are not contained in the bounds declared on {target} ({target_bounds})")]
    IncompatibleBounds {
        member: String,
        target: ShapeId,
        trait_name: &'static str,
        member_bounds: String,
        target_bounds: String,
    },

    #[error("{trait_name} maximum {member_max} on member {member} is below the minimum {target_min} declared on {target}; no value can satisfy both")]
    UnsatisfiableBounds {
        member: String,
        target: ShapeId,
        trait_name: &'static str,
        member_max: String,
        target_min: String,
    },

    #[error("{trait_name} minimum {min} exceeds maximum {max} on {location}")]
    InvertedBounds {
        location: String,
        trait_name: &'static str,
        min: String,
        max: String,
    },

    #[error("range bound {bound} on {location} lies outside the domain of {kind} ({kind_min}..={kind_max})")]
    OutOfDomain {
        location: String,
        kind: &'static str,
        bound: String,
        kind_min: String,
        kind_max: String,
    },

    #[error("{shape} is a set or map of the enumerated type {target}, but its length minimum {min} exceeds the {count} declared constants; a valid instance cannot be created")]
    UnsatisfiableEnumLength {
        shape: ShapeId,
        target: ShapeId,
        min: u64,
        count: usize,
    },

    #[error("member {member} declares a default, but its target {target} is a {kind} shape; defaults are not supported for this kind")]
    UnsupportedDefault {
        member: String,
        target: ShapeId,
        kind: &'static str,
    },

    #[error("default {value} on member {member} matches no declared value of enum {target}")]
    NoSuchEnumConstant {
        member: String,
        target: ShapeId,
        value: String,
    },

    #[error("default {value} on member {member} cannot be represented as {kind}")]
    MalformedDefault {
        member: String,
        kind: &'static str,
        value: String,
    },

    #[error("member {member} references unknown shape {target}")]
    UnknownShape { member: String, target: ShapeId },

    #[error("{shape} declares no variants or constants; a value of it cannot exist")]
    EmptyVariantSet { shape: ShapeId },

    #[error("span trait on {shape} names {member}, which is not a member of the structure")]
    UnknownSpanMember { shape: ShapeId, member: String },

    #[error("pattern on {location} is not a valid regular expression: {detail}")]
    MalformedPattern { location: String, detail: String },
}

//! Deterministic, constraint-respecting random value synthesis.
//!
//! A [`ValueSynthesizer`] is seeded per shape from a hash of the shape's
//! identity, so the same schema yields the same values run after run. The
//! synthesized [`SampleValue`]s feed generated test suites (rendered as Rust
//! literals) and negative-sample tests (via [`ValueSynthesizer::invalid_string`]).

pub mod xeger;

use std::cmp::Ordering;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::errors::StructuralError;
use crate::member::{Namer, NumberKind, StructureMember};
use crate::model::{resolve_trait, Member, Model, Shape, ShapeId, ShapeKind};

pub use xeger::{anchored, Confounded, Xeger};

/// Target-size draw for collections with no length trait: `3..8`, before
/// clamping into declared bounds. Independent of the weighting fallback by
/// design.
pub const COLLECTION_SIZE_RANGE: std::ops::Range<u64> = 3..8;

/// Ceiling for random string lengths when no length trait constrains them.
const DEFAULT_STRING_CEILING: u64 = 12;

/// Retry budget for confounding and for collection-key dedup redraws.
const CONFOUND_ATTEMPTS: usize = 10;

/// A synthesized value, held in memory until rendered as a Rust literal.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Decimal string form of the integer.
    BigInteger(String),
    BigDecimal(String),
    String(String),
    /// Seconds since the Unix epoch.
    Timestamp(i64),
    Blob(Vec<u8>),
    Document(serde_json::Value),
    List(Vec<SampleValue>),
    Set(Vec<SampleValue>),
    Map(Vec<(SampleValue, SampleValue)>),
    Structure {
        type_name: String,
        args: Vec<StructArg>,
    },
    Union {
        type_name: String,
        variant: String,
        value: Box<SampleValue>,
    },
    Enum {
        type_name: String,
        constant: String,
    },
    IntEnum {
        type_name: String,
        constant: String,
    },
}

/// One constructor argument of a synthesized structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StructArg {
    pub name: String,
    pub value: SampleValue,
    /// The constructor takes `Option<T>` for this argument, so the rendered
    /// literal wraps in `Some(..)`.
    pub boxed: bool,
}

impl SampleValue {
    /// Ordering between two values of the same kind, where one exists; used
    /// to enforce span invariants on synthesized structures.
    pub fn partial_cmp_value(&self, other: &SampleValue) -> Option<Ordering> {
        use SampleValue::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a.partial_cmp(b),
            (Byte(a), Byte(b)) => a.partial_cmp(b),
            (Short(a), Short(b)) => a.partial_cmp(b),
            (Integer(a), Integer(b)) => a.partial_cmp(b),
            (Long(a), Long(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (BigInteger(a), BigInteger(b)) => {
                match (a.parse::<i128>(), b.parse::<i128>()) {
                    (Ok(a), Ok(b)) => a.partial_cmp(&b),
                    _ => None,
                }
            }
            (BigDecimal(a), BigDecimal(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b),
                _ => None,
            },
            (String(a), String(b)) => a.partial_cmp(b),
            (Timestamp(a), Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// Render as a Rust expression, suitable for embedding in generated
    /// tests. Fallible parses use `unwrap()` because the literals were
    /// verified at generation time and the target context is a test.
    pub fn render(&self) -> std::string::String {
        match self {
            SampleValue::Boolean(v) => v.to_string(),
            SampleValue::Byte(v) => format!("{v}i8"),
            SampleValue::Short(v) => format!("{v}i16"),
            SampleValue::Integer(v) => format!("{v}i32"),
            SampleValue::Long(v) => format!("{v}i64"),
            SampleValue::Float(v) => format!("{v:?}f32"),
            SampleValue::Double(v) => format!("{v:?}f64"),
            SampleValue::BigInteger(v) => {
                format!("{:?}.parse::<num_bigint::BigInt>().unwrap()", v)
            }
            SampleValue::BigDecimal(v) => {
                format!("{:?}.parse::<bigdecimal::BigDecimal>().unwrap()", v)
            }
            SampleValue::String(v) => format!("{v:?}.to_string()"),
            SampleValue::Timestamp(secs) => {
                format!("time::OffsetDateTime::from_unix_timestamp({secs}).unwrap()")
            }
            SampleValue::Blob(bytes) => {
                let inner = bytes
                    .iter()
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("vec![{inner}]")
            }
            SampleValue::Document(value) => format!("serde_json::json!({value})"),
            SampleValue::List(items) => {
                let inner = items.iter().map(Self::render).collect::<Vec<_>>().join(", ");
                format!("vec![{inner}]")
            }
            SampleValue::Set(items) => {
                let inner = items.iter().map(Self::render).collect::<Vec<_>>().join(", ");
                format!("std::collections::BTreeSet::from([{inner}])")
            }
            SampleValue::Map(entries) => {
                let inner = entries
                    .iter()
                    .map(|(k, v)| format!("({}, {})", k.render(), v.render()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("std::collections::BTreeMap::from([{inner}])")
            }
            SampleValue::Structure { type_name, args } => {
                let rendered = args
                    .iter()
                    .map(|arg| {
                        if arg.boxed {
                            format!("Some({})", arg.value.render())
                        } else {
                            arg.value.render()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{type_name}::new({rendered}).unwrap()")
            }
            SampleValue::Union {
                type_name,
                variant,
                value,
            } => format!("{type_name}::{variant}({})", value.render()),
            SampleValue::Enum {
                type_name,
                constant,
            }
            | SampleValue::IntEnum {
                type_name,
                constant,
            } => format!("{type_name}::{constant}"),
        }
    }
}

/// Seed for a shape: the first eight bytes of the SHA-256 of its id.
pub fn seed_for(id: &ShapeId) -> u64 {
    let digest = Sha256::digest(id.as_str().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Constraint-respecting random value source, seeded per shape.
pub struct ValueSynthesizer<'m> {
    model: &'m Model,
    namer: &'m dyn Namer,
    rng: ChaCha8Rng,
}

impl<'m> ValueSynthesizer<'m> {
    pub fn for_shape(model: &'m Model, namer: &'m dyn Namer, id: &ShapeId) -> Self {
        ValueSynthesizer {
            model,
            namer,
            rng: ChaCha8Rng::seed_from_u64(seed_for(id)),
        }
    }

    /// Synthesize a value of `shape`, honoring shape-level traits.
    pub fn synthesize(&mut self, shape: &'m Shape) -> Result<SampleValue, StructuralError> {
        self.synthesize_for(shape, None)
    }

    /// Synthesize a value for a member usage of `shape`, honoring the
    /// member-overrides-target trait chain.
    pub fn synthesize_for(
        &mut self,
        shape: &'m Shape,
        member: Option<&'m Member>,
    ) -> Result<SampleValue, StructuralError> {
        let range = resolve_trait(member, shape, |t| t.range.as_ref());
        let length = resolve_trait(member, shape, |t| t.length.as_ref());
        let value = match &shape.kind {
            ShapeKind::Boolean => SampleValue::Boolean(self.rng.gen()),
            ShapeKind::Byte => {
                SampleValue::Byte(self.bounded_int(NumberKind::Byte, range) as i8)
            }
            ShapeKind::Short => {
                SampleValue::Short(self.bounded_int(NumberKind::Short, range) as i16)
            }
            ShapeKind::Integer => {
                SampleValue::Integer(self.bounded_int(NumberKind::Integer, range) as i32)
            }
            ShapeKind::Long => {
                SampleValue::Long(self.bounded_int(NumberKind::Long, range) as i64)
            }
            ShapeKind::Float => {
                SampleValue::Float(self.bounded_float(NumberKind::Float, range) as f32)
            }
            ShapeKind::Double => {
                SampleValue::Double(self.bounded_float(NumberKind::Double, range))
            }
            ShapeKind::BigInteger => {
                let v = self.bounded_int(NumberKind::Long, range);
                SampleValue::BigInteger(v.to_string())
            }
            ShapeKind::BigDecimal => {
                let v = self.bounded_float(NumberKind::Double, range);
                SampleValue::BigDecimal(format!("{v:.4}"))
            }
            ShapeKind::String => SampleValue::String(self.random_string(shape, member)),
            ShapeKind::Timestamp => {
                // Seconds in [0, 2^31): parses cleanly in every backend.
                SampleValue::Timestamp(self.rng.gen_range(0..(1i64 << 31)))
            }
            ShapeKind::Blob => {
                let len = self.collection_size(length);
                SampleValue::Blob((0..len).map(|_| self.rng.gen()).collect())
            }
            ShapeKind::Document => {
                let n: i32 = self.rng.gen_range(0..1000);
                SampleValue::Document(serde_json::json!({ "value": n }))
            }
            ShapeKind::List { member: element } => {
                let element = element.as_ref();
                let target = self.model.expect_shape(&element.name, &element.target)?;
                let size = self.collection_size(length);
                let unique = shape.traits.unique_items
                    || member.map(|m| m.traits.unique_items).unwrap_or(false);
                if unique {
                    let mut items: Vec<SampleValue> = Vec::new();
                    let mut attempts = 0;
                    while (items.len() as u64) < size && attempts < size as usize * CONFOUND_ATTEMPTS
                    {
                        attempts += 1;
                        let candidate = self.synthesize_for(target, Some(element))?;
                        if !items.contains(&candidate) {
                            items.push(candidate);
                        }
                    }
                    SampleValue::Set(items)
                } else {
                    let mut items = Vec::with_capacity(size as usize);
                    for _ in 0..size {
                        items.push(self.synthesize_for(target, Some(element))?);
                    }
                    SampleValue::List(items)
                }
            }
            ShapeKind::Map { key, value } => {
                let (key, value) = (key.as_ref(), value.as_ref());
                let key_target = self.model.expect_shape(&key.name, &key.target)?;
                let value_target = self.model.expect_shape(&value.name, &value.target)?;
                let size = self.collection_size(length);
                let mut entries: Vec<(SampleValue, SampleValue)> = Vec::new();
                let mut attempts = 0;
                while (entries.len() as u64) < size
                    && attempts < size as usize * CONFOUND_ATTEMPTS
                {
                    attempts += 1;
                    let k = self.synthesize_for(key_target, Some(key))?;
                    if entries.iter().any(|(existing, _)| existing == &k) {
                        continue;
                    }
                    let v = self.synthesize_for(value_target, Some(value))?;
                    entries.push((k, v));
                }
                SampleValue::Map(entries)
            }
            ShapeKind::Structure { members } => self.synthesize_structure(shape, members)?,
            ShapeKind::Union { variants } => {
                if variants.is_empty() {
                    return Err(StructuralError::EmptyVariantSet {
                        shape: shape.id.clone(),
                    });
                }
                let pick = &variants[self.rng.gen_range(0..variants.len())];
                let target = self.model.expect_shape(&pick.name, &pick.target)?;
                let value = self.synthesize_for(target, Some(pick))?;
                SampleValue::Union {
                    type_name: self.namer.type_name(&shape.id),
                    variant: crate::member::naming::enum_variant_name(&pick.name),
                    value: Box::new(value),
                }
            }
            ShapeKind::Enum { constants } => {
                if constants.is_empty() {
                    return Err(StructuralError::EmptyVariantSet {
                        shape: shape.id.clone(),
                    });
                }
                let pick = &constants[self.rng.gen_range(0..constants.len())];
                SampleValue::Enum {
                    type_name: self.namer.type_name(&shape.id),
                    constant: crate::member::naming::enum_variant_name(&pick.name),
                }
            }
            ShapeKind::IntEnum { constants } => {
                if constants.is_empty() {
                    return Err(StructuralError::EmptyVariantSet {
                        shape: shape.id.clone(),
                    });
                }
                let pick = &constants[self.rng.gen_range(0..constants.len())];
                SampleValue::IntEnum {
                    type_name: self.namer.type_name(&shape.id),
                    constant: crate::member::naming::enum_variant_name(&pick.name),
                }
            }
        };
        Ok(value)
    }

    fn synthesize_structure(
        &mut self,
        shape: &'m Shape,
        members: &'m [Member],
    ) -> Result<SampleValue, StructuralError> {
        let mut args = Vec::with_capacity(members.len());
        for member in members {
            let sm = StructureMember::build(self.model, self.namer, member)?;
            let value = self.synthesize_for(sm.target(), Some(member))?;
            // Constructor takes Option<T> unless the member is required
            // without a default.
            let boxed = !(sm.is_required() && !sm.has_default());
            args.push(StructArg {
                name: sm.arg().to_string(),
                value,
                boxed,
            });
        }
        // Span invariant: synthesize both candidates independently, then
        // reassign so lesser ≤ greater always holds.
        if let Some(span) = &shape.traits.span {
            let lesser_idx = members.iter().position(|m| m.name == span.lesser);
            let greater_idx = members.iter().position(|m| m.name == span.greater);
            if let (Some(a), Some(b)) = (lesser_idx, greater_idx) {
                if args[a].value.partial_cmp_value(&args[b].value) == Some(Ordering::Greater) {
                    let tmp = args[a].value.clone();
                    args[a].value = args[b].value.clone();
                    args[b].value = tmp;
                }
            }
        }
        Ok(SampleValue::Structure {
            type_name: self.namer.type_name(&shape.id),
            args,
        })
    }

    /// Uniform integral draw over the declared range, defaulting to the
    /// kind's full domain — in which case the RNG's native draw is used
    /// directly, since `max - min` would overflow the width arithmetic.
    fn bounded_int(
        &mut self,
        kind: NumberKind,
        range: Option<&crate::model::RangeBounds>,
    ) -> i128 {
        let (domain_lo, domain_hi) = kind.integer_domain().unwrap_or((i64::MIN as i128, i64::MAX as i128));
        let min = range.and_then(|r| r.min_i128()).unwrap_or(domain_lo);
        let max = range.and_then(|r| r.max_i128()).unwrap_or(domain_hi);
        if min <= domain_lo && max >= domain_hi {
            return match kind {
                NumberKind::Byte => self.rng.gen::<i8>() as i128,
                NumberKind::Short => self.rng.gen::<i16>() as i128,
                NumberKind::Integer => self.rng.gen::<i32>() as i128,
                NumberKind::Long | NumberKind::Float | NumberKind::Double => {
                    self.rng.gen::<i64>() as i128
                }
            };
        }
        let min = min.max(domain_lo);
        let max = max.min(domain_hi).max(min);
        self.rng.gen_range(min..=max)
    }

    fn bounded_float(
        &mut self,
        kind: NumberKind,
        range: Option<&crate::model::RangeBounds>,
    ) -> f64 {
        let min = range.and_then(|r| r.min_f64());
        let max = range.and_then(|r| r.max_f64());
        match (min, max) {
            (None, None) => self.rng.gen::<f64>(),
            (min, max) => {
                let lo = min.unwrap_or_else(|| max.map(|m| m - 1.0).unwrap_or(0.0));
                let hi = max.unwrap_or(lo + 1.0).max(lo);
                if lo == hi {
                    lo
                } else {
                    self.rng.gen_range(lo..=hi)
                }
            }
        }
        .clamp(
            kind.float_domain().map(|d| d.0).unwrap_or(f64::MIN),
            kind.float_domain().map(|d| d.1).unwrap_or(f64::MAX),
        )
    }

    /// Target collection size: drawn from a small range, then clamped into
    /// declared bounds with a floor of min+1 to avoid boundary-only coverage.
    fn collection_size(&mut self, length: Option<&crate::model::LengthBounds>) -> u64 {
        let mut target = self.rng.gen_range(COLLECTION_SIZE_RANGE);
        if let Some(len) = length {
            if let Some(min) = len.min {
                target = target.max(min + 1);
            }
            if let Some(max) = len.max {
                target = target.min(max);
            }
        }
        target
    }

    /// Preference order: explicit valid sample, pattern-directed synthesis,
    /// random lowercase string within length bounds.
    fn random_string(&mut self, shape: &'m Shape, member: Option<&'m Member>) -> String {
        let samples = resolve_trait(member, shape, |t| t.samples.as_ref());
        if let Some(samples) = samples {
            let valid = samples.valid_strings();
            if !valid.is_empty() {
                return valid[self.rng.gen_range(0..valid.len())].to_string();
            }
        }
        if let Some(pattern) = resolve_trait(member, shape, |t| t.pattern.as_deref()) {
            if let Ok(xeger) = Xeger::new(pattern) {
                if let Some(sample) = xeger.emit_checked(&mut self.rng, 20) {
                    return sample;
                }
                debug!(pattern, "pattern synthesis exhausted its attempts");
            }
        }
        let length = resolve_trait(member, shape, |t| t.length.as_ref());
        let lo = length.and_then(|l| l.min).unwrap_or(0);
        let hi = length
            .and_then(|l| l.max)
            .unwrap_or(lo + DEFAULT_STRING_CEILING)
            .max(lo);
        let len = self.rng.gen_range(lo..=hi);
        (0..len)
            .map(|_| (b'a' + self.rng.gen_range(0..26u8)) as char)
            .collect()
    }

    /// A string expected to violate the member's constraints: an explicit
    /// invalid sample, or a confounded pattern match re-verified not to
    /// match. `None` is a coverage gap, not an error.
    pub fn invalid_string(&mut self, shape: &'m Shape, member: Option<&'m Member>) -> Option<String> {
        let samples = resolve_trait(member, shape, |t| t.samples.as_ref());
        if let Some(samples) = samples {
            let invalid = samples.invalid_strings();
            if !invalid.is_empty() {
                return Some(invalid[self.rng.gen_range(0..invalid.len())].to_string());
            }
        }
        let pattern = resolve_trait(member, shape, |t| t.pattern.as_deref())?;
        let xeger = Xeger::new(pattern).ok()?;
        let confounded = xeger.confound()?;
        confounded.emit_checked(&mut self.rng, CONFOUND_ATTEMPTS)
    }
}

/// Out-of-range probe values for negative tests: one and seventeen past each
/// declared bound, filtered to the kind's representable domain.
pub fn out_of_range_values(
    kind: NumberKind,
    range: &crate::model::RangeBounds,
) -> Vec<i128> {
    let Some((lo, hi)) = kind.integer_domain() else {
        return Vec::new();
    };
    let mut probes = Vec::new();
    if let Some(min) = range.min_i128() {
        for delta in [1, 17] {
            let v = min - delta;
            if v >= lo {
                probes.push(v);
            }
        }
    }
    if let Some(max) = range.max_i128() {
        for delta in [1, 17] {
            let v = max + delta;
            if v <= hi {
                probes.push(v);
            }
        }
    }
    probes
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::member::DefaultNamer;
    use crate::model::{
        LengthBounds, Member, Model, RangeBounds, Shape, ShapeId, ShapeKind, SpanTrait, TraitSet,
    };

    fn ranged_int(id: &str, min: i64, max: i64) -> Shape {
        let mut shape = Shape::new(ShapeId::new(id), ShapeKind::Integer);
        shape.traits.range = Some(RangeBounds::new(Some(min), Some(max)));
        shape
    }

    #[test]
    fn thousand_draws_respect_range() {
        let model = Model::from_shapes([ranged_int("example#Score", 10, 90)]);
        let shape = model.get(&"example#Score".into()).unwrap();
        let mut synth = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        for _ in 0..1000 {
            match synth.synthesize(shape).unwrap() {
                SampleValue::Integer(v) => assert!((10..=90).contains(&v), "{v} out of range"),
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn all_scalar_kinds_respect_bounds() {
        for (name, kind) in [
            ("Byte", ShapeKind::Byte),
            ("Short", ShapeKind::Short),
            ("Integer", ShapeKind::Integer),
            ("Long", ShapeKind::Long),
        ] {
            let id = format!("example#{name}Ranged");
            let mut shape = Shape::new(ShapeId::new(id.as_str()), kind);
            shape.traits.range = Some(RangeBounds::new(Some(-5), Some(20)));
            let model = Model::from_shapes([shape]);
            let shape = model.get(&id.as_str().into()).unwrap();
            let mut synth = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
            for _ in 0..1000 {
                let v = match synth.synthesize(shape).unwrap() {
                    SampleValue::Byte(v) => v as i64,
                    SampleValue::Short(v) => v as i64,
                    SampleValue::Integer(v) => v as i64,
                    SampleValue::Long(v) => v,
                    other => panic!("unexpected value {other:?}"),
                };
                assert!((-5..=20).contains(&v), "{name}: {v} out of range");
            }
        }
    }

    #[test]
    fn identical_shape_ids_give_identical_sequences() {
        let model = Model::from_shapes([ranged_int("example#Score", 0, 1000)]);
        let shape = model.get(&"example#Score".into()).unwrap();
        let mut a = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        let mut b = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        let first: Vec<SampleValue> = (0..50).map(|_| a.synthesize(shape).unwrap()).collect();
        let second: Vec<SampleValue> = (0..50).map(|_| b.synthesize(shape).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn string_lengths_stay_in_declared_bounds() {
        let mut shape = Shape::new(ShapeId::new("example#Name"), ShapeKind::String);
        shape.traits.length = Some(LengthBounds::new(Some(3), Some(10)));
        let model = Model::from_shapes([shape]);
        let shape = model.get(&"example#Name".into()).unwrap();
        let mut synth = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        for _ in 0..200 {
            match synth.synthesize(shape).unwrap() {
                SampleValue::String(s) => {
                    let n = s.chars().count();
                    assert!((3..=10).contains(&n), "length {n} out of [3,10]: {s:?}");
                }
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn pattern_round_trip() {
        let mut shape = Shape::new(ShapeId::new("example#Code"), ShapeKind::String);
        shape.traits.pattern = Some("[A-Z]{2}-[0-9]{4}".to_string());
        let model = Model::from_shapes([shape]);
        let shape = model.get(&"example#Code".into()).unwrap();
        let xeger = Xeger::new("[A-Z]{2}-[0-9]{4}").unwrap();
        let mut synth = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        for _ in 0..50 {
            match synth.synthesize(shape).unwrap() {
                SampleValue::String(s) => assert!(xeger.matches(&s), "{s:?} should match"),
                other => panic!("unexpected value {other:?}"),
            }
            if let Some(bad) = synth.invalid_string(shape, None) {
                assert!(!xeger.matches(&bad), "{bad:?} should not match");
            }
        }
    }

    #[test]
    fn explicit_samples_win_over_synthesis() {
        let mut shape = Shape::new(ShapeId::new("example#Token"), ShapeKind::String);
        shape.traits.pattern = Some("[a-z]+".to_string());
        shape.traits.samples = Some(crate::model::Samples {
            valid: vec![serde_json::json!("goodtoken")],
            invalid: vec![serde_json::json!("BAD TOKEN")],
        });
        let model = Model::from_shapes([shape]);
        let shape = model.get(&"example#Token".into()).unwrap();
        let mut synth = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        assert_eq!(
            synth.synthesize(shape).unwrap(),
            SampleValue::String("goodtoken".to_string())
        );
        assert_eq!(synth.invalid_string(shape, None).unwrap(), "BAD TOKEN");
    }

    #[test]
    fn collection_sizes_respect_bounds() {
        let mut list = Shape::new(
            ShapeId::new("example#Scores"),
            ShapeKind::List {
                member: Box::new(Member::new("member", ShapeId::prelude("Integer"))),
            },
        );
        list.traits.length = Some(LengthBounds::new(Some(2), Some(4)));
        let model = Model::from_shapes([list]);
        let shape = model.get(&"example#Scores".into()).unwrap();
        let mut synth = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        for _ in 0..100 {
            match synth.synthesize(shape).unwrap() {
                SampleValue::List(items) => {
                    // Floor is min+1, ceiling is max.
                    assert!((3..=4).contains(&items.len()), "size {}", items.len());
                }
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn span_invariant_holds_across_draws() {
        let mut window = Shape::new(
            ShapeId::new("example#Window"),
            ShapeKind::Structure {
                members: vec![
                    {
                        let mut m = Member::new("start", ShapeId::prelude("Integer"));
                        m.traits = TraitSet::required();
                        m
                    },
                    {
                        let mut m = Member::new("end", ShapeId::prelude("Integer"));
                        m.traits = TraitSet::required();
                        m
                    },
                ],
            },
        );
        window.traits.span = Some(SpanTrait {
            lesser: "start".to_string(),
            greater: "end".to_string(),
        });
        let model = Model::from_shapes([window]);
        let shape = model.get(&"example#Window".into()).unwrap();
        let mut synth = ValueSynthesizer::for_shape(&model, &DefaultNamer, &shape.id);
        for _ in 0..100 {
            match synth.synthesize(shape).unwrap() {
                SampleValue::Structure { args, .. } => {
                    let start = &args[0].value;
                    let end = &args[1].value;
                    assert_ne!(
                        start.partial_cmp_value(end),
                        Some(Ordering::Greater),
                        "span violated: {start:?} > {end:?}"
                    );
                }
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn out_of_range_probes_stay_in_domain() {
        let range = RangeBounds::new(Some(0), Some(100));
        let probes = out_of_range_values(NumberKind::Integer, &range);
        assert!(probes.contains(&-1));
        assert!(probes.contains(&101));
        let tight = RangeBounds::new(Some(i64::from(i8::MIN)), Some(i64::from(i8::MAX)));
        assert!(out_of_range_values(NumberKind::Byte, &tight).is_empty());
    }
}

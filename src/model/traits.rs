use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Numeric bounds from a `range` trait. Bounds are kept in their declared
/// JSON form; conversion to a concrete kind happens at the point of use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
}

impl RangeBounds {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        RangeBounds {
            min: min.map(Number::from),
            max: max.map(Number::from),
        }
    }

    pub fn min_f64(&self) -> Option<f64> {
        self.min.as_ref().and_then(Number::as_f64)
    }

    pub fn max_f64(&self) -> Option<f64> {
        self.max.as_ref().and_then(Number::as_f64)
    }

    pub fn min_i128(&self) -> Option<i128> {
        self.min.as_ref().and_then(number_as_i128)
    }

    pub fn max_i128(&self) -> Option<i128> {
        self.max.as_ref().and_then(number_as_i128)
    }
}

/// Exact integral reading of a JSON number where one exists; floats with a
/// fractional part fall back to truncation toward zero.
pub(crate) fn number_as_i128(n: &Number) -> Option<i128> {
    if let Some(v) = n.as_i64() {
        return Some(v as i128);
    }
    if let Some(v) = n.as_u64() {
        return Some(v as i128);
    }
    n.as_f64().map(|f| f as i128)
}

/// Length bounds from a `length` trait: string length in characters, or
/// collection size in entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LengthBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl LengthBounds {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        LengthBounds { min, max }
    }
}

/// Hand-authored positive and negative example values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Samples {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid: Vec<Value>,
}

impl Samples {
    pub fn valid_strings(&self) -> Vec<&str> {
        self.valid.iter().filter_map(Value::as_str).collect()
    }

    pub fn invalid_strings(&self) -> Vec<&str> {
        self.invalid.iter().filter_map(Value::as_str).collect()
    }
}

/// Declares a non-decreasing relationship between two members of one
/// structure: the value of `lesser` must compare ≤ the value of `greater`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanTrait {
    pub lesser: String,
    pub greater: String,
}

/// Where an http-bound member's value is drawn from in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "in", rename_all = "camelCase")]
pub enum HttpBinding {
    /// A path segment; the member name doubles as the template label.
    Label,
    Query {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Header { name: String },
    /// The entire request body.
    Payload,
}

/// The traits attachable to a shape or member. Member-level traits override
/// shape-level ones; that priority chain lives in `StructureMember`, not here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TraitSet {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub unique_items: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Samples>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SpanTrait>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpBinding>,
}

impl TraitSet {
    pub fn is_empty(&self) -> bool {
        self == &TraitSet::default()
    }

    pub fn required() -> Self {
        TraitSet {
            required: true,
            ..TraitSet::default()
        }
    }
}

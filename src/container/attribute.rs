//! Attributes of groups and datasets.
//!
//! Attributes are small named values attached to a node. They persist the
//! data model's configuration tags, counts and descriptions.

use smallvec::SmallVec;
use std::fmt;

/// Value of a single attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    String(String),
    U64(u64),
    I64(i64),
    F64(f64),
    U64Array(Vec<u64>),
}

impl AttributeValue {
    /// Name of the stored type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => String::TYPE_NAME,
            Self::U64(_) => u64::TYPE_NAME,
            Self::I64(_) => i64::TYPE_NAME,
            Self::F64(_) => f64::TYPE_NAME,
            Self::U64Array(_) => Vec::<u64>::TYPE_NAME,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{:?}", s),
            Self::U64(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::U64Array(v) => write!(f, "{:?}", v),
        }
    }
}

/// Rust types that can be stored as attribute values.
pub trait AttributeType: Sized {
    /// Name of the type, for error messages.
    const TYPE_NAME: &'static str;

    fn into_value(self) -> AttributeValue;

    fn from_value(value: &AttributeValue) -> Option<Self>;
}

impl AttributeType for String {
    const TYPE_NAME: &'static str = "string";

    fn into_value(self) -> AttributeValue {
        AttributeValue::String(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl AttributeType for u64 {
    const TYPE_NAME: &'static str = "uint64";

    fn into_value(self) -> AttributeValue {
        AttributeValue::U64(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::U64(v) => Some(*v),
            _ => None,
        }
    }
}

impl AttributeType for i64 {
    const TYPE_NAME: &'static str = "int64";

    fn into_value(self) -> AttributeValue {
        AttributeValue::I64(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::I64(v) => Some(*v),
            _ => None,
        }
    }
}

impl AttributeType for f64 {
    const TYPE_NAME: &'static str = "float64";

    fn into_value(self) -> AttributeValue {
        AttributeValue::F64(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::F64(v) => Some(*v),
            _ => None,
        }
    }
}

impl AttributeType for Vec<u64> {
    const TYPE_NAME: &'static str = "uint64[]";

    fn into_value(self) -> AttributeValue {
        AttributeValue::U64Array(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::U64Array(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Attribute storage - ordered name/value pairs.
///
/// Uses SmallVec optimization for the common case of few entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    entries: SmallVec<[(String, AttributeValue); 4]>,
}

impl Attributes {
    /// Create empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value, replacing an existing one.
    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        for (n, v) in &mut self.entries {
            if n == &name {
                *v = value;
                return;
            }
        }
        self.entries.push((name, value));
    }

    /// Get an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Check if an attribute exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over name/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

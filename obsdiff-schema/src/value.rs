//! Attribute values and variable payloads.

use crate::dtype::DTypeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An attribute value: a scalar or a flat array.
///
/// Attribute comparison is always exact, so no mask or tolerance concept
/// exists here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    TextArray(Vec<String>),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Text(v) => write!(f, "'{}'", v),
            AttrValue::IntArray(v) => write!(f, "{:?}", v),
            AttrValue::FloatArray(v) => write!(f, "{:?}", v),
            AttrValue::TextArray(v) => write!(f, "{:?}", v),
        }
    }
}

/// Flattened n-dimensional payload of a variable.
///
/// Elements are stored in the order implied by the variable's dimension
/// sequence. Numeric payloads carry a mask marking missing entries; an empty
/// mask means no entry is masked, a non-empty mask must match the value
/// count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Numeric {
        values: Vec<f64>,
        #[serde(default)]
        mask: Vec<bool>,
    },
    Text {
        values: Vec<String>,
    },
    Opaque {
        values: Vec<String>,
    },
}

impl Payload {
    /// Number of elements in the payload.
    pub fn len(&self) -> usize {
        match self {
            Payload::Numeric { values, .. } => values.len(),
            Payload::Text { values } => values.len(),
            Payload::Opaque { values } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Comparison family this payload representation belongs to.
    pub fn kind(&self) -> DTypeKind {
        match self {
            Payload::Numeric { .. } => DTypeKind::Numeric,
            Payload::Text { .. } => DTypeKind::Text,
            Payload::Opaque { .. } => DTypeKind::Opaque,
        }
    }

    /// Whether the element at `index` is masked. Only numeric payloads carry
    /// a mask; an empty mask masks nothing.
    pub fn is_masked(&self, index: usize) -> bool {
        match self {
            Payload::Numeric { mask, .. } => mask.get(index).copied().unwrap_or(false),
            _ => false,
        }
    }
}

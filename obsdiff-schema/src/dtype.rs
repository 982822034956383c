//! Semantic type tags for dataset variables.
//!
//! The set of supported dtypes is a closed enum; every payload must carry one
//! of these tags before comparison proceeds. Names follow the NetCDF type
//! vocabulary of the conversion output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type tag of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Int64,
    UInt64,
    Float,
    Double,
    Char,
    Str,
    Opaque,
}

/// Comparison family of a dtype, driving payload dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DTypeKind {
    /// Integer and floating-point types, compared under tolerance.
    Numeric,
    /// Character and string types, compared exactly with fill-value wildcard.
    Text,
    /// User-defined/opaque types, compared exactly with no tolerance.
    Opaque,
}

impl DType {
    /// Classify the dtype into its comparison family.
    pub fn kind(&self) -> DTypeKind {
        match self {
            DType::Byte
            | DType::UByte
            | DType::Short
            | DType::UShort
            | DType::Int
            | DType::UInt
            | DType::Int64
            | DType::UInt64
            | DType::Float
            | DType::Double => DTypeKind::Numeric,
            DType::Char | DType::Str => DTypeKind::Text,
            DType::Opaque => DTypeKind::Opaque,
        }
    }

    /// Canonical lowercase name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            DType::Byte => "byte",
            DType::UByte => "ubyte",
            DType::Short => "short",
            DType::UShort => "ushort",
            DType::Int => "int",
            DType::UInt => "uint",
            DType::Int64 => "int64",
            DType::UInt64 => "uint64",
            DType::Float => "float",
            DType::Double => "double",
            DType::Char => "char",
            DType::Str => "str",
            DType::Opaque => "opaque",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

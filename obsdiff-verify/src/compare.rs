//! Type-dispatched equivalence rules for a single variable.
//!
//! A comparison never fails for data differences; those come back as
//! [`Mismatch`] records. Only malformed input (a payload whose representation
//! disagrees with the dtype driving the dispatch) is an error.

use crate::types::Mismatch;
use obsdiff_schema::{AttrValue, DType, DTypeKind, Payload, Variable};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Absolute tolerance for numeric payloads, tuned for single/double
/// precision geophysical fields.
pub const ABS_TOL: f64 = 1e-6;

/// Relative tolerance for numeric payloads.
pub const REL_TOL: f64 = 1e-5;

/// Sentinel fill value for text payloads. An element equal to this on either
/// side is an intentionally unfilled slot and exempt from comparison.
pub const TEXT_FILL: &str = "-";

/// Usage errors from the comparator. Data mismatches are never errors.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error(
        "variable '{variable}' in group '{group}' of '{file}': dtype {dtype} cannot be compared against a {payload:?} payload"
    )]
    PayloadKind {
        file: String,
        group: String,
        variable: String,
        dtype: DType,
        payload: DTypeKind,
    },
}

/// Location context threaded into every record a comparison produces.
#[derive(Debug, Clone, Copy)]
pub struct VarContext<'a> {
    pub file: &'a str,
    pub group: &'a str,
    pub variable: &'a str,
}

impl<'a> VarContext<'a> {
    pub fn new(file: &'a str, group: &'a str, variable: &'a str) -> Self {
        Self {
            file,
            group,
            variable,
        }
    }

    /// Build a mismatch record at this location.
    pub fn mismatch(
        &self,
        reason: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Mismatch {
        Mismatch {
            file: self.file.to_string(),
            group: self.group.to_string(),
            variable: self.variable.to_string(),
            reason: reason.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    fn payload_kind_error(&self, dtype: DType, payload: DTypeKind) -> CompareError {
        CompareError::PayloadKind {
            file: self.file.to_string(),
            group: self.group.to_string(),
            variable: self.variable.to_string(),
            dtype,
            payload,
        }
    }
}

/// Facet 1: exact equality of the semantic type tag.
pub fn compare_dtype(ctx: &VarContext<'_>, reference: DType, candidate: DType) -> Option<Mismatch> {
    if reference == candidate {
        None
    } else {
        Some(ctx.mismatch("Dtype mismatch", reference, candidate))
    }
}

/// Facet 2: exact, order-sensitive equality of the dimension-name sequence.
pub fn compare_dimensions(
    ctx: &VarContext<'_>,
    reference: &[String],
    candidate: &[String],
) -> Option<Mismatch> {
    if reference == candidate {
        None
    } else {
        Some(ctx.mismatch(
            "Dimension mismatch",
            format!("{:?}", reference),
            format!("{:?}", candidate),
        ))
    }
}

/// Facet 3: set equality of attribute names. Missing and extra attributes
/// both surface in the single record.
pub fn compare_attribute_names(
    ctx: &VarContext<'_>,
    reference: &BTreeMap<String, AttrValue>,
    candidate: &BTreeMap<String, AttrValue>,
) -> Option<Mismatch> {
    let ref_names: Vec<&String> = reference.keys().collect();
    let cand_names: Vec<&String> = candidate.keys().collect();
    if ref_names == cand_names {
        None
    } else {
        Some(ctx.mismatch(
            "Attribute name set mismatch",
            format!("{:?}", ref_names),
            format!("{:?}", cand_names),
        ))
    }
}

/// Facet 4: exact value equality for every attribute name present in both
/// sets. Asymmetric extras were already flagged by the name-set facet, so
/// only the intersection is compared.
pub fn compare_attribute_values(
    ctx: &VarContext<'_>,
    reference: &BTreeMap<String, AttrValue>,
    candidate: &BTreeMap<String, AttrValue>,
) -> Vec<Mismatch> {
    let mut out = Vec::new();
    for (name, ref_val) in reference {
        let Some(cand_val) = candidate.get(name) else {
            continue;
        };
        if ref_val != cand_val {
            out.push(ctx.mismatch(
                format!("Attribute value mismatch for '{}'", name),
                ref_val,
                cand_val,
            ));
        }
    }
    out
}

/// Facets 3 and 4 together, as applied to a whole attribute mapping. Used
/// for both variable attributes and root-scope file attributes.
pub fn compare_attribute_sets(
    ctx: &VarContext<'_>,
    reference: &BTreeMap<String, AttrValue>,
    candidate: &BTreeMap<String, AttrValue>,
) -> Vec<Mismatch> {
    let mut out = Vec::new();
    if let Some(m) = compare_attribute_names(ctx, reference, candidate) {
        out.push(m);
    }
    out.extend(compare_attribute_values(ctx, reference, candidate));
    out
}

/// Facet 5: payload equivalence, dispatched by the reference dtype.
///
/// Empty payloads on both sides are trivially equivalent. At most one record
/// is produced per variable, carrying the flat index of the first differing
/// element.
pub fn compare_payload(
    ctx: &VarContext<'_>,
    dtype: DType,
    reference: &Payload,
    candidate: &Payload,
) -> Result<Vec<Mismatch>, CompareError> {
    if reference.is_empty() && candidate.is_empty() {
        return Ok(vec![]);
    }
    match dtype.kind() {
        DTypeKind::Numeric => compare_numeric(ctx, dtype, reference, candidate),
        DTypeKind::Text => compare_text(ctx, dtype, reference, candidate),
        DTypeKind::Opaque => compare_opaque(ctx, dtype, reference, candidate),
    }
}

/// All facets in order. An early structural mismatch (dtype, dimensions)
/// does not suppress later facets; every defect is collected in one pass.
///
/// The payload facet only runs when both dtypes belong to the same
/// comparison family. A cross-family drift between two individually
/// well-formed variables is fully described by the dtype record, and no
/// element-wise rule applies across families.
pub fn compare_variable(
    ctx: &VarContext<'_>,
    reference: &Variable,
    candidate: &Variable,
) -> Result<Vec<Mismatch>, CompareError> {
    let mut out = Vec::new();
    out.extend(compare_dtype(ctx, reference.dtype, candidate.dtype));
    out.extend(compare_dimensions(
        ctx,
        &reference.dimensions,
        &candidate.dimensions,
    ));
    out.extend(compare_attribute_sets(
        ctx,
        &reference.attributes,
        &candidate.attributes,
    ));
    if reference.dtype.kind() == candidate.dtype.kind() {
        out.extend(compare_payload(
            ctx,
            reference.dtype,
            &reference.data,
            &candidate.data,
        )?);
    }
    Ok(out)
}

/// Tolerance rule for one numeric element pair.
fn numeric_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ABS_TOL + REL_TOL * b.abs()
}

fn compare_numeric(
    ctx: &VarContext<'_>,
    dtype: DType,
    reference: &Payload,
    candidate: &Payload,
) -> Result<Vec<Mismatch>, CompareError> {
    let Payload::Numeric {
        values: ref_values, ..
    } = reference
    else {
        return Err(ctx.payload_kind_error(dtype, reference.kind()));
    };
    let Payload::Numeric {
        values: cand_values,
        ..
    } = candidate
    else {
        return Err(ctx.payload_kind_error(dtype, candidate.kind()));
    };

    if ref_values.len() != cand_values.len() {
        return Ok(vec![ctx.mismatch(
            "Payload element count mismatch",
            ref_values.len(),
            cand_values.len(),
        )]);
    }

    for (i, (a, b)) in ref_values.iter().zip(cand_values.iter()).enumerate() {
        let ref_masked = reference.is_masked(i);
        let cand_masked = candidate.is_masked(i);
        if ref_masked && cand_masked {
            continue;
        }
        if ref_masked != cand_masked {
            let describe = |masked: bool, value: &f64| {
                if masked {
                    "masked".to_string()
                } else {
                    value.to_string()
                }
            };
            return Ok(vec![ctx.mismatch(
                format!("Mask mismatch at index {}", i),
                describe(ref_masked, a),
                describe(cand_masked, b),
            )]);
        }
        if !numeric_close(*a, *b) {
            return Ok(vec![ctx.mismatch(
                format!("Numeric data mismatch at index {}", i),
                a,
                b,
            )]);
        }
    }
    Ok(vec![])
}

fn compare_text(
    ctx: &VarContext<'_>,
    dtype: DType,
    reference: &Payload,
    candidate: &Payload,
) -> Result<Vec<Mismatch>, CompareError> {
    let Payload::Text { values: ref_values } = reference else {
        return Err(ctx.payload_kind_error(dtype, reference.kind()));
    };
    let Payload::Text {
        values: cand_values,
    } = candidate
    else {
        return Err(ctx.payload_kind_error(dtype, candidate.kind()));
    };

    if ref_values.len() != cand_values.len() {
        return Ok(vec![ctx.mismatch(
            "Payload element count mismatch",
            ref_values.len(),
            cand_values.len(),
        )]);
    }

    for (i, (a, b)) in ref_values.iter().zip(cand_values.iter()).enumerate() {
        if a == TEXT_FILL || b == TEXT_FILL {
            continue;
        }
        if a != b {
            return Ok(vec![ctx.mismatch(
                format!("String mismatch at index {}", i),
                format!("'{}'", a),
                format!("'{}'", b),
            )]);
        }
    }
    Ok(vec![])
}

fn compare_opaque(
    ctx: &VarContext<'_>,
    dtype: DType,
    reference: &Payload,
    candidate: &Payload,
) -> Result<Vec<Mismatch>, CompareError> {
    let Payload::Opaque { values: ref_values } = reference else {
        return Err(ctx.payload_kind_error(dtype, reference.kind()));
    };
    let Payload::Opaque {
        values: cand_values,
    } = candidate
    else {
        return Err(ctx.payload_kind_error(dtype, candidate.kind()));
    };

    if ref_values.len() != cand_values.len() {
        return Ok(vec![ctx.mismatch(
            "Payload element count mismatch",
            ref_values.len(),
            cand_values.len(),
        )]);
    }

    for (i, (a, b)) in ref_values.iter().zip(cand_values.iter()).enumerate() {
        if a != b {
            return Ok(vec![ctx.mismatch(
                format!("Opaque element mismatch at index {}", i),
                a,
                b,
            )]);
        }
    }
    Ok(vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>() -> VarContext<'a> {
        VarContext::new("obs.nc.json", "/ObsValue", "airTemperature")
    }

    fn numeric(values: Vec<f64>) -> Payload {
        Payload::Numeric {
            values,
            mask: vec![],
        }
    }

    fn masked(values: Vec<f64>, mask: Vec<bool>) -> Payload {
        Payload::Numeric { values, mask }
    }

    fn text(values: &[&str]) -> Payload {
        Payload::Text {
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    // -------------------------------------------
    // Structural facets
    // -------------------------------------------

    #[test]
    fn test_dtype_equal() {
        assert!(compare_dtype(&ctx(), DType::Float, DType::Float).is_none());
    }

    #[test]
    fn test_dtype_mismatch() {
        let m = compare_dtype(&ctx(), DType::Float, DType::Double).unwrap();
        assert_eq!(m.reason, "Dtype mismatch");
        assert_eq!(m.expected, "float");
        assert_eq!(m.actual, "double");
    }

    #[test]
    fn test_dimensions_order_sensitive() {
        let a = vec!["time".to_string(), "lat".to_string()];
        let b = vec!["lat".to_string(), "time".to_string()];
        assert!(compare_dimensions(&ctx(), &a, &a.clone()).is_none());
        let m = compare_dimensions(&ctx(), &a, &b).unwrap();
        assert_eq!(m.reason, "Dimension mismatch");
    }

    #[test]
    fn test_attribute_names_set_equality() {
        let mut reference = BTreeMap::new();
        reference.insert("units".to_string(), AttrValue::Text("K".into()));
        reference.insert("long_name".to_string(), AttrValue::Text("temp".into()));
        // Same names, different insertion order: still equal as a set
        let mut candidate = BTreeMap::new();
        candidate.insert("long_name".to_string(), AttrValue::Text("other".into()));
        candidate.insert("units".to_string(), AttrValue::Text("K".into()));
        assert!(compare_attribute_names(&ctx(), &reference, &candidate).is_none());

        candidate.remove("long_name");
        let m = compare_attribute_names(&ctx(), &reference, &candidate).unwrap();
        assert_eq!(m.reason, "Attribute name set mismatch");
    }

    #[test]
    fn test_attribute_values_intersection_only() {
        let mut reference = BTreeMap::new();
        reference.insert("units".to_string(), AttrValue::Text("K".into()));
        reference.insert("extra".to_string(), AttrValue::Int(1));
        let mut candidate = BTreeMap::new();
        candidate.insert("units".to_string(), AttrValue::Text("C".into()));

        let records = compare_attribute_values(&ctx(), &reference, &candidate);
        // "extra" is absent on the candidate side and not value-compared
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Attribute value mismatch for 'units'");
        assert_eq!(records[0].expected, "'K'");
        assert_eq!(records[0].actual, "'C'");
    }

    #[test]
    fn test_attribute_array_values_exact() {
        let mut reference = BTreeMap::new();
        reference.insert("range".to_string(), AttrValue::FloatArray(vec![0.0, 1.0]));
        let mut candidate = BTreeMap::new();
        candidate.insert(
            "range".to_string(),
            AttrValue::FloatArray(vec![0.0, 1.0000001]),
        );

        let records = compare_attribute_values(&ctx(), &reference, &candidate);
        assert_eq!(records.len(), 1);
    }

    // -------------------------------------------
    // Numeric payloads
    // -------------------------------------------

    #[test]
    fn test_numeric_identical() {
        let payload = numeric(vec![280.5, 281.0]);
        let records =
            compare_payload(&ctx(), DType::Float, &payload, &payload.clone()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_numeric_within_abs_tolerance_boundary() {
        // Differs by exactly atol at every element: equivalent, boundary inclusive
        let reference = numeric(vec![0.0, 0.0]);
        let candidate = numeric(vec![ABS_TOL, -ABS_TOL]);
        let records = compare_payload(&ctx(), DType::Float, &reference, &candidate).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_numeric_just_above_tolerance() {
        let reference = numeric(vec![0.0]);
        let candidate = numeric(vec![ABS_TOL * 1.01]);
        let records = compare_payload(&ctx(), DType::Float, &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].reason.contains("Numeric data mismatch at index 0"));
    }

    #[test]
    fn test_numeric_relative_tolerance_scales() {
        let reference = numeric(vec![100_000.0]);
        let candidate = numeric(vec![100_000.9]);
        // |a-b| = 0.9 <= 1e-6 + 1e-5 * 100000.9
        let records = compare_payload(&ctx(), DType::Double, &reference, &candidate).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_numeric_masked_both_sides_equivalent() {
        let reference = masked(vec![1.0, 9.0e36], vec![false, true]);
        let candidate = masked(vec![1.0, -7.0e21], vec![false, true]);
        let records = compare_payload(&ctx(), DType::Float, &reference, &candidate).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_numeric_masked_one_side_reported() {
        let reference = masked(vec![1.0, 2.0], vec![false, true]);
        let candidate = numeric(vec![1.0, 2.0]);
        let records = compare_payload(&ctx(), DType::Float, &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Mask mismatch at index 1");
        assert_eq!(records[0].expected, "masked");
        assert_eq!(records[0].actual, "2");
    }

    #[test]
    fn test_numeric_element_count_divergence() {
        let reference = numeric(vec![1.0, 2.0]);
        let candidate = numeric(vec![1.0]);
        let records = compare_payload(&ctx(), DType::Float, &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Payload element count mismatch");
        assert_eq!(records[0].expected, "2");
        assert_eq!(records[0].actual, "1");
    }

    #[test]
    fn test_empty_payloads_short_circuit() {
        let reference = numeric(vec![]);
        let candidate = numeric(vec![]);
        let records = compare_payload(&ctx(), DType::Float, &reference, &candidate).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_numeric_first_mismatch_index_reported() {
        let reference = numeric(vec![1.0, 2.0, 3.0]);
        let candidate = numeric(vec![1.0, 5.0, 9.0]);
        let records = compare_payload(&ctx(), DType::Float, &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Numeric data mismatch at index 1");
    }

    // -------------------------------------------
    // Text payloads
    // -------------------------------------------

    #[test]
    fn test_text_exact_match() {
        let reference = text(&["KDEN", "KLAX"]);
        let records =
            compare_payload(&ctx(), DType::Str, &reference, &reference.clone()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_text_fill_wildcard_either_side() {
        let reference = text(&["-", "KLAX"]);
        let candidate = text(&["KDEN", "-"]);
        let records = compare_payload(&ctx(), DType::Str, &reference, &candidate).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_text_mismatch_reported_with_index() {
        let reference = text(&["KDEN", "KLAX"]);
        let candidate = text(&["KDEN", "KSFO"]);
        let records = compare_payload(&ctx(), DType::Str, &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "String mismatch at index 1");
        assert_eq!(records[0].expected, "'KLAX'");
        assert_eq!(records[0].actual, "'KSFO'");
    }

    // -------------------------------------------
    // Opaque payloads
    // -------------------------------------------

    #[test]
    fn test_opaque_exact_no_tolerance() {
        let reference = Payload::Opaque {
            values: vec!["0a0b".to_string()],
        };
        let candidate = Payload::Opaque {
            values: vec!["0a0c".to_string()],
        };
        let records = compare_payload(&ctx(), DType::Opaque, &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].reason.contains("Opaque element mismatch"));
    }

    // -------------------------------------------
    // Dispatch errors
    // -------------------------------------------

    #[test]
    fn test_payload_kind_disagreement_is_error() {
        let reference = numeric(vec![1.0]);
        let candidate = text(&["1.0"]);
        let result = compare_payload(&ctx(), DType::Float, &reference, &candidate);
        assert!(matches!(result, Err(CompareError::PayloadKind { .. })));
    }

    // -------------------------------------------
    // Full variable comparison
    // -------------------------------------------

    #[test]
    fn test_dtype_mismatch_does_not_suppress_payload() {
        // Scenario: dtype differs but payload is equal within tolerance;
        // exactly one record comes out.
        let reference = Variable {
            dtype: DType::Float,
            dimensions: vec!["time".into(), "lat".into(), "lon".into()],
            attributes: BTreeMap::new(),
            data: numeric(vec![280.0]),
        };
        let candidate = Variable {
            dtype: DType::Double,
            dimensions: reference.dimensions.clone(),
            attributes: BTreeMap::new(),
            data: numeric(vec![280.0]),
        };
        let records = compare_variable(&ctx(), &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Dtype mismatch");
    }

    #[test]
    fn test_cross_family_dtype_drift_recorded_not_fatal() {
        // Both variables are individually well-formed; the family change is
        // a data defect, not malformed input.
        let reference = Variable {
            dtype: DType::Float,
            dimensions: vec!["Location".into()],
            attributes: BTreeMap::new(),
            data: numeric(vec![1.0]),
        };
        let candidate = Variable {
            dtype: DType::Str,
            dimensions: vec!["Location".into()],
            attributes: BTreeMap::new(),
            data: text(&["1.0"]),
        };
        let records = compare_variable(&ctx(), &reference, &candidate).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Dtype mismatch");
    }

    #[test]
    fn test_multiple_facets_all_collected() {
        let mut ref_attrs = BTreeMap::new();
        ref_attrs.insert("units".to_string(), AttrValue::Text("K".into()));
        let reference = Variable {
            dtype: DType::Float,
            dimensions: vec!["Location".into()],
            attributes: ref_attrs,
            data: numeric(vec![1.0]),
        };
        let candidate = Variable {
            dtype: DType::Double,
            dimensions: vec!["Channel".into()],
            attributes: BTreeMap::new(),
            data: numeric(vec![5.0]),
        };
        let records = compare_variable(&ctx(), &reference, &candidate).unwrap();
        let reasons: Vec<&str> = records.iter().map(|m| m.reason.as_str()).collect();
        assert!(reasons.contains(&"Dtype mismatch"));
        assert!(reasons.contains(&"Dimension mismatch"));
        assert!(reasons.contains(&"Attribute name set mismatch"));
        assert!(reasons.contains(&"Numeric data mismatch at index 0"));
    }
}

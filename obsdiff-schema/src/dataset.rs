//! Group tree and structure extraction.
//!
//! A dataset file is a strictly tree-shaped hierarchy of groups. Structure
//! extraction flattens the tree into a mapping from group path to variable
//! metadata, the form the differ consumes.

use crate::dtype::{DType, DTypeKind};
use crate::value::{AttrValue, Payload};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Path of the root group.
pub const ROOT_PATH: &str = "/";

/// Errors raised while validating or flattening a dataset tree.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(
        "variable '{variable}' in group '{group}' has dtype {dtype} but a {payload:?} payload"
    )]
    PayloadKind {
        group: String,
        variable: String,
        dtype: DType,
        payload: DTypeKind,
    },

    #[error(
        "variable '{variable}' in group '{group}' has {values} values but a mask of length {mask}"
    )]
    MaskLength {
        group: String,
        variable: String,
        values: usize,
        mask: usize,
    },
}

/// A named, typed, shaped data field within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub dtype: DType,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
    pub data: Payload,
}

/// A group node: attributes, variables and child groups keyed by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(default)]
    pub variables: BTreeMap<String, Variable>,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupNode>,
}

/// An in-memory dataset file: the root group and everything below it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetFile {
    pub root: GroupNode,
}

/// Flattened view of a dataset file: every group path mapped to its
/// variables, plus the root-level attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub groups: BTreeMap<String, BTreeMap<String, Variable>>,
    pub global_attributes: BTreeMap<String, AttrValue>,
}

impl Structure {
    /// Set of group paths present in the structure.
    pub fn group_paths(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }
}

/// Flatten a dataset tree into its `Structure`.
///
/// Every group reachable from the root appears exactly once, keyed by its
/// slash-delimited path. Each variable is validated on the way: its payload
/// representation must agree with its dtype kind, and a non-empty mask must
/// match the value count.
pub fn extract_structure(file: &DatasetFile) -> Result<Structure, SchemaError> {
    let mut groups = BTreeMap::new();
    walk(ROOT_PATH.to_string(), &file.root, &mut groups)?;
    Ok(Structure {
        groups,
        global_attributes: file.root.attributes.clone(),
    })
}

fn walk(
    path: String,
    node: &GroupNode,
    out: &mut BTreeMap<String, BTreeMap<String, Variable>>,
) -> Result<(), SchemaError> {
    for (name, var) in &node.variables {
        validate_variable(&path, name, var)?;
    }
    out.insert(path.clone(), node.variables.clone());
    for (name, child) in &node.groups {
        let child_path = if path == ROOT_PATH {
            format!("/{}", name)
        } else {
            format!("{}/{}", path, name)
        };
        walk(child_path, child, out)?;
    }
    Ok(())
}

fn validate_variable(group: &str, name: &str, var: &Variable) -> Result<(), SchemaError> {
    if var.data.kind() != var.dtype.kind() {
        return Err(SchemaError::PayloadKind {
            group: group.to_string(),
            variable: name.to_string(),
            dtype: var.dtype,
            payload: var.data.kind(),
        });
    }
    if let Payload::Numeric { values, mask } = &var.data {
        if !mask.is_empty() && mask.len() != values.len() {
            return Err(SchemaError::MaskLength {
                group: group.to_string(),
                variable: name.to_string(),
                values: values.len(),
                mask: mask.len(),
            });
        }
    }
    Ok(())
}

//! Two-tree walk producing the complete mismatch set for one file pair.

use crate::compare::{compare_attribute_sets, compare_variable, CompareError, VarContext};
use crate::types::{Mismatch, ALL_VARIABLES, GLOBAL_SCOPE};
use obsdiff_schema::{Structure, ROOT_PATH};

/// Compare two extracted structures and collect every mismatch in one pass.
///
/// Group paths are reconciled first; a branch missing on one side is
/// reported once at `<ALL>` granularity and not descended (the variables to
/// compare do not exist). For every shared group, variable name sets are
/// reconciled, then each shared variable runs through all comparator facets.
/// Root-scope file attributes are compared last, tagged `"/"`/`"global"`.
pub fn diff_structures(
    file: &str,
    reference: &Structure,
    candidate: &Structure,
) -> Result<Vec<Mismatch>, CompareError> {
    let mut out = Vec::new();

    for (path, ref_vars) in &reference.groups {
        let Some(cand_vars) = candidate.groups.get(path) else {
            out.push(missing_group(file, path, MissingSide::Candidate));
            continue;
        };

        for (name, ref_var) in ref_vars {
            let ctx = VarContext::new(file, path, name);
            let Some(cand_var) = cand_vars.get(name) else {
                out.push(missing_variable(&ctx, MissingSide::Candidate));
                continue;
            };
            out.extend(compare_variable(&ctx, ref_var, cand_var)?);
        }
        for name in cand_vars.keys() {
            if !ref_vars.contains_key(name) {
                let ctx = VarContext::new(file, path, name);
                out.push(missing_variable(&ctx, MissingSide::Reference));
            }
        }
    }
    for path in candidate.groups.keys() {
        if !reference.groups.contains_key(path) {
            out.push(missing_group(file, path, MissingSide::Reference));
        }
    }

    let global = VarContext::new(file, ROOT_PATH, GLOBAL_SCOPE);
    out.extend(compare_attribute_sets(
        &global,
        &reference.global_attributes,
        &candidate.global_attributes,
    ));

    Ok(out)
}

/// Structural-only pass: reconcile group paths and variable name sets
/// without touching metadata or payloads.
pub fn diff_variable_names(
    file: &str,
    reference: &Structure,
    candidate: &Structure,
) -> Vec<Mismatch> {
    let mut out = Vec::new();

    for (path, ref_vars) in &reference.groups {
        let Some(cand_vars) = candidate.groups.get(path) else {
            out.push(missing_group(file, path, MissingSide::Candidate));
            continue;
        };
        for name in ref_vars.keys() {
            if !cand_vars.contains_key(name) {
                let ctx = VarContext::new(file, path, name);
                out.push(missing_variable(&ctx, MissingSide::Candidate));
            }
        }
        for name in cand_vars.keys() {
            if !ref_vars.contains_key(name) {
                let ctx = VarContext::new(file, path, name);
                out.push(missing_variable(&ctx, MissingSide::Reference));
            }
        }
    }
    for path in candidate.groups.keys() {
        if !reference.groups.contains_key(path) {
            out.push(missing_group(file, path, MissingSide::Reference));
        }
    }

    out
}

#[derive(Clone, Copy)]
enum MissingSide {
    Reference,
    Candidate,
}

fn missing_group(file: &str, path: &str, side: MissingSide) -> Mismatch {
    let ctx = VarContext::new(file, path, ALL_VARIABLES);
    match side {
        MissingSide::Candidate => ctx.mismatch("Group missing in candidate", "present", "missing"),
        MissingSide::Reference => ctx.mismatch("Group missing in reference", "missing", "present"),
    }
}

fn missing_variable(ctx: &VarContext<'_>, side: MissingSide) -> Mismatch {
    match side {
        MissingSide::Candidate => {
            ctx.mismatch("Variable missing in candidate", "present", "missing")
        }
        MissingSide::Reference => {
            ctx.mismatch("Variable missing in reference", "missing", "present")
        }
    }
}

//! BUILD_RESULT: assemble the id-less payload, hash its canonical bytes into
//! `RES:<sha256>`, and return `(ResultDoc, result_sha256)`.
//!
//! No timestamps or engine data live here, so identical inputs and
//! parameters always produce the same result id.

use serde::{Deserialize, Serialize};

use ea_algo::{AllocationSummary, DepartmentStatus, StatusReport};
use ea_core::{AllocParams, AssignmentOutcome, GroupOrder, OutputOrder, ResultId};
use ea_io::{hasher, IoError};

use crate::prepare::SkippedStudent;
use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDoc {
    pub id: ResultId,
    /// 64-hex digest of the outcome-affecting parameters.
    pub formula_id: String,
    pub summary: AllocationSummary,
    pub outcomes: Vec<AssignmentOutcome>,
    /// Sorted by department id.
    pub departments: Vec<DepartmentStatus>,
    pub skipped: Vec<SkippedStudent>,
}

#[derive(Serialize)]
struct ResultNoId<'a> {
    formula_id: &'a str,
    summary: &'a AllocationSummary,
    outcomes: &'a [AssignmentOutcome],
    departments: &'a [DepartmentStatus],
    skipped: &'a [SkippedStudent],
}

/// Parameters that change outcomes. The seed is logged in the run record
/// but kept out of the formula id.
#[derive(Serialize)]
struct FormulaParams {
    group_order: GroupOrder,
    output_order: OutputOrder,
    exclude_home_department: bool,
    include_pending: bool,
}

pub fn compute_formula_id(params: &AllocParams) -> Result<String, IoError> {
    hasher::sha256_canonical(&FormulaParams {
        group_order: params.group_order,
        output_order: params.output_order,
        exclude_home_department: params.exclude_home_department,
        include_pending: params.include_pending,
    })
}

pub fn build_result(
    formula_id: String,
    outcomes: Vec<AssignmentOutcome>,
    status: StatusReport,
    skipped: Vec<SkippedStudent>,
) -> Result<(ResultDoc, String), PipelineError> {
    if status.summary.students as usize != outcomes.len() {
        return Err(PipelineError::Build(format!(
            "summary counts {} students but {} outcomes were built",
            status.summary.students,
            outcomes.len()
        )));
    }

    let noid = ResultNoId {
        formula_id: &formula_id,
        summary: &status.summary,
        outcomes: &outcomes,
        departments: &status.departments,
        skipped: &skipped,
    };
    let id = hasher::res_id_from_canonical(&noid)?;

    let doc = ResultDoc {
        id,
        formula_id,
        summary: status.summary,
        outcomes,
        departments: status.departments,
        skipped,
    };
    // digest of the file as written, id included
    let sha = hasher::sha256_canonical(&doc)?;
    Ok((doc, sha))
}

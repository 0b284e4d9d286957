//! BUILD_RUN_RECORD: provenance for one run.
//!
//! - Run ID = `RUN:<timestamp>-<sha256>` over the canonical id-less record.
//! - Inputs are echoed by digest; parameters are echoed in full, with the
//!   seed present only when the group order is `seeded`.
//! - Outputs carry the result id and digest, plus the trace digest when a
//!   trace file is produced.

use serde::{Deserialize, Serialize};

use ea_core::{AllocParams, GroupOrder, OutputOrder, ResultId, RunId};
use ea_io::{hasher, loader::InputDigests};

use crate::{EngineMeta, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsEcho {
    pub group_order: GroupOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_seed: Option<u64>,
    pub output_order: OutputOrder,
    pub max_preferences: u32,
    pub exclude_home_department: bool,
    pub include_pending: bool,
}

impl From<&AllocParams> for ParamsEcho {
    fn from(p: &AllocParams) -> Self {
        Self {
            group_order: p.group_order,
            group_seed: match p.group_order {
                GroupOrder::Seeded => p.group_seed,
                _ => None,
            },
            output_order: p.output_order,
            max_preferences: p.max_preferences,
            exclude_home_department: p.exclude_home_department,
            include_pending: p.include_pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutputs {
    pub result_id: ResultId,
    pub result_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecordDoc {
    pub id: RunId,
    pub timestamp_utc: String,
    pub engine: EngineMeta,
    pub formula_id: String,
    pub inputs: InputDigests,
    pub params: ParamsEcho,
    pub outputs: RunOutputs,
}

/// Everything the record needs; `timestamp_utc` is normalized here.
#[derive(Debug, Clone)]
pub struct RunRecordInputs {
    pub timestamp_utc: String,
    pub engine: EngineMeta,
    pub formula_id: String,
    pub inputs: InputDigests,
    pub params: ParamsEcho,
    pub outputs: RunOutputs,
}

#[derive(Serialize)]
struct RunNoId<'a> {
    timestamp_utc: &'a str,
    engine: &'a EngineMeta,
    formula_id: &'a str,
    inputs: &'a InputDigests,
    params: &'a ParamsEcho,
    outputs: &'a RunOutputs,
}

pub fn build_run_record(inp: RunRecordInputs) -> Result<RunRecordDoc, PipelineError> {
    let ts = hasher::normalize_timestamp_utc(&inp.timestamp_utc)?;
    if !ea_core::ids::is_valid_sha256(&inp.formula_id) {
        return Err(PipelineError::Build(format!("formula id is not 64-hex: {}", inp.formula_id)));
    }

    let body = RunNoId {
        timestamp_utc: &ts,
        engine: &inp.engine,
        formula_id: &inp.formula_id,
        inputs: &inp.inputs,
        params: &inp.params,
        outputs: &inp.outputs,
    };
    let id = hasher::run_id_from_canonical(&ts, &body)?;

    Ok(RunRecordDoc {
        id,
        timestamp_utc: ts,
        engine: inp.engine,
        formula_id: inp.formula_id,
        inputs: inp.inputs,
        params: inp.params,
        outputs: inp.outputs,
    })
}

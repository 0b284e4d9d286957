//! ea_pipeline: deterministic pipeline surface
//! (load → validate → prepare → allocate → verify → build_result → build_run_record).
//!
//! JSON, schema and hashing go through `ea_io`; allocation goes through
//! `ea_algo`. This crate only sequences the stages, logs them, and shapes
//! the artifacts.

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use ea_algo::{AllocationTrace, InvariantViolation};
use ea_core::GroupOrder;
use ea_io::{canonical_json::write_canonical_file, hasher, loader::InputPaths, IoError};

pub mod build_result;
pub mod build_run_record;
pub mod load;
pub mod prepare;
pub mod validate;

pub use build_result::{compute_formula_id, ResultDoc};
pub use build_run_record::{ParamsEcho, RunOutputs, RunRecordDoc};
pub use prepare::{Prepared, SkipReason, SkippedStudent};
pub use validate::{EntityRef, Severity, ValidationIssue, ValidationReport};

/// Artifact file names inside the output directory.
pub const RESULT_FILE: &str = "result.json";
pub const RUN_RECORD_FILE: &str = "run_record.json";
pub const TRACE_FILE: &str = "allocation_trace.json";

/// Engine identifiers recorded in every run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub build: String,
}

pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        vendor: "ea".to_string(),
        name: "ea_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: if cfg!(debug_assertions) { "dev" } else { "release" }.to_string(),
    }
}

/// Where inputs come from.
#[derive(Debug, Clone)]
pub enum InputSource {
    Manifest(PathBuf),
    Paths(InputPaths),
}

/// Command-line style overrides applied on top of `params.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamOverrides {
    pub group_order: Option<GroupOrder>,
    /// A seed without an explicit order switches the run to `seeded`.
    pub group_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PipelineCtx {
    pub inputs: InputSource,
    pub overrides: ParamOverrides,
    pub engine: EngineMeta,
    /// Fixed timestamp for the run record; the current time when `None`.
    pub timestamp_utc: Option<String>,
    /// Hash the trace into the run record (and expect it to be written).
    pub emit_trace: bool,
}

impl PipelineCtx {
    pub fn new(inputs: InputSource) -> Self {
        Self {
            inputs,
            overrides: ParamOverrides::default(),
            engine: engine_identifiers(),
            timestamp_utc: None,
            emit_trace: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub result: ResultDoc,
    pub run_record: RunRecordDoc,
    pub trace: AllocationTrace,
    /// Report that let the run through (warnings only).
    pub validation: ValidationReport,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("parameter error: {0}")]
    Schema(String),

    #[error("validation failed with {} error(s)", .0.error_count())]
    Validate(ValidationReport),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("build error: {0}")]
    Build(String),
}

// -------------------------------------- Public API --------------------------------------

/// LOAD + VALIDATE only. Returns the report whether or not it passes.
pub fn validate_only(ctx: &PipelineCtx) -> Result<ValidationReport, PipelineError> {
    let loaded = load::load(&ctx.inputs, &ctx.overrides)?;
    let report = validate::validate(&loaded.students, &loaded.departments, &loaded.params);
    log_report(&report);
    Ok(report)
}

/// Run every stage and return the artifacts (nothing is written).
pub fn run(ctx: &PipelineCtx) -> Result<PipelineOutputs, PipelineError> {
    // ---- LOAD ----
    let loaded = load::load(&ctx.inputs, &ctx.overrides)?;

    // ---- VALIDATE ----
    let report = validate::validate(&loaded.students, &loaded.departments, &loaded.params);
    log_report(&report);
    if !report.pass {
        return Err(PipelineError::Validate(report));
    }

    // ---- PREPARE ----
    let prepared = prepare::prepare(&loaded.students, &loaded.params);
    info!(
        stage = "prepare",
        eligible = prepared.students.len(),
        skipped = prepared.skipped.len(),
        "students prepared"
    );

    // ---- ALLOCATE ----
    let config = loaded
        .params
        .allocation_config()
        .map_err(|e| PipelineError::Schema(e.to_string()))?;
    let run = ea_algo::allocate_with_trace(&prepared.students, &loaded.departments, &config);
    for (round, visit) in run
        .trace
        .rounds
        .iter()
        .flat_map(|r| r.visits.iter().map(move |v| (r.round, v)))
    {
        debug!(
            round,
            group = %visit.group,
            roll_number = %visit.roll_number,
            reason = %visit.reason,
            "placement"
        );
    }
    info!(
        stage = "allocate",
        group_order = %config.group_order,
        rounds = run.trace.rounds_run,
        visited = run.trace.students_visited,
        "allocation finished"
    );

    // ---- VERIFY ----
    ea_algo::verify_outcomes(&prepared.students, &loaded.departments, &run.outcomes)?;

    // ---- BUILD_RESULT ----
    let formula_id = compute_formula_id(&loaded.params)?;
    let status = ea_algo::department_status(&loaded.departments, &run.outcomes);
    let (result, result_sha256) =
        build_result::build_result(formula_id.clone(), run.outcomes, status, prepared.skipped)?;
    info!(
        stage = "build_result",
        id = %result.id,
        assigned = result.summary.assigned,
        unassigned = result.summary.unassigned,
        "result built"
    );

    // ---- BUILD_RUN_RECORD ----
    let trace_sha256 = if ctx.emit_trace {
        Some(hasher::sha256_canonical(&run.trace)?)
    } else {
        None
    };
    let timestamp = match &ctx.timestamp_utc {
        Some(ts) => hasher::normalize_timestamp_utc(ts)?,
        None => hasher::now_timestamp_utc(),
    };
    let run_record = build_run_record::build_run_record(build_run_record::RunRecordInputs {
        timestamp_utc: timestamp,
        engine: ctx.engine.clone(),
        formula_id,
        inputs: loaded.digests,
        params: ParamsEcho::from(&loaded.params),
        outputs: RunOutputs {
            result_id: result.id.clone(),
            result_sha256,
            trace_sha256,
        },
    })?;
    info!(stage = "build_run_record", id = %run_record.id, "run record built");

    Ok(PipelineOutputs {
        result,
        run_record,
        trace: run.trace,
        validation: report,
    })
}

/// Write `result.json`, `run_record.json`, and (when asked) the trace into `out_dir`.
pub fn write_outputs(
    out_dir: &Path,
    outputs: &PipelineOutputs,
    with_trace: bool,
) -> Result<Vec<PathBuf>, PipelineError> {
    std::fs::create_dir_all(out_dir).map_err(|e| IoError::Write {
        path: out_dir.display().to_string(),
        msg: e.to_string(),
    })?;

    let mut written = Vec::with_capacity(3);
    let result_path = out_dir.join(RESULT_FILE);
    write_canonical_file(&result_path, &outputs.result)?;
    written.push(result_path);

    let record_path = out_dir.join(RUN_RECORD_FILE);
    write_canonical_file(&record_path, &outputs.run_record)?;
    written.push(record_path);

    if with_trace {
        let trace_path = out_dir.join(TRACE_FILE);
        write_canonical_file(&trace_path, &outputs.trace)?;
        written.push(trace_path);
    }
    info!(dir = %out_dir.display(), files = written.len(), "artifacts written");
    Ok(written)
}

fn log_report(report: &ValidationReport) {
    for issue in &report.issues {
        match issue.severity {
            Severity::Error => error!(code = issue.code, at = %issue.where_, "{}", issue.message),
            Severity::Warning => warn!(code = issue.code, at = %issue.where_, "{}", issue.message),
        }
    }
    info!(
        stage = "validate",
        pass = report.pass,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation finished"
    );
}

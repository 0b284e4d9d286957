//! Loader: read local JSON inputs (manifest → roster → departments → params),
//! validate each against its embedded schema, deserialise into typed values,
//! and compute canonical digests. No network I/O.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use ea_core::{AllocParams, DepartmentSnapshot, StudentRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hasher::sha256_canonical_value;
use crate::manifest::{load_and_resolve_manifest, verify_digests};
use crate::schema::{validate_value, SchemaKind};
use crate::IoError;

/// Per-file read limit.
pub const MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

// ----------------------------- Wire-facing types -----------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub students: Vec<StudentRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentsFile {
    pub departments: Vec<DepartmentSnapshot>,
}

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub roster: PathBuf,
    pub departments: PathBuf,
    pub params: Option<PathBuf>,
}

/// SHA-256 of each input's canonical JSON bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigests {
    pub roster_sha256: String,
    pub departments_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_sha256: Option<String>,
}

/// Typed, schema-checked inputs for the pipeline.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub students: Vec<StudentRequest>,
    pub departments: Vec<DepartmentSnapshot>,
    /// Defaults when no params file was supplied.
    pub params: AllocParams,
    pub digests: InputDigests,
}

// ----------------------------- Orchestration -----------------------------

/// Manifest → resolve → load → verify declared digests.
pub fn load_all_from_manifest(manifest_path: &Path) -> Result<LoadedInputs, IoError> {
    let resolved = load_and_resolve_manifest(manifest_path)?;
    let loaded = load_inputs(&InputPaths {
        roster: resolved.roster_path.clone(),
        departments: resolved.departments_path.clone(),
        params: resolved.params_path.clone(),
    })?;
    verify_digests(
        &resolved,
        &loaded.digests.roster_sha256,
        &loaded.digests.departments_sha256,
        loaded.digests.params_sha256.as_deref(),
    )?;
    Ok(loaded)
}

/// Load explicit paths.
pub fn load_inputs(paths: &InputPaths) -> Result<LoadedInputs, IoError> {
    let (students, roster_sha256) = load_roster(&paths.roster)?;
    let (departments, departments_sha256) = load_departments(&paths.departments)?;
    let (params, params_sha256) = match &paths.params {
        Some(p) => {
            let (params, digest) = load_params(p)?;
            (params, Some(digest))
        }
        None => (AllocParams::default(), None),
    };

    Ok(LoadedInputs {
        students,
        departments,
        params,
        digests: InputDigests {
            roster_sha256,
            departments_sha256,
            params_sha256,
        },
    })
}

// ----------------------------- Targeted loaders -----------------------------

/// Roster in file order, plus its canonical digest.
pub fn load_roster(path: &Path) -> Result<(Vec<StudentRequest>, String), IoError> {
    let (file, digest): (RosterFile, String) = load_checked(path, SchemaKind::Roster)?;
    Ok((file.students, digest))
}

pub fn load_departments(path: &Path) -> Result<(Vec<DepartmentSnapshot>, String), IoError> {
    let (file, digest): (DepartmentsFile, String) = load_checked(path, SchemaKind::Departments)?;
    Ok((file.departments, digest))
}

pub fn load_params(path: &Path) -> Result<(AllocParams, String), IoError> {
    load_checked(path, SchemaKind::Params)
}

fn load_checked<T: for<'de> Deserialize<'de>>(path: &Path, kind: SchemaKind) -> Result<(T, String), IoError> {
    let v = read_json_value_with_limits(path)?;
    validate_value(kind, &v)?;
    let digest = sha256_canonical_value(&v)?;
    let typed: T = serde_json::from_value(v).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })?;
    Ok((typed, digest))
}

// ----------------------------- Raw reading -----------------------------

/// Read a UTF-8 JSON file (BOM tolerated) into a `Value`, capped at `MAX_INPUT_BYTES`.
pub fn read_json_value_with_limits(path: &Path) -> Result<Value, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        msg: e.to_string(),
    };
    let f = File::open(path).map_err(read_err)?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1).read_to_end(&mut buf).map_err(read_err)?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Limit(format!(
            "{} exceeds {MAX_INPUT_BYTES} bytes",
            path.display()
        )));
    }
    let body = buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&buf[..]);
    serde_json::from_slice(body).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })
}

// ----------------------------- Tests -----------------------------

//! Deterministic hashing and ID builders for canonical artifacts.
//!
//! - Use `sha256_canonical(..)` for JSON **values/structs** (goes through canonical_json).
//! - Use `sha256_hex(..)` or `sha256_file(..)` for **raw bytes/files**.
//! - `RES:` ids hash the canonical result body; `RUN:` ids prefix an RFC 3339
//!   UTC timestamp (seconds, `Z`) to a hash of the canonical run body.
//! - Hex digests are lowercase.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use ea_core::ids::{ResultId, RunId};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json::{to_canonical_bytes, value_to_canonical_bytes};
use crate::IoError;

/* ------------------------------- Raw hashing ------------------------------- */

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over a file's raw bytes (streamed).
pub fn sha256_file(path: &Path) -> Result<String, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        msg: e.to_string(),
    };
    let mut r = BufReader::new(File::open(path).map_err(read_err)?);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = r.read(&mut buf).map_err(read_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/* ---------------------------- Canonical hashing ---------------------------- */

pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

pub fn sha256_canonical_value(v: &Value) -> Result<String, IoError> {
    Ok(sha256_hex(&value_to_canonical_bytes(v)?))
}

/* ---------------------------- Artifact ID builders ---------------------------- */

/// `RES:<hex>` over the canonical bytes of the id-less result body.
pub fn res_id_from_canonical<T: Serialize>(value: &T) -> Result<ResultId, IoError> {
    let hex = sha256_canonical(value)?;
    format!("RES:{hex}")
        .parse()
        .map_err(|e| IoError::Hash(format!("result id: {e}")))
}

/// Normalize any RFC 3339 timestamp to UTC seconds with a trailing `Z`.
/// Offsets are converted; fractional seconds are truncated.
pub fn normalize_timestamp_utc(ts: &str) -> Result<String, IoError> {
    let dt = DateTime::parse_from_rfc3339(ts.trim())
        .map_err(|e| IoError::Hash(format!("invalid timestamp {ts:?}: {e}")))?;
    Ok(dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Current time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn now_timestamp_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `RUN:<ts>-<hex>` where `<hex>` hashes the canonical run body.
pub fn run_id_from_canonical<T: Serialize>(timestamp_utc: &str, run_body: &T) -> Result<RunId, IoError> {
    let ts = normalize_timestamp_utc(timestamp_utc)?;
    let hex = sha256_canonical(run_body)?;
    format!("RUN:{ts}-{hex}")
        .parse()
        .map_err(|e| IoError::Hash(format!("run id: {e}")))
}

/* ------------------------------------ Tests ------------------------------------ */

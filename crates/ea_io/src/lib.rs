//! ea_io: offline I/O for the elective allocation engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Canonical JSON (sorted keys, compact) and atomic writes.
//! - SHA-256 digests and `RES:`/`RUN:` id builders.
//! - Manifest resolution (offline paths only) and schema-checked loaders.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for ea_io.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("read error at {path}: {msg}")]
    Read { path: String, msg: String },

    #[error("write error at {path}: {msg}")]
    Write { path: String, msg: String },

    /// JSON parse/deserialize failure with a JSON Pointer hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// First schema violation, located by JSON Pointer into the instance.
    #[error("schema error at {pointer}: {msg}")]
    Schema { pointer: String, msg: String },

    #[error("manifest error: {0}")]
    Manifest(String),

    /// A declared expectation (e.g. input digest) did not hold.
    #[error("expectation failed: {0}")]
    Expect(String),

    #[error("canonicalization error: {0}")]
    Canon(String),

    #[error("hash error: {0}")]
    Hash(String),

    #[error("path error: {0}")]
    Path(String),

    #[error("input too large: {0}")]
    Limit(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column, not a pointer
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod manifest;
pub mod schema;

/// Returns true if `s` looks like a URL (any `<scheme>://`, plus bare http(s):).
#[inline]
pub fn looks_like_url(s: &str) -> bool {
    let t = s.trim();
    t.contains("://") || t.starts_with("http:") || t.starts_with("https:")
}

pub mod prelude {
    pub use crate::{looks_like_url, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{sha256_canonical, sha256_hex};
    pub use crate::loader::{load_inputs, InputDigests, InputPaths, LoadedInputs};
}

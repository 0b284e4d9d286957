//! Manifest: where the run's inputs live, plus optional expected digests.
//!
//! - Inputs are local paths only; any URL scheme is rejected.
//! - Relative paths resolve against the manifest's directory.
//! - Digests (if provided) are lowercase 64-hex over the input's canonical
//!   JSON bytes, and may only be given for inputs that are present.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use ea_core::ids::is_valid_sha256;
use serde::{Deserialize, Serialize};

use crate::{looks_like_url, IoError};

const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub roster_path: String,
    pub departments_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_sha256: Option<ManifestDigests>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDigests {
    #[serde(default)]
    pub roster_path: Option<String>,
    #[serde(default)]
    pub departments_path: Option<String>,
    #[serde(default)]
    pub params_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub roster_path: PathBuf,
    pub departments_path: PathBuf,
    pub params_path: Option<PathBuf>,
    pub digests: Option<ManifestDigests>,
}

// ---------- validation (shape, offline policy) ----------

/// Shape and offline checks. No I/O.
pub fn validate_manifest(man: &Manifest) -> Result<(), IoError> {
    check_path("roster_path", &man.roster_path)?;
    check_path("departments_path", &man.departments_path)?;
    if let Some(p) = &man.params_path {
        check_path("params_path", p)?;
    }

    if let Some(d) = &man.inputs_sha256 {
        for (label, h) in [
            ("roster_path", &d.roster_path),
            ("departments_path", &d.departments_path),
            ("params_path", &d.params_path),
        ] {
            if let Some(h) = h {
                if !is_valid_sha256(h) {
                    return Err(IoError::Manifest(format!("invalid sha256 for {label}: {h}")));
                }
            }
        }
        if d.params_path.is_some() && man.params_path.is_none() {
            return Err(IoError::Manifest("digest supplied for missing input: params_path".into()));
        }
    }
    Ok(())
}

fn check_path(label: &str, path: &str) -> Result<(), IoError> {
    if path.trim().is_empty() {
        return Err(IoError::Manifest(format!("{label} must not be empty")));
    }
    if looks_like_url(path) {
        return Err(IoError::Manifest(format!("{label} must be a local path, got {path}")));
    }
    Ok(())
}

// ---------- resolution ----------

#[inline]
fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn must_exist_file(label: &str, p: &Path) -> Result<(), IoError> {
    let md = fs::metadata(p).map_err(|e| IoError::Path(format!("{label}: {} ({e})", p.display())))?;
    if !md.is_file() {
        return Err(IoError::Path(format!("{label}: not a file: {}", p.display())));
    }
    Ok(())
}

/// Join each path under `base_dir` and check that it is an existing file.
pub fn resolve_paths(base_dir: &Path, man: &Manifest) -> Result<ResolvedManifest, IoError> {
    let roster = join_under(base_dir, &man.roster_path);
    let departments = join_under(base_dir, &man.departments_path);
    let params = man.params_path.as_deref().map(|s| join_under(base_dir, s));

    must_exist_file("roster_path", &roster)?;
    must_exist_file("departments_path", &departments)?;
    if let Some(p) = &params {
        must_exist_file("params_path", p)?;
    }

    Ok(ResolvedManifest {
        roster_path: roster,
        departments_path: departments,
        params_path: params,
        digests: man.inputs_sha256.clone(),
    })
}

// ---------- load + verify ----------

/// Read, validate and resolve a manifest file. Digests are not checked here.
pub fn load_and_resolve_manifest(manifest_path: &Path) -> Result<ResolvedManifest, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: manifest_path.display().to_string(),
        msg: e.to_string(),
    };
    let f = fs::File::open(manifest_path).map_err(read_err)?;
    let mut buf = Vec::new();
    f.take(MAX_MANIFEST_BYTES + 1).read_to_end(&mut buf).map_err(read_err)?;
    if buf.len() as u64 > MAX_MANIFEST_BYTES {
        return Err(IoError::Limit(format!(
            "manifest exceeds {MAX_MANIFEST_BYTES} bytes: {}",
            manifest_path.display()
        )));
    }

    let man: Manifest = serde_json::from_slice(&buf)
        .map_err(|e| IoError::Manifest(format!("{}: {e}", manifest_path.display())))?;
    validate_manifest(&man)?;

    let base = match manifest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    resolve_paths(&base, &man)
}

/// Compare declared digests against the canonical-JSON digests actually loaded.
pub fn verify_digests(
    resolved: &ResolvedManifest,
    roster_sha256: &str,
    departments_sha256: &str,
    params_sha256: Option<&str>,
) -> Result<(), IoError> {
    let Some(d) = &resolved.digests else { return Ok(()); };

    fn check(label: &str, want: &Option<String>, got: Option<&str>) -> Result<(), IoError> {
        match (want, got) {
            (Some(w), Some(g)) if w != g => Err(IoError::Expect(format!(
                "sha256 mismatch for {label}: expected={w} got={g}"
            ))),
            (Some(_), None) => Err(IoError::Expect(format!("digest supplied for missing input: {label}"))),
            _ => Ok(()),
        }
    }

    check("roster_path", &d.roster_path, Some(roster_sha256))?;
    check("departments_path", &d.departments_path, Some(departments_sha256))?;
    check("params_path", &d.params_path, params_sha256)?;
    Ok(())
}

// crates/ea_cli/src/args.rs
//
// Offline, deterministic CLI argument surface.
// - No networked paths (any scheme:// and bare http:/https:/file: are rejected)
// - Exactly one of: --manifest  XOR  (--roster + --departments [+ --params])
// - Seed override accepts u64 decimal or 0x-hex (up to 16 nybbles)

use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};

use ea_core::GroupOrder;
use ea_io::loader::InputPaths;
use ea_pipeline::{InputSource, ParamOverrides};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "ea",
    version,
    disable_help_subcommand = true,
    about = "Offline, deterministic elective allocation"
)]
pub struct Cli {
    /// Only warnings and errors on stderr; no summary on stdout.
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Load, validate, allocate, and write artifacts.
    Run(RunArgs),
    /// Load and validate inputs only.
    Validate(ValidateArgs),
}

#[derive(Debug, ClapArgs, Clone)]
pub struct InputArgs {
    /// Manifest JSON naming the input files (exclusive with explicit file flags).
    #[arg(long, conflicts_with_all = ["roster", "departments", "params"])]
    pub manifest: Option<PathBuf>,

    /// Roster JSON (`{"students": [...]}`).
    #[arg(long, required_unless_present = "manifest")]
    pub roster: Option<PathBuf>,

    /// Departments JSON (`{"departments": [...]}`).
    #[arg(long, required_unless_present = "manifest")]
    pub departments: Option<PathBuf>,

    /// Allocation parameters JSON; defaults apply when omitted.
    #[arg(long)]
    pub params: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output directory for result.json / run_record.json.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Group order seed. Decimal u64 or 0x-hex. Implies `--group-order seeded`
    /// unless another order is given.
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// lexicographic | first_seen | seeded
    #[arg(long, value_parser = parse_group_order)]
    pub group_order: Option<GroupOrder>,

    /// Also write allocation_trace.json.
    #[arg(long)]
    pub trace: bool,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    NonLocalPath(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Missing(s) => write!(f, "missing required flag: {s}"),
            CliError::NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
        }
    }
}

impl std::error::Error for CliError {}

pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

pub fn parse_group_order(s: &str) -> Result<GroupOrder, String> {
    s.trim().parse::<GroupOrder>().map_err(|_| {
        let names: Vec<&str> = GroupOrder::ALL.iter().map(|g| g.as_token()).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    ea_io::looks_like_url(&lower) || lower.starts_with("file:")
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

impl InputArgs {
    fn paths(&self) -> impl Iterator<Item = &Path> {
        [
            self.manifest.as_deref(),
            self.roster.as_deref(),
            self.departments.as_deref(),
            self.params.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Scheme checks, then the pipeline's view of where inputs live.
    pub fn to_source(&self) -> Result<InputSource, CliError> {
        for p in self.paths() {
            ensure_local_path(p)?;
        }
        if let Some(m) = &self.manifest {
            return Ok(InputSource::Manifest(m.clone()));
        }
        Ok(InputSource::Paths(InputPaths {
            roster: self.roster.clone().ok_or(CliError::Missing("--roster"))?,
            departments: self.departments.clone().ok_or(CliError::Missing("--departments"))?,
            params: self.params.clone(),
        }))
    }
}

impl RunArgs {
    pub fn overrides(&self) -> ParamOverrides {
        ParamOverrides {
            group_order: self.group_order,
            group_seed: self.seed,
        }
    }

    pub fn check_out_dir(&self) -> Result<(), CliError> {
        ensure_local_path(&self.out)
    }
}

// crates/ea_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup, and the two modes:
// `ea run` (pipeline → artifacts) and `ea validate` (load + report only).

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    /// Schema, manifest, parameter, or validation-report errors.
    pub const VALIDATION: u8 = 2;
    /// Invariant violation or declared digest mismatch.
    pub const SELF_VERIFY: u8 = 3;
    pub const IO: u8 = 4;
    pub const OTHER: u8 = 5;
}

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{Cli, CliError, Command, RunArgs, ValidateArgs};
use ea_io::IoError;
use ea_pipeline::{PipelineCtx, PipelineError, ValidationReport};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    SelfVerify(String),
    Io(String),
    Other(String),
}

impl MainError {
    fn code(&self) -> u8 {
        match self {
            MainError::Validation(_) => exitcodes::VALIDATION,
            MainError::SelfVerify(_) => exitcodes::SELF_VERIFY,
            MainError::Io(_) => exitcodes::IO,
            MainError::Other(_) => exitcodes::OTHER,
        }
    }

    fn message(&self) -> &str {
        match self {
            MainError::Validation(m) | MainError::SelfVerify(m) | MainError::Io(m) | MainError::Other(m) => m,
        }
    }
}

impl From<CliError> for MainError {
    fn from(e: CliError) -> Self {
        MainError::Validation(e.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let res = match &cli.command {
        Command::Run(a) => run_once(a, cli.quiet),
        Command::Validate(a) => validate_only(a, cli.quiet),
    };
    match res {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("ea: error: {}", e.message());
            ExitCode::from(e.code())
        }
    }
}

/// `RUST_LOG` wins unless `--quiet`; otherwise `ea=info`.
fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("ea=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ea=info"))
    };
    // Logs go to stderr; stdout carries the summary only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_once(args: &RunArgs, quiet: bool) -> Result<(), MainError> {
    args.check_out_dir()?;
    let mut ctx = PipelineCtx::new(args.inputs.to_source()?);
    ctx.overrides = args.overrides();
    ctx.emit_trace = args.trace;

    let outs = match ea_pipeline::run(&ctx) {
        Ok(o) => o,
        Err(PipelineError::Validate(report)) => {
            print_report(&report, true);
            return Err(MainError::Validation(format!(
                "validation failed with {} error(s)",
                report.error_count()
            )));
        }
        Err(e) => return Err(map_pipeline_err(e)),
    };
    let written = ea_pipeline::write_outputs(&args.out, &outs, args.trace).map_err(map_pipeline_err)?;
    info!(files = written.len(), "run complete");

    if !quiet {
        let s = outs.result.summary;
        println!("result: {}", outs.result.id);
        println!("run:    {}", outs.run_record.id);
        println!(
            "students: {}  assigned: {}  unassigned: {}  skipped: {}",
            s.students,
            s.assigned,
            s.unassigned,
            outs.result.skipped.len()
        );
        for d in &outs.result.departments {
            println!("  {:<16} enrolled {}/{}", d.id.as_str(), d.final_occupied, d.capacity);
        }
        println!("artifacts written to {}", args.out.display());
    }
    Ok(())
}

fn validate_only(args: &ValidateArgs, quiet: bool) -> Result<(), MainError> {
    let ctx = PipelineCtx::new(args.inputs.to_source()?);
    let report = ea_pipeline::validate_only(&ctx).map_err(map_pipeline_err)?;

    if args.json {
        let s = serde_json::to_string_pretty(&report).map_err(|e| MainError::Other(e.to_string()))?;
        println!("{s}");
    } else if !quiet || !report.pass {
        print_report(&report, false);
    }
    if report.pass {
        Ok(())
    } else {
        Err(MainError::Validation(format!(
            "validation failed with {} error(s)",
            report.error_count()
        )))
    }
}

fn print_report(report: &ValidationReport, to_stderr: bool) {
    let mut lines: Vec<String> = report
        .issues
        .iter()
        .map(|i| format!("{} {} {}: {}", i.severity, i.code, i.where_, i.message))
        .collect();
    lines.push(format!(
        "{}: {} error(s), {} warning(s)",
        if report.pass { "PASS" } else { "FAIL" },
        report.error_count(),
        report.warning_count()
    ));
    for l in lines {
        if to_stderr {
            eprintln!("{l}");
        } else {
            println!("{l}");
        }
    }
}

fn map_io_err(e: IoError) -> MainError {
    use IoError::*;
    match e {
        Schema { .. } | Json { .. } | Manifest(_) => MainError::Validation(e.to_string()),
        Expect(_) => MainError::SelfVerify(e.to_string()),
        Read { .. } | Write { .. } | Path(_) | Limit(_) => MainError::Io(e.to_string()),
        Canon(_) | Hash(_) => MainError::Other(e.to_string()),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Schema(_) | PipelineError::Validate(_) => MainError::Validation(e.to_string()),
        PipelineError::Invariant(_) => MainError::SelfVerify(e.to_string()),
        PipelineError::Build(_) => MainError::Other(e.to_string()),
    }
}

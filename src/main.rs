//! Binary entry point for the `memcomp` measurement harness.
//!
//! Corresponds to `original_source/src/driver.c::main`: parse arguments,
//! resolve a [`RunConfig`], measure the input file, print the CSV report.

use anyhow::Context;
use clap::Parser;

use memcomp::cli::args::Args;
use memcomp::cli::constants::set_display_level;
use memcomp::{displaylevel, driver, MeasurementError};

/// Runs the measurement end-to-end, matching `lz4r::main`'s use of
/// `anyhow` at the CLI boundary to add context around a structured error.
fn run(args: Args) -> anyhow::Result<()> {
    let file = args.file.clone();
    let config = args.into_config().context("invalid arguments")?;

    displaylevel!(3, "measuring {} with {} threads\n", file.display(), config.threads);

    let report = driver::measure_file(&file, config.clone())
        .with_context(|| format!("failed to measure {}", file.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report.write(&mut out, &config).context("failed to write report")?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    if args.quiet {
        set_display_level(1);
    }

    if let Err(err) = run(args) {
        eprintln!("memcomp: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

/// Maps a failure's root cause to a process exit code. Parse/config errors
/// (bad input, bad flags) exit 1; a codec round-trip or decoder failure
/// under `-v` exits 2, distinguishing "this input is unmeasurable" from
/// "this build has a codec bug"; anything else (e.g. a report-write I/O
/// failure) falls back to 1.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<MeasurementError>() {
        Some(MeasurementError::CodecFailure { .. })
        | Some(MeasurementError::InvalidOpcode { .. })
        | Some(MeasurementError::InvalidBitstream { .. }) => 2,
        _ => 1,
    }
}

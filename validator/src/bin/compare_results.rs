// SPDX-License-Identifier: AGPL-3.0-only

//! GFCC result regression gate.
//!
//! Compares every result document in a reference directory against the
//! same-named document in a current directory.
//!
//! # Checks (per case, in order)
//!
//! | Check | Tolerance |
//! |-------|-----------|
//! | `SCF.final_energy` | rel 1e-9 |
//! | `CCSD.final_energy.correlation` | rel `input.CCSD.threshold` (reference) |
//! | `retarded_alpha.nlevels` | exact |
//! | `level{i}.omega_npts` | exact |
//! | `level{i}.{j}.omega` | rel 1e-9 |
//! | `level{i}.{j}.A_a` | rel `input.GFCCSD.gf_threshold` (reference) |
//!
//! # Exit codes
//!
//! 0 if every case matches (nothing is printed), 1 on the first failure
//! (one `ERROR` line on stdout) or on bad usage.
//!
//! # Usage
//!
//! ```bash
//! compare_results ci/reference_results build/results
//! RUST_LOG=gfcc_validator=trace compare_results ref cur   # every check on stderr
//! ```

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use gfcc_validator::compare_directories;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "\nUsage: compare_results reference_results_path current_results_path";

/// Compare GFCC result documents against a reference result set
#[derive(Parser, Debug)]
#[command(name = "compare_results", version, about)]
struct Args {
    /// Directory holding the reference result documents
    reference: PathBuf,

    /// Directory holding the freshly computed result documents
    current: PathBuf,

    /// Log progress to stderr (-v info, -vv debug, -vvv every check)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            println!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.verbose);

    match compare_directories(&args.reference, &args.current) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}

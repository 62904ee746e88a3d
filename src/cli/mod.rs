//! Command line interface for msi_creator.
//!
//! Exit codes: 0 on success or help, 1 on usage errors and failed builds.
//! Configuration problems are reported on standard output, build failures
//! on standard error.

mod args;

pub use args::{Args, normalize_args};

use crate::{
    bundler::Bundler,
    error::{BundlerError, Result},
};
use clap::{Parser, error::ErrorKind};
use std::ffi::OsString;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    run_with(std::env::args_os()).await
}

/// Runs the tool over an explicit argument vector (first item is the program name).
///
/// Usage problems are reported here and turned into exit code 1; build
/// failures propagate as errors.
pub async fn run_with<I, T>(argv: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv = match normalize_args(argv) {
        Ok(argv) => argv,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run with -Help for usage.");
            return Ok(1);
        }
    };

    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
                _ => 1,
            };
            e.print()?;
            return Ok(code);
        }
    };

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            println!("{e}");
            return Ok(1);
        }
    };

    let report = config.validate();
    if !report.is_valid() {
        println!(
            "Missing or invalid required arguments: {}",
            report.missing_fields().join(", ")
        );
        println!("Run with -Help for usage.");
        return Ok(1);
    }

    let bundled = match Bundler::new(config) {
        Ok(bundler) => bundler.bundle().await,
        Err(e) => Err(e),
    };
    match bundled.map_err(BundlerError::from) {
        Ok(artifact) => {
            println!("{}", artifact.path.display());
            Ok(0)
        }
        Err(e) if e.is_usage_error() => {
            println!("{e}");
            println!("Run with -Help for usage.");
            Ok(1)
        }
        Err(e) => Err(e),
    }
}

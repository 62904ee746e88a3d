//! msi_creator - Windows installer generator for pre-built binaries.
//!
//! This binary builds MSI (WiX) or EXE (NSIS) installers and prints the
//! absolute path of the result on success.

use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging; compiler output is logged at info under the tool's name
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match msi_creator::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}

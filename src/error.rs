//! Top-level error types for the command line tool.
//!
//! Domain errors live in [`crate::bundler::Error`]; this module wraps them
//! together with argument errors.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all command line operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// A flag was given without its value
    #[error("Missing value for argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Flag not recognized
    #[error("Unknown argument: {argument}")]
    UnknownArgument {
        /// Argument as given
        argument: String,
    },
}

impl BundlerError {
    /// Whether this error comes from the arguments rather than the build.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            BundlerError::Cli(_)
                | BundlerError::Bundler(crate::bundler::Error::InvalidConfiguration(_))
                | BundlerError::Bundler(crate::bundler::Error::MissingFields(_))
        )
    }
}

//! Error taxonomy for installer generation.
//!
//! Configuration problems, missing inputs, missing toolchains and external
//! compiler failures each get their own variant so the CLI can report them
//! precisely.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while describing or compiling an installer.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is present but unusable (bad GUID, bad version,
    /// unrecognized output kind, missing license file, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Validation found required fields missing or invalid.
    #[error("missing or invalid fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The source binary directory does not exist or is not a directory.
    #[error("source directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The external compiler could not be located.
    #[error("{tool} not found. {guidance}")]
    ToolchainUnavailable {
        /// Tool that was searched for
        tool: String,
        /// How to make the tool available
        guidance: String,
    },

    /// The external compiler ran and reported failure.
    #[error("{tool} failed with exit code {}:\n{diagnostic}", exit_code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()))]
    CompilationFailed {
        /// Tool that failed
        tool: String,
        /// Process exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Combined stdout/stderr of the tool, verbatim
        diagnostic: String,
    },

    /// A child process could not be spawned or awaited.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Command line that was attempted
        command: String,
        /// Underlying I/O error
        error: io::Error,
    },

    /// Filesystem operation failed on a known path.
    #[error("{context} ({}): {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        error: io::Error,
    },

    /// Bare I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Zip archive could not be read or extracted.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// NSIS template failed to render.
    #[error("failed to render NSIS script: {0}")]
    Template(#[from] handlebars::RenderError),

    /// WiX source failed to serialize.
    #[error("failed to write WiX source: {0}")]
    Xml(String),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

/// Attach filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps an I/O error with the operation being performed and its path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Turn `Option`s and foreign errors into [`Error::GenericError`].
pub trait Context<T> {
    /// Uses `msg` as the error message when the value is absent or failed.
    fn context<C: Display>(self, msg: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{msg}: {e}")))
    }
}

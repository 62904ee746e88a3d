//! Bundle orchestration and coordination.
//!
//! This module provides the main [`Bundler`] orchestrator that turns one
//! [`InstallerConfig`](crate::bundler::InstallerConfig) into one installer
//! artifact.
//!
//! # Overview
//!
//! The bundler:
//! 1. Validates the configuration
//! 2. Stages the binaries (directory as-is, zip extracted to a temp dir)
//! 3. Mirrors the directory tree
//! 4. Builds the WiX or NSIS description
//! 5. Runs the external compiler (or writes `.wxs` source)
//! 6. Returns a [`BundledArtifact`](crate::bundler::BundledArtifact) with size and checksum
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - Main [`Bundler`] struct
//! - [`process`] - External compiler execution with streamed output
//! - [`tool_detection`] - External tool location

mod checksum;
mod orchestrator;
pub(crate) mod process;
pub(crate) mod tool_detection;

pub use orchestrator::Bundler;

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Driver glue (§4.8): walks a source directory, shares one `SourceMap` /
//! `SemanticAnalyzer` across its fileset, and writes generated output files
//! rebased onto an output root.
//!
//! ## Module Organization
//!
//! - `driver` - file discovery, compilation, and emission

use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the compilation driver.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// I/O error while reading a source file or writing an output file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// Error loading `eproto.toml`.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub mod driver;

pub use driver::{emit, load_config, CompileSession, DefinitionsDump, EmitReport};

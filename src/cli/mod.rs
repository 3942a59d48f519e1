//! CLI support for prepper-expression
//!
//! Provides programmatic access to the `prepper` commands so they can be
//! embedded in other tools or tested without spawning a process.

mod check;
mod docs;
mod route;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use route::{RouteFile, RouteOptions, execute_route, parse_records};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Statement failed to compile
    #[error("Compile error: {0}")]
    Compile(#[from] crate::CompileError),

    /// Evaluation error
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    /// Route file could not be turned into a router
    #[error("Router error: {0}")]
    Router(#[from] crate::RouterError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// Unknown documentation category
    #[error("Unknown category: '{0}'\nRun 'prepper docs' to see available categories.")]
    UnknownCategory(String),
}

//! Compile and evaluate a single statement against JSON input

use super::CliError;
use crate::{Evaluator, Event, Statement, output::to_tree};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The statement to evaluate
    pub statement: String,
    /// JSON input string (one event)
    pub input: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Include the parsed tree in the result
    pub tree: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid { tree: Option<String> },
    /// Statement evaluated successfully
    Success {
        result: serde_json::Value,
        tree: Option<String>,
    },
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let statement = Statement::compile(&options.statement)?;
    let tree = options.tree.then(|| to_tree(statement.expr()));

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid { tree });
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str)?;
    let event = Event::from(json_value);

    let result = Evaluator::new().evaluate(statement.expr(), &event)?;

    Ok(CheckResult::Success {
        result: result.into(),
        tree,
    })
}

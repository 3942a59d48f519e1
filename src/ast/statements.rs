use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::Expr,
    lexer::{LexError, Position, tokenize},
    parser::{ParseError, Parser},
};

/// A compiled statement.
///
/// Holds the raw text together with its AST. A statement is parsed once and
/// can then be evaluated against any number of events, from any number of
/// threads.
///
/// # Example
/// ```text
/// /status == 200 and /service =~ "^svc-"
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    expr: Expr,
}

impl Statement {
    /// Tokenize and parse `text` into a statement.
    pub fn compile(text: &str) -> Result<Self, CompileError> {
        debug!(statement = text, "compiling statement");

        let tokens = tokenize(text).map_err(|e| CompileError::new(text, e.into()))?;
        let expr = Parser::new(tokens)
            .parse()
            .map_err(|e| CompileError::new(text, e.into()))?;

        Ok(Statement {
            text: text.to_string(),
            expr,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl std::str::FromStr for Statement {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statement::compile(s)
    }
}

/// What went wrong while compiling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CompileErrorKind {
    pub fn position(&self) -> Position {
        match self {
            CompileErrorKind::Lex(e) => e.position(),
            CompileErrorKind::Parse(e) => e.position(),
        }
    }
}

/// A statement that failed to compile, with the text it came from.
///
/// `Display` renders the error followed by a caret pointing at the
/// offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    statement: String,
    kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(statement: &str, kind: CompileErrorKind) -> Self {
        CompileError {
            statement: statement.to_string(),
            kind,
        }
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn kind(&self) -> &CompileErrorKind {
        &self.kind
    }

    pub fn position(&self) -> Position {
        self.kind.position()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.kind,
            self.position().caret(&self.statement)
        )
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            CompileErrorKind::Lex(e) => Some(e),
            CompileErrorKind::Parse(e) => Some(e),
        }
    }
}

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluator;
pub mod event;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod pointer;
pub mod router;
pub mod value;

pub use ast::{BinOp, CompileError, Expr, Statement, Token};
pub use evaluator::{ConditionalEvaluator, EvalError, Evaluator, StatementError, StatementEvaluator};
pub use event::{Event, Record};
pub use lexer::{LexError, Lexer, Position, Spanned, tokenize};
pub use output::{to_statement, to_tree};
pub use parser::{ParseError, Parser};
pub use pointer::JsonPointer;
pub use router::{RouteConfig, RouteFailure, RoutedRecords, Router, RouterError};
pub use value::Value;

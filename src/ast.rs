//! # Prepper Expression Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the conditional
//! expressions used to route events through a telemetry pipeline.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, field references, operations)
//! - **[operators]** - Binary operators (equality, relational, membership, logical)
//! - **[statements]** - Compiled statements and compile errors
//!
//! ## Quick Start
//!
//! ```text
//! /status >= 400 and /service =~ "^svc-"
//! ```
//!
//! This statement matches events whose status is an error and whose service
//! name starts with `svc-`.
//!
//! ## Core Concepts
//!
//! ### Field References
//!
//! Event fields are addressed with JSON pointers, bare or quoted:
//!
//! ```text
//! /http/status
//! "/field with spaces/inner"
//! ```
//!
//! A pointer to a field the event does not have evaluates to `null`.
//!
//! ### Precedence
//!
//! From loosest to tightest binding:
//!
//! | Level      | Operators                  |
//! |------------|----------------------------|
//! | or         | `or`                       |
//! | and        | `and`                      |
//! | not        | `not`                      |
//! | equality   | `==` `!=` `=~` `!~`        |
//! | relational | `<` `<=` `>` `>=`          |
//! | membership | `in` `not in`              |
//! | primary    | literal, pointer, `[...]`, `(...)` |
//!
//! Binary operators at the same level associate to the left.
//!
//! ## Examples
//!
//! ```text
//! /status == 200
//! (/a == 1) and (/b in [1, 2, 3])
//! not /verified == true or /role in ["admin", "ops"]
//! /latency > 2.5 and /region not in ["us-east-1"]
//! ```
pub mod expressions;
pub mod operators;
pub mod statements;
pub mod tokens;

pub use expressions::Expr;
pub use operators::BinOp;
pub use statements::{CompileError, CompileErrorKind, Statement};
pub use tokens::Token;

//! Rendering expressions back to text.
//!
//! This module turns an [`Expr`] into either of two forms:
//!
//! - **Statement text** via [`to_statement()`] - canonical source that parses
//!   back to the same tree. Nested operations are parenthesized, so the text
//!   never depends on precedence.
//! - **Tree dump** via [`to_tree()`] - one node per line with 2-space
//!   indentation, for diagnostics and `prepper check --tree`.
//!
//! # Examples
//!
//! ```
//! use prepper_expression::Statement;
//! use prepper_expression::output::to_statement;
//!
//! let statement = Statement::compile("/a == 1 and not /b in [1,2]").unwrap();
//! assert_eq!(to_statement(statement.expr()), "(/a == 1) and (not (/b in [1, 2]))");
//! ```

use std::fmt;

use crate::ast::Expr;

pub struct ExprPrinter {
    pretty: bool,
}

impl ExprPrinter {
    pub fn new(pretty: bool) -> Self {
        ExprPrinter { pretty }
    }

    pub fn print(&self, expr: &Expr) -> String {
        if self.pretty {
            let mut out = String::new();
            self.print_tree(expr, 0, &mut out);
            out
        } else {
            self.print_expr(expr, false)
        }
    }

    /// `nested` is true for operands, which get parentheses when they are
    /// themselves operations.
    fn print_expr(&self, expr: &Expr, nested: bool) -> String {
        match expr {
            Expr::Float(n) => format!("{:?}", n),
            Expr::Integer(n) => n.to_string(),
            Expr::String(s) => format!("\"{}\"", self.escape_string(s)),
            Expr::Boolean(b) => b.to_string(),
            Expr::Null => "null".to_string(),
            Expr::Pointer(p) => p.to_string(),
            Expr::List(items) => {
                let items: Vec<String> = items.iter().map(|e| self.print_expr(e, false)).collect();
                format!("[{}]", items.join(", "))
            }
            Expr::Not(operand) => {
                self.wrap(format!("not {}", self.print_expr(operand, true)), nested)
            }
            Expr::BinaryOp { op, left, right } => self.wrap(
                format!(
                    "{} {} {}",
                    self.print_expr(left, true),
                    op,
                    self.print_expr(right, true)
                ),
                nested,
            ),
        }
    }

    fn wrap(&self, text: String, nested: bool) -> String {
        if nested { format!("({})", text) } else { text }
    }

    fn print_tree(&self, expr: &Expr, level: usize, out: &mut String) {
        out.push_str(&self.indent(level));
        match expr {
            Expr::Float(n) => out.push_str(&format!("Float {:?}\n", n)),
            Expr::Integer(n) => out.push_str(&format!("Integer {}\n", n)),
            Expr::String(s) => out.push_str(&format!("String \"{}\"\n", self.escape_string(s))),
            Expr::Boolean(b) => out.push_str(&format!("Boolean {}\n", b)),
            Expr::Null => out.push_str("Null\n"),
            Expr::Pointer(p) => out.push_str(&format!("Pointer {}\n", p)),
            Expr::List(items) => {
                out.push_str(&format!("List ({})\n", items.len()));
                for item in items {
                    self.print_tree(item, level + 1, out);
                }
            }
            Expr::Not(operand) => {
                out.push_str("Not\n");
                self.print_tree(operand, level + 1, out);
            }
            Expr::BinaryOp { op, left, right } => {
                out.push_str(&format!("BinaryOp {}\n", op));
                self.print_tree(left, level + 1, out);
                self.print_tree(right, level + 1, out);
            }
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        let mut escaped = String::with_capacity(s.len());
        for (i, c) in s.chars().enumerate() {
            match c {
                '"' => escaped.push_str("\\\""),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                // A leading slash would read back as a JSON pointer
                '/' if i == 0 => escaped.push_str("\\/"),
                c => escaped.push(c),
            }
        }
        escaped
    }
}

/// Renders an expression as statement text that parses back to the same tree.
pub fn to_statement(expr: &Expr) -> String {
    ExprPrinter::new(false).print(expr)
}

/// Renders an expression as an indented tree, one node per line.
///
/// ```
/// use prepper_expression::Statement;
/// use prepper_expression::output::to_tree;
///
/// let statement = Statement::compile("/a == 1").unwrap();
/// assert_eq!(to_tree(statement.expr()), "BinaryOp ==\n  Pointer /a\n  Integer 1\n");
/// ```
pub fn to_tree(expr: &Expr) -> String {
    ExprPrinter::new(true).print(expr)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_statement(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use crate::pointer::JsonPointer;

    #[test]
    fn string_with_leading_slash_is_escaped() {
        assert_eq!(to_statement(&Expr::String("/x".into())), "\"\\/x\"");
    }

    #[test]
    fn nested_not_is_parenthesized_under_equality() {
        let expr = Expr::binary(
            BinOp::Equal,
            Expr::not(Expr::Pointer(JsonPointer::from_segments(["a"]))),
            Expr::Boolean(false),
        );
        assert_eq!(to_statement(&expr), "(not /a) == false");
    }

    #[test]
    fn floats_keep_their_decimal_point() {
        assert_eq!(to_statement(&Expr::Float(5.0)), "5.0");
    }

    #[test]
    fn tree_indents_each_level() {
        let expr = Expr::not(Expr::List(vec![Expr::Integer(1), Expr::Null]));
        assert_eq!(to_tree(&expr), "Not\n  List (2)\n    Integer 1\n    Null\n");
    }
}

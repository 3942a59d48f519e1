use crate::{ast::BinOp, pointer::JsonPointer};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Trees are immutable once the parser returns them and hold no references
/// to the token stream they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 42.0
    /// ```
    Float(f64),

    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    // References
    /// Event field reference
    ///
    /// # Examples
    /// ```text
    /// /status
    /// "/field with spaces"
    /// ```
    Pointer(JsonPointer),

    /// List literal
    ///
    /// # Example
    /// ```text
    /// [200, 201, /fallback]
    /// ```
    List(Vec<Expr>),

    // Operations
    /// Logical negation (`not`)
    Not(Box<Expr>),

    /// Binary operation (equality, relational, membership, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Not(Box::new(operand))
    }

    /// Whether the expression is a literal with no operands.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expr::Float(_) | Expr::Integer(_) | Expr::String(_) | Expr::Boolean(_) | Expr::Null
        )
    }
}

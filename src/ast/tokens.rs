use std::fmt;

use crate::pointer::JsonPointer;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.1415
    /// -0.5
    /// 1e10
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 200
    /// -10
    /// ```
    Integer(i64),

    /// String literal enclosed in double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "^svc-.*"
    /// "\/not a pointer"
    /// ```
    String(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Null value
    Null,

    /// Reference to an event field, bare or quoted
    ///
    /// # Examples
    /// ```text
    /// /status
    /// /people/1/name
    /// "/field with spaces/x"
    /// ```
    JsonPointer(JsonPointer),

    // Equality
    /// Equality operator (`==`)
    EqEq,

    /// Inequality operator (`!=`)
    NotEq,

    /// Regex match (`=~`)
    Match,

    /// Regex non-match (`!~`)
    NotMatch,

    // Relational
    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Logical and membership (words, not symbols)
    /// Logical AND
    ///
    /// # Examples
    /// ```text
    /// /status >= 200 and /status < 300
    /// ```
    And,

    /// Logical OR
    Or,

    /// Logical NOT, also the first half of `not in`
    Not,

    /// List membership
    ///
    /// # Examples
    /// ```text
    /// /status in [200, 201, 204]
    /// ```
    In,

    // Delimiters
    /// Left bracket opening a list literal
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis for grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating list elements
    Comma,

    /// Input no token starts with (a stray character or an unknown word)
    Invalid(String),

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Float(n) => write!(f, "{:?}", n),
            Token::Integer(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "{:?}", s),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Null => f.write_str("null"),
            Token::JsonPointer(p) => write!(f, "{}", p),
            Token::EqEq => f.write_str("=="),
            Token::NotEq => f.write_str("!="),
            Token::Match => f.write_str("=~"),
            Token::NotMatch => f.write_str("!~"),
            Token::Lt => f.write_str("<"),
            Token::Gt => f.write_str(">"),
            Token::LtEq => f.write_str("<="),
            Token::GtEq => f.write_str(">="),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::Not => f.write_str("not"),
            Token::In => f.write_str("in"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Invalid(text) => f.write_str(text),
            Token::Eof => f.write_str("<EOF>"),
        }
    }
}

use std::mem;

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Token},
    lexer::{Position, Spanned},
};

/// Tokens that can start an operand of a comparison or membership test.
const OPERAND: &[&str] = &[
    "integer",
    "float",
    "boolean",
    "null",
    "string",
    "JSON pointer",
    "[",
    "(",
];

/// Tokens that can start an operand where a prefix `not` is also accepted.
const OPERAND_OR_NOT: &[&str] = &[
    "integer",
    "float",
    "boolean",
    "null",
    "string",
    "JSON pointer",
    "[",
    "(",
    "not",
];

/// Bound on parentheses, brackets, `not` prefixes and chained operators
/// along one path of the tree. The parser, evaluator and printer all
/// recurse over that path.
pub const MAX_DEPTH: usize = 128;

/// A statement that tokenized but does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected '{found}' at {position}, expected {}", .expected.join(" or "))]
    UnexpectedToken {
        found: String,
        position: Position,
        expected: Vec<String>,
    },

    #[error("Statement nests deeper than {limit} levels at '{found}' ({position})")]
    NestingTooDeep {
        found: String,
        position: Position,
        limit: usize,
    },
}

impl ParseError {
    fn unexpected(found: &Token, position: Position, expected: &[&str]) -> Self {
        ParseError::UnexpectedToken {
            found: found.to_string(),
            position,
            expected: expected.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }

    pub fn found(&self) -> &str {
        match self {
            ParseError::UnexpectedToken { found, .. }
            | ParseError::NestingTooDeep { found, .. } => found,
        }
    }

    pub fn expected(&self) -> &[String] {
        match self {
            ParseError::UnexpectedToken { expected, .. } => expected,
            ParseError::NestingTooDeep { .. } => &[],
        }
    }
}

/// Recursive-descent parser, one method per precedence level.
pub struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
    depth: usize,
    /// Token index where a prefix `not` would have been accepted
    not_allowed_at: Option<usize>,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser {
            tokens,
            index: 0,
            depth: 0,
            not_allowed_at: None,
        }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.index + offset)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn position(&self) -> Position {
        self.tokens
            .get(self.index)
            .or_else(|| self.tokens.last())
            .map(|s| s.position)
            .unwrap_or_else(Position::start)
    }

    /// Go one level deeper, failing past `MAX_DEPTH`.
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep {
                found: self.current().to_string(),
                position: self.position(),
                limit: MAX_DEPTH,
            });
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    /// Take ownership of the current token and move past it.
    fn take(&mut self) -> Token {
        let token = match self.tokens.get_mut(self.index) {
            Some(spanned) => mem::replace(&mut spanned.token, Token::Eof),
            None => Token::Eof,
        };
        self.advance();
        token
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(self.current()) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            let text = expected.to_string();
            return Err(ParseError::unexpected(
                self.current(),
                self.position(),
                &[text.as_str()],
            ));
        }
        self.advance();
        Ok(())
    }

    /// Parse primary expressions (atoms): literals, pointers, lists and
    /// parenthesized expressions
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let position = self.position();
        let expected = if self.not_allowed_at == Some(self.index) {
            OPERAND_OR_NOT
        } else {
            OPERAND
        };

        match self.take() {
            // Literals
            Token::Float(n) => Ok(Expr::Float(n)),
            Token::Integer(n) => Ok(Expr::Integer(n)),
            Token::String(s) => Ok(Expr::String(s)),
            Token::Boolean(b) => Ok(Expr::Boolean(b)),
            Token::Null => Ok(Expr::Null),

            // References
            Token::JsonPointer(p) => Ok(Expr::Pointer(p)),

            // List literals
            Token::LBracket => {
                self.descend()?;
                let list = self.parse_list_literal()?;
                self.depth -= 1;
                Ok(list)
            }

            Token::LParen => {
                self.descend()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                self.depth -= 1;
                Ok(expr)
            }

            token => Err(ParseError::unexpected(&token, position, expected)),
        }
    }

    fn parse_list_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        if self.check(&Token::RBracket) {
            self.advance();
            return Ok(Expr::List(elements));
        }

        loop {
            elements.push(self.parse_expression()?);

            if self.check(&Token::Comma) {
                self.advance();
            } else if self.check(&Token::RBracket) {
                self.advance();
                return Ok(Expr::List(elements));
            } else {
                return Err(ParseError::unexpected(
                    self.current(),
                    self.position(),
                    &[",", "]"],
                ));
            }
        }
    }

    fn parse_membership(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_primary()?;

        loop {
            let op = if self.check(&Token::In) {
                self.advance();
                BinOp::In
            } else if self.check(&Token::Not) && matches!(self.peek(1), Token::In) {
                self.advance();
                self.advance();
                BinOp::NotIn
            } else {
                break;
            };

            self.descend()?;
            let right = self.parse_primary()?;
            left = Expr::binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_membership()?;

        loop {
            let op = match self.current() {
                Token::Lt => BinOp::LessThan,
                Token::Gt => BinOp::GreaterThan,
                Token::LtEq => BinOp::LessEqual,
                Token::GtEq => BinOp::GreaterEqual,
                _ => break,
            };

            self.advance();
            self.descend()?;
            let right = self.parse_membership()?;
            left = Expr::binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.current() {
                Token::EqEq => BinOp::Equal,
                Token::NotEq => BinOp::NotEqual,
                Token::Match => BinOp::Matches,
                Token::NotMatch => BinOp::NotMatches,
                _ => break,
            };

            self.advance();
            self.descend()?;
            let right = self.parse_relational()?;
            left = Expr::binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Not) {
            self.advance();
            self.descend()?;
            let operand = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expr::not(operand));
        }
        self.not_allowed_at = Some(self.index);
        self.parse_equality()
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_not()?;

        while self.check(&Token::And) {
            self.advance();
            self.descend()?;
            let right = self.parse_not()?;
            left = Expr::binary(BinOp::And, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance();
            self.descend()?;
            let right = self.parse_and()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    /// Parse a complete statement; every token must be consumed.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}

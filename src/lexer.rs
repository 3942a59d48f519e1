use std::fmt;

use thiserror::Error;

use crate::{
    ast::Token,
    pointer::{JsonPointer, is_bare_char},
};

/// Location of a token in the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Character offset from the start of the statement
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Render the line of `source` this position is on, with a caret under
    /// the column.
    pub fn caret(&self, source: &str) -> String {
        let line_text = source
            .lines()
            .nth(self.line.saturating_sub(1))
            .unwrap_or("");
        let line_str = self.line.to_string();
        let gutter = line_str.len() + 1;
        let col_spaces = self.column.saturating_sub(1);

        format!(
            "\n--> {}:{}\n{:<gutter$}|\n{:<gutter$}| {}\n{:<gutter$}| {:<col_spaces$}^",
            self.line, self.column, "", line_str, line_text, "", ""
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token and where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: Position,
}

/// Errors raised while turning statement text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unrecognized input '{text}' at {position}")]
    Unrecognized { text: String, position: Position },

    #[error("Unterminated string starting at {position}: missing closing quote")]
    UnterminatedString { position: Position },

    #[error("Invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::Unrecognized { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn here(&self) -> Position {
        Position {
            offset: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Bare pointer: `/` followed by segment characters and further slashes.
    fn read_bare_pointer(&mut self) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '/' || is_bare_char(ch) {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::JsonPointer(JsonPointer::from_segments(text[1..].split('/')))
    }

    /// Double-quoted literal. A body starting with an unescaped `/` is a
    /// quoted JSON pointer, anything else is a string.
    fn read_quoted(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        self.advance(); // Consume opening quote

        let mut raw = String::new();
        loop {
            match self.current_char() {
                None => return Err(LexError::UnterminatedString { position: start }),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    self.advance();
                    match self.current_char() {
                        Some(ch) => {
                            raw.push(ch);
                            self.advance();
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                }
                Some(ch) => {
                    raw.push(ch);
                    self.advance();
                }
            }
        }

        if raw.starts_with('/')
            && let Ok(pointer) = JsonPointer::from_escaped(&raw)
        {
            return Ok(Token::JsonPointer(pointer));
        }
        Ok(Token::String(unescape(&raw)))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        let mut number = String::new();
        let mut is_float = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Exponent, only when digits actually follow
        if matches!(self.current_char(), Some('e' | 'E')) {
            let digits_at = match self.peek_char(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digits_at {
                    if let Some(ch) = self.current_char() {
                        number.push(ch);
                    }
                    self.advance();
                }
                while let Some(ch) = self.current_char().filter(|c| c.is_ascii_digit()) {
                    number.push(ch);
                    self.advance();
                }
            }
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            position: start,
        };

        if is_float {
            let n = number.parse::<f64>().map_err(|_| invalid())?;
            if !n.is_finite() {
                return Err(invalid());
            }
            Ok(Token::Float(n))
        } else {
            number.parse::<i64>().map(Token::Integer).map_err(|_| invalid())
        }
    }

    fn symbol(&mut self, token: Token, width: usize) -> Token {
        for _ in 0..width {
            self.advance();
        }
        token
    }

    fn invalid(&mut self, ch: char) -> Token {
        self.advance();
        Token::Invalid(ch.to_string())
    }

    pub fn next_token(&mut self) -> Result<Spanned, LexError> {
        self.skip_whitespace();
        let position = self.here();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('/') => self.read_bare_pointer(),
            Some('"') => self.read_quoted()?,
            Some('=') => match self.peek_char(1) {
                Some('=') => self.symbol(Token::EqEq, 2),
                Some('~') => self.symbol(Token::Match, 2),
                _ => self.invalid('='),
            },
            Some('!') => match self.peek_char(1) {
                Some('=') => self.symbol(Token::NotEq, 2),
                Some('~') => self.symbol(Token::NotMatch, 2),
                _ => self.invalid('!'),
            },
            Some('<') => match self.peek_char(1) {
                Some('=') => self.symbol(Token::LtEq, 2),
                _ => self.symbol(Token::Lt, 1),
            },
            Some('>') => match self.peek_char(1) {
                Some('=') => self.symbol(Token::GtEq, 2),
                _ => self.symbol(Token::Gt, 1),
            },
            Some('(') => self.symbol(Token::LParen, 1),
            Some(')') => self.symbol(Token::RParen, 1),
            Some('[') => self.symbol(Token::LBracket, 1),
            Some(']') => self.symbol(Token::RBracket, 1),
            Some(',') => self.symbol(Token::Comma, 1),
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let word = self.read_word();

                match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    _ => Token::Invalid(word),
                }
            }
            Some(ch) => self.invalid(ch),
        };

        Ok(Spanned { token, position })
    }
}

/// Resolve string escapes. Unknown escapes keep their backslash so regex
/// classes such as `\d` pass through untouched.
fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some('/') => result.push('/'),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Tokenize a whole statement, ending with `Token::Eof`.
///
/// The first `Token::Invalid` the lexer produces becomes a
/// [`LexError::Unrecognized`].
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = vec![];

    loop {
        let spanned = lexer.next_token()?;
        match spanned.token {
            Token::Invalid(text) => {
                return Err(LexError::Unrecognized {
                    text,
                    position: spanned.position,
                });
            }
            Token::Eof => {
                tokens.push(spanned);
                return Ok(tokens);
            }
            _ => tokens.push(spanned),
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or not in true false null");
    assert_eq!(lexer.next_token().unwrap().token, Token::And);
    assert_eq!(lexer.next_token().unwrap().token, Token::Or);
    assert_eq!(lexer.next_token().unwrap().token, Token::Not);
    assert_eq!(lexer.next_token().unwrap().token, Token::In);
    assert_eq!(lexer.next_token().unwrap().token, Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap().token, Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap().token, Token::Null);
}

#[test]
fn test_positions_track_lines() {
    let tokens = tokenize("/a ==\n  1").unwrap();
    assert_eq!(tokens[1].position, Position { offset: 3, line: 1, column: 4 });
    assert_eq!(tokens[2].position, Position { offset: 8, line: 2, column: 3 });
}

#[test]
fn test_caret_points_at_column() {
    let pos = Position { offset: 4, line: 1, column: 5 };
    let rendered = pos.caret("5 == %");
    assert!(rendered.ends_with("|     ^"), "{}", rendered);
}

#[test]
fn test_caret_with_default_position() {
    let rendered = Position::default().caret("");
    assert!(rendered.starts_with("\n--> 1:1"), "{}", rendered);
}

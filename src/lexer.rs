use std::borrow::Cow;
use std::{iter::Peekable, str::CharIndices};

use unicode_ident::{is_xid_continue, is_xid_start};

pub mod error;

pub use error::{LexError, LexResult};
pub use crate::token::{Span, Token, TokenKind};

/// Forward-only scanner producing one token per call to [`Lexer::next_token`].
///
/// The lexer walks code points rather than bytes, so identifiers and string
/// literals may contain any Unicode text. Once the input is exhausted every
/// further call yields an `EOF` token.
#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Restarts scanning from the beginning of the input.
    pub fn rewind(&mut self) {
        *self = Self::new(self.input);
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        self.skip_trivia();

        let start_line = self.line;
        let start_column = self.column;
        let Some(&(start_idx, ch)) = self.chars.peek() else {
            let index = self.input.len();
            return Ok(Token::new(
                TokenKind::EOF,
                Span {
                    start: index,
                    end: index,
                    line: start_line,
                    column: start_column,
                },
            ));
        };

        let kind = match ch {
            '"' => return Ok(self.read_string(start_idx, start_line, start_column)),
            c if is_xid_start(c) || c == '_' => {
                return Ok(self.read_identifier(start_idx, start_line, start_column));
            }
            c if c.is_ascii_digit() => {
                return Ok(self.read_number(start_idx, start_line, start_column));
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '.' => TokenKind::Dot,
            '<' => self.with_equal(TokenKind::Less, TokenKind::LessEqual),
            '>' => self.with_equal(TokenKind::Greater, TokenKind::GreaterEqual),
            '=' => self.with_equal(TokenKind::Assign, TokenKind::Equal),
            '!' if self.second_char() == Some('=') => {
                self.advance_char();
                TokenKind::NotEqual
            }
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    character: ch,
                    span: Span {
                        start: start_idx,
                        end: start_idx + ch.len_utf8(),
                        line: start_line,
                        column: start_column,
                    },
                });
            }
        };
        self.advance_char();

        Ok(Token::new(
            kind,
            Span {
                start: start_idx,
                end: self.current_index(),
                line: start_line,
                column: start_column,
            },
        ))
    }

    /// Picks the two-character form when the next character is `=`.
    /// Leaves the final character for the caller to consume.
    fn with_equal(&mut self, single: TokenKind<'a>, double: TokenKind<'a>) -> TokenKind<'a> {
        if self.second_char() == Some('=') {
            self.advance_char();
            double
        } else {
            single
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance_char();
            } else if c == '#' {
                while let Some(&(_, c)) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance_char();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if is_xid_continue(c) {
                self.advance_char();
            } else {
                break;
            }
        }

        let end = self.current_index();
        let ident = &self.input[start..end];
        let kind = match TokenKind::keyword(ident) {
            Some(keyword) => keyword,
            None => TokenKind::Identifier(ident),
        };
        Token::new(
            kind,
            Span {
                start,
                end,
                line,
                column,
            },
        )
    }

    /// Integer digits, then optionally one `.` and any digits after it, so
    /// `1.` is the number 1.
    fn read_number(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_digits();
        if self.peek_char() == Some('.') {
            self.advance_char(); // Consume '.'
            self.advance_digits();
        }

        let end = self.current_index();
        let span = Span {
            start,
            end,
            line,
            column,
        };
        // Digits with at most one '.' always form a valid float literal.
        let value = self.input[start..end].parse::<f64>().unwrap_or(f64::NAN);
        Token::new(TokenKind::Number(value), span)
    }

    fn advance_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance_char();
        }
    }

    /// Scans a string literal. A literal cut off by a newline or the end of
    /// input is kept, with a newline appended to its value.
    fn read_string(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume opening quote
        let content_start = start + 1;
        let mut value = None;
        while let Some(&(idx, c)) = self.chars.peek() {
            self.advance_char();
            if c == '"' {
                value = Some(Cow::Borrowed(&self.input[content_start..idx]));
                break;
            }
            if c == '\n' {
                value = Some(Cow::Owned(format!("{}\n", &self.input[content_start..idx])));
                break;
            }
        }
        let value =
            value.unwrap_or_else(|| Cow::Owned(format!("{}\n", &self.input[content_start..])));

        Token::new(
            TokenKind::String(value),
            Span {
                start,
                end: self.current_index(),
                line,
                column,
            },
        )
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn second_char(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, c)| c)
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

/// Yields tokens up to, but not including, `EOF`. Iteration stops after the
/// first lexical error.
impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.is_eof() => None,
            Ok(token) => Some(Ok(token)),
            Err(error) => {
                self.chars = self.input[self.input.len()..].char_indices().peekable();
                Some(Err(error))
            }
        }
    }
}

/// Scans the whole input, including the trailing `EOF` token.
pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

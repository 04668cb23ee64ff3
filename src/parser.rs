use std::rc::Rc;

use thiserror::Error;

use crate::ast::{BinaryOperator, Expression, Program, Statement};
use crate::lexer::{LexError, Lexer};
use crate::token::{Span, Token, TokenKind};

/// Syntax errors: lexical failures surfaced through the parser, plus
/// grammatical ones.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("Expected {expected}, got {found} at {span}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: &'static str },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a lazily scanned token stream.
///
/// Only the current token is buffered; statements are dispatched on their
/// leading keyword and binary expressions are built by precedence climbing.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> ParseResult<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        loop {
            self.skip_semicolons()?;
            if self.current.is_eof() {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_declaration(),
            TokenKind::Fn => self.parse_function_declaration(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => {
                self.advance()?;
                self.parse_if_tail()
            }
            TokenKind::While => self.parse_while(),
            _ => Ok(Statement::Expression(self.parse_expression()?)),
        }
    }

    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Let)?;
        let name = self.expect_identifier()?;
        let initializer = if self.check(&TokenKind::Assign) {
            self.advance()?;
            self.parse_expression()?
        } else {
            Expression::Nil
        };
        Ok(Statement::Declaration { name, initializer })
    }

    fn parse_function_declaration(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Fn)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        if matches!(self.current.kind, TokenKind::Identifier(_)) {
            params.push(self.expect_identifier()?);
            while self.check(&TokenKind::Comma) {
                self.advance()?;
                params.push(self.expect_identifier()?);
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.parse_body(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;

        Ok(Statement::FunctionDeclaration {
            name,
            params: Rc::from(params),
            body: Rc::from(body),
        })
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Return)?;
        let bare = matches!(
            self.current.kind,
            TokenKind::EOF
                | TokenKind::Semicolon
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::ElseIf
        );
        if bare {
            return Ok(Statement::Return(Expression::Nil));
        }
        Ok(Statement::Return(self.parse_expression()?))
    }

    /// Parses the part of an `if` after its keyword. Each `elseif` becomes a
    /// nested `If` that forms the whole else body.
    fn parse_if_tail(&mut self) -> ParseResult<Statement> {
        let condition = self.parse_expression()?;
        let then_body = self.parse_body(&[TokenKind::End, TokenKind::Else, TokenKind::ElseIf])?;

        let else_body = match self.current.kind {
            TokenKind::ElseIf => {
                self.advance()?;
                vec![self.parse_if_tail()?]
            }
            TokenKind::Else => {
                self.advance()?;
                let body = self.parse_body(&[TokenKind::End])?;
                self.expect(TokenKind::End)?;
                body
            }
            _ => {
                self.expect(TokenKind::End)?;
                Vec::new()
            }
        };

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::While)?;
        let condition = self.parse_expression()?;
        let body = self.parse_body(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;
        Ok(Statement::While { condition, body })
    }

    /// Collects statements until one of `terminators` (left unconsumed) or
    /// the end of input.
    fn parse_body(&mut self, terminators: &[TokenKind<'_>]) -> ParseResult<Vec<Statement>> {
        let mut body = Vec::new();
        loop {
            self.skip_semicolons()?;
            if self.current.is_eof() || terminators.contains(&self.current.kind) {
                return Ok(body);
            }
            body.push(self.parse_statement()?);
        }
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_assignment()
    }

    /// Assignment is right-associative and only applies when the left side
    /// parsed as a plain variable.
    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let target = self.parse_binary(0)?;
        if let Expression::Variable(name) = &target
            && self.check(&TokenKind::Assign)
        {
            let name = name.clone();
            self.advance()?;
            let value = self.parse_assignment()?;
            return Ok(Expression::Assignment {
                name,
                value: Box::new(value),
            });
        }
        Ok(target)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let mut left = self.parse_postfix()?;
        while let Some(op) = binary_operator(&self.current.kind) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            let right = self.parse_binary(precedence + 1)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current.kind {
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    expr = Expression::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::LBracket => {
                    self.advance()?;
                    let key = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expression::Subscript {
                        object: Box::new(expr),
                        key: Box::new(key),
                    };
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let field = self.expect_identifier()?;
                    expr = Expression::Subscript {
                        object: Box::new(expr),
                        key: Box::new(Expression::String(field)),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            self.advance()?;
            return Ok(args);
        }

        args.push(self.parse_expression()?);
        while self.check(&TokenKind::Comma) {
            self.advance()?;
            args.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let expr = match &self.current.kind {
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::Number(value) => Expression::Number(*value),
            TokenKind::String(value) => Expression::String(value.to_string()),
            TokenKind::Nil => Expression::Nil,
            TokenKind::True => Expression::Boolean(true),
            TokenKind::False => Expression::Boolean(false),
            TokenKind::Identifier(name) => Expression::Variable(name.to_string()),
            _ => return Err(self.error("expression")),
        };
        self.advance()?;
        Ok(expr)
    }

    fn skip_semicolons(&mut self) -> ParseResult<()> {
        while self.check(&TokenKind::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }

    fn check(&self, kind: &TokenKind<'_>) -> bool {
        &self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind<'static>) -> ParseResult<()> {
        if self.check(&kind) {
            self.advance()?;
            Ok(())
        } else {
            Err(self.error(kind.name()))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = self.current.kind {
            self.advance()?;
            Ok(name.to_string())
        } else {
            Err(self.error("identifier"))
        }
    }

    fn advance(&mut self) -> ParseResult<Token<'a>> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn error(&self, expected: &'static str) -> ParseError {
        if self.current.is_eof() {
            ParseError::UnexpectedEndOfInput { expected }
        } else {
            ParseError::UnexpectedToken {
                expected,
                found: self.current.kind.to_string(),
                span: self.current.span,
            }
        }
    }
}

fn binary_operator(kind: &TokenKind<'_>) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::LessEqual => BinaryOperator::LessEqual,
        TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
        TokenKind::Equal => BinaryOperator::Equal,
        TokenKind::NotEqual => BinaryOperator::NotEqual,
        TokenKind::Plus => BinaryOperator::Plus,
        TokenKind::Minus => BinaryOperator::Minus,
        TokenKind::Asterisk => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Modulo,
        _ => return None,
    };
    Some(op)
}

pub fn parse(input: &str) -> ParseResult<Program> {
    Parser::new(input)?.parse_program()
}

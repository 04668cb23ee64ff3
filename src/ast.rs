use std::fmt;
use std::rc::Rc;

pub mod printer;

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Assignment {
        name: String,
        value: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    /// `object[key]`; `object.field` is parsed into a subscript keyed by the
    /// string `"field"`.
    Subscript {
        object: Box<Expression>,
        key: Box<Expression>,
    },
    Variable(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl BinaryOperator {
    /// Binding strength used by the precedence-climbing parser.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Less
            | Self::Greater
            | Self::LessEqual
            | Self::GreaterEqual
            | Self::Equal
            | Self::NotEqual => 10,
            Self::Plus | Self::Minus => 20,
            Self::Multiply | Self::Divide | Self::Modulo => 30,
        }
    }

    /// Property looked up on the left operand to evaluate this operator.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::Plus => "add",
            Self::Minus => "sub",
            Self::Multiply => "mul",
            Self::Divide => "div",
            Self::Modulo => "mod",
            Self::Less => "lt",
            Self::Greater => "gt",
            Self::LessEqual => "le",
            Self::GreaterEqual => "ge",
            Self::Equal => "eq",
            Self::NotEqual => "ne",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    /// `let name = initializer`; a missing initializer is stored as `Nil`.
    Declaration {
        name: String,
        initializer: Expression,
    },
    FunctionDeclaration {
        name: String,
        params: Rc<[String]>,
        body: Rc<[Statement]>,
    },
    Expression(Expression),
    Return(Expression),
    /// An `elseif` chain is a nested `If` as the only statement of `else_body`.
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Vec<Statement>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

use std::fmt;
use std::rc::Rc;

use crate::ast::Statement;
use crate::runtime::native::NativeFunction;

mod number;
mod string;

/// Runtime value. The set of kinds is closed.
///
/// `Nil`, `true` and `false` carry no payload, so every occurrence is the same
/// canonical value ([`NIL`], [`TRUE`], [`FALSE`]).
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Function(Rc<Function>),
    NativeFunction(Rc<NativeFunction>),
}

pub const NIL: Value = Value::Nil;
pub const TRUE: Value = Value::Boolean(true);
pub const FALSE: Value = Value::Boolean(false);

/// User-defined function. Captures no environment: a call links its frame to
/// whatever scope is active at the call site.
#[derive(Debug)]
pub struct Function {
    pub params: Rc<[String]>,
    pub body: Rc<[Statement]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Boolean,
    Number,
    String,
    Function,
    NativeFunction,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Nil => "Nil",
            ValueKind::Boolean => "Boolean",
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::Function => "Function",
            ValueKind::NativeFunction => "NativeFunction",
        })
    }
}

impl Value {
    pub fn from_bool(value: bool) -> Self {
        if value { TRUE } else { FALSE }
    }

    pub fn string(value: impl Into<Rc<str>>) -> Self {
        Value::String(value.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Function(_) => ValueKind::Function,
            Value::NativeFunction(_) => ValueKind::NativeFunction,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Property lookup used for operator dispatch and subscripts. Only string
    /// keys can name a property; anything unknown resolves to nil.
    pub fn lookup(&self, key: &Value) -> Value {
        let Some(key) = key.as_str() else {
            return NIL;
        };
        match self {
            Value::Number(_) => number::property(key),
            Value::String(_) => string::property(key),
            Value::Nil | Value::Boolean(_) | Value::Function(_) | Value::NativeFunction(_) => NIL,
        }
    }

    /// Text rendering used by the `stringify` built-in.
    pub fn stringify(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Boolean(value) => value.to_string(),
            Value::Number(value) => number::render(*value),
            Value::String(value) => value.to_string(),
            Value::Function(_) => "function".to_string(),
            Value::NativeFunction(_) => "native function".to_string(),
        }
    }

    /// Rendering used when echoing values interactively: like [`stringify`]
    /// except that strings are quoted.
    ///
    /// [`stringify`]: Value::stringify
    pub fn repr(&self) -> String {
        match self {
            Value::String(value) => format!("\"{value}\""),
            other => other.stringify(),
        }
    }
}

/// Payload equality for nil, booleans, numbers and strings; identity for
/// functions.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
            (Value::NativeFunction(left), Value::NativeFunction(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::from_bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

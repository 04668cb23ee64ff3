use std::fmt;
use std::rc::Rc;

use super::error::{RuntimeError, RuntimeResult};
use super::value::{Value, ValueKind};

/// Host services available to native functions while they run.
pub trait CallContext {
    fn write_line(&mut self, line: &str) -> RuntimeResult<()>;
}

pub type NativeCallable = dyn Fn(&mut dyn CallContext, Vec<Value>) -> RuntimeResult<Value>;

/// Declared type of one native-function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Kind(ValueKind),
}

impl ParamType {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::Any => true,
            ParamType::Kind(kind) => value.kind() == kind,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => f.write_str("Value"),
            ParamType::Kind(kind) => kind.fmt(f),
        }
    }
}

/// Host-implemented callable with a positional parameter signature that is
/// checked before every invocation.
pub struct NativeFunction {
    name: String,
    signature: Vec<ParamType>,
    callable: Box<NativeCallable>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, signature: Vec<ParamType>, callable: F) -> Self
    where
        F: Fn(&mut dyn CallContext, Vec<Value>) -> RuntimeResult<Value> + 'static,
    {
        Self {
            name: name.into(),
            signature,
            callable: Box::new(callable),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks `args` against the signature element-wise, then runs the host
    /// operation. A length difference counts as a mismatch.
    pub fn invoke(&self, context: &mut dyn CallContext, args: Vec<Value>) -> RuntimeResult<Value> {
        let matches = args.len() == self.signature.len()
            && self
                .signature
                .iter()
                .zip(&args)
                .all(|(param, arg)| param.accepts(arg));
        if !matches {
            return Err(self.mismatch(&args));
        }
        (self.callable)(context, args)
    }

    pub(crate) fn mismatch(&self, args: &[Value]) -> RuntimeError {
        RuntimeError::InvalidArguments {
            function: self.name.clone(),
            expected: join(self.signature.iter()),
            got: join(args.iter().map(Value::kind)),
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

/// Wraps a host closure as a callable runtime value.
pub(crate) fn native<F>(name: &str, signature: Vec<ParamType>, callable: F) -> Value
where
    F: Fn(&mut dyn CallContext, Vec<Value>) -> RuntimeResult<Value> + 'static,
{
    Value::NativeFunction(Rc::new(NativeFunction::new(name, signature, callable)))
}

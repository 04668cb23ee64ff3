use std::rc::Rc;

use log::debug;

use crate::runtime::native::{CallContext, NativeFunction, ParamType};
use crate::runtime::{NIL, RuntimeResult, Scope, Value, ValueKind};

/// Host functions bound in the root frame of every interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    Print,
    Stringify,
}

impl BuiltinFunction {
    pub const ALL: [BuiltinFunction; 2] = [Self::Print, Self::Stringify];

    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Stringify => "stringify",
        }
    }

    pub fn signature(self) -> Vec<ParamType> {
        match self {
            Self::Print => vec![ParamType::Kind(ValueKind::String)],
            Self::Stringify => vec![ParamType::Any],
        }
    }

    pub fn native(self) -> NativeFunction {
        let name = self.name();
        let signature = self.signature();
        match self {
            Self::Print => NativeFunction::new(name, signature, print),
            Self::Stringify => NativeFunction::new(name, signature, stringify),
        }
    }
}

fn print(context: &mut dyn CallContext, args: Vec<Value>) -> RuntimeResult<Value> {
    for line in args.iter().filter_map(Value::as_str) {
        context.write_line(line)?;
    }
    Ok(NIL)
}

fn stringify(_context: &mut dyn CallContext, args: Vec<Value>) -> RuntimeResult<Value> {
    let rendered = args.first().map(Value::stringify).unwrap_or_default();
    Ok(Value::string(rendered))
}

/// Declares every builtin in the current frame of `scope`.
pub fn install(scope: &mut Scope) {
    for builtin in BuiltinFunction::ALL {
        debug!("Registering builtin '{}'", builtin.name());
        scope.declare(
            builtin.name(),
            Value::NativeFunction(Rc::new(builtin.native())),
        );
    }
}

//! Runtime object model: values, their property lookup, native functions and
//! the scope chain the interpreter evaluates against.
pub mod error;
pub mod native;
pub mod scope;
pub mod value;

pub use error::{RuntimeError, RuntimeResult};
pub use native::{CallContext, NativeFunction, ParamType};
pub use scope::Scope;
pub use value::{FALSE, Function, NIL, TRUE, Value, ValueKind};

use super::{NIL, Value, ValueKind};
use crate::runtime::native::{ParamType, native};

/// Strings only define `add`, which concatenates two strings.
pub(super) fn property(key: &str) -> Value {
    match key {
        "add" => {
            let string = ParamType::Kind(ValueKind::String);
            native(key, vec![string, string], |_context, args| {
                let concatenated: String = args.iter().filter_map(Value::as_str).collect();
                Ok(Value::string(concatenated))
            })
        }
        _ => NIL,
    }
}

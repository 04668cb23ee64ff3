use super::{NIL, Value, ValueKind};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::native::{ParamType, native};

type Operation = fn(f64, f64) -> RuntimeResult<Value>;

/// Operator methods of numbers. Each takes `(self, other)` as two numbers.
pub(super) fn property(key: &str) -> Value {
    let operation: Operation = match key {
        "add" => |lhs, rhs| Ok(Value::Number(lhs + rhs)),
        "sub" => |lhs, rhs| Ok(Value::Number(lhs - rhs)),
        "mul" => |lhs, rhs| Ok(Value::Number(lhs * rhs)),
        "div" => |lhs, rhs| {
            if rhs == 0.0 {
                return Err(RuntimeError::DivisionByZero { method: "div" });
            }
            Ok(Value::Number(lhs / rhs))
        },
        // Operands are narrowed to integers first; the remainder truncates.
        "mod" => |lhs, rhs| {
            let (lhs, rhs) = (lhs as i64, rhs as i64);
            if rhs == 0 {
                return Err(RuntimeError::DivisionByZero { method: "mod" });
            }
            Ok(Value::Number(lhs.wrapping_rem(rhs) as f64))
        },
        "lt" => |lhs, rhs| Ok(Value::from_bool(lhs < rhs)),
        "gt" => |lhs, rhs| Ok(Value::from_bool(lhs > rhs)),
        "le" => |lhs, rhs| Ok(Value::from_bool(lhs <= rhs)),
        "ge" => |lhs, rhs| Ok(Value::from_bool(lhs >= rhs)),
        "eq" => |lhs, rhs| Ok(Value::from_bool(lhs == rhs)),
        "ne" => |lhs, rhs| Ok(Value::from_bool(lhs != rhs)),
        _ => return NIL,
    };

    let number = ParamType::Kind(ValueKind::Number);
    native(key, vec![number, number], move |_context, args| {
        match args.as_slice() {
            [Value::Number(lhs), Value::Number(rhs)] => operation(*lhs, *rhs),
            _ => Err(RuntimeError::InvalidArguments {
                function: "number operator".to_string(),
                expected: "Number, Number".to_string(),
                got: args
                    .iter()
                    .map(|arg| arg.kind().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    })
}

/// Significant digits kept when rendering a number.
const PRECISION: i32 = 14;

/// Renders like `%.14G` with a PHP-style exponent: trailing zeros dropped,
/// exponent form (`1.0E+16`, `1.0E-5`) once the decimal point would sit more
/// than 14 places right or more than 4 places left of the first digit.
pub(super) fn render(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        let rendered = if value > 0.0 { "INF" } else { "-INF" };
        return rendered.to_string();
    }
    if value == 0.0 {
        let rendered = if value.is_sign_negative() { "-0" } else { "0" };
        return rendered.to_string();
    }

    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits = mantissa.replace('.', "");
    let digits = digits.trim_end_matches('0');
    // Position of the decimal point relative to the first significant digit.
    let point = exponent + 1;

    let mut rendered = String::new();
    if value < 0.0 {
        rendered.push('-');
    }
    if point < -3 || point > PRECISION {
        let (first, rest) = digits.split_at(1);
        rendered.push_str(first);
        rendered.push('.');
        rendered.push_str(if rest.is_empty() { "0" } else { rest });
        rendered.push('E');
        rendered.push(if exponent < 0 { '-' } else { '+' });
        rendered.push_str(&exponent.abs().to_string());
    } else if point <= 0 {
        rendered.push_str("0.");
        rendered.push_str(&"0".repeat(point.unsigned_abs() as usize));
        rendered.push_str(digits);
    } else {
        let point = point as usize;
        if digits.len() <= point {
            rendered.push_str(digits);
            rendered.push_str(&"0".repeat(point - digits.len()));
        } else {
            rendered.push_str(&digits[..point]);
            rendered.push('.');
            rendered.push_str(&digits[point..]);
        }
    }
    rendered
}

//! Arithmetic, negation, indexing and slicing on runtime values.

use crate::ast::ArithmeticOp;
use crate::error::EvalError;
use crate::format;
use crate::policy::Limits;
use crate::value::Value;

pub(crate) fn apply_binary(
    op: ArithmeticOp,
    left: Value,
    right: Value,
    limits: &Limits,
) -> Result<Value, EvalError> {
    match op {
        ArithmeticOp::Add => add(left, right, limits),
        ArithmeticOp::Sub => numeric(op, &left, &right, i64::checked_sub, |a, b| a - b),
        ArithmeticOp::Mul => multiply(left, right, limits),
        ArithmeticOp::Div => divide(&left, &right),
        ArithmeticOp::Mod => match (&left, &right) {
            (Value::Str(fmt), arg) => format::printf(fmt, arg, limits).map(Value::Str),
            _ => modulo(&left, &right),
        },
    }
}

fn unsupported(op: ArithmeticOp, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeError(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn overflow() -> EvalError {
    EvalError::LimitExceeded("integer overflow".to_string())
}

/// Both operands as floats when at least one is a float and neither is a
/// string or list.
fn as_floats(left: &Value, right: &Value) -> Option<(f64, f64)> {
    let to_float = |v: &Value| match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    };
    Some((to_float(left)?, to_float(right)?))
}

fn numeric(
    op: ArithmeticOp,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b).map(Value::Int).ok_or_else(overflow),
        _ => as_floats(left, right)
            .map(|(a, b)| Value::Float(float_op(a, b)))
            .ok_or_else(|| unsupported(op, left, right)),
    }
}

fn add(left: Value, right: Value, limits: &Limits) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Str(mut a), Value::Str(b)) => {
            limits.check_len(a.len() + b.len(), "string")?;
            a.push_str(&b);
            Ok(Value::Str(a))
        }
        (Value::List(mut a), Value::List(b)) => {
            limits.check_len(a.len() + b.len(), "list")?;
            a.extend(b);
            Ok(Value::List(a))
        }
        (Value::Str(_), other) => Err(EvalError::TypeError(format!(
            "can only concatenate str (not \"{}\") to str",
            other.type_name()
        ))),
        (Value::List(_), other) => Err(EvalError::TypeError(format!(
            "can only concatenate list (not \"{}\") to list",
            other.type_name()
        ))),
        (left, right) => numeric(ArithmeticOp::Add, &left, &right, i64::checked_add, |a, b| a + b),
    }
}

fn repeat_count(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

fn multiply(left: Value, right: Value, limits: &Limits) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
            let n = repeat_count(n);
            limits.check_len(s.len().saturating_mul(n), "string")?;
            Ok(Value::Str(s.repeat(n)))
        }
        (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
            let n = repeat_count(n);
            limits.check_len(items.len().saturating_mul(n), "list")?;
            let mut out = Vec::with_capacity(items.len() * n);
            for _ in 0..n {
                out.extend(items.iter().cloned());
            }
            Ok(Value::List(out))
        }
        (left @ (Value::Str(_) | Value::List(_)), right)
        | (left, right @ (Value::Str(_) | Value::List(_))) => Err(EvalError::TypeError(format!(
            "can't multiply sequence by non-int of type '{}'",
            if matches!(left, Value::Str(_) | Value::List(_)) {
                right.type_name()
            } else {
                left.type_name()
            }
        ))),
        (left, right) => numeric(ArithmeticOp::Mul, &left, &right, i64::checked_mul, |a, b| a * b),
    }
}

fn divide(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (a, b) = match (left, right) {
        (Value::Int(a), Value::Int(b)) => (*a as f64, *b as f64),
        _ => as_floats(left, right).ok_or_else(|| unsupported(ArithmeticOp::Div, left, right))?,
    };
    if b == 0.0 {
        return Err(EvalError::ZeroDivision("division by zero".to_string()));
    }
    Ok(Value::Float(a / b))
}

/// Modulo with the sign of the divisor, as Python defines it.
fn modulo(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(EvalError::ZeroDivision(
                    "integer modulo by zero".to_string(),
                ));
            }
            let r = a.checked_rem(*b).unwrap_or(0);
            Ok(Value::Int(if r != 0 && (r < 0) != (*b < 0) { r + b } else { r }))
        }
        _ => {
            let (a, b) = as_floats(left, right)
                .ok_or_else(|| unsupported(ArithmeticOp::Mod, left, right))?;
            if b == 0.0 {
                return Err(EvalError::ZeroDivision("float modulo".to_string()));
            }
            let r = a % b;
            let r = if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else if r == 0.0 {
                0.0_f64.copysign(b)
            } else {
                r
            };
            Ok(Value::Float(r))
        }
    }
}

pub(crate) fn negate(value: Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(EvalError::TypeError(format!(
            "bad operand type for unary -: '{}'",
            other.type_name()
        ))),
    }
}

fn sequence_name(value: &Value) -> &'static str {
    match value {
        Value::List(_) => "list",
        _ => "string",
    }
}

fn not_subscriptable(value: &Value) -> EvalError {
    EvalError::TypeError(format!(
        "'{}' object is not subscriptable",
        value.type_name()
    ))
}

/// Resolves a possibly negative index against a sequence of `len` items.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index.checked_add(len)? } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

pub(crate) fn index(value: &Value, index: &Value) -> Result<Value, EvalError> {
    if matches!(value, Value::Int(_) | Value::Float(_)) {
        return Err(not_subscriptable(value));
    }
    let Value::Int(i) = index else {
        return Err(EvalError::TypeError(format!(
            "{} indices must be integers, not '{}'",
            sequence_name(value),
            index.type_name()
        )));
    };
    let out_of_range = || EvalError::IndexOutOfRange(format!("{} index out of range", sequence_name(value)));
    match value {
        Value::Str(s) => {
            let len = s.chars().count();
            let at = resolve_index(*i, len).ok_or_else(out_of_range)?;
            s.chars()
                .nth(at)
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(out_of_range)
        }
        Value::List(items) => {
            let at = resolve_index(*i, items.len()).ok_or_else(out_of_range)?;
            items.get(at).cloned().ok_or_else(out_of_range)
        }
        other => Err(not_subscriptable(other)),
    }
}

fn slice_bound(bound: Option<&Value>) -> Result<Option<i64>, EvalError> {
    match bound {
        None => Ok(None),
        Some(Value::Int(i)) => Ok(Some(*i)),
        Some(other) => Err(EvalError::TypeError(format!(
            "slice indices must be integers or None, not '{}'",
            other.type_name()
        ))),
    }
}

/// The positions selected by `[start:stop:step]` over `len` items, with
/// Python's clamping of out-of-range and negative bounds.
fn slice_positions(len: usize, start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let adjust = |bound: i64, low: i64, high: i64| {
        let b = if bound < 0 { bound.saturating_add(len) } else { bound };
        b.clamp(low, high)
    };
    let (start, stop) = if step > 0 {
        (
            start.map_or(0, |s| adjust(s, 0, len)),
            stop.map_or(len, |s| adjust(s, 0, len)),
        )
    } else {
        (
            start.map_or(len - 1, |s| adjust(s, -1, len - 1)),
            stop.map_or(-1, |s| adjust(s, -1, len - 1)),
        )
    };

    let mut positions = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if let Ok(p) = usize::try_from(i) {
            positions.push(p);
        }
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    positions
}

pub(crate) fn slice(
    value: &Value,
    lower: Option<&Value>,
    upper: Option<&Value>,
    step: Option<&Value>,
) -> Result<Value, EvalError> {
    if matches!(value, Value::Int(_) | Value::Float(_)) {
        return Err(not_subscriptable(value));
    }
    let start = slice_bound(lower)?;
    let stop = slice_bound(upper)?;
    let step = slice_bound(step)?.unwrap_or(1);
    if step == 0 {
        return Err(EvalError::ValueError("slice step cannot be zero".to_string()));
    }

    match value {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let selected = slice_positions(chars.len(), start, stop, step)
                .into_iter()
                .filter_map(|p| chars.get(p))
                .collect();
            Ok(Value::Str(selected))
        }
        Value::List(items) => {
            let selected = slice_positions(items.len(), start, stop, step)
                .into_iter()
                .filter_map(|p| items.get(p).cloned())
                .collect();
            Ok(Value::List(selected))
        }
        other => Err(not_subscriptable(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    fn binary(op: ArithmeticOp, left: Value, right: Value) -> Result<Value, EvalError> {
        apply_binary(op, left, right, &Limits::default())
    }

    #[test]
    fn test_addition() {
        assert_eq!(binary(ArithmeticOp::Add, s("a"), s("b")).unwrap(), s("ab"));
        assert_eq!(binary(ArithmeticOp::Add, Value::Int(2), Value::Int(3)).unwrap(), Value::Int(5));
        assert_eq!(
            binary(ArithmeticOp::Add, Value::Int(2), Value::Float(0.5)).unwrap(),
            Value::Float(2.5)
        );
        assert!(matches!(
            binary(ArithmeticOp::Add, s("a"), Value::Int(1)),
            Err(EvalError::TypeError(_))
        ));
        assert!(matches!(
            binary(ArithmeticOp::Add, Value::Int(1), s("a")),
            Err(EvalError::TypeError(_))
        ));
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(
            binary(ArithmeticOp::Add, Value::Int(i64::MAX), Value::Int(1)),
            Err(EvalError::LimitExceeded(_))
        ));
        assert!(matches!(
            binary(ArithmeticOp::Mul, Value::Int(i64::MAX), Value::Int(2)),
            Err(EvalError::LimitExceeded(_))
        ));
        assert!(matches!(negate(Value::Int(i64::MIN)), Err(EvalError::LimitExceeded(_))));
    }

    #[test]
    fn test_division_always_floats() {
        assert_eq!(binary(ArithmeticOp::Div, Value::Int(7), Value::Int(2)).unwrap(), Value::Float(3.5));
        assert_eq!(binary(ArithmeticOp::Div, Value::Int(4), Value::Int(2)).unwrap(), Value::Float(2.0));
        assert!(matches!(
            binary(ArithmeticOp::Div, Value::Int(1), Value::Int(0)),
            Err(EvalError::ZeroDivision(_))
        ));
    }

    #[test]
    fn test_modulo_takes_divisor_sign() {
        assert_eq!(binary(ArithmeticOp::Mod, Value::Int(-7), Value::Int(3)).unwrap(), Value::Int(2));
        assert_eq!(binary(ArithmeticOp::Mod, Value::Int(7), Value::Int(-3)).unwrap(), Value::Int(-2));
        assert_eq!(
            binary(ArithmeticOp::Mod, Value::Float(-1.5), Value::Int(1)).unwrap(),
            Value::Float(0.5)
        );
        assert_eq!(
            binary(ArithmeticOp::Mod, Value::Int(i64::MIN), Value::Int(-1)).unwrap(),
            Value::Int(0)
        );
        assert!(matches!(
            binary(ArithmeticOp::Mod, Value::Int(1), Value::Int(0)),
            Err(EvalError::ZeroDivision(_))
        ));
    }

    #[test]
    fn test_string_repetition() {
        assert_eq!(binary(ArithmeticOp::Mul, s("ab"), Value::Int(3)).unwrap(), s("ababab"));
        assert_eq!(binary(ArithmeticOp::Mul, Value::Int(-1), s("ab")).unwrap(), s(""));
        assert!(matches!(
            binary(ArithmeticOp::Mul, s("ab"), s("c")),
            Err(EvalError::TypeError(_))
        ));
        assert!(matches!(
            binary(ArithmeticOp::Mul, s("ab"), Value::Int(1 << 40)),
            Err(EvalError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_subtraction_requires_numbers() {
        assert_eq!(binary(ArithmeticOp::Sub, Value::Int(5), Value::Int(7)).unwrap(), Value::Int(-2));
        assert!(matches!(
            binary(ArithmeticOp::Sub, s("a"), s("b")),
            Err(EvalError::TypeError(_))
        ));
    }

    #[test]
    fn test_indexing() {
        assert_eq!(index(&s("Sector12"), &Value::Int(-1)).unwrap(), s("2"));
        assert_eq!(index(&s("Ébène"), &Value::Int(0)).unwrap(), s("É"));
        assert!(matches!(
            index(&s("abc"), &Value::Int(3)),
            Err(EvalError::IndexOutOfRange(_))
        ));
        assert!(matches!(
            index(&s("abc"), &Value::Int(-4)),
            Err(EvalError::IndexOutOfRange(_))
        ));
        assert!(matches!(index(&Value::Int(5), &Value::Int(0)), Err(EvalError::TypeError(_))));
        assert!(matches!(index(&s("abc"), &s("a")), Err(EvalError::TypeError(_))));
    }

    #[test]
    fn test_slicing() {
        let value = s("Level 01");
        let sl = |a: Option<i64>, b: Option<i64>, c: Option<i64>| {
            slice(
                &value,
                a.map(Value::Int).as_ref(),
                b.map(Value::Int).as_ref(),
                c.map(Value::Int).as_ref(),
            )
            .unwrap()
        };
        assert_eq!(sl(Some(0), Some(3), None), s("Lev"));
        assert_eq!(sl(Some(-2), None, None), s("01"));
        assert_eq!(sl(None, None, Some(-1)), s("10 leveL"));
        assert_eq!(sl(None, None, Some(2)), s("Lvl0"));
        assert_eq!(sl(Some(100), None, None), s(""));
        assert_eq!(sl(Some(-100), Some(2), None), s("Le"));
        assert_eq!(sl(Some(5), Some(1), Some(-2)), s(" e"));

        assert!(matches!(
            slice(&value, None, None, Some(&Value::Int(0))),
            Err(EvalError::ValueError(_))
        ));
        assert!(matches!(
            slice(&value, Some(&Value::Float(1.0)), None, None),
            Err(EvalError::TypeError(_))
        ));
    }
}

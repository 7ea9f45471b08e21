//! String methods and built-in functions.
//!
//! Lengths, widths and positions count characters, not bytes, to match how a
//! user reads a level or scope box name. The output limit is the exception:
//! it counts UTF-8 bytes.

use crate::ast::{Builtin, Method};
use crate::error::EvalError;
use crate::format::float_to_int;
use crate::policy::Limits;
use crate::value::Value;
use std::num::IntErrorKind;

/// Checks the argument count against `min..=max` and reports it the way
/// Python's `TypeError` messages do.
fn expect_arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    let given = args.len();
    if (min..=max).contains(&given) {
        return Ok(());
    }
    let expected = match (min, max) {
        (0, 0) => "no arguments".to_string(),
        (1, 1) => "exactly one argument".to_string(),
        (min, max) if min == max => format!("exactly {} arguments", min),
        (min, _) if given < min => format!("at least {} argument{}", min, plural(min)),
        (_, max) => format!("at most {} argument{}", max, plural(max)),
    };
    Err(EvalError::TypeError(format!(
        "{}() takes {} ({} given)",
        name, expected, given
    )))
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn str_arg<'a>(name: &str, args: &'a [Value], at: usize) -> Result<&'a str, EvalError> {
    match &args[at] {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::TypeError(format!(
            "{}() argument {} must be str, not {}",
            name,
            at + 1,
            other.type_name()
        ))),
    }
}

fn optional_str_arg<'a>(name: &str, args: &'a [Value], at: usize) -> Result<Option<&'a str>, EvalError> {
    if at < args.len() {
        str_arg(name, args, at).map(Some)
    } else {
        Ok(None)
    }
}

fn int_arg(args: &[Value], at: usize) -> Result<i64, EvalError> {
    match &args[at] {
        Value::Int(i) => Ok(*i),
        other => Err(EvalError::TypeError(format!(
            "'{}' object cannot be interpreted as an integer",
            other.type_name()
        ))),
    }
}

fn optional_int_arg(args: &[Value], at: usize) -> Result<Option<i64>, EvalError> {
    if at < args.len() { int_arg(args, at).map(Some) } else { Ok(None) }
}

fn fill_arg(args: &[Value], at: usize) -> Result<char, EvalError> {
    if at >= args.len() {
        return Ok(' ');
    }
    let fill = match &args[at] {
        Value::Str(s) => s,
        other => {
            return Err(EvalError::TypeError(format!(
                "The fill character must be a unicode character, not {}",
                other.type_name()
            )));
        }
    };
    let mut chars = fill.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(EvalError::TypeError(
            "The fill character must be exactly one character long".to_string(),
        )),
    }
}

/// A width argument, bounded by the output limit before anything is allocated.
fn width_arg(args: &[Value], at: usize, limits: &Limits) -> Result<usize, EvalError> {
    let width = usize::try_from(int_arg(args, at)?).unwrap_or(0);
    limits.check_len(width, "padded string")?;
    Ok(width)
}

pub(crate) fn call_method(
    method: Method,
    receiver: &Value,
    args: &[Value],
    limits: &Limits,
) -> Result<Value, EvalError> {
    let name = method.name();
    let Value::Str(s) = receiver else {
        return Err(EvalError::TypeError(format!(
            "'{}' object has no attribute '{}'",
            receiver.type_name(),
            name
        )));
    };
    let s = s.as_str();

    let result = match method {
        Method::Upper => {
            expect_arity(name, args, 0, 0)?;
            s.to_uppercase()
        }
        Method::Lower => {
            expect_arity(name, args, 0, 0)?;
            s.to_lowercase()
        }
        Method::SwapCase => {
            expect_arity(name, args, 0, 0)?;
            swapcase(s)
        }
        Method::Capitalize => {
            expect_arity(name, args, 0, 0)?;
            capitalize(s)
        }
        Method::Title => {
            expect_arity(name, args, 0, 0)?;
            title(s)
        }
        Method::Strip | Method::LStrip | Method::RStrip => {
            expect_arity(name, args, 0, 1)?;
            let chars = optional_str_arg(name, args, 0)?;
            strip(s, chars, method != Method::RStrip, method != Method::LStrip).to_string()
        }
        Method::Replace => {
            expect_arity(name, args, 2, 3)?;
            let old = str_arg(name, args, 0)?;
            let new = str_arg(name, args, 1)?;
            let count = optional_int_arg(args, 2)?;
            replace(s, old, new, count, limits)?
        }
        Method::Split => {
            expect_arity(name, args, 0, 2)?;
            let sep = optional_str_arg(name, args, 0)?;
            let max_split = optional_int_arg(args, 1)?
                .and_then(|n| usize::try_from(n).ok());
            let parts = split(s, sep, max_split)?;
            limits.check_len(parts.len(), "list")?;
            return Ok(Value::List(parts.into_iter().map(Value::Str).collect()));
        }
        Method::Join => {
            expect_arity(name, args, 1, 1)?;
            join(s, &args[0], limits)?
        }
        Method::ZFill => {
            expect_arity(name, args, 1, 1)?;
            let width = width_arg(args, 0, limits)?;
            zfill(s, width)
        }
        Method::LJust | Method::RJust | Method::Center => {
            expect_arity(name, args, 1, 2)?;
            let width = width_arg(args, 0, limits)?;
            let fill = fill_arg(args, 1)?;
            justify(s, method, width, fill)
        }
        Method::Index | Method::Find => {
            expect_arity(name, args, 1, 3)?;
            let needle = str_arg(name, args, 0)?;
            let found = find(s, needle, optional_int_arg(args, 1)?, optional_int_arg(args, 2)?);
            return match (found, method) {
                (Some(at), _) => Ok(Value::Int(i64::try_from(at).unwrap_or(i64::MAX))),
                (None, Method::Find) => Ok(Value::Int(-1)),
                (None, _) => Err(EvalError::ValueError("substring not found".to_string())),
            };
        }
        Method::Count => {
            expect_arity(name, args, 1, 3)?;
            let needle = str_arg(name, args, 0)?;
            let n = count(s, needle, optional_int_arg(args, 1)?, optional_int_arg(args, 2)?);
            return Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)));
        }
    };

    limits.check_len(result.len(), "string")?;
    Ok(Value::Str(result))
}

fn swapcase(s: &str) -> String {
    s.chars()
        .flat_map(|c| -> Box<dyn Iterator<Item = char>> {
            if c.is_uppercase() {
                Box::new(c.to_lowercase())
            } else if c.is_lowercase() {
                Box::new(c.to_uppercase())
            } else {
                Box::new(std::iter::once(c))
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    let mut out = String::with_capacity(s.len());
    if let Some(first) = chars.next() {
        push_titlecase(&mut out, first);
        out.push_str(&chars.as_str().to_lowercase());
    }
    out
}

// Letters of the Unicode titlecase category, e.g. `ǅ`.
fn is_titlecase(c: char) -> bool {
    matches!(
        c,
        '\u{01C5}'
            | '\u{01C8}'
            | '\u{01CB}'
            | '\u{01F2}'
            | '\u{1F88}'..='\u{1F8F}'
            | '\u{1F98}'..='\u{1F9F}'
            | '\u{1FA8}'..='\u{1FAF}'
            | '\u{1FBC}'
            | '\u{1FCC}'
            | '\u{1FFC}'
    )
}

/// Pushes the title case of `c`. The Latin digraphs have a single-character
/// title form; any other multi-character upper case keeps only its first
/// character upper (`ß` becomes `Ss`).
fn push_titlecase(out: &mut String, c: char) {
    let digraph = match c {
        '\u{01C4}'..='\u{01C6}' => Some('\u{01C5}'),
        '\u{01C7}'..='\u{01C9}' => Some('\u{01C8}'),
        '\u{01CA}'..='\u{01CC}' => Some('\u{01CB}'),
        '\u{01F1}'..='\u{01F3}' => Some('\u{01F2}'),
        _ => None,
    };
    if let Some(title) = digraph {
        out.push(title);
        return;
    }
    if is_titlecase(c) {
        out.push(c);
        return;
    }
    let mut upper = c.to_uppercase();
    out.extend(upper.next());
    for rest in upper {
        out.extend(rest.to_lowercase());
    }
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase() || is_titlecase(c)
}

/// Title-cases the first cased character of every run of cased characters.
fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_cased = false;
    for c in s.chars() {
        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            push_titlecase(&mut out, c);
        }
        previous_cased = is_cased(c);
    }
    out
}

fn strip<'a>(s: &'a str, chars: Option<&str>, left: bool, right: bool) -> &'a str {
    let matches = |c: char| match chars {
        Some(set) => set.contains(c),
        None => c.is_whitespace(),
    };
    let s = if left { s.trim_start_matches(matches) } else { s };
    if right { s.trim_end_matches(matches) } else { s }
}

fn replace(s: &str, old: &str, new: &str, count: Option<i64>, limits: &Limits) -> Result<String, EvalError> {
    let available = if old.is_empty() {
        s.chars().count() + 1
    } else {
        s.matches(old).count()
    };
    let n = match count.and_then(|c| usize::try_from(c).ok()) {
        Some(c) => c.min(available),
        None => available,
    };
    let grown = (s.len() + n.saturating_mul(new.len())).saturating_sub(n * old.len());
    limits.check_len(grown, "string")?;
    Ok(s.replacen(old, new, n))
}

fn split(s: &str, sep: Option<&str>, max_split: Option<usize>) -> Result<Vec<String>, EvalError> {
    match sep {
        Some("") => Err(EvalError::ValueError("empty separator".to_string())),
        Some(sep) => Ok(match max_split {
            Some(n) => s.splitn(n.saturating_add(1), sep).map(str::to_string).collect(),
            None => s.split(sep).map(str::to_string).collect(),
        }),
        None => Ok(split_whitespace(s, max_split)),
    }
}

/// Splits on runs of whitespace; once `max_split` splits are made the rest
/// of the string, minus its leading whitespace, is the final item.
fn split_whitespace(s: &str, max_split: Option<usize>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if max_split.is_some_and(|n| parts.len() >= n) {
            parts.push(rest.to_string());
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(rest[..end].to_string());
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest.to_string());
                break;
            }
        }
    }
    parts
}

fn join(separator: &str, iterable: &Value, limits: &Limits) -> Result<String, EvalError> {
    let items: Vec<String> = match iterable {
        Value::Str(s) => s.chars().map(String::from).collect(),
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Str(s) => Ok(s.clone()),
                other => Err(EvalError::TypeError(format!(
                    "sequence item {}: expected str instance, {} found",
                    i,
                    other.type_name()
                ))),
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(EvalError::TypeError(format!(
                "can only join an iterable, not '{}'",
                other.type_name()
            )));
        }
    };
    let total = items.iter().map(String::len).sum::<usize>()
        + separator.len().saturating_mul(items.len().saturating_sub(1));
    limits.check_len(total, "string")?;
    Ok(items.join(separator))
}

fn zfill(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let zeros = "0".repeat(width - len);
    match s.chars().next() {
        Some(sign @ ('+' | '-')) => format!("{}{}{}", sign, zeros, &s[1..]),
        _ => format!("{}{}", zeros, s),
    }
}

fn justify(s: &str, method: Method, width: usize, fill: char) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let margin = width - len;
    let (left, right) = match method {
        Method::LJust => (0, margin),
        Method::RJust => (margin, 0),
        _ => {
            let left = margin / 2 + (margin & width & 1);
            (left, margin - left)
        }
    };
    let pad = |n: usize| std::iter::repeat_n(fill, n).collect::<String>();
    format!("{}{}{}", pad(left), s, pad(right))
}

/// Resolves optional `start`/`end` arguments into a character window, with
/// the same clamping as slicing.
fn window(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let resolve = |bound: i64| -> usize {
        let len_i = i64::try_from(len).unwrap_or(i64::MAX);
        let b = if bound < 0 { bound.saturating_add(len_i) } else { bound };
        usize::try_from(b.clamp(0, len_i)).unwrap_or(0)
    };
    (start.map_or(0, resolve), end.map_or(len, resolve))
}

fn find(s: &str, needle: &str, start: Option<i64>, end: Option<i64>) -> Option<usize> {
    let haystack: Vec<char> = s.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    let (start, end) = window(haystack.len(), start, end);
    if start > end || end - start < needle.len() {
        return None;
    }
    (start..=end - needle.len()).find(|&i| haystack[i..i + needle.len()] == needle[..])
}

fn count(s: &str, needle: &str, start: Option<i64>, end: Option<i64>) -> usize {
    let haystack: Vec<char> = s.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    let (start, end) = window(haystack.len(), start, end);
    if start > end {
        return 0;
    }
    if needle.is_empty() {
        return end - start + 1;
    }
    let mut n = 0;
    let mut i = start;
    while i + needle.len() <= end {
        if haystack[i..i + needle.len()] == needle[..] {
            n += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    n
}

pub(crate) fn call_builtin(builtin: Builtin, args: &[Value], limits: &Limits) -> Result<Value, EvalError> {
    let name = builtin.name();
    match builtin {
        Builtin::Str => {
            expect_arity(name, args, 0, 1)?;
            let text = args.first().map(ToString::to_string).unwrap_or_default();
            limits.check_len(text.len(), "string")?;
            Ok(Value::Str(text))
        }
        Builtin::Int => {
            expect_arity(name, args, 0, 2)?;
            match args {
                [] => Ok(Value::Int(0)),
                [value] => to_int(value).map(Value::Int),
                [Value::Str(text), _] => {
                    let base = int_arg(args, 1)?;
                    parse_int(text, base).map(Value::Int)
                }
                _ => Err(EvalError::TypeError(
                    "int() can't convert non-string with explicit base".to_string(),
                )),
            }
        }
        Builtin::Float => {
            expect_arity(name, args, 0, 1)?;
            match args.first() {
                None => Ok(Value::Float(0.0)),
                Some(Value::Int(i)) => Ok(Value::Float(*i as f64)),
                Some(Value::Float(x)) => Ok(Value::Float(*x)),
                Some(Value::Str(text)) => parse_float(text).map(Value::Float),
                Some(other) => Err(EvalError::TypeError(format!(
                    "float() argument must be a string or a real number, not '{}'",
                    other.type_name()
                ))),
            }
        }
        Builtin::Len => {
            expect_arity(name, args, 1, 1)?;
            let len = match &args[0] {
                Value::Str(s) => s.chars().count(),
                Value::List(items) => items.len(),
                other => {
                    return Err(EvalError::TypeError(format!(
                        "object of type '{}' has no len()",
                        other.type_name()
                    )));
                }
            };
            Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
        }
    }
}

fn to_int(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(x) => float_to_int(*x),
        Value::Str(text) => parse_int(text, 10),
        other => Err(EvalError::TypeError(format!(
            "int() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Removes single underscores between digits; `None` if any underscore is
/// misplaced.
fn strip_digit_underscores(digits: &str) -> Option<String> {
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    Some(digits.replace('_', ""))
}

fn parse_int(text: &str, base: i64) -> Result<i64, EvalError> {
    if base != 0 && !(2..=36).contains(&base) {
        return Err(EvalError::ValueError(
            "int() base must be >= 2 and <= 36, or 0".to_string(),
        ));
    }
    let invalid = || {
        EvalError::ValueError(format!(
            "invalid literal for int() with base {}: {}",
            base,
            Value::from(text).repr()
        ))
    };

    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = unsigned.to_ascii_lowercase();
    let prefixed = |p: &str, radix: i64| {
        lower
            .strip_prefix(p)
            .filter(|_| base == 0 || base == radix)
            .map(|rest| (rest.trim_start_matches('_'), radix))
    };
    let (digits, radix) = prefixed("0x", 16)
        .or_else(|| prefixed("0o", 8))
        .or_else(|| prefixed("0b", 2))
        .unwrap_or((lower.as_str(), if base == 0 { 10 } else { base }));

    let digits = strip_digit_underscores(digits).ok_or_else(invalid)?;
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid());
    }
    let signed = if negative { format!("-{}", digits) } else { digits };
    let radix = u32::try_from(radix).map_err(|_| invalid())?;
    i64::from_str_radix(&signed, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            EvalError::LimitExceeded("integer overflow".to_string())
        }
        _ => invalid(),
    })
}

fn parse_float(text: &str) -> Result<f64, EvalError> {
    let invalid = || {
        EvalError::ValueError(format!(
            "could not convert string to float: {}",
            Value::from(text).repr()
        ))
    };
    let trimmed = text.trim();
    let cleaned = strip_digit_underscores(trimmed).ok_or_else(invalid)?;
    let lower = cleaned.to_ascii_lowercase();
    let unsigned = lower.trim_start_matches(['+', '-']);
    if !matches!(unsigned, "inf" | "infinity" | "nan")
        && !unsigned.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | '+' | '-'))
    {
        return Err(invalid());
    }
    cleaned.parse::<f64>().map_err(|_| invalid())
}

//! `printf`-style formatting for `str % value`.
//!
//! Only a single value argument exists in this language (there are no
//! tuples or mappings), so exactly one conversion must consume it.

use crate::error::EvalError;
use crate::policy::Limits;
use crate::value::{Value, python_exponent};

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    alternate: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
}

pub(crate) fn printf(fmt: &str, arg: &Value, limits: &Limits) -> Result<String, EvalError> {
    let chars: Vec<char> = fmt.chars().collect();
    let mut out = String::with_capacity(fmt.len());
    let mut consumed = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '%' {
            out.push(c);
            continue;
        }

        if chars.get(i) == Some(&'(') {
            return Err(EvalError::TypeError("format requires a mapping".to_string()));
        }
        let mut spec = Spec::default();
        while let Some(&flag) = chars.get(i) {
            match flag {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '#' => spec.alternate = true,
                '0' => spec.zero = true,
                _ => break,
            }
            i += 1;
        }
        if chars.get(i) == Some(&'*') {
            return Err(not_enough_arguments());
        }
        spec.width = read_number(&chars, &mut i);
        if chars.get(i) == Some(&'.') {
            i += 1;
            if chars.get(i) == Some(&'*') {
                return Err(not_enough_arguments());
            }
            spec.precision = Some(read_number(&chars, &mut i));
        }
        while matches!(chars.get(i), Some('h' | 'l' | 'L')) {
            i += 1;
        }
        let Some(&conversion) = chars.get(i) else {
            return Err(EvalError::ValueError("incomplete format".to_string()));
        };
        let position = i;
        i += 1;

        if conversion == '%' {
            out.push('%');
            continue;
        }
        if consumed {
            return Err(not_enough_arguments());
        }
        consumed = true;
        limits.check_len(spec.width, "format width")?;
        limits.check_len(spec.precision.unwrap_or(0), "format precision")?;

        let piece = match conversion {
            's' => pad_text(&spec, &arg.to_string()),
            'r' => pad_text(&spec, &arg.repr()),
            'a' => pad_text(&spec, &ascii(&arg.repr())),
            'd' | 'i' | 'u' => format_integer(&spec, integer_for(conversion, arg)?, 10, false),
            'x' => format_integer(&spec, strict_integer(conversion, arg)?, 16, false),
            'X' => format_integer(&spec, strict_integer(conversion, arg)?, 16, true),
            'o' => format_integer(&spec, strict_integer(conversion, arg)?, 8, false),
            'e' | 'E' | 'f' | 'F' | 'g' | 'G' => format_real(&spec, real_for(arg)?, conversion),
            'c' => pad_text(&spec, &character_for(arg)?.to_string()),
            other => {
                return Err(EvalError::ValueError(format!(
                    "unsupported format character '{}' (0x{:x}) at index {}",
                    other,
                    other as u32,
                    position
                )));
            }
        };
        out.push_str(&piece);
        limits.check_len(out.len(), "formatted string")?;
    }

    if !consumed {
        return Err(EvalError::TypeError(
            "not all arguments converted during string formatting".to_string(),
        ));
    }
    Ok(out)
}

fn not_enough_arguments() -> EvalError {
    EvalError::TypeError("not enough arguments for format string".to_string())
}

fn read_number(chars: &[char], i: &mut usize) -> usize {
    let mut n: usize = 0;
    while let Some(d) = chars.get(*i).and_then(|c| c.to_digit(10)) {
        n = n.saturating_mul(10).saturating_add(d as usize);
        *i += 1;
    }
    n
}

fn pad_text(spec: &Spec, text: &str) -> String {
    let text: String = match spec.precision {
        Some(p) => text.chars().take(p).collect(),
        None => text.to_string(),
    };
    let len = text.chars().count();
    if len >= spec.width {
        return text;
    }
    let fill = " ".repeat(spec.width - len);
    if spec.left {
        text + &fill
    } else {
        fill + &text
    }
}

fn ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        match code {
            0..=0x7f => out.push(c),
            0x80..=0xff => out.push_str(&format!("\\x{:02x}", code)),
            0x100..=0xffff => out.push_str(&format!("\\u{:04x}", code)),
            _ => out.push_str(&format!("\\U{:08x}", code)),
        }
    }
    out
}

fn pad_number(spec: &Spec, negative: bool, prefix: &str, digits: &str, allow_zero: bool) -> String {
    let sign = if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    };
    let len = sign.len() + prefix.len() + digits.len();
    if len >= spec.width {
        return format!("{}{}{}", sign, prefix, digits);
    }
    let fill = spec.width - len;
    if spec.left {
        format!("{}{}{}{}", sign, prefix, digits, " ".repeat(fill))
    } else if spec.zero && allow_zero {
        format!("{}{}{}{}", sign, prefix, "0".repeat(fill), digits)
    } else {
        format!("{}{}{}{}", " ".repeat(fill), sign, prefix, digits)
    }
}

/// `%d` accepts floats and truncates them.
fn integer_for(conversion: char, arg: &Value) -> Result<i64, EvalError> {
    match arg {
        Value::Int(i) => Ok(*i),
        Value::Float(x) => float_to_int(*x),
        other => Err(EvalError::TypeError(format!(
            "%{} format: a real number is required, not {}",
            conversion,
            other.type_name()
        ))),
    }
}

/// `%x` and `%o` only accept integers.
fn strict_integer(conversion: char, arg: &Value) -> Result<i64, EvalError> {
    match arg {
        Value::Int(i) => Ok(*i),
        other => Err(EvalError::TypeError(format!(
            "%{} format: an integer is required, not {}",
            conversion,
            other.type_name()
        ))),
    }
}

pub(crate) fn float_to_int(x: f64) -> Result<i64, EvalError> {
    if x.is_nan() {
        return Err(EvalError::ValueError(
            "cannot convert float NaN to integer".to_string(),
        ));
    }
    if x.is_infinite() {
        return Err(EvalError::LimitExceeded(
            "cannot convert float infinity to integer".to_string(),
        ));
    }
    let truncated = x.trunc();
    if truncated < -9_223_372_036_854_775_808.0 || truncated >= 9_223_372_036_854_775_808.0 {
        return Err(EvalError::LimitExceeded("integer overflow".to_string()));
    }
    Ok(truncated as i64)
}

fn format_integer(spec: &Spec, value: i64, radix: u32, upper: bool) -> String {
    let magnitude = value.unsigned_abs();
    let mut digits = match radix {
        16 if upper => format!("{:X}", magnitude),
        16 => format!("{:x}", magnitude),
        8 => format!("{:o}", magnitude),
        _ => magnitude.to_string(),
    };
    if let Some(p) = spec.precision {
        if digits.len() < p {
            digits = format!("{}{}", "0".repeat(p - digits.len()), digits);
        }
    }
    let prefix = match (spec.alternate, radix, upper) {
        (true, 16, true) => "0X",
        (true, 16, false) => "0x",
        (true, 8, _) => "0o",
        _ => "",
    };
    pad_number(spec, value < 0, prefix, &digits, true)
}

fn real_for(arg: &Value) -> Result<f64, EvalError> {
    match arg {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(x) => Ok(*x),
        other => Err(EvalError::TypeError(format!(
            "must be real number, not {}",
            other.type_name()
        ))),
    }
}

fn exponent_form(magnitude: f64, precision: usize, alternate: bool) -> String {
    let formatted = format!("{:.*e}", precision, magnitude);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let point = if alternate && precision == 0 { "." } else { "" };
    format!("{}{}e{}", mantissa, point, python_exponent(exponent))
}

fn strip_trailing_zeros(number: &str) -> String {
    let (mantissa, exponent) = match number.find('e') {
        Some(at) => number.split_at(at),
        None => (number, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{}{}", mantissa, exponent)
}

fn format_real(spec: &Spec, value: f64, conversion: char) -> String {
    let negative = value.is_sign_negative() && !value.is_nan();
    let upper = conversion.is_ascii_uppercase();

    if !value.is_finite() {
        let text = if value.is_nan() { "nan" } else { "inf" };
        let text = if upper { text.to_ascii_uppercase() } else { text.to_string() };
        return pad_number(spec, negative, "", &text, false);
    }

    let magnitude = value.abs();
    let precision = spec.precision.unwrap_or(6);
    let digits = match conversion.to_ascii_lowercase() {
        'f' => {
            let mut s = format!("{:.*}", precision, magnitude);
            if spec.alternate && precision == 0 {
                s.push('.');
            }
            s
        }
        'e' => exponent_form(magnitude, precision, spec.alternate),
        _ => {
            let significant = precision.max(1);
            let exponent = if magnitude == 0.0 {
                0
            } else {
                let probe = format!("{:.*e}", significant - 1, magnitude);
                probe
                    .split_once('e')
                    .and_then(|(_, e)| e.parse::<i64>().ok())
                    .unwrap_or(0)
            };
            let significant_i = i64::try_from(significant).unwrap_or(i64::MAX);
            let s = if (-4..significant_i).contains(&exponent) {
                let decimals = usize::try_from(significant_i - 1 - exponent).unwrap_or(0);
                let mut s = format!("{:.*}", decimals, magnitude);
                if spec.alternate && decimals == 0 {
                    s.push('.');
                }
                s
            } else {
                exponent_form(magnitude, significant - 1, spec.alternate)
            };
            if spec.alternate { s } else { strip_trailing_zeros(&s) }
        }
    };
    let digits = if upper { digits.to_ascii_uppercase() } else { digits };
    pad_number(spec, negative, "", &digits, true)
}

fn character_for(arg: &Value) -> Result<char, EvalError> {
    match arg {
        Value::Int(i) => u32::try_from(*i)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| EvalError::ValueError("%c arg not in range(0x110000)".to_string())),
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(EvalError::TypeError(
                    "%c requires an int or a unicode character".to_string(),
                )),
            }
        }
        other => Err(EvalError::TypeError(format!(
            "%c requires an int or a unicode character, not {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(template: &str, arg: impl Into<Value>) -> String {
        printf(template, &arg.into(), &Limits::default()).unwrap()
    }

    fn fmt_err(template: &str, arg: impl Into<Value>) -> EvalError {
        printf(template, &arg.into(), &Limits::default()).unwrap_err()
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(fmt("L%s", "01"), "L01");
        assert_eq!(fmt("[%5s]", "ab"), "[   ab]");
        assert_eq!(fmt("[%-5s]", "ab"), "[ab   ]");
        assert_eq!(fmt("[%.2s]", "abcd"), "[ab]");
        assert_eq!(fmt("%r", "ab"), "'ab'");
        assert_eq!(fmt("%a", "é"), "'\\xe9'");
        assert_eq!(fmt("%s", 1.0), "1.0");
        assert_eq!(fmt("100%%: %s", "x"), "100%: x");
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(fmt("%03d", 7), "007");
        assert_eq!(fmt("%+d", 7), "+7");
        assert_eq!(fmt("% d", 7), " 7");
        assert_eq!(fmt("%05d", -42), "-0042");
        assert_eq!(fmt("%-4d|", 5), "5   |");
        assert_eq!(fmt("%.3d", 5), "005");
        assert_eq!(fmt("%d", 3.99), "3");
        assert_eq!(fmt("%x", 255), "ff");
        assert_eq!(fmt("%#X", 255), "0XFF");
        assert_eq!(fmt("%#08x", 255), "0x0000ff");
        assert_eq!(fmt("%o", 8), "10");
        assert_eq!(fmt("%d", i64::MIN), "-9223372036854775808");
    }

    #[test]
    fn test_real_conversions() {
        assert_eq!(fmt("%f", 1.5), "1.500000");
        assert_eq!(fmt("%.2f", 2), "2.00");
        assert_eq!(fmt("%08.3f", -3.14159), "-003.142");
        assert_eq!(fmt("%e", 12345.678), "1.234568e+04");
        assert_eq!(fmt("%.1E", 0.00012), "1.2E-04");
        assert_eq!(fmt("%g", 100000.0), "100000");
        assert_eq!(fmt("%g", 1000000.0), "1e+06");
        assert_eq!(fmt("%g", 0.0001), "0.0001");
        assert_eq!(fmt("%g", 0.00001), "1e-05");
        assert_eq!(fmt("%g", 2.5), "2.5");
        assert_eq!(fmt("%G", f64::INFINITY), "INF");
        assert_eq!(fmt("%5f", f64::NAN), "  nan");
    }

    #[test]
    fn test_character_conversion() {
        assert_eq!(fmt("%c", 65), "A");
        assert_eq!(fmt("%c", "z"), "z");
        assert!(matches!(fmt_err("%c", "zz"), EvalError::TypeError(_)));
        assert!(matches!(fmt_err("%c", -1), EvalError::ValueError(_)));
    }

    #[test]
    fn test_argument_count_errors() {
        assert!(matches!(fmt_err("plain", "x"), EvalError::TypeError(_)));
        assert!(matches!(fmt_err("%s %s", "x"), EvalError::TypeError(_)));
        assert!(matches!(fmt_err("%*d", 1), EvalError::TypeError(_)));
        assert!(matches!(fmt_err("%(name)s", "x"), EvalError::TypeError(_)));
    }

    #[test]
    fn test_type_errors() {
        assert!(matches!(fmt_err("%d", "1"), EvalError::TypeError(_)));
        assert!(matches!(fmt_err("%x", 1.5), EvalError::TypeError(_)));
        assert!(matches!(fmt_err("%f", "x"), EvalError::TypeError(_)));
    }

    #[test]
    fn test_format_errors() {
        assert!(matches!(fmt_err("%q", 1), EvalError::ValueError(_)));
        assert!(matches!(fmt_err("abc %", 1), EvalError::ValueError(_)));
        assert!(matches!(fmt_err("%99999s", "x"), EvalError::LimitExceeded(_)));
        assert!(matches!(fmt_err("%.99999f", 1), EvalError::LimitExceeded(_)));
    }
}

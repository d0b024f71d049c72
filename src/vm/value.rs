use std::rc::Rc;

use super::func::Func;
use super::matrix::Matrix;
use super::RuntimeError;

pub type Scalar = f64;

/// A built-in function. It receives the argument values left to right and
/// either produces a result or fails with a runtime error.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, RuntimeError>;

/// A runtime value. Matrices, strings and user functions live on the heap
/// behind a shared handle; the other variants are inline.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Nil,
    Scalar(Scalar),
    Matrix(Rc<Matrix>),
    Str(Rc<str>),
    Builtin(BuiltinFn),
    Func(Rc<Func>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Scalar(_) => "scalar",
            Value::Matrix(_) => "matrix",
            Value::Str(_) => "string",
            Value::Builtin(_) | Value::Func(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Scalar(x) => *x != 0.0,
            Value::Matrix(m) => m.elems().iter().any(|&x| x != 0.0),
            Value::Str(s) => !s.is_empty(),
            Value::Builtin(_) | Value::Func(_) => true,
        }
    }

    /// Print the value to stdout the way the `Print` instruction does.
    /// Nil prints nothing at all, not even a newline.
    pub fn print(&self) {
        match self {
            Value::Nil => {}
            Value::Scalar(x) => println!("{}", format_scalar(*x)),
            Value::Matrix(m) => {
                println!("[");
                let width = m.width() as usize;
                if width > 0 {
                    for row in m.elems().chunks(width) {
                        for x in row {
                            print!("\t{}", format_scalar(*x));
                        }
                        println!();
                    }
                }
                println!("]");
            }
            Value::Str(s) => println!("{s}"),
            Value::Builtin(f) => println!("<built-in function {:p}>", *f as *const ()),
            Value::Func(f) => println!("<function {:p}>", Rc::as_ptr(f)),
        }
    }
}

/// Parse a numeric literal: decimal digits with at most one `.`.
/// A trailing `.` is fine, a second `.` is not; signs and exponents are
/// not part of the grammar (the lexer never produces them).
pub fn parse_scalar(text: &str) -> Option<Scalar> {
    if text.bytes().filter(|&b| b == b'.').count() > 1 {
        return None;
    }
    text.parse().ok()
}

/// Format a scalar like C's `%.15g`: 15 significant digits, trailing
/// zeros trimmed, scientific notation outside [1e-4, 1e15).
pub fn format_scalar(x: Scalar) -> String {
    if x.is_nan() {
        return "nan".to_owned();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf" } else { "inf" }.to_owned();
    }
    if x == 0.0 {
        return "0".to_owned();
    }

    let exp = x.abs().log10().floor() as i32;
    if (-4..15).contains(&exp) {
        let prec = (14 - exp).max(0) as usize;
        let mut s = format!("{x:.prec$}");
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        s
    } else {
        let s = format!("{x:.14e}");
        let (mantissa, exponent) = s.split_once('e').unwrap_or((&s, "0"));
        let mut mantissa = mantissa.to_owned();
        if mantissa.contains('.') {
            while mantissa.ends_with('0') {
                mantissa.pop();
            }
            if mantissa.ends_with('.') {
                mantissa.pop();
            }
        }
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Unescape the contents of a string literal (without its quotes).
/// `\n`, `\q` and `\\` map to newline, `"` and `\`; a backslash before any
/// other byte swallows both bytes, and a trailing backslash is dropped.
pub fn unescape(lit: &str) -> String {
    let mut out = String::with_capacity(lit.len());
    let mut chars = lit.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('q') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(_) | None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Scalar(0.0).is_truthy());
        assert!(Value::Scalar(-0.5).is_truthy());
        assert!(!Value::Str(Rc::from("")).is_truthy());
        assert!(Value::Str(Rc::from("x")).is_truthy());
        assert!(!Value::Matrix(Rc::new(Matrix::new(2, 2))).is_truthy());
        let m = Matrix::new(2, 2);
        m.elems_mut()[3] = 1.0;
        assert!(Value::Matrix(Rc::new(m)).is_truthy());
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("42"), Some(42.0));
        assert_eq!(parse_scalar("1.5"), Some(1.5));
        assert_eq!(parse_scalar("1."), Some(1.0));
        assert_eq!(parse_scalar("1.2.3"), None);
        assert_eq!(parse_scalar("1..2"), None);
    }

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(7.0), "7");
        assert_eq!(format_scalar(0.0), "0");
        assert_eq!(format_scalar(-3.5), "-3.5");
        assert_eq!(format_scalar(0.1), "0.1");
        assert_eq!(format_scalar(1.0 / 3.0), "0.333333333333333");
        assert_eq!(format_scalar(1e-5), "1e-05");
        assert_eq!(format_scalar(1e300), "1e+300");
        assert_eq!(format_scalar(f64::INFINITY), "inf");
        assert_eq!(format_scalar(f64::NAN), "nan");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("abc"), "abc");
        assert_eq!(unescape("a\\nb"), "a\nb");
        assert_eq!(unescape("\\q"), "\"");
        assert_eq!(unescape("\\\\"), "\\");
        assert_eq!(unescape("a\\xb"), "ab");
        assert_eq!(unescape("a\\"), "a");
    }
}

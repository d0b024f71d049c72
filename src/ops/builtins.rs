//! Intrinsic functions and constants: scalar math, matrix construction
//! and inspection, string building, and a couple of debugging helpers.

use std::rc::Rc;

use rand::Rng;

use crate::disasm;
use crate::runtime::Runtime;
use crate::vm::matrix::Matrix;
use crate::vm::value::{format_scalar, Scalar, Value};
use crate::vm::RuntimeError;

pub(crate) fn install(rt: &mut Runtime) {
    rt.define_global("sin", Value::Builtin(sin));
    rt.define_global("cos", Value::Builtin(cos));
    rt.define_global("atan", Value::Builtin(atan));
    rt.define_global("ln", Value::Builtin(ln));
    rt.define_global("exp", Value::Builtin(exp));
    rt.define_global("trunc", Value::Builtin(trunc));
    rt.define_global("floor", Value::Builtin(floor));
    rt.define_global("ceil", Value::Builtin(ceil));

    rt.define_global("Mat", Value::Builtin(mat));
    rt.define_global("Dim", Value::Builtin(dim));
    rt.define_global("Trans", Value::Builtin(trans));
    rt.define_global("Kind", Value::Builtin(kind));
    rt.define_global("Cat", Value::Builtin(cat));
    rt.define_global("Rand", Value::Builtin(rand_));
    rt.define_global("DisAsm", Value::Builtin(dis_asm));

    rt.define_global("pi", Value::Scalar(std::f64::consts::PI));
}

macro_rules! scalar_fn {
    ($name:ident) => {
        fn $name(args: &[Value]) -> Result<Value, RuntimeError> {
            if args.len() != 1 {
                return Err(RuntimeError(format!(
                    "'{}' expects exactly one argument",
                    stringify!($name)
                )));
            }
            let Value::Scalar(x) = args[0] else {
                return Err(RuntimeError(format!(
                    "'{}' can only be applied to a scalar",
                    stringify!($name)
                )));
            };
            Ok(Value::Scalar(x.$name()))
        }
    };
}

scalar_fn!(sin);
scalar_fn!(cos);
scalar_fn!(atan);
scalar_fn!(ln);
scalar_fn!(exp);
scalar_fn!(trunc);
scalar_fn!(floor);
scalar_fn!(ceil);

fn mat(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 2 {
        return Err(RuntimeError("'Mat' expects exactly two arguments".to_owned()));
    }
    let (Value::Scalar(h), Value::Scalar(w)) = (&args[0], &args[1]) else {
        return Err(RuntimeError(
            "both arguments to 'Mat' must be scalars".to_owned(),
        ));
    };
    let (height, width) = (*h as u32, *w as u32);
    if (height == 0) != (width == 0) {
        return Err(RuntimeError("invalid matrix dimensions".to_owned()));
    }
    Ok(Value::Matrix(Rc::new(Matrix::new(height, width))))
}

fn dim(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError("'Dim' expects exactly one argument".to_owned()));
    }
    let Value::Matrix(m) = &args[0] else {
        return Err(RuntimeError(
            "'Dim' can only be applied to a matrix".to_owned(),
        ));
    };
    Ok(Value::Matrix(Rc::new(Matrix::from_vec(
        1,
        2,
        vec![m.height() as Scalar, m.width() as Scalar],
    ))))
}

fn trans(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError(
            "'Trans' expects exactly one argument".to_owned(),
        ));
    }
    let Value::Matrix(m) = &args[0] else {
        return Err(RuntimeError(
            "'Trans' can only be applied to a matrix".to_owned(),
        ));
    };
    let (height, width) = (m.height() as usize, m.width() as usize);
    let elems = m.elems();
    let mut out = vec![0.0; elems.len()];
    for i in 0..width {
        for j in 0..height {
            out[i * height + j] = elems[j * width + i];
        }
    }
    Ok(Value::Matrix(Rc::new(Matrix::from_vec(
        m.width(),
        m.height(),
        out,
    ))))
}

fn kind(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError(
            "'Kind' expects exactly one argument".to_owned(),
        ));
    }
    Ok(Value::Str(Rc::from(args[0].kind_name())))
}

fn cat(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut buf = String::new();
    for arg in args {
        match arg {
            Value::Nil => buf.push_str("nil"),
            Value::Scalar(x) => buf.push_str(&format_scalar(*x)),
            Value::Str(s) => buf.push_str(s),
            Value::Matrix(m) => {
                let width = m.width() as usize;
                let elems = m.elems();
                buf.push('[');
                for (i, x) in elems.iter().enumerate() {
                    if i > 0 {
                        buf.push(' ');
                    }
                    buf.push_str(&format_scalar(*x));
                    if i + 1 != elems.len() {
                        buf.push(if (i + 1) % width == 0 { ';' } else { ',' });
                    }
                }
                buf.push(']');
            }
            Value::Func(f) => buf.push_str(&format!("<function {:p}>", Rc::as_ptr(f))),
            Value::Builtin(f) => {
                buf.push_str(&format!("<built-in function {:p}>", *f as *const ()))
            }
        }
    }
    Ok(Value::Str(Rc::from(buf)))
}

fn rand_(args: &[Value]) -> Result<Value, RuntimeError> {
    if !args.is_empty() {
        return Err(RuntimeError("'Rand' takes no arguments".to_owned()));
    }
    Ok(Value::Scalar(rand::thread_rng().gen()))
}

fn dis_asm(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError(
            "'DisAsm' expects exactly one argument".to_owned(),
        ));
    }
    let Value::Func(f) = &args[0] else {
        return Err(RuntimeError(
            "'DisAsm' can only be applied to a function".to_owned(),
        ));
    };
    disasm::print(&f.body);
    Ok(Value::Nil)
}
